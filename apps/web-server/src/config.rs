//! Server configuration.

use std::env;

use anyhow::Context;
use auth::OidcConfig;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

/// Server configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Secret used to sign session cookies.
    pub secret_key: String,
    /// Auth0 tenant host, e.g. `tenant.us.auth0.com`.
    pub auth0_domain: String,
    /// OAuth client ID.
    pub auth0_client_id: String,
    /// OAuth client secret.
    pub auth0_client_secret: String,
    /// Public base URL; derived from the `Host` header when unset.
    pub base_url: Option<String>,
    /// Log level.
    pub log_level: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("auth0_domain", &self.auth0_domain)
            .field("auth0_client_id", &self.auth0_client_id)
            .field("base_url", &self.base_url)
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .with_context(|| format!("{} is not set", name))
        };

        let port = match lookup("PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port: {}", port))?,
            None => 3000,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            secret_key: required("APP_SECRET_KEY")?,
            auth0_domain: required("AUTH0_DOMAIN")?,
            auth0_client_id: required("AUTH0_CLIENT_ID")?,
            auth0_client_secret: required("AUTH0_CLIENT_SECRET")?,
            base_url: lookup("APP_BASE_URL")
                .filter(|url| !url.is_empty())
                .map(|url| url.trim_end_matches('/').to_string()),
            log_level: lookup("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the OIDC client configuration for the Auth0 tenant.
    pub fn oidc_config(&self) -> OidcConfig {
        OidcConfig::new(
            format!("https://{}", self.auth0_domain),
            &self.auth0_client_id,
            &self.auth0_client_secret,
        )
    }

    /// Returns the provider's logout endpoint.
    pub fn logout_endpoint(&self) -> String {
        format!("https://{}/v2/logout", self.auth0_domain)
    }

    /// Returns the cookie signing key.
    ///
    /// The secret is stretched with SHA-512 to the 64 bytes the key needs.
    pub fn cookie_key(&self) -> Key {
        Key::from(Sha512::digest(self.secret_key.as_bytes()).as_slice())
    }

    /// Returns true if cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.base_url
            .as_deref()
            .is_some_and(|url| url.starts_with("https://"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("APP_SECRET_KEY", "change-me"),
        ("AUTH0_DOMAIN", "tenant.example.com"),
        ("AUTH0_CLIENT_ID", "client-123"),
        ("AUTH0_CLIENT_SECRET", "secret-456"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.server_addr(), "0.0.0.0:3000");
        assert_eq!(config.log_level, "info");
        assert!(config.base_url.is_none());
        assert!(!config.secure_cookies());
        assert_eq!(config.logout_endpoint(), "https://tenant.example.com/v2/logout");
        assert_eq!(
            config.oidc_config().discovery_url(),
            "https://tenant.example.com/.well-known/openid-configuration"
        );
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("APP_BASE_URL", "https://app.example.com/"),
        ]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.server_addr(), "127.0.0.1:8080");
        assert_eq!(config.base_url.as_deref(), Some("https://app.example.com"));
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_missing_variable_is_named() {
        let vars: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(name, _)| *name != "AUTH0_CLIENT_SECRET")
            .collect();

        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("AUTH0_CLIENT_SECRET"));
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "http"));

        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        let debug = format!("{:?}", config);

        assert!(!debug.contains("change-me"));
        assert!(!debug.contains("secret-456"));
    }
}
