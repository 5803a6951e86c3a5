//! OpenID Connect (OIDC) integration
//!
//! This module provides the authorization code flow against a single OIDC
//! provider: discovery, building the authorization URL, exchanging the code
//! and verifying the returned ID token.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    AuthError, AuthResult, IdTokenVerifier, PkceChallenge, TokenRecord,
    AUTH_STATE_EXPIRATION_SECS, DEFAULT_SCOPES,
};

/// Timeout applied to every request made to the provider.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenID Connect configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcConfig {
    /// The OIDC provider's issuer URL (e.g., "https://tenant.auth0.com")
    pub issuer_url: String,

    /// OAuth2 client ID
    pub client_id: String,

    /// OAuth2 client secret
    pub client_secret: String,

    /// Scopes to request (defaults to ["openid", "profile", "email"])
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
}

impl OidcConfig {
    /// Create a new OIDC configuration
    pub fn new(
        issuer_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            issuer_url: issuer_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scopes: default_scopes(),
        }
    }

    /// Get the discovery URL for the OIDC provider
    pub fn discovery_url(&self) -> String {
        format!(
            "{}/.well-known/openid-configuration",
            self.issuer_url.trim_end_matches('/')
        )
    }
}

/// OIDC provider metadata (subset of fields we need)
#[derive(Debug, Clone, Deserialize)]
pub struct OidcProviderMetadata {
    /// The issuer identifier
    pub issuer: String,

    /// URL of the authorization endpoint
    pub authorization_endpoint: String,

    /// URL of the token endpoint
    pub token_endpoint: String,

    /// URL of the JWKS endpoint
    pub jwks_uri: String,
}

/// Pending authorization, kept by the caller between login and callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationState {
    /// CSRF token
    pub state: String,

    /// Nonce for ID token validation
    pub nonce: String,

    /// PKCE code verifier
    pub code_verifier: String,

    /// Redirect URI sent with the authorization request
    pub redirect_uri: String,

    /// Timestamp when this state was created
    pub created_at: i64,
}

impl AuthorizationState {
    /// Create new authorization state for the given redirect URI
    pub fn new(redirect_uri: impl Into<String>) -> Self {
        Self {
            state: generate_random_string(32),
            nonce: generate_random_string(32),
            code_verifier: PkceChallenge::new().verifier,
            redirect_uri: redirect_uri.into(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Check if this state has expired
    pub fn is_expired(&self, max_age_secs: i64) -> bool {
        let now = chrono::Utc::now().timestamp();
        now - self.created_at > max_age_secs
    }

    /// PKCE code challenge (S256)
    pub fn code_challenge(&self) -> PkceChallenge {
        PkceChallenge::from_verifier(self.code_verifier.as_str())
    }
}

/// Generate a random string for state/nonce
fn generate_random_string(len: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..len)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Error body returned by the token endpoint
#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// OIDC authentication client
///
/// A lightweight client for the authorization code flow with PKCE. It is
/// built once at startup from the provider's discovery document.
#[derive(Debug)]
pub struct OidcAuth {
    config: OidcConfig,
    metadata: OidcProviderMetadata,
    http: reqwest::Client,
    verifier: IdTokenVerifier,
}

impl OidcAuth {
    /// Fetch the provider's discovery document and build the client
    pub async fn discover(config: OidcConfig) -> AuthResult<Self> {
        let http = http_client()?;
        let url = config.discovery_url();

        let response = http
            .get(&url)
            .send()
            .await
            .map_err(|e| AuthError::Discovery(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AuthError::Discovery(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let metadata: OidcProviderMetadata = response
            .json()
            .await
            .map_err(|e| AuthError::Discovery(format!("invalid metadata: {}", e)))?;

        info!(
            issuer = %metadata.issuer,
            authorization_endpoint = %metadata.authorization_endpoint,
            "Loaded OIDC provider metadata"
        );

        Self::with_metadata(config, metadata, http)
    }

    /// Build the client from already known metadata
    pub fn with_metadata(
        config: OidcConfig,
        metadata: OidcProviderMetadata,
        http: reqwest::Client,
    ) -> AuthResult<Self> {
        if metadata.issuer.trim_end_matches('/') != config.issuer_url.trim_end_matches('/') {
            return Err(AuthError::Discovery(format!(
                "issuer mismatch: expected {}, provider reports {}",
                config.issuer_url, metadata.issuer
            )));
        }

        let verifier = IdTokenVerifier::new(
            metadata.issuer.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
            metadata.jwks_uri.clone(),
            http.clone(),
        );

        Ok(Self {
            config,
            metadata,
            http,
            verifier,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &OidcConfig {
        &self.config
    }

    /// Get the provider metadata
    pub fn metadata(&self) -> &OidcProviderMetadata {
        &self.metadata
    }

    /// Build the authorization URL for a pending authorization
    pub fn authorization_url(&self, state: &AuthorizationState) -> AuthResult<String> {
        let mut url = url::Url::parse(&self.metadata.authorization_endpoint)
            .map_err(|e| AuthError::Discovery(format!("Invalid authorization endpoint: {}", e)))?;

        let pkce = state.code_challenge();

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &state.redirect_uri)
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", &state.state)
            .append_pair("nonce", &state.nonce)
            .append_pair("code_challenge", &pkce.challenge)
            .append_pair("code_challenge_method", pkce.method.as_str());

        Ok(url.to_string())
    }

    /// Exchange an authorization code for tokens
    ///
    /// The callback's `state` must match the pending authorization, which
    /// must not be older than [`AUTH_STATE_EXPIRATION_SECS`].
    pub async fn exchange_authorization_code(
        &self,
        code: Option<&str>,
        returned_state: Option<&str>,
        pending: Option<&AuthorizationState>,
    ) -> AuthResult<TokenRecord> {
        let pending = pending.ok_or_else(|| {
            warn!("Callback without a pending authorization");
            AuthError::InvalidState("no pending authorization".to_string())
        })?;

        match returned_state {
            Some(state) if state == pending.state => {}
            Some(_) => {
                warn!("State parameter does not match pending authorization");
                return Err(AuthError::InvalidState("state mismatch".to_string()));
            }
            None => return Err(AuthError::InvalidState("missing state parameter".to_string())),
        }

        if pending.is_expired(AUTH_STATE_EXPIRATION_SECS) {
            warn!("Authorization state expired");
            return Err(AuthError::InvalidState(
                "authorization request expired".to_string(),
            ));
        }

        let code = code
            .ok_or_else(|| AuthError::TokenExchange("missing authorization code".to_string()))?;

        let response = self
            .http
            .post(&self.metadata.token_endpoint)
            .form(&self.token_request_params(code, pending))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Don't log the body, it may echo credentials
            error!(status = %status, "Token endpoint returned error");
            let detail = match response.json::<TokenErrorBody>().await {
                Ok(body) => match body.error_description {
                    Some(description) => format!("{}: {}", body.error, description),
                    None => body.error,
                },
                Err(_) => status.to_string(),
            };
            return Err(AuthError::TokenExchange(detail));
        }

        let record: TokenRecord = response
            .json()
            .await
            .map_err(|e| AuthError::TokenExchange(format!("invalid token response: {}", e)))?;

        let mut record = record.stamp_expiry(chrono::Utc::now().timestamp());

        if let Some(id_token) = record.id_token.clone() {
            let claims = self.verifier.verify(&id_token, &pending.nonce).await?;
            record = record.with_userinfo(claims);
        }

        Ok(record)
    }

    /// Token request parameters for the authorization code grant
    fn token_request_params<'a>(
        &'a self,
        code: &'a str,
        state: &'a AuthorizationState,
    ) -> [(&'static str, &'a str); 6] {
        [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", state.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code_verifier", state.code_verifier.as_str()),
        ]
    }
}

/// HTTP client shared by discovery, token exchange and JWKS fetches
fn http_client() -> AuthResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(AuthError::from)
}
