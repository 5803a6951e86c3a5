//! OAuth client adapter used by the web handlers.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::{AuthError, AuthResult, AuthorizationState, OidcAuth, TokenRecord};

/// Where to send the browser, and what to remember until it comes back.
#[derive(Debug, Clone)]
pub struct AuthorizationRedirect {
    /// Provider authorization URL
    pub url: String,

    /// Pending authorization to hand back to [`OAuthClient::exchange_code`]
    pub state: AuthorizationState,
}

/// Query parameters of the provider's redirect to the callback
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    /// Authorization code from the provider
    #[serde(default)]
    pub code: Option<String>,

    /// State parameter for CSRF protection
    #[serde(default)]
    pub state: Option<String>,

    /// Optional error from provider
    #[serde(default)]
    pub error: Option<String>,

    /// Optional error description
    #[serde(default)]
    pub error_description: Option<String>,
}

/// The two operations the handlers need from an OAuth/OIDC client.
#[async_trait]
pub trait OAuthClient: Send + Sync {
    /// Start the authorization code flow for the given callback URL
    async fn authorization_redirect(&self, redirect_uri: &str)
        -> AuthResult<AuthorizationRedirect>;

    /// Finish the flow: validate the callback and exchange the code for tokens
    async fn exchange_code(
        &self,
        params: &CallbackParams,
        pending: Option<&AuthorizationState>,
    ) -> AuthResult<TokenRecord>;
}

#[async_trait]
impl OAuthClient for OidcAuth {
    async fn authorization_redirect(
        &self,
        redirect_uri: &str,
    ) -> AuthResult<AuthorizationRedirect> {
        let state = AuthorizationState::new(redirect_uri);
        let url = self.authorization_url(&state)?;
        Ok(AuthorizationRedirect { url, state })
    }

    async fn exchange_code(
        &self,
        params: &CallbackParams,
        pending: Option<&AuthorizationState>,
    ) -> AuthResult<TokenRecord> {
        if let Some(error) = &params.error {
            let description = params
                .error_description
                .clone()
                .unwrap_or_else(|| "Authentication failed".to_string());
            warn!(error = %error, description = %description, "OIDC error");
            return Err(AuthError::Provider {
                error: error.clone(),
                description,
            });
        }

        OidcAuth::exchange_authorization_code(
            self,
            params.code.as_deref(),
            params.state.as_deref(),
            pending,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OidcConfig, OidcProviderMetadata};

    fn oidc() -> OidcAuth {
        let metadata: OidcProviderMetadata = serde_json::from_value(serde_json::json!({
            "issuer": "https://tenant.example.com/",
            "authorization_endpoint": "https://tenant.example.com/authorize",
            "token_endpoint": "https://tenant.example.com/oauth/token",
            "jwks_uri": "https://tenant.example.com/.well-known/jwks.json"
        }))
        .unwrap();

        OidcAuth::with_metadata(
            OidcConfig::new("https://tenant.example.com", "client-123", "secret-456"),
            metadata,
            reqwest::Client::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_authorization_redirect_carries_state() {
        let redirect = oidc()
            .authorization_redirect("http://localhost:3000/callback")
            .await
            .unwrap();

        assert!(redirect
            .url
            .starts_with("https://tenant.example.com/authorize?"));
        assert!(redirect.url.contains(&format!("state={}", redirect.state.state)));
        assert_eq!(redirect.state.redirect_uri, "http://localhost:3000/callback");
    }

    #[tokio::test]
    async fn test_provider_error_is_reported() {
        let params = CallbackParams {
            error: Some("access_denied".to_string()),
            error_description: Some("User cancelled".to_string()),
            ..Default::default()
        };

        let err = OAuthClient::exchange_code(&oidc(), &params, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AuthError::Provider { ref error, .. } if error == "access_denied"
        ));
    }
}
