//! Authentication route handlers
//!
//! - `/login` - Redirect to the provider's authorization endpoint
//! - `/callback` - Exchange the authorization code and store the session
//! - `/logout` - Clear the session and log out at the provider

use auth::{AuthorizationRedirect, CallbackParams, OAuthClient};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use axum_extra::extract::{Host, SignedCookieJar};
use tracing::info;

use crate::config::Config;
use crate::error::{ServerError, ServerResult};
use crate::routes::{absolute_url, found};
use crate::session::{CookieSession, SessionStore};
use crate::state::AppState;

/// Initiate OIDC login
pub async fn login<C: OAuthClient>(
    State(state): State<AppState<C>>,
    host: Option<Host>,
    jar: SignedCookieJar,
) -> ServerResult<impl IntoResponse> {
    let host = host.map(|Host(host)| host);
    let redirect_uri = absolute_url(&state.config, host.as_deref(), "/callback")?;

    let AuthorizationRedirect {
        url,
        state: pending,
    } = state.oauth.authorization_redirect(&redirect_uri).await?;

    let session = CookieSession::new(jar)
        .secure(state.config.secure_cookies())
        .with_pending(&pending)?;

    info!(redirect_uri = %redirect_uri, "Initiating OIDC login");

    Ok((session, found(&url)))
}

/// Handle OIDC callback
pub async fn callback<C: OAuthClient>(
    State(state): State<AppState<C>>,
    Query(params): Query<CallbackParams>,
    jar: SignedCookieJar,
) -> ServerResult<impl IntoResponse> {
    let (session, pending) = CookieSession::new(jar)
        .secure(state.config.secure_cookies())
        .take_pending();

    let token = state.oauth.exchange_code(&params, pending.as_ref()).await?;

    info!(
        sub = token.subject().unwrap_or("unknown"),
        "User authenticated via OIDC"
    );

    let session = session.set_user(&token)?;

    Ok((session, found("/")))
}

/// Clear the session and log out at the provider
pub async fn logout<C: OAuthClient>(
    State(state): State<AppState<C>>,
    host: Option<Host>,
    jar: SignedCookieJar,
) -> ServerResult<impl IntoResponse> {
    let host = host.map(|Host(host)| host);
    let return_to = absolute_url(&state.config, host.as_deref(), "/")?;
    let url = logout_url(&state.config, &return_to)?;

    let session = CookieSession::new(jar).clear();

    info!("User logged out");

    Ok((session, found(&url)))
}

/// Provider logout URL, form-encoded so spaces become `+`
fn logout_url(config: &Config, return_to: &str) -> ServerResult<String> {
    let mut url = url::Url::parse(&config.logout_endpoint())
        .map_err(|e| ServerError::Internal(format!("Invalid logout endpoint: {}", e)))?;

    url.query_pairs_mut()
        .append_pair("returnTo", return_to)
        .append_pair("client_id", &config.auth0_client_id);

    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(client_id: &str) -> Config {
        Config {
            host: "0.0.0.0".to_string(),
            port: 3000,
            secret_key: "change-me".to_string(),
            auth0_domain: "tenant.example.com".to_string(),
            auth0_client_id: client_id.to_string(),
            auth0_client_secret: "secret-456".to_string(),
            base_url: None,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_logout_url() {
        let url = logout_url(&config("client-123"), "http://localhost:3000/").unwrap();

        assert_eq!(
            url,
            "https://tenant.example.com/v2/logout?returnTo=http%3A%2F%2Flocalhost%3A3000%2F&client_id=client-123"
        );
    }

    #[test]
    fn test_logout_url_encodes_spaces_as_plus() {
        let url = logout_url(&config("my client"), "http://localhost:3000/").unwrap();

        assert!(url.ends_with("&client_id=my+client"));
    }
}
