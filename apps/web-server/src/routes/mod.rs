//! HTTP routes.

pub mod auth;
pub mod home;

use ::auth::OAuthClient;
use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::config::Config;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Creates the router with all routes configured.
pub fn create_router<C: OAuthClient + 'static>() -> Router<AppState<C>> {
    Router::new()
        .route("/", get(home::home))
        .route("/login", get(auth::login::<C>))
        .route("/callback", get(auth::callback::<C>))
        .route("/logout", get(auth::logout::<C>))
        .route("/health", get(health_check))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// A `302 Found` redirect.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Absolute URL of `path` on this deployment.
///
/// Uses the configured public base URL, or the host the request was sent to
/// as resolved by [`axum_extra::extract::Host`] (forwarding headers, `Host`,
/// then the request URI's authority).
pub(crate) fn absolute_url(config: &Config, host: Option<&str>, path: &str) -> ServerResult<String> {
    let base = match (&config.base_url, host) {
        (Some(base), _) => base.clone(),
        (None, Some(host)) => format!("http://{}", host),
        (None, None) => {
            return Err(ServerError::Internal(
                "cannot determine the request's host".to_string(),
            ));
        }
    };

    Ok(format!("{}{}", base, path))
}
