//! Auth0 login web app
//!
//! A small web app that logs users in with OpenID Connect against Auth0 and
//! keeps the resulting tokens in a signed cookie session.

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;


use auth::OAuthClient;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Creates the application router with all routes configured.
pub fn create_app<C: OAuthClient + 'static>(state: AppState<C>) -> Router {
    routes::create_router::<C>()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
