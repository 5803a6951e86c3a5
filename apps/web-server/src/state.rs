//! Application state.

use std::sync::Arc;

use auth::OAuthClient;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::config::Config;

/// Shared application state.
///
/// Built once at startup and handed to every handler; nothing in it changes
/// after construction.
pub struct AppState<C> {
    /// Server configuration.
    pub config: Arc<Config>,
    /// OAuth client adapter.
    pub oauth: Arc<C>,
    /// Cookie signing key.
    pub cookie_key: Key,
}

impl<C: OAuthClient> AppState<C> {
    /// Creates new application state.
    pub fn new(config: Config, oauth: C) -> Self {
        let cookie_key = config.cookie_key();
        Self {
            config: Arc::new(config),
            oauth: Arc::new(oauth),
            cookie_key,
        }
    }
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            oauth: Arc::clone(&self.oauth),
            cookie_key: self.cookie_key.clone(),
        }
    }
}

impl<C> FromRef<AppState<C>> for Key {
    fn from_ref(state: &AppState<C>) -> Self {
        state.cookie_key.clone()
    }
}
