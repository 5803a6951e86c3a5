//! OpenID Connect client for the Auth0 login web app.
//!
//! This crate provides:
//! - Provider discovery and the authorization code flow with PKCE
//! - ID token verification against the provider's JWKS
//! - The [`OAuthClient`] adapter consumed by the web handlers

mod client;
mod error;
mod id_token;
mod oidc;
mod pkce;
mod token;

#[cfg(test)]
mod testing;

pub use client::*;
pub use error::*;
pub use id_token::*;
pub use oidc::*;
pub use pkce::*;
pub use token::*;

/// Scopes requested by default.
pub const DEFAULT_SCOPES: [&str; 3] = ["openid", "profile", "email"];

/// Maximum age of a pending authorization state in seconds (10 minutes).
pub const AUTH_STATE_EXPIRATION_SECS: i64 = 600;
