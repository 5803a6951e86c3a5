//! Cookie-backed session store.
//!
//! The session holds one entry, `user`: the token record from the last
//! successful login. A second cookie carries the pending authorization
//! between `/login` and `/callback`. Both are signed with the app's
//! cookie key, so a tampered cookie reads as absent.

use std::convert::Infallible;

use auth::{AuthorizationState, TokenRecord};
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::{
    SignedCookieJar,
    cookie::{Cookie, SameSite},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Name of the cookie holding the pending authorization.
pub const AUTH_STATE_COOKIE: &str = "auth0_state";

/// Session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The value could not be serialized.
    #[error("Failed to serialize session value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Per-browser session storage, independent of how it is persisted.
pub trait SessionStore: Sized {
    /// Returns the logged-in user's token record, if any.
    fn user(&self) -> Option<TokenRecord>;

    /// Stores the token record as the session's user.
    fn set_user(self, user: &TokenRecord) -> Result<Self, SessionError>;

    /// Resets the whole session.
    fn clear(self) -> Self;
}

/// Session stored in signed cookies.
#[derive(Debug)]
pub struct CookieSession {
    jar: SignedCookieJar,
    secure: bool,
}

impl CookieSession {
    /// Wraps the request's signed cookie jar.
    pub fn new(jar: SignedCookieJar) -> Self {
        Self { jar, secure: false }
    }

    /// Sets whether written cookies carry the `Secure` attribute.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Remembers a pending authorization until the callback.
    pub fn with_pending(self, state: &AuthorizationState) -> Result<Self, SessionError> {
        self.write(AUTH_STATE_COOKIE, state)
    }

    /// Removes and returns the pending authorization.
    pub fn take_pending(self) -> (Self, Option<AuthorizationState>) {
        let pending = self.read(AUTH_STATE_COOKIE);
        (self.remove(AUTH_STATE_COOKIE), pending)
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let cookie = self.jar.get(name)?;
        let decoded = URL_SAFE_NO_PAD.decode(cookie.value()).ok()?;

        match serde_json::from_slice(&decoded) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(cookie = name, error = %e, "Discarding unreadable cookie");
                None
            }
        }
    }

    fn write<T: Serialize>(mut self, name: &'static str, value: &T) -> Result<Self, SessionError> {
        let encoded = URL_SAFE_NO_PAD.encode(serde_json::to_vec(value)?);
        let cookie = Cookie::build((name, encoded))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure);

        self.jar = self.jar.add(cookie);
        Ok(self)
    }

    fn remove(mut self, name: &'static str) -> Self {
        self.jar = self.jar.remove(Cookie::build(name).path("/"));
        self
    }
}

impl SessionStore for CookieSession {
    fn user(&self) -> Option<TokenRecord> {
        self.read(SESSION_COOKIE)
    }

    fn set_user(self, user: &TokenRecord) -> Result<Self, SessionError> {
        self.write(SESSION_COOKIE, user)
    }

    fn clear(self) -> Self {
        self.remove(SESSION_COOKIE).remove(AUTH_STATE_COOKIE)
    }
}

impl IntoResponseParts for CookieSession {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Key;
    use serde_json::json;

    fn session() -> CookieSession {
        CookieSession::new(SignedCookieJar::new(Key::generate()))
    }

    fn token() -> TokenRecord {
        serde_json::from_value(json!({
            "access_token": "at-123",
            "token_type": "Bearer",
            "expires_in": 86400,
            "userinfo": {"sub": "auth0|42", "name": "Jane Doe"}
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_session_has_no_user() {
        assert!(session().user().is_none());
    }

    #[test]
    fn test_set_then_clear_user() {
        let session = session().set_user(&token()).unwrap();
        assert_eq!(session.user(), Some(token()));

        let session = session.clear();
        assert!(session.user().is_none());
    }

    #[test]
    fn test_pending_state_is_taken_once() {
        let pending = AuthorizationState::new("http://localhost:3000/callback");
        let session = session().with_pending(&pending).unwrap();

        let (session, taken) = session.take_pending();
        assert_eq!(taken, Some(pending));

        let (_, taken) = session.take_pending();
        assert!(taken.is_none());
    }

    #[test]
    fn test_pending_state_does_not_touch_user() {
        let pending = AuthorizationState::new("http://localhost:3000/callback");
        let session = session().with_pending(&pending).unwrap();

        assert!(session.user().is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        let session = session().secure(true).set_user(&token()).unwrap();
        let cookie = session.jar.get(SESSION_COOKIE).unwrap();

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_garbage_value_reads_as_absent() {
        let jar =
            SignedCookieJar::new(Key::generate()).add(Cookie::new(SESSION_COOKIE, "not-json"));
        assert!(CookieSession::new(jar).user().is_none());
    }
}
