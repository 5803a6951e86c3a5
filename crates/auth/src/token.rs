//! Token record returned by a successful code exchange.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The provider's token response, as stored in the session.
///
/// Fields the provider sends beyond the standard ones are kept in `extra`
/// so the record round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// The access token
    pub access_token: String,

    /// Token type (usually "Bearer")
    pub token_type: String,

    /// Lifetime of the access token in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Absolute expiry as a unix timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,

    /// The ID token (JWT containing user claims)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// The refresh token (if granted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Scopes granted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Verified ID token claims
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo: Option<Map<String, Value>>,

    /// Any other fields from the token response
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenRecord {
    /// Fills in `expires_at` from `expires_in` when the provider omitted it.
    pub fn stamp_expiry(mut self, now: i64) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = self.expires_in.map(|secs| now + secs);
        }
        self
    }

    /// Sets the verified ID token claims.
    pub fn with_userinfo(mut self, claims: Map<String, Value>) -> Self {
        self.userinfo = Some(claims);
        self
    }

    /// Returns a string claim from the verified ID token.
    pub fn claim(&self, name: &str) -> Option<&str> {
        self.userinfo
            .as_ref()
            .and_then(|claims| claims.get(name))
            .and_then(Value::as_str)
    }

    /// Returns the subject identifier, if the ID token was verified.
    pub fn subject(&self) -> Option<&str> {
        self.claim("sub")
    }

    /// Returns the display name, falling back to email or subject
    pub fn display_name(&self) -> Option<&str> {
        self.claim("name")
            .or_else(|| self.claim("email"))
            .or_else(|| self.subject())
    }
}
