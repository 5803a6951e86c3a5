//! ID token verification.

use jsonwebtoken::{
    decode, decode_header,
    jwk::{Jwk, JwkSet},
    Algorithm, DecodingKey, Validation,
};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{AuthError, AuthResult};

/// Minimum seconds between two JWKS fetches caused by an unknown key id.
const JWKS_REFRESH_COOLDOWN_SECS: i64 = 60;

/// Last fetched JWKS and when it was fetched.
#[derive(Default)]
struct JwksCache {
    keys: Option<JwkSet>,
    fetched_at: Option<i64>,
}

/// Verifies ID tokens issued by one provider for one client.
///
/// HMAC-signed tokens are checked with the client secret; asymmetric ones
/// with the provider's JWKS, fetched on first use and refreshed when a key
/// id is not found, at most once per [`JWKS_REFRESH_COOLDOWN_SECS`].
pub struct IdTokenVerifier {
    issuer: String,
    client_id: String,
    client_secret: String,
    jwks_uri: String,
    http: reqwest::Client,
    jwks: RwLock<JwksCache>,
    refresh_cooldown_secs: i64,
}

impl std::fmt::Debug for IdTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdTokenVerifier")
            .field("issuer", &self.issuer)
            .field("client_id", &self.client_id)
            .field("jwks_uri", &self.jwks_uri)
            .finish_non_exhaustive()
    }
}

impl IdTokenVerifier {
    /// Creates a verifier.
    pub fn new(
        issuer: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        jwks_uri: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            jwks_uri: jwks_uri.into(),
            http,
            jwks: RwLock::new(JwksCache::default()),
            refresh_cooldown_secs: JWKS_REFRESH_COOLDOWN_SECS,
        }
    }

    /// Verifies signature, issuer, audience, expiry and nonce, returning the claims.
    pub async fn verify(&self, token: &str, nonce: &str) -> AuthResult<Map<String, Value>> {
        let header = decode_header(token)?;

        let key = match header.alg {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                DecodingKey::from_secret(self.client_secret.as_bytes())
            }
            _ => self.jwk_decoding_key(header.kid.as_deref()).await?,
        };

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.client_id]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let claims = decode::<Map<String, Value>>(token, &key, &validation)?.claims;

        match claims.get("nonce").and_then(Value::as_str) {
            Some(claimed) if claimed == nonce => Ok(claims),
            Some(_) => Err(AuthError::IdToken("nonce mismatch".to_string())),
            None => Err(AuthError::IdToken("nonce missing".to_string())),
        }
    }

    async fn jwk_decoding_key(&self, kid: Option<&str>) -> AuthResult<DecodingKey> {
        if let Some(key) = self.cached_key(kid).await? {
            return Ok(key);
        }

        if self.recently_refreshed().await {
            debug!(kid = ?kid, "Unknown key id, JWKS was refreshed recently");
            return Err(no_matching_key(kid));
        }

        debug!(kid = ?kid, "Signing key not cached, refreshing JWKS");
        self.refresh_jwks().await?;

        self.cached_key(kid)
            .await?
            .ok_or_else(|| no_matching_key(kid))
    }

    async fn cached_key(&self, kid: Option<&str>) -> AuthResult<Option<DecodingKey>> {
        let cache = self.jwks.read().await;
        let Some(set) = cache.keys.as_ref() else {
            return Ok(None);
        };

        select_jwk(set, kid)
            .map(|jwk| DecodingKey::from_jwk(jwk).map_err(AuthError::from))
            .transpose()
    }

    async fn recently_refreshed(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.jwks
            .read()
            .await
            .fetched_at
            .is_some_and(|at| now - at < self.refresh_cooldown_secs)
    }

    async fn refresh_jwks(&self) -> AuthResult<()> {
        let set: JwkSet = self
            .http
            .get(&self.jwks_uri)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        info!(keys = set.keys.len(), "Loaded provider JWKS");
        *self.jwks.write().await = JwksCache {
            keys: Some(set),
            fetched_at: Some(chrono::Utc::now().timestamp()),
        };
        Ok(())
    }
}

fn no_matching_key(kid: Option<&str>) -> AuthError {
    AuthError::IdToken(format!("no signing key matches kid {:?}", kid))
}

/// Picks the key named by `kid`, or the only key when the token names none.
fn select_jwk<'a>(set: &'a JwkSet, kid: Option<&str>) -> Option<&'a Jwk> {
    match kid {
        Some(kid) => set.find(kid),
        None if set.keys.len() == 1 => set.keys.first(),
        None => None,
    }
}
