//! PKCE (Proof Key for Code Exchange) support.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use sha2::{Digest, Sha256};

/// PKCE challenge method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PkceChallengeMethod {
    /// S256 (SHA-256) method.
    S256,
}

impl PkceChallengeMethod {
    /// Returns the string representation for OAuth parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S256 => "S256",
        }
    }
}

/// PKCE challenge and verifier pair.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    /// The code verifier (secret, sent when exchanging the code).
    pub verifier: String,
    /// The code challenge (derived from verifier, sent in auth URL).
    pub challenge: String,
    /// The challenge method.
    pub method: PkceChallengeMethod,
}

impl PkceChallenge {
    /// Generates a new PKCE challenge.
    pub fn new() -> Self {
        Self::from_verifier(generate_code_verifier())
    }

    /// Creates a PKCE challenge from an existing verifier.
    pub fn from_verifier(verifier: impl Into<String>) -> Self {
        let verifier = verifier.into();
        let challenge = generate_code_challenge(&verifier);

        Self {
            verifier,
            challenge,
            method: PkceChallengeMethod::S256,
        }
    }
}

impl Default for PkceChallenge {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a cryptographically random code verifier.
fn generate_code_verifier() -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.random::<u8>()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// Generates a code challenge from a verifier using S256 method.
fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}
