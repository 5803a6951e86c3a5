//! RSA signing key shared by the ID token tests.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

const RSA_PRIVATE_KEY: &str = include_str!("../testdata/id_token_rsa.pem");

/// Base64url modulus of the public half of [`RSA_PRIVATE_KEY`].
const RSA_MODULUS: &str = "rMS-vtepm-NptlL7kahkL-dr3euDTyqTKSdmCeXIV-SXDuigGwpvLnyTmO9A2G3bTcMQYZM_YyBspkQECZfaoXaIxq72pjcFEESL3RvhspVjUQR6GQPcYPCZ9NNj3CVcPqpIwkH027TNa2LayaoemEWOtw5MXZEpB22JV5FHU4QkmwhdLFHKEbgt7AdiLrClu-HqMMf7J9uRQwsavTRGhNfXMZ13cTt35EBbYHUdSBaglKj4V7t6TSmit__dJ3MU4soKniCOFoURekXeTT4oy8x-MPryym2KnQjS426sni0LhaaWCJ1AXt67hhHx80XOCulfrsKz_jMVFGLoy0E8Mw";

/// JWKS document publishing the test key under `kid`.
pub(crate) fn rsa_jwks(kid: &str) -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "kid": kid,
            "n": RSA_MODULUS,
            "e": "AQAB"
        }]
    })
}

/// Signs `claims` with the test key as an RS256 token naming `kid`.
pub(crate) fn sign_rs256(kid: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());

    encode(
        &header,
        claims,
        &EncodingKey::from_rsa_pem(RSA_PRIVATE_KEY.as_bytes()).unwrap(),
    )
    .unwrap()
}
