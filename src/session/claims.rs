//! Decoding of the identity fields carried in a JWT access token.
//!
//! Signatures are not checked here; the API validates every bearer token it
//! receives. The payload only feeds the local notion of "who is signed in".

use base64::Engine;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{IdentityError, User};

#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    user_metadata: Option<Map<String, Value>>,
}

/// Identity fields extracted from an access token.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenClaims {
    pub user: User,
    /// Expiry as unix seconds, when the token carries one.
    pub expires_at: Option<i64>,
}

/// Decode the payload segment of a compact JWT.
pub fn decode_claims(token: &str) -> Result<TokenClaims, IdentityError> {
    let mut parts = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(IdentityError::InvalidToken(
            "expected three dot-separated segments".into(),
        ));
    };
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|err| IdentityError::InvalidToken(format!("payload is not base64url: {err}")))?;
    let raw: RawClaims = serde_json::from_slice(&bytes)
        .map_err(|err| IdentityError::InvalidToken(format!("payload is not JSON: {err}")))?;
    if raw.sub.trim().is_empty() {
        return Err(IdentityError::InvalidToken("missing subject".into()));
    }
    Ok(TokenClaims {
        user: User {
            id: raw.sub,
            email: raw.email.filter(|email| !email.is_empty()),
            metadata: raw.user_metadata.unwrap_or_default(),
        },
        expires_at: raw.exp,
    })
}

#[cfg(test)]
pub(crate) fn encode_test_token(payload: &Value) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = engine.encode(payload.to_string());
    format!("{header}.{body}.c2lnbmF0dXJl")
}
