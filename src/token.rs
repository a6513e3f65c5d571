//! Token claims decoding
//!
//! Reads the expiry and user id embedded in backend-issued tokens. Signatures
//! are not checked here; the server re-validates every token it receives.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tokens expiring within this many seconds are treated as absent.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by access and refresh tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiration timestamp, seconds since the epoch
    pub exp: i64,
    /// Issued-at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Owner of the token; only refresh tokens carry it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

/// Tokens issued by login, registration, password reset and refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(default, alias = "userId")]
    pub user_id: Option<i64>,
    pub access_token: String,
    pub refresh_token: String,
}

fn claims_validation() -> Validation {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

/// Decode the payload of a token without verifying its signature
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &claims_validation())?;
    Ok(data.claims)
}

/// Whether `token` is still usable at `now`, including the expiry margin.
/// Malformed tokens are never valid.
pub fn is_valid_token_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.exp >= now.timestamp() + EXPIRY_MARGIN_SECS,
        Err(e) => {
            tracing::debug!("Discarding undecodable token: {}", e);
            false
        }
    }
}

pub fn is_valid_token(token: &str) -> bool {
    is_valid_token_at(token, Utc::now())
}

/// User id embedded in a refresh token
pub fn user_id_from_token(token: &str) -> Option<i64> {
    decode_claims(token).ok().and_then(|claims| claims.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn mint(exp: i64, user_id: Option<i64>) -> String {
        let claims = TokenClaims { exp, iat: Some(exp - 3600), user_id };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server_secret")).unwrap()
    }

    #[test]
    fn decodes_foreign_signed_claims() {
        let token = mint(2_000_000_000, Some(42));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.exp, 2_000_000_000);
        assert_eq!(claims.user_id, Some(42));
        assert_eq!(user_id_from_token(&token), Some(42));
    }

    #[test]
    fn expiry_margin_boundary() {
        let now = Utc::now();
        let ts = now.timestamp();
        assert!(!is_valid_token_at(&mint(ts + 59, None), now));
        assert!(is_valid_token_at(&mint(ts + 60, None), now));
        assert!(is_valid_token_at(&mint(ts + 3600, None), now));
        assert!(!is_valid_token_at(&mint(ts - 10, None), now));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(!is_valid_token("not-a-token"));
        assert!(!is_valid_token(""));
        assert!(decode_claims("a.b.c").is_err());
        assert_eq!(user_id_from_token("a.b.c"), None);
    }
}
