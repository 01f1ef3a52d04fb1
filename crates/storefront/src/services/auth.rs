//! Access-token claim decoding.
//!
//! The backend issues the JWTs and verifies their signatures on every call it
//! receives; this layer only reads the claims (identity, role, status,
//! expiry) to drive presentation decisions, the same way the original client
//! read the token payload. Expiry IS validated here so a stale session is
//! caught before a round-trip.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use lumora_core::{Role, UserStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token decoding errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token's `exp` claim is in the past.
    #[error("access token expired")]
    Expired,

    /// The token could not be decoded at all.
    #[error("invalid access token: {0}")]
    Invalid(String),
}

/// Claims carried in the backend-issued access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id.
    pub sub: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp.
    #[serde(default)]
    pub iat: i64,
}

impl TokenClaims {
    /// The expiry instant as a `DateTime`.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// Decode the claims of a backend-issued access token.
///
/// Signature verification stays with the backend that minted the token; this
/// decode checks structure and expiry only.
///
/// # Errors
///
/// Returns [`AuthError::Expired`] for stale tokens, [`AuthError::Invalid`]
/// for anything undecodable.
pub fn decode_claims(token: &str) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation.required_spec_claims.insert("exp".to_string());

    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation).map_err(
        |e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Invalid(e.to_string()),
        },
    )?;

    Ok(data.claims)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token_with_exp(exp: i64) -> String {
        let claims = TokenClaims {
            sub: "USR1".to_string(),
            username: "amara".to_string(),
            email: "amara@example.com".to_string(),
            role: Role::Customer,
            status: UserStatus::Active,
            exp,
            iat: exp - 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-signing-key"),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_valid_token() {
        let exp = Utc::now().timestamp() + 3600;
        let claims = decode_claims(&token_with_exp(exp)).unwrap();

        assert_eq!(claims.sub, "USR1");
        assert_eq!(claims.username, "amara");
        assert_eq!(claims.role, Role::Customer);
        assert_eq!(claims.status, UserStatus::Active);
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn test_decode_expired_token() {
        let exp = Utc::now().timestamp() - 3600;
        assert!(matches!(
            decode_claims(&token_with_exp(exp)),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_claims("not-a-jwt"),
            Err(AuthError::Invalid(_))
        ));
    }

    #[test]
    fn test_expires_at_roundtrip() {
        let exp = Utc::now().timestamp() + 60;
        let claims = decode_claims(&token_with_exp(exp)).unwrap();
        assert_eq!(claims.expires_at().timestamp(), exp);
    }
}
