//! Token Codec
//! Mission: Sign and verify stateless, time-bound bearer tokens
//!
//! Tokens are HS256 JWTs carrying only the subject id plus absolute `iat`/`exp`
//! timestamps. Nothing is stored server-side; a token dies by expiry.

use crate::auth::models::{Claims, TokenSubject};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::time::Duration;
use tracing::debug;

/// Why a token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Signature mismatch, or the token could not be decoded at all.
    InvalidSignature,
    Expired,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::InvalidSignature => write!(f, "invalid token signature"),
            TokenError::Expired => write!(f, "token expired"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Sign a token for `subject_id` that expires `ttl` from now.
pub fn issue(subject_id: &str, secret: &[u8], ttl: Duration) -> Result<String> {
    issue_at(subject_id, secret, ttl, Utc::now())
}

/// Sign a token as if issued at `issued_at`.
pub fn issue_at(
    subject_id: &str,
    secret: &[u8],
    ttl: Duration,
    issued_at: DateTime<Utc>,
) -> Result<String> {
    let ttl = chrono::Duration::from_std(ttl).context("Token lifetime out of range")?;
    let expires_at = issued_at
        .checked_add_signed(ttl)
        .context("Invalid timestamp")?;

    let claims = Claims {
        user: TokenSubject {
            id: subject_id.to_string(),
        },
        iat: issued_at.timestamp(),
        exp: expires_at.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .context("Failed to sign token")
}

/// Check signature then expiry; return the embedded subject id.
///
/// The signature is checked first, so a forged token reports
/// `InvalidSignature` even when its `exp` is in the past. HMAC comparison
/// inside `jsonwebtoken` is constant-time.
pub fn verify(token: &str, secret: &[u8]) -> Result<String, TokenError> {
    decode_claims(token, secret).map(|claims| claims.user.id)
}

pub fn decode_claims(token: &str, secret: &[u8]) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    match decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => Err(TokenError::Expired),
            _ => Err(TokenError::InvalidSignature),
        },
    }
}

/// Holds the process-wide signing secret.
///
/// Built once at startup from configuration and shared read-only behind an
/// `Arc`; verification needs no locking.
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl TokenCodec {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn issue(&self, subject_id: &str, ttl: Duration) -> Result<String> {
        debug!(
            "Issuing token for user {}, expires in {}s",
            subject_id,
            ttl.as_secs()
        );
        issue(subject_id, &self.secret, ttl)
    }

    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        verify(token, &self.secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-12345";
    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_issue_and_verify() {
        let token = issue("u1", SECRET, HOUR).unwrap();
        assert!(!token.is_empty());
        assert_eq!(verify(&token, SECRET), Ok("u1".to_string()));
    }

    #[test]
    fn test_expiry_is_absolute() {
        let issued_at = Utc::now();
        let token = issue_at("u1", SECRET, HOUR, issued_at).unwrap();

        let claims = decode_claims(&token, SECRET).unwrap();
        assert_eq!(claims.iat, issued_at.timestamp());
        assert_eq!(claims.exp, issued_at.timestamp() + 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issued_at = Utc::now() - chrono::Duration::hours(2);
        let token = issue_at("u1", SECRET, HOUR, issued_at).unwrap();

        assert_eq!(verify(&token, SECRET), Err(TokenError::Expired));
    }

    #[test]
    fn test_different_secrets_reject() {
        let token = issue("u1", b"secret1", HOUR).unwrap();
        assert_eq!(verify(&token, b"secret2"), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_forged_expired_token_reports_signature() {
        let issued_at = Utc::now() - chrono::Duration::hours(2);
        let token = issue_at("u1", b"secret1", HOUR, issued_at).unwrap();

        assert_eq!(verify(&token, b"secret2"), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(
            verify("invalid.token.here", SECRET),
            Err(TokenError::InvalidSignature)
        );
        assert_eq!(verify("", SECRET), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = issue("u1", SECRET, HOUR).unwrap();
        let other = issue("u2", SECRET, HOUR).unwrap();

        // u2's payload under u1's signature
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert_eq!(verify(&spliced, SECRET), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_verification_is_idempotent() {
        let codec = TokenCodec::new("test-secret-key-12345");
        let token = codec.issue("u1", HOUR).unwrap();

        let first = codec.verify(&token);
        let second = codec.verify(&token);
        assert_eq!(first, Ok("u1".to_string()));
        assert_eq!(first, second);
    }
}
