//! Session Token Codec
//!
//! HS256-signed JWTs carrying the user id and an absolute expiry. The
//! current time is always passed in, so expiry is checked against the
//! caller's clock and never with leeway.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::SessionClaims;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    BadSignature,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token has expired")]
    Expired,

    #[error("token could not be signed: {0}")]
    Signing(String),
}

/// Signs and verifies session tokens under one secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            config.jwt_issuer.clone(),
            Duration::seconds(config.session_ttl),
        )
    }

    /// Session lifetime applied by [`sign`](Self::sign)
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` that expires one TTL after `now`
    pub fn sign(&self, subject: Uuid, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = SessionClaims {
            sub: subject,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature, issuer and expiry, returning the subject
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, TokenError> {
        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &self.validation()).map_err(
                |e| match e.kind() {
                    ErrorKind::InvalidSignature => TokenError::BadSignature,
                    _ => TokenError::Malformed(e.to_string()),
                },
            )?;

        let claims = token_data.claims;
        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims.sub)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the caller's `now` in `verify`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation
    }
}
