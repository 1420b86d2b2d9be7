use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use super::claims::{Claims, ReceivedClaims, TokenKind};
use crate::{config::JwtConfig, state::AppState};

/// Why a token was refused. Each kind maps to its own client-facing message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Token is missing 'sub' field")]
    MissingSubject,
    #[error("Token has incorrect type, expected '{expected}'")]
    TypeMismatch { expected: TokenKind },
    #[error("failed to sign token: {0}")]
    Encoding(String),
}

/// Signing material plus the per-kind lifetimes, built once from [`JwtConfig`].
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    pub access_ttl_minutes: i64,
    pub confirmation_ttl_minutes: i64,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            access_ttl_minutes: cfg.access_ttl_minutes,
            confirmation_ttl_minutes: cfg.confirmation_ttl_minutes,
        }
    }

    pub fn issue(&self, email: &str, kind: TokenKind, ttl_minutes: i64) -> Result<String, TokenError> {
        let exp = ttl_minutes
            .checked_mul(60)
            .map(TimeDuration::seconds)
            .and_then(|ttl| OffsetDateTime::now_utc().checked_add(ttl))
            .ok_or_else(|| TokenError::Encoding(format!("ttl of {ttl_minutes} minutes is out of range")))?;
        let claims = Claims {
            sub: email,
            exp: exp.unix_timestamp(),
            kind,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;
        debug!(kind = %kind, ttl_minutes, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, email: &str) -> Result<String, TokenError> {
        self.issue(email, TokenKind::Access, self.access_ttl_minutes)
    }

    pub fn sign_confirmation(&self, email: &str) -> Result<String, TokenError> {
        self.issue(email, TokenKind::Confirmation, self.confirmation_ttl_minutes)
    }

    /// Verifies signature and expiry, then returns the email in `sub` if the
    /// token was issued as `expected`.
    pub fn subject_for(&self, token: &str, expected: TokenKind) -> Result<String, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let data = decode::<ReceivedClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => {
                    warn!(error = %e, "jwt rejected");
                    TokenError::Invalid
                }
            }
        })?;

        let email = data.claims.sub.ok_or(TokenError::MissingSubject)?;
        if data.claims.kind.as_deref() != Some(expected.as_str()) {
            return Err(TokenError::TypeMismatch { expected });
        }
        debug!(kind = %expected, "jwt verified");
        Ok(email)
    }
}

#[cfg(test)]
pub(crate) fn test_keys() -> JwtKeys {
    JwtKeys::new(&JwtConfig {
        secret: "test-secret-key-for-jwt-signing-at-least-32-bytes".into(),
        algorithm: Algorithm::HS256,
        access_ttl_minutes: 30,
        confirmation_ttl_minutes: 1440,
    })
}
