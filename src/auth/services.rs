use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use super::{
    claims::TokenKind,
    jwt::JwtKeys,
    password::{verify_password, PasswordError},
    repo::UserRepository,
    repo_types::User,
};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email and wrong password look the same to the caller.
    #[error("Could not validate credentials")]
    InvalidCredentials,
    #[error("User has not confirmed email")]
    EmailNotConfirmed,
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        AuthError::Internal(anyhow::Error::new(e))
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Log-safe form of an address: at most its first three characters.
pub(crate) fn mask_email(email: &str) -> String {
    let head: String = email.chars().take(3).collect();
    format!("{head}***")
}

/// Checks credentials first and confirmation second, so an unconfirmed
/// account only reveals its state to someone who already knows the password.
pub async fn authenticate(
    users: &dyn UserRepository,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    debug!(email = %mask_email(email), "authenticating user");
    let Some(user) = users.find_by_email(email).await? else {
        warn!(email = %mask_email(email), "login unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    if !user.confirmed {
        warn!(user_id = user.id, "login before email confirmation");
        return Err(AuthError::EmailNotConfirmed);
    }

    Ok(user)
}

pub async fn current_user(
    users: &dyn UserRepository,
    keys: &JwtKeys,
    token: &str,
) -> Result<User, AuthError> {
    let email = keys.subject_for(token, TokenKind::Access).map_err(|e| {
        warn!(error = %e, "access token rejected");
        AuthError::Unauthorized(e.to_string())
    })?;

    users.find_by_email(&email).await?.ok_or_else(|| {
        warn!(email = %mask_email(&email), "token subject has no user");
        AuthError::Unauthorized("Could not find user for this token".into())
    })
}
