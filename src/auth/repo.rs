use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::auth::repo_types::User;

#[derive(Debug, Error)]
pub enum CreateUserError {
    /// The unique index on `users.email` rejected the insert.
    #[error("a user with that email already exists")]
    Duplicate,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Narrow user queries the auth core needs.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, CreateUserError>;
    /// Marks the user as confirmed. Returns false when no row matched.
    async fn confirm(&self, email: &str) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, confirmed
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn create(&self, email: &str, password_hash: &str) -> Result<User, CreateUserError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, confirmed
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => CreateUserError::Duplicate,
            other => CreateUserError::Other(anyhow::Error::new(other).context("insert user")),
        })
    }

    async fn confirm(&self, email: &str) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"UPDATE users SET confirmed = TRUE WHERE email = $1"#)
            .bind(email)
            .execute(&self.db)
            .await
            .context("confirm user")?;
        Ok(res.rows_affected() > 0)
    }
}
