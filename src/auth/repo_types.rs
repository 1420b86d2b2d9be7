use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct User {
    pub id: i64,                // generated on insert
    pub email: String,          // unique, stored as given
    #[serde(skip_serializing)]
    pub password_hash: String,  // Argon2 hash, not exposed in JSON
    pub confirmed: bool,        // flipped once by email confirmation
}
