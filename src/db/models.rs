use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored account as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// The pieces of an account Login needs, never serialized.
#[derive(Clone, FromRow)]
pub struct UserCredentials {
    pub id: String,
    pub password_hash: String,
}

impl std::fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("id", &self.id)
            .field("password_hash", &"[redacted]")
            .finish()
    }
}

/// Input for creating an account; the password is already hashed.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
