use async_trait::async_trait;
use thiserror::Error;

use crate::db::models::{NewUser, User, UserCredentials};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("email already in use")]
    EmailTaken,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage for user accounts.
///
/// Lookups return `Ok(None)` for a missing record; `Err` is reserved for
/// infrastructure failures.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn email_exists(&self, email: &str) -> Result<bool, DirectoryError>;

    /// Insert a user and return its generated id.
    async fn create(&self, user: NewUser) -> Result<String, DirectoryError>;

    async fn lookup_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, DirectoryError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, DirectoryError>;
}
