use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use crate::db::directory::{DirectoryError, UserDirectory};
use crate::db::models::{NewUser, User, UserCredentials};

/// [`UserDirectory`] backed by the `users` table.
#[derive(Clone)]
pub struct SqliteUserDirectory {
    pool: Pool<Sqlite>,
}

impl SqliteUserDirectory {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for SqliteUserDirectory {
    async fn email_exists(&self, email: &str) -> Result<bool, DirectoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    async fn create(&self, user: NewUser) -> Result<String, DirectoryError> {
        let created_at = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
INSERT INTO users (name, email, password_hash, created_at)
VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => DirectoryError::EmailTaken,
            other => DirectoryError::Database(other),
        })?;

        Ok(result.last_insert_rowid().to_string())
    }

    async fn lookup_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, DirectoryError> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT CAST(id AS TEXT) AS id, password_hash FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credentials)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, DirectoryError> {
        // Ids are assigned by SQLite; anything that is not an integer cannot match.
        let Ok(id) = id.parse::<i64>() else {
            return Ok(None);
        };

        let user = sqlx::query_as::<_, User>(
            "SELECT CAST(id AS TEXT) AS id, name, email FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
