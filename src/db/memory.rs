use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::directory::{DirectoryError, UserDirectory};
use crate::db::models::{NewUser, User, UserCredentials};

struct Record {
    user: User,
    password_hash: String,
}

/// Process-local [`UserDirectory`], used for tests and throwaway runs.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    records: RwLock<Vec<Record>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn email_exists(&self, email: &str) -> Result<bool, DirectoryError> {
        let records = self.records.read().await;
        Ok(records.iter().any(|r| r.user.email == email))
    }

    async fn create(&self, user: NewUser) -> Result<String, DirectoryError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.user.email == user.email) {
            return Err(DirectoryError::EmailTaken);
        }

        let id = (records.len() + 1).to_string();
        records.push(Record {
            user: User {
                id: id.clone(),
                name: user.name,
                email: user.email,
            },
            password_hash: user.password_hash,
        });

        Ok(id)
    }

    async fn lookup_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, DirectoryError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.user.email == email)
            .map(|r| UserCredentials {
                id: r.user.id.clone(),
                password_hash: r.password_hash.clone(),
            }))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, DirectoryError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.user.id == id)
            .map(|r| r.user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Jim Jomson".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_start_at_one() {
        let directory = InMemoryUserDirectory::new();

        assert_eq!(directory.create(new_user("a@example.com")).await.unwrap(), "1");
        assert_eq!(directory.create(new_user("b@example.com")).await.unwrap(), "2");
        assert_eq!(directory.len().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let directory = InMemoryUserDirectory::new();
        directory.create(new_user("a@example.com")).await.unwrap();

        let result = directory.create(new_user("a@example.com")).await;
        assert!(matches!(result, Err(DirectoryError::EmailTaken)));
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_lookups() {
        let directory = InMemoryUserDirectory::new();
        let id = directory.create(new_user("a@example.com")).await.unwrap();

        assert!(directory.email_exists("a@example.com").await.unwrap());
        assert!(!directory.email_exists("A@example.com").await.unwrap());

        let credentials = directory
            .lookup_credentials_by_email("a@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credentials.id, id);
        assert_eq!(credentials.password_hash, "hash");

        assert_eq!(directory.get_by_id(&id).await.unwrap().unwrap().email, "a@example.com");
        assert!(directory.get_by_id("2").await.unwrap().is_none());
    }
}
