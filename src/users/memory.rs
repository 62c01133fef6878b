use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::UserRepository;
use super::repo_types::{NewUser, RepoError, User};

/// In-process stand-in for the `users` table, unique on email.
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn set_active(&self, email: &str, is_active: bool) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(u) = rows.iter_mut().find(|u| u.email == email) {
            u.is_active = is_active;
            u.updated_at = OffsetDateTime::now_utc();
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, new: NewUser) -> Result<User, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == new.email) {
            return Err(RepoError::EmailTaken);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            role: new.role_or_baseline().to_string(),
            email: new.email,
            credential: new.credential,
            name: new.name,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        rows.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::{Credential, BASELINE_ROLE};

    fn local(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            credential: Credential::Local {
                password_hash: "$argon2id$x".into(),
            },
            name: Some("Ann".into()),
            role: None,
        }
    }

    #[tokio::test]
    async fn create_then_find_by_email_and_id() {
        let repo = InMemoryUserRepository::default();
        let created = repo.create(local("a@x.com")).await.unwrap();
        assert_eq!(created.role, BASELINE_ROLE);

        let by_email = repo.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryUserRepository::default();
        repo.create(local("a@x.com")).await.unwrap();
        let err = repo.create(local("a@x.com")).await.unwrap_err();
        assert!(matches!(err, RepoError::EmailTaken));
    }
}
