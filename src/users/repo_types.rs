use std::fmt;

use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Role assigned to accounts registered without an explicit one.
pub const BASELINE_ROLE: &str = "task_logger";

/// How an account proves its identity. Exactly one kind per account.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Local password, stored as an argon2 PHC string.
    Local { password_hash: String },
    /// Account authenticated by an external identity provider.
    Federated { provider_ref: String },
}

impl Credential {
    pub fn password_hash(&self) -> Option<&str> {
        match self {
            Credential::Local { password_hash } => Some(password_hash),
            Credential::Federated { .. } => None,
        }
    }

    fn into_columns(self) -> (Option<String>, Option<String>) {
        match self {
            Credential::Local { password_hash } => (Some(password_hash), None),
            Credential::Federated { provider_ref } => (None, Some(provider_ref)),
        }
    }
}

// Hashes must never end up in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Local { .. } => f
                .debug_struct("Local")
                .field("password_hash", &"<redacted>")
                .finish(),
            Credential::Federated { provider_ref } => f
                .debug_struct("Federated")
                .field("provider_ref", provider_ref)
                .finish(),
        }
    }
}

/// User record as the domain sees it. Not serializable on purpose:
/// responses go through [`PublicUser`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub credential: Credential,
    pub name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Raw `users` row.
#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Option<String>,
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("email already registered")]
    EmailTaken,

    #[error("user {0} has an inconsistent credential")]
    InconsistentCredential(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl TryFrom<UserRow> for User {
    type Error = RepoError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let credential = match (r.password_hash, r.external_id) {
            (Some(password_hash), None) => Credential::Local { password_hash },
            (None, Some(provider_ref)) => Credential::Federated { provider_ref },
            _ => return Err(RepoError::InconsistentCredential(r.id)),
        };
        Ok(Self {
            id: r.id,
            email: r.email,
            credential,
            name: r.name,
            role: r.role,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Insert payload for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub credential: Credential,
    pub name: Option<String>,
    pub role: Option<String>,
}

impl NewUser {
    pub fn role_or_baseline(&self) -> &str {
        self.role.as_deref().unwrap_or(BASELINE_ROLE)
    }

    /// Splits the credential into the `(password_hash, external_id)` columns.
    pub(crate) fn credential_columns(&self) -> (Option<String>, Option<String>) {
        self.credential.clone().into_columns()
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            name: u.name.clone(),
            role: u.role.clone(),
            is_active: u.is_active,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}
