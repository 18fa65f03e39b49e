//! User directory: account records and the store they live in.
//!
//! The directory guarantees one account per email and one-time activation.
//! The credential hash never leaves this module boundary except to the
//! session engine for verification; callers outside the engine only ever
//! see [`UserView`].

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

pub use memory::InMemoryUserDirectory;
pub use postgres::PgUserDirectory;

/// A registered account as stored
#[derive(Clone, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub activation_link: String,
    pub is_activated: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// A fresh account awaiting activation
    pub fn pending(email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            activation_link: Uuid::new_v4().to_string(),
            is_activated: false,
            created_at: Utc::now(),
        }
    }
}

// Keeps the hash and activation link out of logs
impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("is_activated", &self.is_activated)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Public projection of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub is_activated: bool,
}

impl From<&Account> for UserView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            is_activated: account.is_activated,
        }
    }
}

/// Persistence seam for accounts
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;

    /// Store a new account.
    ///
    /// # Errors
    /// `AccountExists` if the email is taken. The check and the insert are
    /// atomic per email.
    async fn create(&self, account: Account) -> Result<Account, AppError>;

    /// Flip the account holding `activation_link` to activated, but only if
    /// it is still pending. Returns `None` for unknown or already used links.
    async fn activate_pending(&self, activation_link: &str) -> Result<Option<Account>, AppError>;

    async fn list(&self) -> Result<Vec<Account>, AppError>;
}
