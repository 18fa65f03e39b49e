use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Account, UserDirectory};
use crate::error::{AppError, AuthError};

/// Process-local directory. Insertion order is kept for listing.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    accounts: RwLock<Vec<Account>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn create(&self, account: Account) -> Result<Account, AppError> {
        // Check and insert under the same write lock
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(AppError::Auth(AuthError::AccountExists));
        }
        accounts.push(account.clone());
        Ok(account)
    }

    async fn activate_pending(&self, activation_link: &str) -> Result<Option<Account>, AppError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.activation_link == activation_link && !a.is_activated);

        Ok(account.map(|a| {
            a.is_activated = true;
            a.clone()
        }))
    }

    async fn list(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.accounts.read().await.clone())
    }
}
