use std::sync::Arc;

use crate::auth::claims::Claims;
use crate::auth::jwt::{self, TokenPair};
use crate::auth::refresh_token::{RefreshTokenRecord, RefreshTokenStore};
use crate::configuration::JwtSettings;
use crate::directory::UserView;
use crate::error::AppError;

/// Issues, verifies and persists access/refresh token pairs.
///
/// Cheap to clone; clones share the same refresh token store.
#[derive(Clone)]
pub struct TokenService {
    config: JwtSettings,
    store: Arc<dyn RefreshTokenStore>,
}

impl TokenService {
    pub fn new(config: JwtSettings, store: Arc<dyn RefreshTokenStore>) -> Self {
        Self { config, store }
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_token_expiry(&self) -> i64 {
        self.config.refresh_token_expiry
    }

    pub fn issue_pair(&self, user: &UserView) -> Result<TokenPair, AppError> {
        jwt::issue_token_pair(user, &self.config)
    }

    /// Replace whatever refresh token `user_id` held before
    pub async fn persist_refresh_token(
        &self,
        user_id: uuid::Uuid,
        refresh_token: &str,
    ) -> Result<(), AppError> {
        self.store
            .upsert(RefreshTokenRecord::new(user_id, refresh_token))
            .await
    }

    pub async fn revoke_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AppError> {
        self.store.delete_by_token(refresh_token).await
    }

    pub async fn lookup_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AppError> {
        self.store.find_by_token(refresh_token).await
    }

    pub fn verify_access_token(&self, token: &str) -> Option<Claims> {
        jwt::verify_access_token(token, &self.config)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Option<Claims> {
        jwt::verify_refresh_token(token, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::refresh_token::InMemoryRefreshTokenStore;
    use uuid::Uuid;

    fn service() -> TokenService {
        let config = JwtSettings {
            access_secret: "test-access-secret-at-least-32-characters".to_string(),
            refresh_secret: "test-refresh-secret-at-least-32-characters".to_string(),
            access_token_expiry: 1800,
            refresh_token_expiry: 2592000,
            issuer: "test".to_string(),
        };
        TokenService::new(config, Arc::new(InMemoryRefreshTokenStore::new()))
    }

    fn user() -> UserView {
        UserView {
            id: Uuid::new_v4(),
            email: "alice@x.com".to_string(),
            is_activated: false,
        }
    }

    #[test]
    fn test_pairs_are_unique() {
        let tokens = service();
        let user = user();

        let first = tokens.issue_pair(&user).unwrap();
        let second = tokens.issue_pair(&user).unwrap();

        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[tokio::test]
    async fn test_persist_then_lookup_and_revoke() {
        let tokens = service();
        let user = user();
        let pair = tokens.issue_pair(&user).unwrap();

        tokens.persist_refresh_token(user.id, &pair.refresh_token).await.unwrap();
        let found = tokens.lookup_refresh_token(&pair.refresh_token).await.unwrap();
        assert_eq!(found.map(|r| r.user_id), Some(user.id));

        let revoked = tokens.revoke_refresh_token(&pair.refresh_token).await.unwrap();
        assert_eq!(revoked.map(|r| r.user_id), Some(user.id));
        assert!(tokens.lookup_refresh_token(&pair.refresh_token).await.unwrap().is_none());
        assert!(tokens.revoke_refresh_token(&pair.refresh_token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persist_supersedes_previous_token() {
        let tokens = service();
        let user = user();
        let old = tokens.issue_pair(&user).unwrap();
        let new = tokens.issue_pair(&user).unwrap();

        tokens.persist_refresh_token(user.id, &old.refresh_token).await.unwrap();
        tokens.persist_refresh_token(user.id, &new.refresh_token).await.unwrap();

        assert!(tokens.lookup_refresh_token(&old.refresh_token).await.unwrap().is_none());
        // Still cryptographically valid, only the store knows it is superseded
        assert!(tokens.verify_refresh_token(&old.refresh_token).is_some());
    }
}
