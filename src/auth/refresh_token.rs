/// Refresh Token Storage
///
/// At most one live record per user. Records are:
/// - Keyed by `user_id`; saving a new token replaces the previous one (rotation)
/// - Stored as the SHA-256 digest of the token (never store plaintext)
/// - Deleted on logout

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::AppError;

/// The single stored refresh token of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRecord {
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn new(user_id: Uuid, token: &str) -> Self {
        Self {
            user_id,
            token_hash: hash_token(token),
            created_at: Utc::now(),
        }
    }

    /// Whether `token` is exactly the token this record was saved with
    pub fn matches(&self, token: &str) -> bool {
        self.token_hash == hash_token(token)
    }
}

/// Hash a refresh token using SHA-256
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Persistence seam for refresh token records
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Insert or replace the record for `record.user_id`
    async fn upsert(&self, record: RefreshTokenRecord) -> Result<(), AppError>;

    /// Delete the record holding exactly this token, returning it
    async fn delete_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError>;

    /// Exact-match lookup
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
}

/// Postgres-backed store (`refresh_tokens` table, unique on `user_id`)
#[derive(Debug, Clone)]
pub struct PgRefreshTokenStore {
    pool: PgPool,
}

impl PgRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn upsert(&self, record: RefreshTokenRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET token_hash = EXCLUDED.token_hash, created_at = EXCLUDED.created_at
            "#,
        )
        .bind(record.user_id)
        .bind(&record.token_hash)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            DELETE FROM refresh_tokens
            WHERE token_hash = $1
            RETURNING user_id, token_hash, created_at
            "#,
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            SELECT user_id, token_hash, created_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}

/// Process-local store keyed by user id
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    records: Mutex<HashMap<Uuid, RefreshTokenRecord>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn upsert(&self, record: RefreshTokenRecord) -> Result<(), AppError> {
        self.records.lock().await.insert(record.user_id, record);
        Ok(())
    }

    async fn delete_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError> {
        let mut records = self.records.lock().await;
        let owner = records
            .values()
            .find(|record| record.matches(token))
            .map(|record| record.user_id);

        Ok(owner.and_then(|user_id| records.remove(&user_id)))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError> {
        let records = self.records.lock().await;
        Ok(records.values().find(|record| record.matches(token)).cloned())
    }
}
