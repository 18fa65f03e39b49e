use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Account, UserDirectory};
use crate::error::{AppError, AuthError, DatabaseError};

/// Postgres-backed directory (`users` table, unique on `email`)
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, activation_link, is_activated, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, activation_link, is_activated, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn create(&self, account: Account) -> Result<Account, AppError> {
        // The unique index on email is what makes concurrent registrations safe
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, activation_link, is_activated, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.activation_link)
        .bind(account.is_activated)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => {
                AppError::Auth(AuthError::AccountExists)
            }
            other => other,
        })?;

        Ok(account)
    }

    async fn activate_pending(&self, activation_link: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE users
            SET is_activated = true
            WHERE activation_link = $1 AND is_activated = false
            RETURNING id, email, password_hash, activation_link, is_activated, created_at
            "#,
        )
        .bind(activation_link)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn list(&self) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, activation_link, is_activated, created_at
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }
}
