mod common;

use std::sync::Arc;

use authgate::auth::{PgRefreshTokenStore, RefreshTokenRecord, RefreshTokenStore, TokenService};
use authgate::configuration::{get_configuration, DatabaseSettings};
use authgate::directory::{Account, PgUserDirectory, UserDirectory};
use authgate::error::AuthError;
use authgate::session::SessionEngine;
use common::{application, jwt_settings, RecordingNotifier, TEST_HASH_COST};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

/// Each test gets its own freshly migrated database
async fn spawn_pool() -> PgPool {
    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = Uuid::new_v4().to_string();
    configure_database(&configuration.database).await
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");
    // Migrate database
    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

fn pending(email: &str) -> Account {
    Account::pending(email.to_string(), "not-a-real-hash".to_string())
}

// --- Directory ---

#[tokio::test]
async fn activation_link_is_consumed_once() {
    let directory = PgUserDirectory::new(spawn_pool().await);
    let account = directory.create(pending("alice@x.com")).await.unwrap();

    let activated = directory
        .activate_pending(&account.activation_link)
        .await
        .unwrap()
        .expect("first activation should succeed");
    assert_eq!(activated.id, account.id);
    assert!(activated.is_activated);

    assert!(directory
        .activate_pending(&account.activation_link)
        .await
        .unwrap()
        .is_none());
    assert!(directory.activate_pending("unknown-link").await.unwrap().is_none());

    let stored = directory.find_by_id(account.id).await.unwrap().unwrap();
    assert!(stored.is_activated);
}

#[tokio::test]
async fn duplicate_email_is_rejected_by_the_unique_index() {
    let directory = PgUserDirectory::new(spawn_pool().await);
    directory.create(pending("alice@x.com")).await.unwrap();

    let err = directory.create(pending("alice@x.com")).await.unwrap_err();

    assert_eq!(err.auth_kind(), Some(AuthError::AccountExists));
    assert_eq!(directory.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_returns_accounts_in_creation_order() {
    let directory = PgUserDirectory::new(spawn_pool().await);
    directory.create(pending("bob@x.com")).await.unwrap();
    directory.create(pending("alice@x.com")).await.unwrap();

    let emails: Vec<String> = directory
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|account| account.email)
        .collect();

    assert_eq!(emails, vec!["bob@x.com", "alice@x.com"]);
}

// --- Refresh tokens ---

#[tokio::test]
async fn upsert_replaces_the_previous_token() {
    let pool = spawn_pool().await;
    let account = PgUserDirectory::new(pool.clone())
        .create(pending("alice@x.com"))
        .await
        .unwrap();
    let store = PgRefreshTokenStore::new(pool);

    store
        .upsert(RefreshTokenRecord::new(account.id, "old-token"))
        .await
        .unwrap();
    store
        .upsert(RefreshTokenRecord::new(account.id, "new-token"))
        .await
        .unwrap();

    assert!(store.find_by_token("old-token").await.unwrap().is_none());
    let current = store.find_by_token("new-token").await.unwrap().unwrap();
    assert_eq!(current.user_id, account.id);
    assert!(current.matches("new-token"));
}

#[tokio::test]
async fn delete_returns_the_removed_record_once() {
    let pool = spawn_pool().await;
    let account = PgUserDirectory::new(pool.clone())
        .create(pending("alice@x.com"))
        .await
        .unwrap();
    let store = PgRefreshTokenStore::new(pool);
    store
        .upsert(RefreshTokenRecord::new(account.id, "token"))
        .await
        .unwrap();

    let removed = store.delete_by_token("token").await.unwrap();
    assert_eq!(removed.map(|r| r.user_id), Some(account.id));

    assert!(store.delete_by_token("token").await.unwrap().is_none());
    assert!(store.find_by_token("token").await.unwrap().is_none());
}

// --- Engine over Postgres ---

#[tokio::test]
async fn concurrent_registrations_create_one_account() {
    let pool = spawn_pool().await;
    let tokens = TokenService::new(
        jwt_settings(),
        Arc::new(PgRefreshTokenStore::new(pool.clone())),
    );
    let engine = SessionEngine::new(
        Arc::new(PgUserDirectory::new(pool)),
        tokens,
        Arc::new(RecordingNotifier::default()),
        application(),
        TEST_HASH_COST,
    );

    let (first, second) = tokio::join!(
        engine.register("race@x.com", "pw123"),
        engine.register("race@x.com", "pw456"),
    );

    let failures: Vec<_> = [first, second]
        .into_iter()
        .filter_map(Result::err)
        .collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].auth_kind(), Some(AuthError::AccountExists));
    assert_eq!(engine.list_accounts().await.unwrap().len(), 1);
}
