#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use authgate::auth::{InMemoryRefreshTokenStore, TokenService};
use authgate::configuration::{ApplicationSettings, JwtSettings};
use authgate::directory::InMemoryUserDirectory;
use authgate::email_client::ActivationNotifier;
use authgate::error::EmailError;
use authgate::session::SessionEngine;

// Minimum bcrypt cost keeps the suite fast
pub const TEST_HASH_COST: u32 = 4;

/// Records every activation mail instead of sending it
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// The bare activation link last mailed to `recipient`
    pub fn activation_link_for(&self, recipient: &str) -> String {
        let sent = self.sent();
        let (_, url) = sent
            .iter()
            .rev()
            .find(|(to, _)| to == recipient)
            .expect("No activation mail sent to recipient");
        url.rsplit('/').next().unwrap().to_string()
    }
}

#[async_trait]
impl ActivationNotifier for RecordingNotifier {
    async fn send_activation_mail(&self, recipient: &str, link: &str) -> Result<(), EmailError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), link.to_string()));
        if self.fail {
            return Err(EmailError::ServiceUnavailable("mail server down".to_string()));
        }
        Ok(())
    }
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        access_secret: "test-access-secret-at-least-32-characters".to_string(),
        refresh_secret: "test-refresh-secret-at-least-32-characters".to_string(),
        access_token_expiry: 1800,
        refresh_token_expiry: 2592000,
        issuer: "authgate-test".to_string(),
    }
}

pub fn application() -> ApplicationSettings {
    ApplicationSettings {
        host: "127.0.0.1".to_string(),
        port: 0,
        api_url: "http://localhost:5000".to_string(),
        client_url: "http://localhost:3000".to_string(),
    }
}

pub fn engine_with(notifier: Arc<RecordingNotifier>, jwt: JwtSettings) -> SessionEngine {
    let tokens = TokenService::new(jwt, Arc::new(InMemoryRefreshTokenStore::new()));
    SessionEngine::new(
        Arc::new(InMemoryUserDirectory::new()),
        tokens,
        notifier,
        application(),
        TEST_HASH_COST,
    )
}

pub fn engine(notifier: Arc<RecordingNotifier>) -> SessionEngine {
    engine_with(notifier, jwt_settings())
}
