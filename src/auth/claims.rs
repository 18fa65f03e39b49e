/// JWT Claims structure
///
/// Payload shared by access and refresh tokens: the public user view plus
/// standard JWT claims (RFC 7519).

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::UserView;
use crate::error::{AppError, AuthError};

const TOKEN_ID_LENGTH: usize = 32;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account id as UUID string)
    pub sub: String,
    pub email: String,
    pub is_activated: bool,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
    /// Random token id, keeps tokens issued within the same second distinct
    pub jti: String,
}

impl Claims {
    /// Create claims for `user` expiring `expiry_seconds` from now
    pub fn new(user: &UserView, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            is_activated: user.is_activated,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
            jti: generate_token_id(),
        }
    }

    /// Extract the account id
    ///
    /// # Errors
    /// `Unauthenticated` if the subject is not a valid UUID
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Auth(AuthError::Unauthenticated))
    }

    /// Rebuild the user view carried by the token
    pub fn user_view(&self) -> Result<UserView, AppError> {
        Ok(UserView {
            id: self.user_id()?,
            email: self.email.clone(),
            is_activated: self.is_activated,
        })
    }
}

fn generate_token_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_ID_LENGTH)
        .map(char::from)
        .collect()
}
