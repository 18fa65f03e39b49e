/// Session Engine
///
/// Registration, activation, login, refresh and logout over the user
/// directory and the token service.
///
/// Account states: pending activation -> activated (terminal).
/// Refresh token states: issued -> valid -> superseded | revoked.

use std::sync::Arc;

use serde::Serialize;

use crate::auth::{hash_password, verify_password, RefreshTokenRecord, TokenService};
use crate::configuration::ApplicationSettings;
use crate::directory::{Account, UserDirectory, UserView};
use crate::email_client::ActivationNotifier;
use crate::error::{AppError, AuthError, ErrorContext};

/// Result of every use case that signs the user in
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserView,
}

#[derive(Clone)]
pub struct SessionEngine {
    directory: Arc<dyn UserDirectory>,
    tokens: TokenService,
    notifier: Arc<dyn ActivationNotifier>,
    application: ApplicationSettings,
    hash_cost: u32,
}

impl SessionEngine {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        tokens: TokenService,
        notifier: Arc<dyn ActivationNotifier>,
        application: ApplicationSettings,
        hash_cost: u32,
    ) -> Self {
        Self {
            directory,
            tokens,
            notifier,
            application,
            hash_cost,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Create a pending account and sign it in.
    ///
    /// # Errors
    /// - `AccountExists` if the email is already registered
    ///
    /// A failing notifier is logged and does not undo the registration.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let context = ErrorContext::new("register");

        if self.directory.find_by_email(email).await?.is_some() {
            return Err(AuthError::AccountExists.into());
        }

        let password_hash = hash_password(password, self.hash_cost)?;
        // create() re-checks uniqueness atomically for concurrent registrations
        let account = self
            .directory
            .create(Account::pending(email.to_string(), password_hash))
            .await?;

        let url = self.application.activation_url(&account.activation_link);
        if let Err(e) = self.notifier.send_activation_mail(&account.email, &url).await {
            context
                .clone()
                .with_user_id(account.id.to_string())
                .log_error(&AppError::Email(e));
        }

        let session = self.start_session(&account).await?;

        tracing::info!(
            request_id = %context.request_id,
            user_id = %account.id,
            "Account registered"
        );

        Ok(session)
    }

    /// Consume an activation link.
    ///
    /// # Errors
    /// - `InvalidActivationLink` for unknown links and links already used
    pub async fn activate(&self, activation_link: &str) -> Result<(), AppError> {
        let account = self
            .directory
            .activate_pending(activation_link)
            .await?
            .ok_or(AuthError::InvalidActivationLink)?;

        tracing::info!(user_id = %account.id, "Account activated");
        Ok(())
    }

    /// Check credentials and sign in, superseding any previous session.
    ///
    /// # Errors
    /// - `UserNotFound` if no account has this email
    /// - `InvalidCredentials` if the password does not verify
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let account = self
            .directory
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(password, &account.password_hash) {
            tracing::warn!(user_id = %account.id, "Password verification failed");
            return Err(AuthError::InvalidCredentials.into());
        }

        let session = self.start_session(&account).await?;
        tracing::info!(user_id = %account.id, "User logged in");
        Ok(session)
    }

    /// Exchange the current refresh token for a new pair (rotation).
    ///
    /// # Errors
    /// - `Unauthenticated` if the token is absent, does not verify, or is not
    ///   the one currently stored for its owner
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<AuthSession, AppError> {
        let refresh_token = refresh_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::Unauthenticated)?;

        let claims = self
            .tokens
            .verify_refresh_token(refresh_token)
            .ok_or(AuthError::Unauthenticated)?;
        let user_id = claims.user_id()?;

        let stored = self.tokens.lookup_refresh_token(refresh_token).await?;
        if !stored.map_or(false, |record| record.user_id == user_id) {
            tracing::warn!(user_id = %user_id, "Refresh token is not the current one");
            return Err(AuthError::Unauthenticated.into());
        }

        let account = self
            .directory
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        let session = self.start_session(&account).await?;
        tracing::info!(user_id = %account.id, "Session refreshed");
        Ok(session)
    }

    /// Revoke the refresh token. Revoking an unknown token is not an error.
    pub async fn logout(&self, refresh_token: &str) -> Result<Option<RefreshTokenRecord>, AppError> {
        let removed = self.tokens.revoke_refresh_token(refresh_token).await?;

        match &removed {
            Some(record) => tracing::info!(user_id = %record.user_id, "User logged out"),
            None => tracing::debug!("Logout with no stored refresh token"),
        }

        Ok(removed)
    }

    pub async fn list_accounts(&self) -> Result<Vec<UserView>, AppError> {
        let accounts = self.directory.list().await?;
        Ok(accounts.iter().map(UserView::from).collect())
    }

    async fn start_session(&self, account: &Account) -> Result<AuthSession, AppError> {
        let user = UserView::from(account);
        let pair = self.tokens.issue_pair(&user)?;
        self.tokens
            .persist_refresh_token(user.id, &pair.refresh_token)
            .await?;

        Ok(AuthSession {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            user,
        })
    }
}
