/// JWT Token Generation and Validation
///
/// Access and refresh tokens are both HS256 JWTs, each signed with its own
/// secret and expiry. Verification never fails loudly: any problem yields
/// `None`.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::directory::UserView;
use crate::error::AppError;

/// Freshly issued access/refresh tokens
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign a new access/refresh pair for `user`
///
/// # Errors
/// Returns error if encoding fails
pub fn issue_token_pair(user: &UserView, config: &JwtSettings) -> Result<TokenPair, AppError> {
    let access_claims = Claims::new(user, config.access_token_expiry, config.issuer.clone());
    let refresh_claims = Claims::new(user, config.refresh_token_expiry, config.issuer.clone());

    Ok(TokenPair {
        access_token: sign(&access_claims, &config.access_secret)?,
        refresh_token: sign(&refresh_claims, &config.refresh_secret)?,
    })
}

/// Signature + expiry check against the access secret
pub fn verify_access_token(token: &str, config: &JwtSettings) -> Option<Claims> {
    verify(token, &config.access_secret, &config.issuer)
}

/// Signature + expiry check against the refresh secret
pub fn verify_refresh_token(token: &str, config: &JwtSettings) -> Option<Claims> {
    verify(token, &config.refresh_secret, &config.issuer)
}

pub(crate) fn sign(claims: &Claims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

fn verify(token: &str, secret: &str, issuer: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| tracing::debug!("JWT validation error: {}", e))
    .ok()
}
