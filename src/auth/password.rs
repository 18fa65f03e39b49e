/// Credential hashing with bcrypt
///
/// Salted one-way hash; the salt and cost are embedded in the stored value.

use bcrypt::{hash, verify};

use crate::error::AppError;

/// Hash a password with the given bcrypt cost factor
///
/// # Errors
/// Returns error if the cost is outside bcrypt's range or hashing fails
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored hash
///
/// A malformed stored hash counts as a failed verification.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    verify(password, password_hash).unwrap_or_else(|e| {
        tracing::warn!("Stored password hash could not be verified: {}", e);
        false
    })
}
