/// Input validators applied at the transport boundary, before any use case runs.
/// - Email: length limits, RFC 5322 (simplified) format
/// - Password: trimmed length window

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_LOCAL_PART_LENGTH: usize = 64; // RFC 5321
const MIN_PASSWORD_LENGTH: usize = 5;
const MAX_PASSWORD_LENGTH: usize = 32;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validates an email address and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email".to_string(), MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    // The regex admits exactly one '@'
    let local_part = trimmed.split('@').next().unwrap_or_default();
    if local_part.len() > MAX_LOCAL_PART_LENGTH {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a registration password and returns it trimmed
pub fn is_valid_password(password: &str) -> Result<String, ValidationError> {
    let trimmed = password.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    // bcrypt only looks at the first 72 bytes, the upper bound stays well below that
    let length = trimmed.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password".to_string(), MIN_PASSWORD_LENGTH));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_LENGTH));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert_eq!(is_valid_email(" alice@x.com ").unwrap(), "alice@x.com");
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
    }

    #[test]
    fn test_email_length_limits() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(is_valid_email(&too_long).is_err());
        assert_eq!(
            is_valid_email("").unwrap_err(),
            ValidationError::EmptyField("email".to_string())
        );
    }

    #[test]
    fn test_punctuation_allowed_in_local_part() {
        assert_eq!(is_valid_email("first--last@x.com").unwrap(), "first--last@x.com");
        assert!(is_valid_email("and=1@x.com").is_ok());
        assert!(is_valid_email("bob/*x@x.com").is_ok());
    }

    #[test]
    fn test_overlong_local_part() {
        let email = format!("{}@x.com", "a".repeat(65));
        assert_eq!(
            is_valid_email(&email).unwrap_err(),
            ValidationError::InvalidFormat("email".to_string())
        );
        assert!(is_valid_email(&format!("{}@x.com", "a".repeat(64))).is_ok());
    }

    #[test]
    fn test_password_window() {
        assert_eq!(is_valid_password("  pw123  ").unwrap(), "pw123");
        assert_eq!(
            is_valid_password("pw1").unwrap_err(),
            ValidationError::TooShort("password".to_string(), MIN_PASSWORD_LENGTH)
        );
        assert_eq!(
            is_valid_password(&"a".repeat(33)).unwrap_err(),
            ValidationError::TooLong("password".to_string(), MAX_PASSWORD_LENGTH)
        );
        assert!(is_valid_password(&"a".repeat(32)).is_ok());
        assert!(is_valid_password("     ").is_err());
    }
}
