//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("{0} cannot be empty")]
    EmptyName(&'static str),

    #[error("{0} exceeds maximum length of {1} characters")]
    NameTooLong(&'static str, usize),

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email exceeds maximum length of {0} characters")]
    EmailTooLong(usize),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be at least {0} characters long")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),

    #[error("Password must contain at least one digit")]
    PasswordMissingDigit,

    #[error("Password must contain at least one letter")]
    PasswordMissingLetter,
}

const MAX_NAME_LENGTH: usize = 50;
const MAX_EMAIL_LENGTH: usize = 100;
const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 128;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

/// Validate a first or last name (already trimmed)
pub fn validate_name(field: &'static str, name: &str) -> Result<(), UserValidationError> {
    if name.is_empty() {
        return Err(UserValidationError::EmptyName(field));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(UserValidationError::NameTooLong(field, MAX_NAME_LENGTH));
    }

    Ok(())
}

/// Validate an email address (already normalized)
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(UserValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(UserValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validate a password
///
/// Rules:
/// - 6 to 128 characters
/// - At least one digit and one letter
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(UserValidationError::PasswordMissingDigit);
    }

    if !password.chars().any(|c| c.is_alphabetic()) {
        return Err(UserValidationError::PasswordMissingLetter);
    }

    Ok(())
}

/// Trim and lowercase an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_name("First name", "Ada").is_ok());
        assert!(validate_name("Last name", &"x".repeat(50)).is_ok());
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(
            validate_name("First name", ""),
            Err(UserValidationError::EmptyName("First name"))
        );
    }

    #[test]
    fn test_name_too_long() {
        assert_eq!(
            validate_name("Last name", &"x".repeat(51)),
            Err(UserValidationError::NameTooLong("Last name", 50))
        );
    }

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.domain.org").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert_eq!(validate_email(""), Err(UserValidationError::EmptyEmail));
        assert_eq!(
            validate_email("not-an-email"),
            Err(UserValidationError::InvalidEmail)
        );
        assert_eq!(
            validate_email("user@domain.c"),
            Err(UserValidationError::InvalidEmail)
        );
    }

    #[test]
    fn test_email_too_long() {
        let email = format!("{}@example.com", "a".repeat(95));
        assert_eq!(
            validate_email(&email),
            Err(UserValidationError::EmailTooLong(100))
        );
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
    }

    #[test]
    fn test_valid_passwords() {
        assert!(validate_password("abc123").is_ok());
        assert!(validate_password("P@ssw0rd!").is_ok());
    }

    #[test]
    fn test_password_too_short() {
        assert_eq!(
            validate_password("ab1"),
            Err(UserValidationError::PasswordTooShort(6))
        );
    }

    #[test]
    fn test_password_too_long() {
        let password = format!("{}1", "a".repeat(128));
        assert_eq!(
            validate_password(&password),
            Err(UserValidationError::PasswordTooLong(128))
        );
    }

    #[test]
    fn test_password_composition() {
        assert_eq!(
            validate_password("abcdefg"),
            Err(UserValidationError::PasswordMissingDigit)
        );
        assert_eq!(
            validate_password("1234567"),
            Err(UserValidationError::PasswordMissingLetter)
        );
    }
}
