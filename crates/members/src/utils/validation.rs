//! Input validation utilities.
//!
//! Lengths are counted in characters, not bytes, since names are mostly
//! Japanese.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::ValidationCode;

pub const MAX_IDENTIFIER_LENGTH: usize = 255;
pub const MAX_EMAIL_LENGTH: usize = 255;
pub const MAX_NAME_LENGTH: usize = 100;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

pub fn validate_email(email: &str) -> Result<(), ValidationCode> {
    if email.trim().is_empty() {
        return Err(ValidationCode::Required);
    }
    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(ValidationCode::TooLong);
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationCode::InvalidEmail);
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ValidationCode> {
    if name.trim().is_empty() {
        return Err(ValidationCode::Required);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationCode::TooLong);
    }
    Ok(())
}

pub fn validate_password(password: &str, min_length: usize) -> Result<(), ValidationCode> {
    if password.is_empty() {
        return Err(ValidationCode::Required);
    }
    if password.chars().count() < min_length {
        return Err(ValidationCode::PasswordTooShort);
    }
    Ok(())
}

/// Login identifier: an email address or a member number.
pub fn validate_identifier(identifier: &str) -> Result<(), ValidationCode> {
    if identifier.trim().is_empty() {
        return Err(ValidationCode::Required);
    }
    if identifier.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationCode::TooLong);
    }
    Ok(())
}
