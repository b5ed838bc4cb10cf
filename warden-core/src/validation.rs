//! Input validation helpers
//!
//! Single source of truth for validating the values that cross the crate
//! boundary (registration data, profile updates, app origins). All helpers
//! return a [`ValidationError`] describing the first failed check.

use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

/// Letters (including Spanish accented characters) and spaces only.
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑ\s]+$").expect("Invalid name regex pattern")
});

/// International phone format: leading `+`, 3 to 15 digits.
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{2,14}$").expect("Invalid phone regex pattern"));

static PASSWORD_SPECIAL: &str = "@$!%*?&#";

/// Validates an email address.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField(
            "Email is required".to_string(),
        ));
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(format!(
            "Invalid email format: {email}"
        )))
    }
}

/// Validates a password against the security requirements.
///
/// Requirements: 8 to 128 characters, at least one lowercase letter, one
/// uppercase letter, one digit, and one of `@$!%*?&#`.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField(
            "Password is required".to_string(),
        ));
    }

    if password.len() < 8 {
        return Err(ValidationError::InvalidPassword(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(ValidationError::InvalidPassword(
            "Password must be at most 128 characters long".to_string(),
        ));
    }

    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIAL.contains(c));

    if has_lowercase && has_uppercase && has_digit && has_special {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword)
    }
}

/// Validates a person's name (letters and spaces, max 100 characters).
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingField(
            "Name is required".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(ValidationError::InvalidName("Name is too long".to_string()));
    }

    if NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidName(format!(
            "Name contains invalid characters: {name}"
        )))
    }
}

/// Validates a phone number in international format (e.g. `+34600111222`).
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone(format!(
            "Phone must be in international format: {phone}"
        )))
    }
}

/// Validates an origin for an app allowlist (`http(s)://host[:port]`).
pub fn validate_origin(origin: &str) -> Result<(), ValidationError> {
    if origin.is_empty() {
        return Err(ValidationError::MissingField(
            "Origin is required".to_string(),
        ));
    }

    let rest = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"));

    match rest {
        Some(host) if !host.is_empty() && !host.contains('/') && !host.contains(char::is_whitespace) => {
            Ok(())
        }
        _ => Err(ValidationError::InvalidOrigin(format!(
            "Origin must be a scheme and host without a path: {origin}"
        ))),
    }
}
