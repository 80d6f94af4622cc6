//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{AuthError, AuthResult};

/// Validate email
pub fn validate_email(email: &str) -> AuthResult<()> {
    if email.is_empty() {
        return Err(AuthError::Validation("Email is required".to_string()));
    }

    if email.len() > 254 {
        return Err(AuthError::Validation(
            "Email must be at most 254 characters long".to_string(),
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(AuthError::Validation("Invalid email format".to_string()));
    }

    Ok(())
}

/// Validate password for account creation
///
/// Login never validates client-side; the server is authoritative there.
pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }

    if password.len() < 8 {
        return Err(AuthError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(AuthError::Validation(
            "Password must be at most 128 characters long".to_string(),
        ));
    }

    let mut has_letter = false;
    let mut has_digit = false;

    for c in password.chars() {
        if c.is_ascii_alphabetic() {
            has_letter = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        }
    }

    if !has_letter || !has_digit {
        return Err(AuthError::Validation(
            "Password must contain at least one letter and one digit".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_normal_email() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("first.last+tag@church.example.org").is_ok());
    }

    #[test]
    fn rejects_malformed_email() {
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn password_requires_letter_and_digit() {
        assert!(validate_password("passw0rd").is_ok());
        assert!(validate_password("password").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password("short1").is_err());
    }
}
