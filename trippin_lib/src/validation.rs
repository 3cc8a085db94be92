//! Validation of user-supplied names before they reach a query.

use crate::error::TripPinError;

pub const MAX_NAME_LENGTH: usize = 100;

/// Trims a free-text name and rejects empty, overlong or control-character input.
pub fn validate_name(input: &str) -> Result<String, TripPinError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TripPinError::InvalidInput("name cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(TripPinError::InvalidInput(format!(
            "name too long (max {} characters)",
            MAX_NAME_LENGTH
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(TripPinError::InvalidInput(
            "name cannot contain control characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// User names are lowercase ASCII letters and digits (e.g. `russellwhyte`).
pub fn validate_user_name(input: &str) -> Result<String, TripPinError> {
    let name = validate_name(input)?.to_lowercase();
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(TripPinError::InvalidInput(format!(
            "invalid user name '{}': only letters and digits allowed",
            input.trim()
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Vincent ").unwrap(), "Vincent");
        assert_eq!(validate_name("O'Brien").unwrap(), "O'Brien");
        assert!(validate_name("   ").is_err());
        assert!(validate_name("a\u{7}b").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
        assert!(validate_name(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_user_name() {
        assert_eq!(validate_user_name("RussellWhyte").unwrap(), "russellwhyte");
        assert!(validate_user_name("russell whyte").is_err());
        assert!(validate_user_name("russell'); --").is_err());
    }
}
