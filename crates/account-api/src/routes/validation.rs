//! Input validation shared by the account routes

use crate::error::ApiError;

/// Minimum length of names, surnames and passwords
const MIN_NAME_LENGTH: usize = 4;
const MIN_PASSWORD_LENGTH: usize = 4;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;
const MAX_EMAIL_LENGTH: usize = 254;
const MAX_NAME_LENGTH: usize = 128;
const MAX_GENDER_LENGTH: usize = 32;
const MAX_PHOTO_LENGTH: usize = 2048;

/// Pull a required field out of a request body
pub fn required(value: Option<String>) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("invalid body structure".to_string()))
}

/// Validate a name-like field (`name`, `surname`)
pub fn validate_name(field: &str, value: &str) -> Result<(), ApiError> {
    let len = value.trim().chars().count();
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&len) {
        return Err(ApiError::BadRequest(format!("invalid {} structure", field)));
    }
    Ok(())
}

/// Basic structural email check
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let invalid = || ApiError::BadRequest("invalid email".to_string());

    if email.len() > MAX_EMAIL_LENGTH || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Gender is free text; it only has to be present and short
pub fn validate_gender(gender: &str) -> Result<(), ApiError> {
    let gender = gender.trim();
    if gender.is_empty() || gender.chars().count() > MAX_GENDER_LENGTH {
        return Err(ApiError::BadRequest("invalid gender structure".to_string()));
    }
    Ok(())
}

pub fn validate_photo(photo: &str) -> Result<(), ApiError> {
    if photo.len() > MAX_PHOTO_LENGTH {
        return Err(ApiError::BadRequest("invalid photo structure".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert_eq!(required(Some("jane".to_string())).unwrap(), "jane");
        assert!(required(Some(String::new())).is_err());
        assert!(required(None).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Jane").is_ok());
        assert!(validate_name("name", "Zoë!").is_ok());
        assert!(validate_name("name", "Jo").is_err());
        assert!(validate_name("name", "   Jo   ").is_err());

        let err = validate_name("surname", "Li").unwrap_err();
        assert_eq!(err.to_string(), "Bad request: invalid surname structure");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane@example.com").is_ok());
        assert!(validate_email("jane.doe+tag@mail.example.org").is_ok());

        assert!(validate_email("jane").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("jane@example").is_err());
        assert!(validate_email("jane@.com").is_err());
        assert!(validate_email("jane@example.").is_err());
        assert!(validate_email("jane@@example.com").is_err());
        assert!(validate_email("jane doe@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter22").is_ok());
        assert!(validate_password("abc").is_err());
        assert!(validate_password(&"x".repeat(257)).is_err());
    }

    #[test]
    fn test_validate_gender() {
        assert!(validate_gender("female").is_ok());
        assert!(validate_gender("male").is_ok());
        assert!(validate_gender("non-binary").is_ok());
        assert!(validate_gender("  ").is_err());
        assert!(validate_gender(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_photo() {
        assert!(validate_photo("https://example.com/jane.png").is_ok());
        assert!(validate_photo(&"x".repeat(2049)).is_err());
    }
}
