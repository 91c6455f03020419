//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::{
    error::{AuthError, AuthResult, FieldErrors},
    models::{NewUser, UpdateUser, UserPayload},
};

pub const PASSWORD_MIN_LENGTH: usize = 5;
const PASSWORD_MAX_LENGTH: usize = 128;
const MAX_LENGTH: usize = 255;

const REQUIRED: &str = "This field is required.";

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("This field may not be blank.".to_string());
    }

    if email.len() > MAX_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            MAX_LENGTH
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Enter a valid email address.".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    let length = password.chars().count();

    if length < PASSWORD_MIN_LENGTH {
        return Err(format!(
            "Ensure this field has at least {} characters.",
            PASSWORD_MIN_LENGTH
        ));
    }

    if length > PASSWORD_MAX_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            PASSWORD_MAX_LENGTH
        ));
    }

    Ok(())
}

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("This field may not be blank.".to_string());
    }

    if name.chars().count() > MAX_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            MAX_LENGTH
        ));
    }

    Ok(())
}

/// Lowercase the domain part of an email address
pub fn normalize_email(email: &str) -> String {
    match email.trim().rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.trim().to_string(),
    }
}

fn checked(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    required: bool,
    validate: fn(&str) -> Result<(), String>,
) -> Option<String> {
    let Some(value) = value else {
        if required {
            errors.entry(field.to_string()).or_default().push(REQUIRED.to_string());
        }
        return None;
    };

    match validate(&value) {
        Ok(()) => Some(value),
        Err(message) => {
            errors.entry(field.to_string()).or_default().push(message);
            None
        }
    }
}

/// Validate a profile payload; with `partial` every field may be omitted
pub fn validate_user_update(payload: UserPayload, partial: bool) -> AuthResult<UpdateUser> {
    let mut errors = FieldErrors::new();
    let required = !partial;

    let email = checked(
        &mut errors,
        "email",
        payload.email.map(|email| normalize_email(&email)),
        required,
        validate_email,
    );
    let name = checked(
        &mut errors,
        "name",
        payload.name.map(|name| name.trim().to_string()),
        required,
        validate_name,
    );
    let password = checked(
        &mut errors,
        "password",
        payload.password,
        required,
        validate_password,
    );

    if errors.is_empty() {
        Ok(UpdateUser {
            email,
            name,
            password,
        })
    } else {
        Err(AuthError::Validation(errors))
    }
}

/// Validate a registration payload
pub fn validate_registration(payload: UserPayload) -> AuthResult<NewUser> {
    match validate_user_update(payload, false)? {
        UpdateUser {
            email: Some(email),
            name: Some(name),
            password: Some(password),
        } => Ok(NewUser {
            email,
            name,
            password,
        }),
        // every field is required when not partial
        _ => Err(AuthError::InternalServerError),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(email: &str, password: &str, name: &str) -> UserPayload {
        UserPayload {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            name: Some(name.to_string()),
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("pw").is_err());
        assert!(validate_password("pass").is_err());
        assert!(validate_password("passw").is_ok());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_normalize_email_lowercases_domain() {
        assert_eq!(normalize_email("Test1@EXAMPLE.com"), "Test1@example.com");
        assert_eq!(normalize_email(" test2@Example.COM "), "test2@example.com");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn test_registration_normalizes_fields() {
        let user = validate_registration(payload("User@EXAMPLE.COM", "testpass123", " Test "))
            .unwrap();
        assert_eq!(user.email, "User@example.com");
        assert_eq!(user.name, "Test");
        assert_eq!(user.password, "testpass123");
    }

    #[test]
    fn test_registration_collects_field_errors() {
        let Err(AuthError::Validation(errors)) =
            validate_registration(payload("bad", "pw", "   "))
        else {
            panic!("expected validation error");
        };

        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("password"));
        assert!(errors.contains_key("name"));
    }

    #[test]
    fn test_registration_requires_every_field() {
        let Err(AuthError::Validation(errors)) = validate_registration(UserPayload::default())
        else {
            panic!("expected validation error");
        };

        assert_eq!(errors["email"], vec![REQUIRED]);
        assert_eq!(errors["password"], vec![REQUIRED]);
        assert_eq!(errors["name"], vec![REQUIRED]);
    }

    #[test]
    fn test_partial_update_allows_missing_fields() {
        let update = validate_user_update(
            UserPayload {
                name: Some("New name".to_string()),
                ..Default::default()
            },
            true,
        )
        .unwrap();

        assert_eq!(update.name.as_deref(), Some("New name"));
        assert!(update.email.is_none());
        assert!(update.password.is_none());
    }
}
