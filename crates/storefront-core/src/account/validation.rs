//! Registration validation.
//!
//! [`validate_registration`] is pure: it never touches storage. Uniqueness of
//! the email is checked by the repository, which reports it with the same
//! [`ValidationError`] type so callers get one list of per-field problems.

use super::model::NewAccount;

/// Shortest password accepted at registration, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 5;

/// Validation error for registration input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Email address is empty.
    EmptyEmail,
    /// Email address already belongs to another account.
    DuplicateEmail,
    /// First name is empty.
    EmptyFirstName,
    /// Last name is empty.
    EmptyLastName,
    /// Password is empty.
    EmptyPassword,
    /// Password is shorter than [`MIN_PASSWORD_LENGTH`].
    PasswordTooShort,
    /// Password confirmation differs from the password.
    PasswordConfirmationMismatch,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::EmptyFirstName | Self::EmptyLastName | Self::EmptyPassword => {
                "can't be blank"
            }
            Self::DuplicateEmail => "has already been taken",
            // Keep in step with MIN_PASSWORD_LENGTH
            Self::PasswordTooShort => "is too short (minimum is 5 characters)",
            Self::PasswordConfirmationMismatch => "doesn't match Password",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::DuplicateEmail => "email",
            Self::EmptyFirstName => "first_name",
            Self::EmptyLastName => "last_name",
            Self::EmptyPassword | Self::PasswordTooShort => "password",
            Self::PasswordConfirmationMismatch => "password_confirmation",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a registration.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Messages recorded against one field, in the order they were found.
#[must_use]
pub fn messages_for(errors: &[ValidationError], field: &str) -> Vec<&'static str> {
    errors
        .iter()
        .filter(|e| e.field() == field)
        .map(ValidationError::message)
        .collect()
}

/// Validate registration input.
///
/// Returns `Ok(())` if valid, or `Err(Vec<ValidationError>)` with all errors.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_registration(account: &NewAccount) -> ValidationResult {
    let mut errors = Vec::new();

    if account.identifier().is_empty() {
        errors.push(ValidationError::EmptyEmail);
    }
    if account.first_name.trim().is_empty() {
        errors.push(ValidationError::EmptyFirstName);
    }
    if account.last_name.trim().is_empty() {
        errors.push(ValidationError::EmptyLastName);
    }

    // Whitespace counts: a password of five spaces is still five characters
    if account.password.is_empty() {
        errors.push(ValidationError::EmptyPassword);
    } else if account.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(ValidationError::PasswordTooShort);
    }

    if let Some(confirmation) = &account.password_confirmation
        && confirmation != &account.password
    {
        errors.push(ValidationError::PasswordConfirmationMismatch);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect
)]
mod tests {
    use super::*;

    fn valid() -> NewAccount {
        NewAccount::new("test2@test.com", "first_name", "last_name", "hogehoge")
    }

    #[test]
    fn test_valid_registration() {
        assert!(validate_registration(&valid()).is_ok());
    }

    #[test]
    fn test_empty_registration_reports_every_field() {
        let errors = validate_registration(&NewAccount::default()).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyEmail));
        assert!(errors.contains(&ValidationError::EmptyFirstName));
        assert!(errors.contains(&ValidationError::EmptyLastName));
        assert!(errors.contains(&ValidationError::EmptyPassword));
        assert!(!errors.contains(&ValidationError::PasswordTooShort));
    }

    #[test]
    fn test_email_missing_then_filled() {
        let mut account = valid();
        account.email = String::new();
        let errors = validate_registration(&account).unwrap_err();
        assert_eq!(messages_for(&errors, "email"), vec!["can't be blank"]);

        account.email = "test@test.com".to_string();
        assert!(validate_registration(&account).is_ok());
    }

    #[test]
    fn test_blank_names_are_rejected() {
        let mut account = valid();
        account.first_name = "   ".to_string();
        account.last_name = String::new();
        let errors = validate_registration(&account).unwrap_err();
        assert_eq!(messages_for(&errors, "first_name"), vec!["can't be blank"]);
        assert_eq!(messages_for(&errors, "last_name"), vec!["can't be blank"]);

        account.first_name = "first_name".to_string();
        let errors = validate_registration(&account).unwrap_err();
        assert!(messages_for(&errors, "first_name").is_empty());
    }

    #[test]
    fn test_whitespace_only_email_is_blank() {
        let mut account = valid();
        account.email = "  \t ".to_string();
        let errors = validate_registration(&account).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EmptyEmail]);
    }

    #[test]
    fn test_password_length_boundary() {
        let short = NewAccount::new("test@test.com", "first_name", "last_name", "1234");
        let errors = validate_registration(&short).unwrap_err();
        assert_eq!(errors, vec![ValidationError::PasswordTooShort]);

        let exact = NewAccount::new("test@test.com", "first_name", "last_name", "12345");
        assert!(validate_registration(&exact).is_ok());
    }

    #[test]
    fn test_password_length_counts_characters() {
        // Four characters, eight bytes
        let short = NewAccount::new("test@test.com", "first_name", "last_name", "ππππ");
        assert!(validate_registration(&short).is_err());
    }

    #[test]
    fn test_confirmation_mismatch() {
        let account = valid().with_confirmation("hoge");
        let errors = validate_registration(&account).unwrap_err();
        assert!(!messages_for(&errors, "password_confirmation").is_empty());
        assert_eq!(errors, vec![ValidationError::PasswordConfirmationMismatch]);
    }

    #[test]
    fn test_missing_confirmation_is_not_checked() {
        let mut account = valid();
        account.password_confirmation = None;
        assert!(validate_registration(&account).is_ok());
    }

    #[test]
    fn test_error_fields_and_messages() {
        assert_eq!(ValidationError::DuplicateEmail.field(), "email");
        assert_eq!(ValidationError::DuplicateEmail.to_string(), "has already been taken");
        assert_eq!(ValidationError::PasswordTooShort.field(), "password");
    }

    #[test]
    fn test_too_short_message_names_minimum() {
        let expected = format!("(minimum is {MIN_PASSWORD_LENGTH} characters)");
        assert!(ValidationError::PasswordTooShort.message().ends_with(&expected));
    }
}
