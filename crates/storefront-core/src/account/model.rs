//! Account model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifier::Identifier;

/// Unique identifier for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl AccountId {
    /// Create a new account ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered customer account.
///
/// The password hash never leaves the process: it is skipped when the
/// account is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Database-assigned identifier.
    pub id: AccountId,
    /// Normalized email address (trimmed, lowercased).
    pub email: Identifier,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Full display name, "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registration input, as submitted by the signup form.
///
/// Fields are raw: nothing is trimmed or normalized until validation and
/// persistence. Missing fields deserialize as empty so validation can
/// report them per field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewAccount {
    /// Email address as typed.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Plaintext password.
    pub password: String,
    /// Confirmation; only checked when present.
    pub password_confirmation: Option<String>,
}

impl NewAccount {
    /// Builds a complete registration with a matching confirmation.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            password_confirmation: Some(password.clone()),
            password,
        }
    }

    /// Replaces the password confirmation.
    #[must_use]
    pub fn with_confirmation(mut self, confirmation: impl Into<String>) -> Self {
        self.password_confirmation = Some(confirmation.into());
        self
    }

    /// The email as it will be stored and matched.
    #[must_use]
    pub fn identifier(&self) -> Identifier {
        Identifier::normalize(&self.email)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_display() {
        assert_eq!(AccountId::new(42).to_string(), "42");
    }

    #[test]
    fn test_new_account_confirms_password() {
        let new = NewAccount::new("a@b.com", "First", "Last", "hogehoge");
        assert_eq!(new.password_confirmation.as_deref(), Some("hogehoge"));

        let new = new.with_confirmation("hoge");
        assert_eq!(new.password_confirmation.as_deref(), Some("hoge"));
    }

    #[test]
    fn test_new_account_identifier_is_normalized() {
        let new = NewAccount::new("  Test@Test.com ", "First", "Last", "hogehoge");
        assert_eq!(new.identifier().as_str(), "test@test.com");
    }

    #[test]
    fn test_serialized_account_omits_hash() {
        let account = Account {
            id: AccountId::new(1),
            email: Identifier::normalize("test@test.com"),
            first_name: "First".to_string(),
            last_name: "Last".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["email"], "test@test.com");
        assert!(json.get("password_hash").is_none());
        assert_eq!(account.full_name(), "First Last");
    }

    #[test]
    fn test_missing_fields_deserialize_empty() {
        let new: NewAccount =
            serde_json::from_str(r#"{"email": "a@b.com", "password": "hogehoge"}"#).unwrap();
        assert_eq!(new.email, "a@b.com");
        assert!(new.first_name.is_empty());
        assert!(new.last_name.is_empty());
        assert!(new.password_confirmation.is_none());
    }
}
