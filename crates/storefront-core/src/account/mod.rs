//! Account management module.
//!
//! Provides the account model, identifier normalization, registration
//! validation, password hashing and storage.

mod identifier;
mod model;
mod password;
pub(crate) mod repository;
mod validation;

pub use identifier::Identifier;
pub use model::{Account, AccountId, NewAccount};
pub use password::SecretHasher;
pub use repository::AccountRepository;
pub use validation::{
    MIN_PASSWORD_LENGTH, ValidationError, ValidationResult, messages_for, validate_registration,
};
