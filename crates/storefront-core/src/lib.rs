//! # storefront-core
//!
//! Core business logic for the storefront.
//!
//! This crate provides:
//! - Account registration and validation
//! - Credential authentication (Argon2id password hashes)
//! - Cookie sessions with an explicit per-request context
//! - Product catalog and per-session shopping carts
//! - Local storage (`SQLite`)
//!
//! ## Example
//!
//! ```ignore
//! use storefront_core::{Authenticator, Database, NewAccount, SecretHasher};
//!
//! let db = Database::open("storefront.db").await?;
//! let hasher = SecretHasher::default();
//! db.accounts()
//!     .register(&NewAccount::new("test@test.com", "Ada", "Lovelace", "hogehoge"), &hasher)
//!     .await?;
//!
//! let auth = Authenticator::new(db.accounts(), hasher)?;
//! assert!(auth.authenticate("  TEST@test.com ", "hogehoge").await?.is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod auth;
pub mod cart;
pub mod catalog;
mod db;
mod error;
pub mod session;

pub use account::{
    Account, AccountId, AccountRepository, Identifier, NewAccount, SecretHasher, ValidationError,
    ValidationResult, validate_registration,
};
pub use auth::{AccountLookup, Authenticator};
pub use cart::{CartLine, CartRepository, CartSummary};
pub use catalog::{NewProduct, Product, ProductId, ProductRepository};
pub use db::Database;
pub use error::{Error, Result};
pub use session::{RequestContext, Session, SessionRepository, SessionToken};
