//! Authentication.
//!
//! Verifies login credentials against stored account hashes. Session
//! handling lives in [`crate::session`].

mod authenticator;

pub use authenticator::{AccountLookup, Authenticator};
