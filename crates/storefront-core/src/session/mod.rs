//! Browser sessions.
//!
//! A session is an opaque random token in a cookie. The database keeps only
//! the token's digest, the optional signed-in account and an expiry.

mod model;
pub(crate) mod repository;
mod token;

pub use model::{RequestContext, Session};
pub use repository::SessionRepository;
pub use token::SessionToken;
