//! # storefront
//!
//! HTTP server for the storefront: registration, cookie login/logout,
//! product listing and a per-session shopping cart.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
mod routes;
pub mod session;
pub mod state;

pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use routes::router;
pub use state::AppState;
