//! Shopping carts.

mod model;
pub(crate) mod repository;

pub use model::{CartLine, CartSummary};
pub use repository::CartRepository;
