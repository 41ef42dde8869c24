//! Product catalog.

mod model;
pub(crate) mod repository;

pub use model::{NewProduct, Product, ProductId};
pub use repository::ProductRepository;
