//! Product model.

use serde::{Deserialize, Serialize};

/// Unique identifier for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub i64);

impl ProductId {
    /// Create a new product ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product that can be added to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Database-assigned identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Free-form description (may be empty).
    pub description: String,
}

/// Product data for seeding the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProduct {
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}
