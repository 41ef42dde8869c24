//! Cart model.

use serde::Serialize;

use crate::catalog::ProductId;

/// One product in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    /// Product in the line.
    pub product_id: ProductId,
    /// Product name at read time.
    pub name: String,
    /// Always at least one.
    pub quantity: u32,
}

/// A cart as shown in the header: total item count plus its lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    /// Sum of all line quantities.
    pub count: u32,
    /// Lines in the order they were first added.
    pub lines: Vec<CartLine>,
}

impl CartSummary {
    /// Build a summary from lines, computing the count.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let count = lines.iter().map(|l| l.quantity).sum();
        Self { count, lines }
    }
}
