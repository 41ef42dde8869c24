//! Cart storage repository.
//!
//! Carts belong to sessions, not accounts, so anonymous visitors can shop.
//! Lines are keyed by `(session_key, product_id)`.

use sqlx::Row;
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::model::{CartLine, CartSummary};
use crate::catalog::ProductId;
use crate::{Error, Result};

/// Repository for cart lines.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

/// Create the cart table.
///
/// Lines are ordered by `rowid`, which grows with each new line.
pub(crate) async fn initialize(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS cart_items (
            session_key TEXT NOT NULL REFERENCES sessions(key) ON DELETE CASCADE,
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            PRIMARY KEY (session_key, product_id)
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}

impl CartRepository {
    pub(crate) const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add one unit of a product to the session's cart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProductNotFound`] for an unknown product, or an error
    /// if the database query fails.
    pub async fn add_item(&self, session_key: &str, product_id: ProductId) -> Result<()> {
        let exists = sqlx::query("SELECT 1 FROM products WHERE id = ?")
            .bind(product_id.0)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        if !exists {
            return Err(Error::ProductNotFound(product_id));
        }

        sqlx::query(
            r"
            INSERT INTO cart_items (session_key, product_id, quantity)
            VALUES (?, ?, 1)
            ON CONFLICT(session_key, product_id) DO UPDATE SET
                quantity = quantity + 1
            ",
        )
        .bind(session_key)
        .bind(product_id.0)
        .execute(&self.pool)
        .await?;

        debug!("Added product {product_id} to cart");
        Ok(())
    }

    /// Remove one unit of a product, dropping the line when it reaches zero.
    ///
    /// Removing something that is not in the cart is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn remove_item(&self, session_key: &str, product_id: ProductId) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            DELETE FROM cart_items
            WHERE session_key = ? AND product_id = ? AND quantity <= 1
            ",
        )
        .bind(session_key)
        .bind(product_id.0)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            UPDATE cart_items SET quantity = quantity - 1
            WHERE session_key = ? AND product_id = ?
            ",
        )
        .bind(session_key)
        .bind(product_id.0)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Total number of units in the cart; 0 for an unknown session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self, session_key: &str) -> Result<u32> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(quantity), 0) AS n FROM cart_items WHERE session_key = ?",
        )
        .bind(session_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(u32::try_from(row.get::<i64, _>("n")).unwrap_or(u32::MAX))
    }

    /// The cart's lines with product names.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn lines(&self, session_key: &str) -> Result<Vec<CartLine>> {
        let rows = sqlx::query(
            r"
            SELECT c.product_id, p.name, c.quantity
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            WHERE c.session_key = ?
            ORDER BY c.rowid ASC
            ",
        )
        .bind(session_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| CartLine {
                product_id: ProductId::new(row.get("product_id")),
                name: row.get("name"),
                quantity: u32::try_from(row.get::<i64, _>("quantity")).unwrap_or(0),
            })
            .collect())
    }

    /// Count and lines together.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn summary(&self, session_key: &str) -> Result<CartSummary> {
        Ok(CartSummary::from_lines(self.lines(session_key).await?))
    }

    /// Move every line from one session to another, merging quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn transfer(&self, from_key: &str, to_key: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        move_lines(&mut tx, from_key, to_key).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Move cart lines between sessions on an open connection or transaction.
///
/// Lines new to `to_key` keep their relative order; lines already there
/// keep their place and gain the moved quantity.
pub(crate) async fn move_lines(
    conn: &mut SqliteConnection,
    from_key: &str,
    to_key: &str,
) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO cart_items (session_key, product_id, quantity)
        SELECT ?, product_id, quantity FROM cart_items WHERE session_key = ?
        ORDER BY rowid ASC
        ON CONFLICT(session_key, product_id) DO UPDATE SET
            quantity = quantity + excluded.quantity
        ",
    )
    .bind(to_key)
    .bind(from_key)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM cart_items WHERE session_key = ?")
        .bind(from_key)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
