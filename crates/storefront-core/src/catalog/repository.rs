//! Product storage repository.

use std::path::Path;

use sqlx::Row;
use sqlx::sqlite::SqlitePool;
use tracing::info;

use super::model::{NewProduct, Product, ProductId};
use crate::Result;

/// Repository for the product catalog.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

/// Create the products table.
pub(crate) async fn initialize(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT ''
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}

impl ProductRepository {
    pub(crate) const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn insert(&self, product: &NewProduct) -> Result<Product> {
        let result = sqlx::query("INSERT INTO products (name, description) VALUES (?, ?)")
            .bind(&product.name)
            .bind(&product.description)
            .execute(&self.pool)
            .await?;

        Ok(Product {
            id: ProductId::new(result.last_insert_rowid()),
            name: product.name.clone(),
            description: product.description.clone(),
        })
    }

    /// Get product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, name, description FROM products WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_product))
    }

    /// Get all products in catalog order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT id, name, description FROM products ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(row_to_product).collect())
    }

    /// Whether the catalog has no products yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_empty(&self) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("n") == 0)
    }

    /// Load products from a JSON array file into an empty catalog.
    ///
    /// A catalog that already has products is left alone. Returns how many
    /// products were inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a query fails.
    pub async fn seed_from_file(&self, path: &Path) -> Result<usize> {
        if !self.is_empty().await? {
            return Ok(0);
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let products: Vec<NewProduct> = serde_json::from_str(&contents)?;
        for product in &products {
            self.insert(product).await?;
        }

        info!("Seeded {} product(s) from {}", products.len(), path.display());
        Ok(products.len())
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Product {
    Product {
        id: ProductId::new(row.get("id")),
        name: row.get("name"),
        description: row.get("description"),
    }
}
