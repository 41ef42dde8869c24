//! `SQLite` connection shared by every repository.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::Result;
use crate::account::AccountRepository;
use crate::cart::CartRepository;
use crate::catalog::ProductRepository;
use crate::session::SessionRepository;

/// Database handle. Cloning is cheap and shares the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database at the given path.
    ///
    /// Creates the tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn open(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let db = Self { pool };
        db.initialize().await?;
        debug!("Opened database at {database_path}");
        Ok(db)
    }

    /// Create an in-memory database for testing.
    ///
    /// A single connection keeps every repository on the same in-memory
    /// database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    /// Initialize database schema. Order matters for foreign keys.
    async fn initialize(&self) -> Result<()> {
        crate::account::repository::initialize(&self.pool).await?;
        crate::session::repository::initialize(&self.pool).await?;
        crate::catalog::repository::initialize(&self.pool).await?;
        crate::cart::repository::initialize(&self.pool).await?;
        Ok(())
    }

    /// Account storage.
    #[must_use]
    pub fn accounts(&self) -> AccountRepository {
        AccountRepository::new(self.pool.clone())
    }

    /// Session storage with the given session lifetime.
    #[must_use]
    pub fn sessions(&self, ttl: chrono::Duration) -> SessionRepository {
        SessionRepository::new(self.pool.clone(), ttl)
    }

    /// Product catalog.
    #[must_use]
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Cart storage.
    #[must_use]
    pub fn carts(&self) -> CartRepository {
        CartRepository::new(self.pool.clone())
    }

    /// Close all connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Timestamps are stored as second-precision RFC 3339 in UTC so that string
/// comparison in SQL matches chronological order.
pub(crate) fn to_db_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn from_db_time(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_db_time_round_trip_truncates_to_seconds() {
        let now = Utc::now();
        let stored = to_db_time(now);
        assert!(stored.ends_with('Z'));
        assert_eq!(from_db_time(&stored).timestamp(), now.timestamp());
    }

    #[test]
    fn test_db_time_orders_lexically() {
        let earlier = to_db_time(Utc::now());
        let later = to_db_time(Utc::now() + chrono::Duration::seconds(5));
        assert!(earlier < later);
    }

    #[test]
    fn test_unparseable_time_falls_back_to_epoch() {
        assert_eq!(from_db_time("yesterday").timestamp(), 0);
    }

    #[tokio::test]
    async fn test_in_memory_creates_schema() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.accounts().list().await.unwrap().is_empty());
        assert!(db.products().is_empty().await.unwrap());
    }
}
