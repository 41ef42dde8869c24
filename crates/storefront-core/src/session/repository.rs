//! Session storage repository.

use chrono::{Duration, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::model::Session;
use super::token::SessionToken;
use crate::Result;
use crate::account::AccountId;
use crate::cart::repository::move_lines;
use crate::db::{from_db_time, to_db_time};

/// Repository for browser sessions.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
    ttl: Duration,
}

/// Create the sessions table.
pub(crate) async fn initialize(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS sessions (
            key TEXT PRIMARY KEY,
            account_id INTEGER REFERENCES accounts(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    // Create index for purging expired sessions
    sqlx::query(
        r"
        CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at)
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}

impl SessionRepository {
    pub(crate) const fn new(pool: SqlitePool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    /// How long a new session lives.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session, optionally signed in.
    ///
    /// Returns the token for the cookie and the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn create(&self, account_id: Option<AccountId>) -> Result<(SessionToken, Session)> {
        let (token, session) = self.issue(account_id);
        let mut conn = self.pool.acquire().await?;
        insert_session(&mut conn, &session).await?;

        debug!(
            "Created {} session",
            if account_id.is_some() { "signed-in" } else { "anonymous" }
        );
        Ok((token, session))
    }

    /// Replace `previous` with a fresh session for `account_id`.
    ///
    /// The previous session's cart moves to the new one and the previous
    /// session is deleted. Either all of that happens or none of it does.
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails; the transaction is rolled back.
    pub async fn rotate(
        &self,
        previous: Option<&Session>,
        account_id: Option<AccountId>,
    ) -> Result<(SessionToken, Session)> {
        let (token, session) = self.issue(account_id);
        let mut tx = self.pool.begin().await?;

        insert_session(&mut tx, &session).await?;
        if let Some(previous) = previous {
            move_lines(&mut tx, &previous.key, &session.key).await?;
            sqlx::query("DELETE FROM sessions WHERE key = ?")
                .bind(&previous.key)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!("Rotated session");
        Ok((token, session))
    }

    fn issue(&self, account_id: Option<AccountId>) -> (SessionToken, Session) {
        let token = SessionToken::generate();
        let now = Utc::now();
        let session = Session {
            key: token.digest(),
            account_id,
            created_at: from_db_time(&to_db_time(now)),
            expires_at: from_db_time(&to_db_time(now + self.ttl)),
        };
        (token, session)
    }

    /// Look up the live session for a cookie token.
    ///
    /// Unknown and expired tokens both resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn resolve(&self, token: &SessionToken) -> Result<Option<Session>> {
        let row = sqlx::query(
            r"
            SELECT key, account_id, created_at, expires_at
            FROM sessions
            WHERE key = ?
            ",
        )
        .bind(token.digest())
        .fetch_optional(&self.pool)
        .await?;

        let session = row.as_ref().map(row_to_session);
        Ok(session.filter(|s| !s.is_expired_at(Utc::now())))
    }

    /// Clear the signed-in account, keeping the session and its cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn sign_out(&self, session: &Session) -> Result<()> {
        sqlx::query("UPDATE sessions SET account_id = NULL WHERE key = ?")
            .bind(&session.key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a session outright.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete(&self, session: &Session) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE key = ?")
            .bind(&session.key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete every expired session, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(to_db_time(Utc::now()))
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            debug!("Purged {removed} expired session(s)");
        }
        Ok(removed)
    }
}

async fn insert_session(conn: &mut SqliteConnection, session: &Session) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO sessions (key, account_id, created_at, expires_at)
        VALUES (?, ?, ?, ?)
        ",
    )
    .bind(&session.key)
    .bind(session.account_id.map(|id| id.0))
    .bind(to_db_time(session.created_at))
    .bind(to_db_time(session.expires_at))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Session {
    let created_at: String = row.get("created_at");
    let expires_at: String = row.get("expires_at");

    Session {
        key: row.get("key"),
        account_id: row.get::<Option<i64>, _>("account_id").map(AccountId::new),
        created_at: from_db_time(&created_at),
        expires_at: from_db_time(&expires_at),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::account::{NewAccount, SecretHasher};
    use crate::catalog::NewProduct;

    async fn setup() -> (Database, AccountId) {
        let db = Database::in_memory().await.unwrap();
        let account = db
            .accounts()
            .register(
                &NewAccount::new("test@test.com", "first_name", "last_name", "hogehoge"),
                &SecretHasher::with_params(1024, 1, 1).unwrap(),
            )
            .await
            .unwrap();
        (db, account.id)
    }

    #[tokio::test]
    async fn test_create_and_resolve() {
        let (db, account_id) = setup().await;
        let sessions = db.sessions(Duration::hours(1));

        let (token, session) = sessions.create(Some(account_id)).await.unwrap();
        assert_ne!(session.key, token.as_str());

        let resolved = sessions.resolve(&token).await.unwrap().unwrap();
        assert_eq!(resolved, session);
        assert_eq!(resolved.account_id, Some(account_id));
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (db, _) = setup().await;
        let sessions = db.sessions(Duration::hours(1));
        assert!(sessions.resolve(&SessionToken::generate()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_does_not_resolve() {
        let (db, account_id) = setup().await;
        let sessions = db.sessions(Duration::seconds(-1));

        let (token, _) = sessions.create(Some(account_id)).await.unwrap();
        assert!(sessions.resolve(&token).await.unwrap().is_none());
        assert_eq!(sessions.purge_expired().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_purge_keeps_live_sessions() {
        let (db, _) = setup().await;
        let sessions = db.sessions(Duration::hours(1));
        let (token, _) = sessions.create(None).await.unwrap();

        assert_eq!(sessions.purge_expired().await.unwrap(), 0);
        assert!(sessions.resolve(&token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sign_out_clears_account_only() {
        let (db, account_id) = setup().await;
        let sessions = db.sessions(Duration::hours(1));
        let (token, session) = sessions.create(Some(account_id)).await.unwrap();

        sessions.sign_out(&session).await.unwrap();

        let resolved = sessions.resolve(&token).await.unwrap().unwrap();
        assert_eq!(resolved.account_id, None);
    }

    #[tokio::test]
    async fn test_rotate_moves_cart_and_retires_previous() {
        let (db, account_id) = setup().await;
        let sessions = db.sessions(Duration::hours(1));
        let hat = db
            .products()
            .insert(&NewProduct {
                name: "Hat".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        let (old_token, old) = sessions.create(None).await.unwrap();
        db.carts().add_item(&old.key, hat.id).await.unwrap();

        let (token, session) = sessions.rotate(Some(&old), Some(account_id)).await.unwrap();

        assert_ne!(token.as_str(), old_token.as_str());
        assert_eq!(session.account_id, Some(account_id));
        assert!(sessions.resolve(&old_token).await.unwrap().is_none());
        assert_eq!(db.carts().count(&session.key).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_rotate_leaves_previous_intact() {
        let (db, _) = setup().await;
        let sessions = db.sessions(Duration::hours(1));
        let hat = db
            .products()
            .insert(&NewProduct {
                name: "Hat".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        let (old_token, old) = sessions.create(None).await.unwrap();
        db.carts().add_item(&old.key, hat.id).await.unwrap();

        // No such account: the foreign key rejects the new session
        let result = sessions.rotate(Some(&old), Some(AccountId::new(999))).await;
        assert!(result.is_err());

        assert!(sessions.resolve(&old_token).await.unwrap().is_some());
        assert_eq!(db.carts().count(&old.key).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rotate_without_previous() {
        let (db, account_id) = setup().await;
        let sessions = db.sessions(Duration::hours(1));

        let (token, _) = sessions.rotate(None, Some(account_id)).await.unwrap();
        let resolved = sessions.resolve(&token).await.unwrap().unwrap();
        assert_eq!(resolved.account_id, Some(account_id));
    }

    #[tokio::test]
    async fn test_delete() {
        let (db, _) = setup().await;
        let sessions = db.sessions(Duration::hours(1));
        let (token, session) = sessions.create(None).await.unwrap();

        sessions.delete(&session).await.unwrap();
        assert!(sessions.resolve(&token).await.unwrap().is_none());
    }
}
