//! Account storage repository.

use sqlx::Row;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use super::identifier::Identifier;
use super::model::{Account, AccountId, NewAccount};
use super::password::SecretHasher;
use super::validation::{ValidationError, validate_registration};
use crate::auth::AccountLookup;
use crate::db::{from_db_time, to_db_time};
use crate::{Error, Result};

/// Repository for account storage and retrieval.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

/// Create the accounts table.
///
/// Emails are stored normalized; `COLLATE NOCASE` keeps the unique index
/// case-insensitive even for rows written by other tools.
pub(crate) async fn initialize(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}

impl AccountRepository {
    pub(crate) const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate, hash and store a new account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] with every field problem (including a
    /// taken email), or an error if hashing or the database fails.
    pub async fn register(&self, new: &NewAccount, hasher: &SecretHasher) -> Result<Account> {
        let mut errors = validate_registration(new).err().unwrap_or_default();

        let email = new.identifier();
        if !email.is_empty() && self.find_by_identifier(&email).await?.is_some() {
            errors.push(ValidationError::DuplicateEmail);
        }
        if !errors.is_empty() {
            debug!("Registration rejected: {} problem(s)", errors.len());
            return Err(Error::Validation(errors));
        }

        let hasher = hasher.clone();
        let password = new.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        let created_at = chrono::Utc::now();
        let first_name = new.first_name.trim();
        let last_name = new.last_name.trim();

        let result = sqlx::query(
            r"
            INSERT INTO accounts (email, first_name, last_name, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(email.as_str())
        .bind(first_name)
        .bind(last_name)
        .bind(&password_hash)
        .bind(to_db_time(created_at))
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            // Lost a race with a concurrent registration
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(Error::Validation(vec![ValidationError::DuplicateEmail]));
            }
            Err(e) => return Err(e.into()),
        };

        let id = AccountId::new(result.last_insert_rowid());
        info!("Registered account {id}");

        Ok(Account {
            id,
            email,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            password_hash,
            created_at: from_db_time(&to_db_time(created_at)),
        })
    }

    /// Find the account with this normalized email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_identifier(&self, identifier: &Identifier) -> Result<Option<Account>> {
        let row = sqlx::query(
            r"
            SELECT id, email, first_name, last_name, password_hash, created_at
            FROM accounts
            WHERE email = ?
            ",
        )
        .bind(identifier.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_account))
    }

    /// Get account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(
            r"
            SELECT id, email, first_name, last_name, password_hash, created_at
            FROM accounts
            WHERE id = ?
            ",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_account))
    }

    /// Get all accounts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            r"
            SELECT id, email, first_name, last_name, password_hash, created_at
            FROM accounts
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_account).collect())
    }
}

impl AccountLookup for AccountRepository {
    async fn find_by_identifier(&self, identifier: &Identifier) -> Result<Option<Account>> {
        Self::find_by_identifier(self, identifier).await
    }
}

/// Convert a database row to an Account.
fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Account {
    let email: String = row.get("email");
    let created_at: String = row.get("created_at");

    Account {
        id: AccountId::new(row.get("id")),
        email: Identifier::normalize(&email),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        password_hash: row.get("password_hash"),
        created_at: from_db_time(&created_at),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect
)]
mod tests {
    use super::*;
    use crate::Database;

    fn hasher() -> SecretHasher {
        SecretHasher::with_params(1024, 1, 1).unwrap()
    }

    async fn repo() -> AccountRepository {
        Database::in_memory().await.unwrap().accounts()
    }

    #[tokio::test]
    async fn test_register_and_retrieve_account() {
        let repo = repo().await;
        let new = NewAccount::new("test@test.com", "first_name", "last_name", "hogehoge");

        let account = repo.register(&new, &hasher()).await.unwrap();
        assert_eq!(account.email.as_str(), "test@test.com");
        assert_ne!(account.password_hash, "hogehoge");

        let retrieved = repo.get(account.id).await.unwrap().unwrap();
        assert_eq!(retrieved, account);
    }

    #[tokio::test]
    async fn test_register_stores_normalized_email() {
        let repo = repo().await;
        let new = NewAccount::new("  Test@Test.COM ", "first_name", "last_name", "hogehoge");

        let account = repo.register(&new, &hasher()).await.unwrap();
        assert_eq!(account.email.as_str(), "test@test.com");

        let found = repo
            .find_by_identifier(&Identifier::normalize("test@test.com"))
            .await
            .unwrap();
        assert_eq!(found.map(|a| a.id), Some(account.id));
    }

    #[tokio::test]
    async fn test_email_must_be_unique() {
        let repo = repo().await;
        let hasher = hasher();

        let first = NewAccount::new("test@test.com", "first_name", "last_name", "hogehoge");
        repo.register(&first, &hasher).await.unwrap();

        let second = NewAccount::new("Test@Test.com", "first_name", "last_name", "hogehoge");
        let err = repo.register(&second, &hasher).await.unwrap_err();
        match err {
            Error::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::DuplicateEmail]);
                assert_eq!(errors[0].message(), "has already been taken");
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_reported_with_other_errors() {
        let repo = repo().await;
        let hasher = hasher();
        repo.register(
            &NewAccount::new("test@test.com", "first_name", "last_name", "hogehoge"),
            &hasher,
        )
        .await
        .unwrap();

        let bad = NewAccount::new("test@test.com", "", "last_name", "1234");
        let Err(Error::Validation(errors)) = repo.register(&bad, &hasher).await else {
            panic!("expected validation failure");
        };
        assert!(errors.contains(&ValidationError::EmptyFirstName));
        assert!(errors.contains(&ValidationError::PasswordTooShort));
        assert!(errors.contains(&ValidationError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_invalid_registration_is_not_stored() {
        let repo = repo().await;
        let new = NewAccount::new("test2@test.com", "first_name", "last_name", "hogehoge")
            .with_confirmation("hoge");

        assert!(matches!(
            repo.register(&new, &hasher()).await,
            Err(Error::Validation(_))
        ));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_identifier() {
        let repo = repo().await;
        let found = repo
            .find_by_identifier(&Identifier::normalize("nobody@test.com"))
            .await
            .unwrap();
        assert!(found.is_none());
        assert!(repo.get(AccountId::new(99)).await.unwrap().is_none());
    }
}
