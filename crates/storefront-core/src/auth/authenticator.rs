//! Credential authentication.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::Result;
use crate::account::{Account, Identifier, SecretHasher};

/// Lookup side of the account store used by [`Authenticator`].
pub trait AccountLookup: Send + Sync {
    /// Return the one account stored under this normalized identifier.
    fn find_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> impl Future<Output = Result<Option<Account>>> + Send;
}

/// Checks an email/password pair against the account store.
///
/// Read-only: it never creates sessions or touches the account.
#[derive(Debug, Clone)]
pub struct Authenticator<S> {
    store: S,
    hasher: SecretHasher,
    /// Verified against when the identifier is unknown so both failure
    /// paths cost one hash verification.
    dummy_hash: Arc<str>,
}

impl<S: AccountLookup> Authenticator<S> {
    /// Create an authenticator over the given store.
    ///
    /// # Errors
    ///
    /// Returns an error if the placeholder hash cannot be computed.
    pub fn new(store: S, hasher: SecretHasher) -> Result<Self> {
        let dummy_hash = hasher.hash("storefront-unknown-account")?;
        Ok(Self {
            store,
            hasher,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// The underlying account store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Authenticate with a raw identifier and password.
    ///
    /// Returns `Ok(None)` both when no account matches and when the password
    /// is wrong; callers cannot tell the two apart.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure faults: the store failing,
    /// a corrupt stored hash, or the hashing task dying.
    pub async fn authenticate(
        &self,
        raw_identifier: &str,
        raw_secret: &str,
    ) -> Result<Option<Account>> {
        let identifier = Identifier::normalize(raw_identifier);
        let account = self.store.find_by_identifier(&identifier).await?;

        let stored_hash = account
            .as_ref()
            .map_or_else(|| self.dummy_hash.to_string(), |a| a.password_hash.clone());
        let hasher = self.hasher.clone();
        let secret = raw_secret.to_owned();
        let verified =
            tokio::task::spawn_blocking(move || hasher.verify(&secret, &stored_hash)).await??;

        match account {
            Some(account) if verified => {
                debug!("Authenticated account {}", account.id);
                Ok(Some(account))
            }
            Some(account) => {
                debug!("Password mismatch for account {}", account.id);
                Ok(None)
            }
            None => {
                debug!("Authentication attempt for unknown identifier");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;

    use super::*;
    use crate::account::{AccountId, NewAccount};
    use crate::{Database, Error};

    fn hasher() -> SecretHasher {
        SecretHasher::with_params(1024, 1, 1).unwrap()
    }

    /// Map-backed store for exercising the authenticator without a database.
    struct MemoryStore {
        accounts: HashMap<Identifier, Account>,
    }

    impl MemoryStore {
        fn with(hasher: &SecretHasher, entries: &[(&str, &str)]) -> Self {
            let accounts = entries
                .iter()
                .enumerate()
                .map(|(i, (email, password))| {
                    let email = Identifier::normalize(email);
                    let account = Account {
                        id: AccountId::new(i64::try_from(i).unwrap() + 1),
                        email: email.clone(),
                        first_name: "first_name".to_string(),
                        last_name: "last_name".to_string(),
                        password_hash: hasher.hash(password).unwrap(),
                        created_at: Utc::now(),
                    };
                    (email, account)
                })
                .collect();
            Self { accounts }
        }
    }

    impl AccountLookup for MemoryStore {
        async fn find_by_identifier(&self, identifier: &Identifier) -> Result<Option<Account>> {
            Ok(self.accounts.get(identifier).cloned())
        }
    }

    struct BrokenStore;

    impl AccountLookup for BrokenStore {
        async fn find_by_identifier(&self, _identifier: &Identifier) -> Result<Option<Account>> {
            Err(Error::Database(sqlx::Error::PoolClosed))
        }
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let hasher = hasher();
        let store = MemoryStore::with(&hasher, &[("test@test.com", "hogehoge")]);
        let auth = Authenticator::new(store, hasher).unwrap();

        let account = auth.authenticate("test@test.com", "hogehoge").await.unwrap();
        assert_eq!(account.map(|a| a.id), Some(AccountId::new(1)));
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let hasher = hasher();
        let store = MemoryStore::with(&hasher, &[("test@test.com", "hogehoge")]);
        let auth = Authenticator::new(store, hasher).unwrap();

        for wrong in ["hogehoge3", "wrong", "", "HOGEHOGE", " hogehoge"] {
            assert!(auth.authenticate("test@test.com", wrong).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_unknown_identifier() {
        let hasher = hasher();
        let store = MemoryStore::with(&hasher, &[("test@test.com", "hogehoge")]);
        let auth = Authenticator::new(store, hasher).unwrap();

        assert!(auth.authenticate("other@test.com", "hogehoge").await.unwrap().is_none());
        assert!(auth.authenticate("", "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identifier_is_normalized() {
        let hasher = hasher();
        let store = MemoryStore::with(&hasher, &[("test@test.com", "hogehoge")]);
        let auth = Authenticator::new(store, hasher).unwrap();

        let spaced = auth.authenticate("  test@test.com  ", "hogehoge").await.unwrap();
        let capitalized = auth.authenticate("tesT@tEst.com", "hogehoge").await.unwrap();
        let both = auth.authenticate("  Test@Test.com  ", "hogehoge").await.unwrap();

        assert!(spaced.is_some());
        assert_eq!(spaced, capitalized);
        assert_eq!(spaced, both);
    }

    #[tokio::test]
    async fn test_picks_the_matching_account() {
        let hasher = hasher();
        let store = MemoryStore::with(
            &hasher,
            &[("a@test.com", "password-a"), ("b@test.com", "password-b")],
        );
        let auth = Authenticator::new(store, hasher).unwrap();

        let b = auth.authenticate("B@test.com", "password-b").await.unwrap().unwrap();
        assert_eq!(b.email.as_str(), "b@test.com");
        assert!(auth.authenticate("a@test.com", "password-b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let auth = Authenticator::new(BrokenStore, hasher()).unwrap();
        let result = auth.authenticate("test@test.com", "hogehoge").await;
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[tokio::test]
    async fn test_registered_account_scenario() {
        let db = Database::in_memory().await.unwrap();
        let hasher = hasher();
        let created = db
            .accounts()
            .register(
                &NewAccount::new("test@test.com", "first_name", "last_name", "hogehoge"),
                &hasher,
            )
            .await
            .unwrap();

        let auth = Authenticator::new(db.accounts(), hasher).unwrap();

        let found = auth.authenticate("TEST@test.com", "hogehoge").await.unwrap();
        assert_eq!(found, Some(created));
        assert!(auth.authenticate("test@test.com", "wrong").await.unwrap().is_none());
    }
}
