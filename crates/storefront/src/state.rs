//! Shared application state.

use std::sync::Arc;

use storefront_core::{
    AccountRepository, Authenticator, CartRepository, Database, ProductRepository, SecretHasher,
    SessionRepository,
};

use crate::config::ServerConfig;
use crate::session::CookieSettings;

/// State handed to every handler. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Account storage.
    pub accounts: AccountRepository,
    /// Session storage.
    pub sessions: SessionRepository,
    /// Product catalog.
    pub products: ProductRepository,
    /// Carts.
    pub carts: CartRepository,
    /// Password hasher for registrations.
    pub hasher: SecretHasher,
    /// Login credential checks.
    pub authenticator: Arc<Authenticator<AccountRepository>>,
    /// Session cookie attributes.
    pub cookie: Arc<CookieSettings>,
}

impl AppState {
    /// Wire repositories and the authenticator over an open database.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured hashing parameters are invalid.
    pub fn new(db: Database, config: &ServerConfig) -> storefront_core::Result<Self> {
        let hasher = config.hasher()?;
        Self::with_hasher(db, config, hasher)
    }

    /// Like [`AppState::new`] with an explicit hasher.
    ///
    /// # Errors
    ///
    /// Returns an error if the authenticator cannot be built.
    pub fn with_hasher(
        db: Database,
        config: &ServerConfig,
        hasher: SecretHasher,
    ) -> storefront_core::Result<Self> {
        let authenticator = Authenticator::new(db.accounts(), hasher.clone())?;
        let ttl = config.session_ttl();

        Ok(Self {
            accounts: db.accounts(),
            sessions: db.sessions(ttl),
            products: db.products(),
            carts: db.carts(),
            hasher,
            authenticator: Arc::new(authenticator),
            cookie: Arc::new(CookieSettings {
                name: config.cookie_name.clone(),
                secure: config.secure_cookies,
                max_age_secs: ttl.num_seconds(),
            }),
            db,
        })
    }
}
