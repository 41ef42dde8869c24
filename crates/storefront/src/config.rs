//! Server configuration.
//!
//! Read from a JSON file (`$STOREFRONT_CONFIG`, else
//! `<config dir>/storefront/config.json`); a missing file means defaults.
//! `STOREFRONT_BIND` and `STOREFRONT_DATABASE` override the file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use storefront_core::SecretHasher;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "STOREFRONT_CONFIG";
/// Environment override for [`ServerConfig::bind_address`].
pub const BIND_ENV: &str = "STOREFRONT_BIND";
/// Environment override for [`ServerConfig::database_path`].
pub const DATABASE_ENV: &str = "STOREFRONT_DATABASE";

/// Argon2 cost settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashingConfig {
    // Matches the argon2 crate's recommended defaults
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_address: String,
    /// `SQLite` database file.
    pub database_path: PathBuf,
    /// Session lifetime in hours.
    pub session_ttl_hours: u32,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Mark the session cookie `Secure` (HTTPS only).
    pub secure_cookies: bool,
    /// JSON product list loaded into an empty catalog at startup.
    pub catalog_seed: Option<PathBuf>,
    /// Password hashing cost.
    pub password_hashing: HashingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            database_path: default_data_dir().join("storefront.db"),
            session_ttl_hours: 14 * 24,
            cookie_name: "storefront_session".to_string(),
            secure_cookies: false,
            catalog_seed: None,
            password_hashing: HashingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from the configured location, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> anyhow::Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map_or_else(|| default_config_dir().join("config.json"), PathBuf::from);

        let mut config = Self::load_from(&path).await?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a specific file; defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;

        serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Apply `STOREFRONT_*` overrides from the given lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup(BIND_ENV) {
            self.bind_address = bind;
        }
        if let Some(database) = lookup(DATABASE_ENV) {
            self.database_path = PathBuf::from(database);
        }
    }

    /// Session lifetime.
    #[must_use]
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.session_ttl_hours))
    }

    /// Password hasher with the configured cost.
    ///
    /// # Errors
    ///
    /// Returns an error if argon2 rejects the parameters.
    pub fn hasher(&self) -> storefront_core::Result<SecretHasher> {
        let h = self.password_hashing;
        SecretHasher::with_params(h.memory_kib, h.iterations, h.parallelism)
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("storefront")
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("storefront")
}
