//! # configs
//!
//! Typed configuration for the reputation engine. Values come from the
//! process environment (with `.env` support for local development) under the
//! `REPUTATION__` prefix, e.g. `REPUTATION__DATABASE__URL`. The database URL
//! may carry credentials, so it is held behind `secrecy` and never printed.

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL, e.g. `sqlite:reputation.db` or `sqlite::memory:`.
    pub url: SecretString,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// In-memory database on a single connection. sqlite gives every pooled
    /// connection its own `:memory:` instance, so tests must not pool.
    pub fn in_memory() -> Self {
        Self {
            url: SecretString::from("sqlite::memory:"),
            max_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub database: DatabaseConfig,
}

impl EngineConfig {
    /// Loads configuration from the environment, falling back to local-dev
    /// defaults for anything unset.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let cfg: EngineConfig = config::Config::builder()
            .set_default("database.url", "sqlite:reputation.db")?
            .set_default("database.max_connections", 5i64)?
            .add_source(
                config::Environment::with_prefix("REPUTATION")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        debug!(max_connections = cfg.database.max_connections, "configuration loaded");
        Ok(cfg)
    }
}
