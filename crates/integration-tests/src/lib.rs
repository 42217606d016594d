//! # integration-tests
//!
//! End-to-end coverage wiring the services to the real SQLite adapter.
//! Shared fixtures live here; the scenarios live under `tests/`.

use configs::DatabaseConfig;
use secrecy::ExposeSecret;
use std::sync::Arc;
use storage_adapters::SqliteStore;
use uuid::Uuid;

/// Fresh in-memory store with one seeded vendor profile.
pub async fn store_with_target(name: &str) -> (Arc<SqliteStore>, Uuid) {
    let cfg = DatabaseConfig::in_memory();
    let store = SqliteStore::connect(cfg.url.expose_secret(), cfg.max_connections)
        .await
        .expect("in-memory store");
    let target = Uuid::now_v7();
    store.insert_target(target, name).await.expect("seed target");
    (Arc::new(store), target)
}
