//! # Core Traits (Ports)
//!
//! Storage contracts the engine is written against. Any store adapter must
//! implement these traits to be wired into the services.

use crate::error::Result;
use crate::models::{ReputationRecord, VoteRecord};
use async_trait::async_trait;
use uuid::Uuid;

/// Durable ledger of cast votes.
///
/// At most one record per (voter, target) pair. The store's uniqueness
/// constraint is the only enforcement; there is no pre-check query.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Appends a vote. Fails with `EngineError::DuplicateVote` when the
    /// (voter, target) pair already has an entry.
    async fn insert_vote(&self, vote: VoteRecord) -> Result<VoteRecord>;

    /// All votes by one voter, ordered by `cast_at` descending.
    async fn list_by_voter(&self, voter_id: &str) -> Result<Vec<VoteRecord>>;
}

/// Persistence contract for per-target reputation records.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ReputationStore: Send + Sync {
    /// Resolves the non-owning target reference against the vendor
    /// collection owned by the surrounding system.
    async fn target_exists(&self, target_id: Uuid) -> Result<bool>;

    async fn find_by_target(&self, target_id: Uuid) -> Result<Option<ReputationRecord>>;

    /// Atomic whole-record write with a revision check: a stale `revision`
    /// fails with `EngineError::Conflict` instead of overwriting a
    /// concurrent grant. Returns the record with its bumped revision.
    async fn save(&self, record: ReputationRecord) -> Result<ReputationRecord>;
}
