//! # Vote Ledger
//!
//! Records one vote event per (voter, target) and lists a voter's history.
//! Per-target tallying is the ranking job's aggregate query against the
//! store; nothing is cached or counted here.

use domains::{EngineError, Result, VoteRecord, VoteStore};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub struct VoteLedger {
    store: Arc<dyn VoteStore>,
}

impl VoteLedger {
    pub fn new(store: Arc<dyn VoteStore>) -> Self {
        Self { store }
    }

    /// Casts a vote for a vendor profile.
    ///
    /// No pre-check query: the store's uniqueness constraint is the sole
    /// serialization point, and its violation surfaces as `DuplicateVote`.
    pub async fn cast_vote(&self, voter_id: &str, target_id: Uuid) -> Result<VoteRecord> {
        if voter_id.trim().is_empty() {
            return Err(EngineError::Validation("voter id must not be empty".into()));
        }
        if target_id.is_nil() {
            return Err(EngineError::Validation("target id must not be nil".into()));
        }

        debug!(voter = %voter_id, target = %target_id, "casting vote");
        let vote = self
            .store
            .insert_vote(VoteRecord::new(voter_id.to_string(), target_id))
            .await?;
        info!(voter = %vote.voter_id, target = %vote.target_id, "vote recorded");
        Ok(vote)
    }

    /// A voter's full vote history, most recent first. Read-only.
    pub async fn votes_by_voter(&self, voter_id: &str) -> Result<Vec<VoteRecord>> {
        if voter_id.trim().is_empty() {
            return Err(EngineError::Validation("voter id must not be empty".into()));
        }
        self.store.list_by_voter(voter_id).await
    }
}
