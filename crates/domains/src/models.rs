//! # Domain Models
//!
//! These structs represent the core entities of the reputation engine.
//! Vendor profiles ("targets") are keyed by UUID v7 for time-ordered,
//! globally unique identification; voters and grantors carry opaque
//! string ids minted by the chat platform, never by this engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A single vote cast by an actor for a vendor profile.
///
/// The pair (voter_id, target_id) is unique across all time: re-voting is
/// rejected by the store's uniqueness constraint, never overwritten. Records
/// are append-only and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRecord {
    pub id: Uuid,
    /// Opaque identifier of the casting actor (e.g. a chat user id).
    pub voter_id: String,
    pub target_id: Uuid,
    pub cast_at: DateTime<Utc>,
}

impl VoteRecord {
    /// Builds a fresh record with a server-assigned timestamp.
    pub fn new(voter_id: String, target_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            voter_id,
            target_id,
            cast_at: Utc::now(),
        }
    }
}

/// Reward profile of a badge, captured by value at grant time.
///
/// Later edits to the global badge table never reach back into history:
/// each grant keeps the profile it was granted with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardProfile {
    /// Multiplicative ranking boost. Absent means "contributes a factor of 1".
    pub boost_multiplier: Option<f64>,
    /// Additive free-promotion days. Absent means "contributes 0".
    pub bonus_days: Option<u32>,
    pub special_mention: Option<bool>,
}

/// A badge definition as configured outside the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeType {
    pub badge_id: String,
    pub name: String,
    pub emoji: String,
    pub rewards: RewardProfile,
}

/// Identity of the actor who granted a badge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grantor {
    pub id: String,
    pub display_name: String,
}

/// One badge grant in a target's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeGrant {
    pub badge_id: String,
    pub badge_name: String,
    pub badge_emoji: String,
    pub granted_by: Grantor,
    pub granted_at: DateTime<Utc>,
    pub rewards: RewardProfile,
}

impl BadgeGrant {
    /// Snapshots a badge definition into a grant, stamped with the current time.
    pub fn new(badge: &BadgeType, granted_by: Grantor) -> Self {
        Self {
            badge_id: badge.badge_id.clone(),
            badge_name: badge.name.clone(),
            badge_emoji: badge.emoji.clone(),
            granted_by,
            granted_at: Utc::now(),
            rewards: badge.rewards.clone(),
        }
    }
}

/// Per-badge occurrence count produced by [`ReputationRecord::summarize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeTally {
    pub name: String,
    pub emoji: String,
    pub count: u64,
}

/// A target's full grant history plus the derived aggregate fields.
///
/// The four derived fields are always exactly the fold of `grants` as
/// performed by [`recompute`](Self::recompute); the record is never persisted
/// in a state where they diverge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationRecord {
    pub target_id: Uuid,
    /// Insertion order = grant order.
    pub grants: Vec<BadgeGrant>,
    pub total_grants: u64,
    pub total_boost: f64,
    pub total_bonus_days: u32,
    pub has_special_mention: bool,
    /// Optimistic-concurrency stamp. 0 = never persisted; the store bumps it
    /// on every successful write and rejects stale values.
    pub revision: i64,
}

impl ReputationRecord {
    /// The lazy-init value for a target with no grants yet.
    pub fn empty(target_id: Uuid) -> Self {
        Self {
            target_id,
            grants: Vec::new(),
            total_grants: 0,
            total_boost: 1.0,
            total_bonus_days: 0,
            has_special_mention: false,
            revision: 0,
        }
    }

    /// Recomputes the derived fields as a pure fold of the entire history.
    ///
    /// Deliberately NOT incremental: folding from scratch keeps the totals an
    /// auditable function of `grants`, immune to drift from partial failures
    /// or out-of-order updates. O(history length) per call, which is fine at
    /// the grant rates a vendor directory sees.
    pub fn recompute(&mut self) {
        self.total_grants = self.grants.len() as u64;
        // A grant with no multiplier contributes a factor of 1, never 0.
        self.total_boost = self
            .grants
            .iter()
            .map(|g| g.rewards.boost_multiplier.unwrap_or(1.0))
            .product();
        self.total_bonus_days = self
            .grants
            .iter()
            .map(|g| g.rewards.bonus_days.unwrap_or(0))
            .sum();
        self.has_special_mention = self
            .grants
            .iter()
            .any(|g| g.rewards.special_mention.unwrap_or(false));
    }

    /// Appends a grant and refreshes the derived fields. The only mutation
    /// path; grants are never edited or removed.
    pub fn append_grant(&mut self, grant: BadgeGrant) {
        self.grants.push(grant);
        self.recompute();
    }

    /// Counts occurrences of each badge type across the history.
    ///
    /// Display-only: the aggregate fields are always sourced from
    /// [`recompute`](Self::recompute), never from this summary, so the two
    /// derivations can never diverge.
    pub fn summarize(&self) -> BTreeMap<String, BadgeTally> {
        let mut tallies: BTreeMap<String, BadgeTally> = BTreeMap::new();
        for grant in &self.grants {
            tallies
                .entry(grant.badge_id.clone())
                .and_modify(|t| t.count += 1)
                .or_insert_with(|| BadgeTally {
                    name: grant.badge_name.clone(),
                    emoji: grant.badge_emoji.clone(),
                    count: 1,
                });
        }
        tallies
    }
}
