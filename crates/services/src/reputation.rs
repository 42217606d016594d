//! # Reward Aggregator
//!
//! Owns the per-target badge-grant history. Every grant appends one event
//! and refreshes the derived totals (boost multiplier, bonus days,
//! special-mention flag, grant count) by folding the entire history, then
//! persists the whole record in a single revision-checked write.

use domains::{
    BadgeGrant, BadgeTally, BadgeType, EngineError, Grantor, ReputationRecord, ReputationStore,
    Result,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub struct RewardAggregator {
    store: Arc<dyn ReputationStore>,
}

impl RewardAggregator {
    pub fn new(store: Arc<dyn ReputationStore>) -> Self {
        Self { store }
    }

    /// Grants a badge to a vendor profile and returns the updated record.
    ///
    /// The badge's reward profile is captured by value into the grant, so a
    /// later edit of the badge definition never rewrites history. The store
    /// write is atomic and revision-checked: of two concurrent grants to the
    /// same target exactly one commits, the other fails with
    /// `EngineError::Conflict` for the caller to retry.
    pub async fn grant_badge(
        &self,
        target_id: Uuid,
        badge: &BadgeType,
        granted_by: Grantor,
    ) -> Result<ReputationRecord> {
        if badge.badge_id.trim().is_empty() {
            return Err(EngineError::Validation("badge id must not be empty".into()));
        }
        // A non-positive multiplier would drag the whole history's boost
        // below the other grants' contribution; the fold assumes positive
        // finite factors.
        if let Some(boost) = badge.rewards.boost_multiplier {
            if !boost.is_finite() || boost <= 0.0 {
                return Err(EngineError::Validation(format!(
                    "boost multiplier must be a positive finite number, got {boost}"
                )));
            }
        }
        if !self.store.target_exists(target_id).await? {
            return Err(EngineError::TargetNotFound(target_id));
        }

        let mut record = self
            .store
            .find_by_target(target_id)
            .await?
            .unwrap_or_else(|| ReputationRecord::empty(target_id));

        debug!(
            target = %target_id,
            badge = %badge.badge_id,
            prior_grants = record.total_grants,
            "appending badge grant"
        );
        record.append_grant(BadgeGrant::new(badge, granted_by));

        let saved = self.store.save(record).await?;
        info!(
            target = %target_id,
            badge = %badge.badge_id,
            total_grants = saved.total_grants,
            total_boost = saved.total_boost,
            "badge granted"
        );
        Ok(saved)
    }

    /// Per-badge occurrence counts for display. Read-only and idempotent; a
    /// target that was never granted anything yields an empty map, matching
    /// the lazy-init semantics of the record itself.
    pub async fn summarize(&self, target_id: Uuid) -> Result<BTreeMap<String, BadgeTally>> {
        match self.store.find_by_target(target_id).await? {
            Some(record) => Ok(record.summarize()),
            None => Ok(BTreeMap::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{MockReputationStore, RewardProfile};

    fn badge(id: &str, boost: Option<f64>, days: Option<u32>, special: Option<bool>) -> BadgeType {
        BadgeType {
            badge_id: id.to_string(),
            name: "Top Seller".to_string(),
            emoji: "🏆".to_string(),
            rewards: RewardProfile {
                boost_multiplier: boost,
                bonus_days: days,
                special_mention: special,
            },
        }
    }

    fn admin() -> Grantor {
        Grantor {
            id: "admin:7".to_string(),
            display_name: "Ops".to_string(),
        }
    }

    #[tokio::test]
    async fn grant_to_missing_target_fails_before_any_write() {
        let mut store = MockReputationStore::new();
        store.expect_target_exists().returning(|_| Ok(false));
        store.expect_find_by_target().times(0);
        store.expect_save().times(0);

        let aggregator = RewardAggregator::new(Arc::new(store));
        let target = Uuid::now_v7();
        let err = aggregator
            .grant_badge(target, &badge("top", Some(2.0), None, None), admin())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::TargetNotFound(t) if t == target));
    }

    #[tokio::test]
    async fn non_positive_or_non_finite_boost_never_reaches_store() {
        let mut store = MockReputationStore::new();
        store.expect_target_exists().times(0);
        store.expect_find_by_target().times(0);
        store.expect_save().times(0);

        let aggregator = RewardAggregator::new(Arc::new(store));
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = aggregator
                .grant_badge(Uuid::now_v7(), &badge("top", Some(bad), None, None), admin())
                .await
                .unwrap_err();
            assert!(matches!(err, EngineError::Validation(_)), "accepted {bad}");
        }
    }

    #[tokio::test]
    async fn first_grant_lazily_initializes_the_record() {
        let mut store = MockReputationStore::new();
        store.expect_target_exists().returning(|_| Ok(true));
        store.expect_find_by_target().returning(|_| Ok(None));
        store.expect_save().times(1).returning(|mut record| {
            record.revision += 1;
            Ok(record)
        });

        let aggregator = RewardAggregator::new(Arc::new(store));
        let saved = aggregator
            .grant_badge(
                Uuid::now_v7(),
                &badge("top", Some(2.0), Some(3), Some(false)),
                admin(),
            )
            .await
            .unwrap();

        assert_eq!(saved.total_grants, 1);
        assert_eq!(saved.total_boost, 2.0);
        assert_eq!(saved.total_bonus_days, 3);
        assert!(!saved.has_special_mention);
        assert_eq!(saved.revision, 1);
    }

    #[tokio::test]
    async fn second_grant_folds_the_full_history() {
        // Existing record from grant A = {boost: 2.0, days: 3, special: false};
        // grant B = {boost: none, days: 2, special: true} lands on top of it.
        let target = Uuid::now_v7();
        let mut existing = ReputationRecord::empty(target);
        existing.append_grant(BadgeGrant::new(
            &badge("top", Some(2.0), Some(3), Some(false)),
            admin(),
        ));
        existing.revision = 1;

        let mut store = MockReputationStore::new();
        store.expect_target_exists().returning(|_| Ok(true));
        store
            .expect_find_by_target()
            .returning(move |_| Ok(Some(existing.clone())));
        store.expect_save().times(1).returning(|mut record| {
            record.revision += 1;
            Ok(record)
        });

        let aggregator = RewardAggregator::new(Arc::new(store));
        let saved = aggregator
            .grant_badge(target, &badge("featured", None, Some(2), Some(true)), admin())
            .await
            .unwrap();

        assert_eq!(saved.total_grants, 2);
        assert_eq!(saved.total_boost, 2.0);
        assert_eq!(saved.total_bonus_days, 5);
        assert!(saved.has_special_mention);
    }

    #[tokio::test]
    async fn stale_revision_conflict_is_surfaced_not_retried() {
        let mut store = MockReputationStore::new();
        store.expect_target_exists().returning(|_| Ok(true));
        store.expect_find_by_target().returning(|_| Ok(None));
        store
            .expect_save()
            .times(1)
            .returning(|_| Err(EngineError::Conflict("stale revision 0".into())));

        let aggregator = RewardAggregator::new(Arc::new(store));
        let err = aggregator
            .grant_badge(Uuid::now_v7(), &badge("top", None, None, None), admin())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[tokio::test]
    async fn summarize_counts_without_touching_totals() {
        let target = Uuid::now_v7();
        let mut record = ReputationRecord::empty(target);
        record.append_grant(BadgeGrant::new(&badge("top", Some(2.0), None, None), admin()));
        record.append_grant(BadgeGrant::new(&badge("top", Some(2.0), None, None), admin()));
        record.append_grant(BadgeGrant::new(&badge("featured", None, None, None), admin()));

        let mut store = MockReputationStore::new();
        store
            .expect_find_by_target()
            .returning(move |_| Ok(Some(record.clone())));
        store.expect_save().times(0);

        let aggregator = RewardAggregator::new(Arc::new(store));
        let summary = aggregator.summarize(target).await.unwrap();
        assert_eq!(summary["top"].count, 2);
        assert_eq!(summary["featured"].count, 1);
    }

    #[tokio::test]
    async fn summarize_of_unknown_target_is_empty() {
        let mut store = MockReputationStore::new();
        store.expect_find_by_target().returning(|_| Ok(None));

        let aggregator = RewardAggregator::new(Arc::new(store));
        let summary = aggregator.summarize(Uuid::now_v7()).await.unwrap();
        assert!(summary.is_empty());
    }
}
