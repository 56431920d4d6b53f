use std::sync::Arc;

use crate::core::compatibility::CompatibilityEngine;
use crate::core::EngineError;
use crate::models::{
    BlendMode, MatchAction, MatchRecord, MatchSeed, MatchState, PairKey, UserProfile,
};
use crate::services::enrichment::InsightProvider;
use crate::services::store::{MatchStore, ProfileStore};

/// Outcome of an action submission
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub matched: bool,
    pub record: MatchRecord,
}

/// Derive the pair state from its two action slots
///
/// The rule is commutative in the two slots: (A likes, then B likes) and
/// (B likes, then A likes) land on the same terminal state.
pub fn resolve_state(
    action_a: MatchAction,
    action_b: MatchAction,
    incoming: MatchAction,
) -> MatchState {
    if action_a.is_positive() && action_b.is_positive() {
        MatchState::Mutual
    } else if incoming == MatchAction::Pass {
        MatchState::Rejected
    } else {
        MatchState::Pending
    }
}

/// Per-pair action engine
///
/// Owns the match record lifecycle: lazy creation with a one-time
/// compatibility seed, action application through the store's atomic
/// read-modify-write, and best-effort insight enrichment once a pair goes
/// mutual. `Mutual` and `Rejected` are terminal; later actions are ignored.
pub struct MatchEngine {
    matches: Arc<dyn MatchStore>,
    profiles: Arc<dyn ProfileStore>,
    insights: Arc<dyn InsightProvider>,
    scorer: CompatibilityEngine,
}

impl MatchEngine {
    pub fn new(
        matches: Arc<dyn MatchStore>,
        profiles: Arc<dyn ProfileStore>,
        insights: Arc<dyn InsightProvider>,
        scorer: CompatibilityEngine,
    ) -> Self {
        Self {
            matches,
            profiles,
            insights,
            scorer,
        }
    }

    /// Apply a like/pass/super-like from `user_id` toward `target_user_id`.
    ///
    /// On first contact between a pair the compatibility score is computed
    /// once and persisted with the record; subsequent actions reuse it. The
    /// store performs find-or-create plus the action mutation as one atomic
    /// unit, so concurrent first actions cannot produce two records.
    pub async fn apply_action(
        &self,
        user_id: &str,
        target_user_id: &str,
        action: MatchAction,
    ) -> Result<ActionOutcome, EngineError> {
        if user_id == target_user_id {
            return Err(EngineError::SelfAction);
        }
        if action == MatchAction::Unset {
            return Err(EngineError::InvalidAction("unset".to_string()));
        }

        let key = PairKey::new(user_id, target_user_id);

        // Only pay for scoring when the pair has no record yet. A concurrent
        // creation race is resolved by the store: one seed wins, the other
        // is discarded.
        let seed = match self.matches.find_record(&key).await? {
            Some(_) => None,
            None => {
                let a = self.load_profile(key.first()).await?;
                let b = self.load_profile(key.second()).await?;
                let result = self.scorer.score_pair(&a, &b, BlendMode::Standard)?;
                Some(MatchSeed {
                    score: result.score,
                    band: result.band,
                })
            }
        };

        let side = key.side_of(user_id);
        let applied = self
            .matches
            .record_action(&key, seed, side, action)
            .await?;
        let mut record = applied.record;

        // Authoritative transition is committed; enrichment is a strictly
        // additive second phase.
        if applied.became_mutual {
            if let Some(text) = self.mutual_insight(&key, record.score).await {
                match self.matches.set_enrichment(&key, &text).await {
                    Ok(()) => record.enrichment = Some(text),
                    Err(e) => {
                        tracing::warn!("Failed to store insight for pair {}: {}", key, e);
                    }
                }
            }
        }

        tracing::debug!(
            "Action {:?} from {} on pair {} -> {:?}",
            action,
            user_id,
            key,
            record.state
        );

        Ok(ActionOutcome {
            matched: record.state == MatchState::Mutual,
            record,
        })
    }

    async fn load_profile(&self, user_id: &str) -> Result<UserProfile, EngineError> {
        self.profiles
            .find_user(user_id)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(user_id.to_string()))
    }

    /// Conversation-oriented insight for a freshly mutual pair. Best-effort:
    /// every failure path collapses to `None` with a log line.
    async fn mutual_insight(&self, key: &PairKey, score: f64) -> Option<String> {
        let a = match self.profiles.find_user(key.first()).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Profile load for insight failed on {}: {}", key, e);
                return None;
            }
        };
        let b = match self.profiles.find_user(key.second()).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Profile load for insight failed on {}: {}", key, e);
                return None;
            }
        };

        match self.insights.generate_insight(&a, &b, score).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("Mutual insight failed for pair {}: {}", key, e);
                None
            }
        }
    }
}
