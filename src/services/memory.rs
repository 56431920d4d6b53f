use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::core::distance::is_within_bounding_box;
use crate::core::matches::resolve_state;
use crate::models::{
    GeoQuery, MatchAction, MatchRecord, MatchSeed, MatchState, PairKey, PairSide, UserProfile,
};
use crate::services::store::{MatchStore, ProfileStore, RecordedAction, StoreError};

/// In-memory store for profiles and match records
///
/// Backs tests and local development; data is lost on restart. The whole
/// find-or-create plus read-modify-write of `record_action` runs under one
/// write lock, matching the atomicity the Postgres store gets from its
/// transaction.
#[derive(Default)]
pub struct InMemoryStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
    records: RwLock<HashMap<String, MatchRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile (test/dev helper).
    pub async fn insert_profile(&self, profile: UserProfile) {
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile);
    }

    /// Number of match records currently held.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn find_candidates(&self, query: &GeoQuery) -> Result<Vec<UserProfile>, StoreError> {
        let profiles = self.profiles.read().await;
        let mut candidates: Vec<UserProfile> = profiles
            .values()
            .filter(|p| p.is_active)
            .filter(|p| is_within_bounding_box(p.latitude, p.longitude, &query.bounding_box))
            .filter(|p| !query.exclude_user_ids.contains(&p.user_id))
            .cloned()
            .collect();

        candidates.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        candidates.truncate(query.limit);

        Ok(candidates)
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn find_record(&self, key: &PairKey) -> Result<Option<MatchRecord>, StoreError> {
        Ok(self.records.read().await.get(&key.to_string()).cloned())
    }

    async fn record_action(
        &self,
        key: &PairKey,
        seed: Option<MatchSeed>,
        side: PairSide,
        action: MatchAction,
    ) -> Result<RecordedAction, StoreError> {
        let mut records = self.records.write().await;

        if let Some(seed) = seed {
            records
                .entry(key.to_string())
                .or_insert_with(|| MatchRecord::new(key, seed.score, seed.band));
        }

        let record = records
            .get_mut(&key.to_string())
            .ok_or_else(|| StoreError::NotFound(format!("match record {}", key)))?;

        let mut became_mutual = false;
        if record.state == MatchState::Pending {
            match side {
                PairSide::A => record.action_a = action,
                PairSide::B => record.action_b = action,
            }
            let next = resolve_state(record.action_a, record.action_b, action);
            became_mutual = next == MatchState::Mutual;
            record.state = next;
            record.updated_at = chrono::Utc::now();
        }

        Ok(RecordedAction {
            record: record.clone(),
            became_mutual,
        })
    }

    async fn set_enrichment(&self, key: &PairKey, text: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&key.to_string())
            .ok_or_else(|| StoreError::NotFound(format!("match record {}", key)))?;
        record.enrichment = Some(text.to_string());
        record.updated_at = chrono::Utc::now();
        Ok(())
    }
}
