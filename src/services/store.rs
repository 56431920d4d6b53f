use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

use crate::core::matches::resolve_state;
use crate::models::{
    GeoQuery, MatchAction, MatchRecord, MatchSeed, MatchState, PairKey, PairSide, UserProfile,
};

/// Errors that can occur at the persistence boundary
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Stored document malformed: {0}")]
    Decode(String),
}

/// Result of an atomic action application
#[derive(Debug, Clone)]
pub struct RecordedAction {
    pub record: MatchRecord,
    /// True only for the call that moved the pair from pending to mutual.
    pub became_mutual: bool,
}

/// Read access to user profiles
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    async fn find_candidates(&self, query: &GeoQuery) -> Result<Vec<UserProfile>, StoreError>;

    /// Liveness probe for the backing store. Defaults to healthy for
    /// implementations with nothing to probe.
    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

/// Ownership of match records
///
/// `record_action` is the atomic unit required by the pair state machine:
/// create-if-absent (using the seed) and the action read-modify-write happen
/// under one transaction or one lock, never as separate calls.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn find_record(&self, key: &PairKey) -> Result<Option<MatchRecord>, StoreError>;

    async fn record_action(
        &self,
        key: &PairKey,
        seed: Option<MatchSeed>,
        side: PairSide,
        action: MatchAction,
    ) -> Result<RecordedAction, StoreError>;

    async fn set_enrichment(&self, key: &PairKey, text: &str) -> Result<(), StoreError>;
}

/// PostgreSQL-backed store for profiles and match records
///
/// Match records are keyed by the canonical pair key; the primary-key
/// constraint plus `ON CONFLICT DO NOTHING` and `SELECT ... FOR UPDATE`
/// give the single-record-per-pair guarantee under concurrent writers.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store from a connection string, running migrations.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        Self::connect(url, max_connections.unwrap_or(10), min_connections.unwrap_or(1)).await
    }

    fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<MatchRecord, StoreError> {
        Ok(MatchRecord {
            pair_key: row.try_get("pair_key")?,
            user_a: row.try_get("user_a")?,
            user_b: row.try_get("user_b")?,
            score: row.try_get("score")?,
            band: row.try_get("band")?,
            action_a: row.try_get("action_a")?,
            action_b: row.try_get("action_b")?,
            state: row.try_get("state")?,
            enrichment: row.try_get("enrichment")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_profile(row: &sqlx::postgres::PgRow) -> Result<UserProfile, StoreError> {
        let document: serde_json::Value = row.try_get("profile")?;
        serde_json::from_value(document)
            .map_err(|e| StoreError::Decode(format!("user profile: {}", e)))
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let row = sqlx::query("SELECT profile FROM user_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_profile).transpose()
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }

    async fn find_candidates(&self, query: &GeoQuery) -> Result<Vec<UserProfile>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT profile
            FROM user_profiles
            WHERE is_active = TRUE
              AND latitude BETWEEN $1 AND $2
              AND longitude BETWEEN $3 AND $4
              AND user_id <> ALL($5)
            ORDER BY user_id
            LIMIT $6
            "#,
        )
        .bind(query.bounding_box.min_lat)
        .bind(query.bounding_box.max_lat)
        .bind(query.bounding_box.min_lon)
        .bind(query.bounding_box.max_lon)
        .bind(&query.exclude_user_ids)
        .bind(query.limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let profiles = rows
            .iter()
            .filter_map(|row| match Self::row_to_profile(row) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Skipping malformed candidate row: {}", e);
                    None
                }
            })
            .collect();

        Ok(profiles)
    }
}

#[async_trait]
impl MatchStore for PgStore {
    async fn find_record(&self, key: &PairKey) -> Result<Option<MatchRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM match_records WHERE pair_key = $1")
            .bind(key.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn record_action(
        &self,
        key: &PairKey,
        seed: Option<MatchSeed>,
        side: PairSide,
        action: MatchAction,
    ) -> Result<RecordedAction, StoreError> {
        let mut tx = self.pool.begin().await?;

        if let Some(seed) = seed {
            // Concurrent first contacts both reach this insert; the conflict
            // clause lets exactly one seed win.
            sqlx::query(
                r#"
                INSERT INTO match_records (pair_key, user_a, user_b, score, band)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (pair_key) DO NOTHING
                "#,
            )
            .bind(key.to_string())
            .bind(key.first())
            .bind(key.second())
            .bind(seed.score)
            .bind(seed.band)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query("SELECT * FROM match_records WHERE pair_key = $1 FOR UPDATE")
            .bind(key.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("match record {}", key)))?;

        let mut record = Self::row_to_record(&row)?;
        let mut became_mutual = false;

        // Terminal states are immutable; only pending records take actions.
        if record.state == MatchState::Pending {
            match side {
                PairSide::A => record.action_a = action,
                PairSide::B => record.action_b = action,
            }
            let next = resolve_state(record.action_a, record.action_b, action);
            became_mutual = next == MatchState::Mutual;
            record.state = next;

            sqlx::query(
                r#"
                UPDATE match_records
                SET action_a = $2, action_b = $3, state = $4, updated_at = NOW()
                WHERE pair_key = $1
                "#,
            )
            .bind(key.to_string())
            .bind(record.action_a)
            .bind(record.action_b)
            .bind(record.state)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(RecordedAction {
            record,
            became_mutual,
        })
    }

    async fn set_enrichment(&self, key: &PairKey, text: &str) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE match_records SET enrichment = $2, updated_at = NOW() WHERE pair_key = $1",
        )
        .bind(key.to_string())
        .bind(text)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
