use serde::{Deserialize, Serialize};

/// Big-five personality trait profile with optional emotional intelligence.
///
/// Values are on a 0-100 scale. The five core traits are required for a
/// profile to be scoreable; `emotional_intelligence` is optional and treated
/// as neutral (50) when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraitProfile {
    #[serde(default)]
    pub openness: Option<f64>,
    #[serde(default)]
    pub conscientiousness: Option<f64>,
    #[serde(default)]
    pub extraversion: Option<f64>,
    #[serde(default)]
    pub agreeableness: Option<f64>,
    #[serde(default)]
    pub neuroticism: Option<f64>,
    #[serde(rename = "emotionalIntelligence", default)]
    pub emotional_intelligence: Option<f64>,
}

impl TraitProfile {
    /// Name of the first missing required trait, if any.
    pub fn missing_required(&self) -> Option<&'static str> {
        if self.openness.is_none() {
            Some("openness")
        } else if self.conscientiousness.is_none() {
            Some("conscientiousness")
        } else if self.extraversion.is_none() {
            Some("extraversion")
        } else if self.agreeableness.is_none() {
            Some("agreeableness")
        } else if self.neuroticism.is_none() {
            Some("neuroticism")
        } else {
            None
        }
    }
}

/// Veto flags a user declares as absolutely unacceptable in a partner.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DealBreakerSet {
    #[serde(default)]
    pub smoking: bool,
    #[serde(rename = "hasKids", default)]
    pub has_kids: bool,
    #[serde(default)]
    pub pets: bool,
}

/// Lifestyle facts: the counterpart side of the veto check plus the
/// 0-5 scale factors used for lifestyle scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifestyleFacts {
    #[serde(default)]
    pub smokes: bool,
    #[serde(rename = "hasKids", default)]
    pub has_kids: bool,
    #[serde(rename = "hasPets", default)]
    pub has_pets: bool,
    #[serde(rename = "exerciseFrequency", default)]
    pub exercise_frequency: Option<u8>,
    #[serde(rename = "drinkingHabits", default)]
    pub drinking_habits: Option<u8>,
    #[serde(rename = "socialLevel", default)]
    pub social_level: Option<u8>,
    #[serde(rename = "sleepSchedule", default)]
    pub sleep_schedule: Option<u8>,
}

/// Subscription tier, gating the enrichment phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Plus,
    Premium,
}

impl SubscriptionTier {
    pub fn is_paid(&self) -> bool {
        !matches!(self, SubscriptionTier::Free)
    }
}

/// User profile with the fields the engine reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub age: u8,
    pub gender: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub tier: SubscriptionTier,
    #[serde(default)]
    pub traits: TraitProfile,
    #[serde(default)]
    pub lifestyle: LifestyleFacts,
    #[serde(rename = "dealBreakers", default)]
    pub deal_breakers: DealBreakerSet,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Which blend the compatibility engine applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// personality 0.6, lifestyle 0.3, deal-breakers 0.1
    #[default]
    Standard,
    /// personality 0.4, interests 0.2, lifestyle 0.2, values 0.2
    Detailed,
}

/// Qualitative classification of a compatibility score.
///
/// Bands are closed-open intervals: 90.0 is perfect, 89.999 is excellent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "score_band", rename_all = "lowercase")]
pub enum Band {
    Potential,
    Good,
    Excellent,
    Perfect,
}

impl Band {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Band::Perfect
        } else if score >= 80.0 {
            Band::Excellent
        } else if score >= 70.0 {
            Band::Good
        } else {
            Band::Potential
        }
    }
}

/// Outcome of a pair evaluation. Derived data; never source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityResult {
    pub score: f64,
    pub band: Band,
    pub enrichment: Option<String>,
}

/// Per-user action on a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "match_action", rename_all = "snake_case")]
pub enum MatchAction {
    Unset,
    Like,
    Pass,
    SuperLike,
}

impl MatchAction {
    /// Like and super-like both count toward a mutual match.
    pub fn is_positive(&self) -> bool {
        matches!(self, MatchAction::Like | MatchAction::SuperLike)
    }
}

/// Pair state. `Mutual` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "match_state", rename_all = "lowercase")]
pub enum MatchState {
    Pending,
    Mutual,
    Rejected,
}

/// Canonical unordered pair of user ids.
///
/// `(a, b)` and `(b, a)` resolve to the same key, so a pair can never own
/// two records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    first: String,
    second: String,
}

/// The slot a user occupies within a pair record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    A,
    B,
}

impl PairKey {
    pub fn new(x: &str, y: &str) -> Self {
        if x <= y {
            Self {
                first: x.to_string(),
                second: y.to_string(),
            }
        } else {
            Self {
                first: y.to_string(),
                second: x.to_string(),
            }
        }
    }

    /// Lexicographically smaller user id (slot A).
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Lexicographically larger user id (slot B).
    pub fn second(&self) -> &str {
        &self.second
    }

    /// Which slot the given user occupies.
    pub fn side_of(&self, user_id: &str) -> PairSide {
        if user_id == self.first {
            PairSide::A
        } else {
            PairSide::B
        }
    }

}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.first, self.second)
    }
}

/// Persistent record for one unordered pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "pairKey")]
    pub pair_key: String,
    #[serde(rename = "userA")]
    pub user_a: String,
    #[serde(rename = "userB")]
    pub user_b: String,
    pub score: f64,
    pub band: Band,
    #[serde(rename = "actionA")]
    pub action_a: MatchAction,
    #[serde(rename = "actionB")]
    pub action_b: MatchAction,
    pub state: MatchState,
    pub enrichment: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl MatchRecord {
    /// Fresh pending record seeded with the creation-time score.
    pub fn new(key: &PairKey, score: f64, band: Band) -> Self {
        let now = chrono::Utc::now();
        Self {
            pair_key: key.to_string(),
            user_a: key.first().to_string(),
            user_b: key.second().to_string(),
            score,
            band,
            action_a: MatchAction::Unset,
            action_b: MatchAction::Unset,
            state: MatchState::Pending,
            enrichment: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn action_of(&self, side: PairSide) -> MatchAction {
        match side {
            PairSide::A => self.action_a,
            PairSide::B => self.action_b,
        }
    }
}

/// Creation-time compatibility seed for a new pair record.
#[derive(Debug, Clone, Copy)]
pub struct MatchSeed {
    pub score: f64,
    pub band: Band,
}

/// Candidate annotated with its compatibility evaluation, as returned by
/// the discovery pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub age: u8,
    pub gender: String,
    #[serde(rename = "distanceMi")]
    pub distance_mi: f64,
    pub score: f64,
    pub band: Band,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Candidate fetch parameters handed to the profile store.
#[derive(Debug, Clone)]
pub struct GeoQuery {
    pub bounding_box: BoundingBox,
    pub exclude_user_ids: Vec<String>,
    pub limit: usize,
}

/// Optional demographic bounds the discovery pipeline applies before scoring.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryBounds {
    pub preferred_genders: Vec<String>,
    pub min_age: Option<u8>,
    pub max_age: Option<u8>,
}
