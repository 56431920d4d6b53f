use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::BlendMode;

/// Request to evaluate compatibility for one pair
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EvaluateRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "targetUserId", rename = "targetUserId")]
    pub target_user_id: String,
    #[serde(default)]
    pub mode: BlendMode,
}

/// Request to run the discovery pipeline
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiscoverRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(alias = "maxDistanceMi", rename = "maxDistanceMi")]
    pub max_distance_mi: Option<f64>,
    #[serde(default = "default_limit")]
    pub limit: u16,
    #[serde(alias = "preferredGenders", rename = "preferredGenders", default)]
    pub preferred_genders: Vec<String>,
    #[serde(alias = "minAge", rename = "minAge")]
    pub min_age: Option<u8>,
    #[serde(alias = "maxAge", rename = "maxAge")]
    pub max_age: Option<u8>,
}

fn default_limit() -> u16 {
    20
}

/// Request to record a like/pass/super-like on a pair
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ActionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "targetUserId", rename = "targetUserId")]
    pub target_user_id: String,
    #[serde(alias = "action", rename = "action")]
    pub action: String,
}
