use serde::{Deserialize, Serialize};
use crate::models::domain::{Band, MatchRecord, ScoredCandidate};

/// Response for the compatibility evaluation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "targetUserId")]
    pub target_user_id: String,
    pub score: f64,
    pub band: Band,
    pub enrichment: Option<String>,
}

/// Response for the discovery endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverResponse {
    pub matches: Vec<ScoredCandidate>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Response for the action endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub matched: bool,
    pub record: MatchRecord,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Throttled response with a retry hint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottledResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "retryAfterSecs")]
    pub retry_after_secs: u64,
}
