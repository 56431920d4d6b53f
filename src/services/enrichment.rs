use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::UserProfile;

/// Errors that can occur when talking to the enrichment provider
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error status: {0}")]
    ApiError(u16),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Enrichment is disabled")]
    Disabled,
}

/// Conversation/profile risk classification returned by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

/// Safety analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyAssessment {
    #[serde(rename = "riskLevel")]
    pub risk_level: RiskLevel,
    pub text: String,
}

/// Text-generation collaborator
///
/// Every call is best-effort: callers treat any error (transport, timeout,
/// non-2xx, malformed body) as "no enrichment" and carry on.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    /// Short compatibility insight for a scored pair.
    async fn generate_insight(
        &self,
        a: &UserProfile,
        b: &UserProfile,
        score: f64,
    ) -> Result<String, EnrichmentError>;

    /// Conversation coaching over recent messages.
    async fn analyze_conversation(
        &self,
        a: &UserProfile,
        b: &UserProfile,
        recent_messages: &[String],
    ) -> Result<String, EnrichmentError>;

    /// Risk classification for a profile plus message history.
    async fn analyze_safety_risk(
        &self,
        profile: &UserProfile,
        messages: &[String],
    ) -> Result<SafetyAssessment, EnrichmentError>;
}

#[derive(Debug, Deserialize)]
struct InsightBody {
    text: String,
}

/// HTTP client for the enrichment provider
///
/// All requests share one bounded timeout, so a stalled provider can delay
/// an operation by at most that much before the caller degrades.
pub struct HttpInsightClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl HttpInsightClient {
    pub fn new(
        base_url: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, EnrichmentError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    async fn post_for_text(
        &self,
        path: &str,
        payload: serde_json::Value,
    ) -> Result<String, EnrichmentError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EnrichmentError::ApiError(response.status().as_u16()));
        }

        let body: InsightBody = response
            .json()
            .await
            .map_err(|e| EnrichmentError::InvalidResponse(e.to_string()))?;

        if body.text.trim().is_empty() {
            return Err(EnrichmentError::InvalidResponse("empty text".to_string()));
        }

        Ok(body.text)
    }
}

#[async_trait]
impl InsightProvider for HttpInsightClient {
    async fn generate_insight(
        &self,
        a: &UserProfile,
        b: &UserProfile,
        score: f64,
    ) -> Result<String, EnrichmentError> {
        self.post_for_text(
            "/v1/insights",
            serde_json::json!({
                "profileA": a,
                "profileB": b,
                "score": score,
            }),
        )
        .await
    }

    async fn analyze_conversation(
        &self,
        a: &UserProfile,
        b: &UserProfile,
        recent_messages: &[String],
    ) -> Result<String, EnrichmentError> {
        self.post_for_text(
            "/v1/conversation",
            serde_json::json!({
                "profileA": a,
                "profileB": b,
                "recentMessages": recent_messages,
            }),
        )
        .await
    }

    async fn analyze_safety_risk(
        &self,
        profile: &UserProfile,
        messages: &[String],
    ) -> Result<SafetyAssessment, EnrichmentError> {
        let url = format!("{}/v1/safety", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "profile": profile,
                "messages": messages,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EnrichmentError::ApiError(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| EnrichmentError::InvalidResponse(e.to_string()))
    }
}

/// Provider used when enrichment is switched off. Always unavailable, so
/// every caller exercises its degrade path.
pub struct NoopInsight;

#[async_trait]
impl InsightProvider for NoopInsight {
    async fn generate_insight(
        &self,
        _a: &UserProfile,
        _b: &UserProfile,
        _score: f64,
    ) -> Result<String, EnrichmentError> {
        Err(EnrichmentError::Disabled)
    }

    async fn analyze_conversation(
        &self,
        _a: &UserProfile,
        _b: &UserProfile,
        _recent_messages: &[String],
    ) -> Result<String, EnrichmentError> {
        Err(EnrichmentError::Disabled)
    }

    async fn analyze_safety_risk(
        &self,
        _profile: &UserProfile,
        _messages: &[String],
    ) -> Result<SafetyAssessment, EnrichmentError> {
        Err(EnrichmentError::Disabled)
    }
}
