// Integration tests for the Amora matching engine

use std::sync::Arc;

use async_trait::async_trait;

use amora_algo::core::compatibility::{BlendWeights, CompatibilityEngine};
use amora_algo::core::{DiscoveryEngine, MatchEngine};
use amora_algo::models::{
    BlendMode, DealBreakerSet, DiscoveryBounds, GeoQuery, LifestyleFacts, MatchAction, MatchState,
    SubscriptionTier, TraitProfile, UserProfile,
};
use amora_algo::services::enrichment::{EnrichmentError, InsightProvider, SafetyAssessment};
use amora_algo::services::{
    CompatibilityCache, HttpInsightClient, InMemoryStore, NoopInsight, ProfileStore, RiskLevel,
};

fn traits(values: [f64; 5]) -> TraitProfile {
    TraitProfile {
        openness: Some(values[0]),
        conscientiousness: Some(values[1]),
        extraversion: Some(values[2]),
        agreeableness: Some(values[3]),
        neuroticism: Some(values[4]),
        emotional_intelligence: None,
    }
}

fn profile(id: &str, lat: f64, lon: f64) -> UserProfile {
    UserProfile {
        user_id: id.to_string(),
        name: format!("User {}", id),
        age: 28,
        gender: "female".to_string(),
        latitude: lat,
        longitude: lon,
        is_active: true,
        tier: SubscriptionTier::Free,
        traits: traits([60.0, 55.0, 70.0, 65.0, 45.0]),
        lifestyle: LifestyleFacts::default(),
        deal_breakers: DealBreakerSet::default(),
        interests: vec![],
        values: vec![],
    }
}

fn compat_engine(insights: Arc<dyn InsightProvider>) -> CompatibilityEngine {
    CompatibilityEngine::new(
        BlendWeights::default(),
        insights,
        Arc::new(CompatibilityCache::new(100, 60)),
    )
}

async fn match_engine_with(
    insights: Arc<dyn InsightProvider>,
    profiles: &[UserProfile],
) -> (Arc<InMemoryStore>, MatchEngine) {
    let store = Arc::new(InMemoryStore::new());
    for p in profiles {
        store.insert_profile(p.clone()).await;
    }

    let engine = MatchEngine::new(
        store.clone(),
        store.clone(),
        insights.clone(),
        compat_engine(insights),
    );

    (store, engine)
}

/// Insight stub that always produces text.
struct CannedInsight;

#[async_trait]
impl InsightProvider for CannedInsight {
    async fn generate_insight(
        &self,
        a: &UserProfile,
        b: &UserProfile,
        _score: f64,
    ) -> Result<String, EnrichmentError> {
        Ok(format!("{} and {} both value a quiet evening", a.name, b.name))
    }

    async fn analyze_conversation(
        &self,
        _a: &UserProfile,
        _b: &UserProfile,
        _recent_messages: &[String],
    ) -> Result<String, EnrichmentError> {
        Ok("keep asking open questions".to_string())
    }

    async fn analyze_safety_risk(
        &self,
        _profile: &UserProfile,
        _messages: &[String],
    ) -> Result<SafetyAssessment, EnrichmentError> {
        Ok(SafetyAssessment {
            risk_level: RiskLevel::Low,
            text: "nothing concerning".to_string(),
        })
    }
}

#[tokio::test]
async fn test_mutual_match_is_commutative() {
    let ava = profile("ava", 40.7128, -74.0060);
    let ben = profile("ben", 40.72, -74.01);

    // A then B
    let (_, engine) = match_engine_with(Arc::new(NoopInsight), &[ava.clone(), ben.clone()]).await;
    let first = engine.apply_action("ava", "ben", MatchAction::Like).await.unwrap();
    assert!(!first.matched);
    assert_eq!(first.record.state, MatchState::Pending);
    let second = engine.apply_action("ben", "ava", MatchAction::Like).await.unwrap();
    assert!(second.matched);
    assert_eq!(second.record.state, MatchState::Mutual);

    // B then A reaches the same terminal state
    let (_, engine) = match_engine_with(Arc::new(NoopInsight), &[ava, ben]).await;
    engine.apply_action("ben", "ava", MatchAction::Like).await.unwrap();
    let outcome = engine.apply_action("ava", "ben", MatchAction::Like).await.unwrap();
    assert!(outcome.matched);
    assert_eq!(outcome.record.state, MatchState::Mutual);
}

#[tokio::test]
async fn test_super_like_counts_as_positive() {
    let ava = profile("ava", 40.7128, -74.0060);
    let ben = profile("ben", 40.72, -74.01);
    let (_, engine) = match_engine_with(Arc::new(NoopInsight), &[ava, ben]).await;

    engine.apply_action("ava", "ben", MatchAction::SuperLike).await.unwrap();
    let outcome = engine.apply_action("ben", "ava", MatchAction::Like).await.unwrap();
    assert!(outcome.matched);
}

#[tokio::test]
async fn test_pass_rejects_and_is_terminal() {
    let ava = profile("ava", 40.7128, -74.0060);
    let ben = profile("ben", 40.72, -74.01);
    let (_, engine) = match_engine_with(Arc::new(NoopInsight), &[ava, ben]).await;

    let passed = engine.apply_action("ava", "ben", MatchAction::Pass).await.unwrap();
    assert!(!passed.matched);
    assert_eq!(passed.record.state, MatchState::Rejected);

    // Neither a like from the other side nor a change of heart reopens it.
    let late_like = engine.apply_action("ben", "ava", MatchAction::Like).await.unwrap();
    assert_eq!(late_like.record.state, MatchState::Rejected);
    let retracted = engine.apply_action("ava", "ben", MatchAction::Like).await.unwrap();
    assert_eq!(retracted.record.state, MatchState::Rejected);
    assert!(!retracted.matched);
}

#[tokio::test]
async fn test_score_computed_once_per_pair() {
    let ava = profile("ava", 40.7128, -74.0060);
    let ben = profile("ben", 40.72, -74.01);
    let (store, engine) = match_engine_with(Arc::new(NoopInsight), &[ava, ben]).await;

    let first = engine.apply_action("ava", "ben", MatchAction::Like).await.unwrap();
    let seeded_score = first.record.score;
    assert!(seeded_score > 0.0);

    let second = engine.apply_action("ben", "ava", MatchAction::Like).await.unwrap();
    assert_eq!(second.record.score, seeded_score);
    assert_eq!(store.record_count().await, 1);
}

#[tokio::test]
async fn test_self_action_is_rejected() {
    let ava = profile("ava", 40.7128, -74.0060);
    let (_, engine) = match_engine_with(Arc::new(NoopInsight), &[ava]).await;

    let result = engine.apply_action("ava", "ava", MatchAction::Like).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_unknown_user_is_rejected() {
    let ava = profile("ava", 40.7128, -74.0060);
    let (_, engine) = match_engine_with(Arc::new(NoopInsight), &[ava]).await;

    let result = engine.apply_action("ava", "ghost", MatchAction::Like).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_mutual_survives_enrichment_failure() {
    let ava = profile("ava", 40.7128, -74.0060);
    let ben = profile("ben", 40.72, -74.01);
    // NoopInsight fails every call; the transition must still land.
    let (_, engine) = match_engine_with(Arc::new(NoopInsight), &[ava, ben]).await;

    engine.apply_action("ava", "ben", MatchAction::Like).await.unwrap();
    let outcome = engine.apply_action("ben", "ava", MatchAction::Like).await.unwrap();

    assert!(outcome.matched);
    assert!(outcome.record.enrichment.is_none());
}

#[tokio::test]
async fn test_mutual_match_stores_insight_when_available() {
    let ava = profile("ava", 40.7128, -74.0060);
    let ben = profile("ben", 40.72, -74.01);
    let (store, engine) = match_engine_with(Arc::new(CannedInsight), &[ava, ben]).await;

    engine.apply_action("ava", "ben", MatchAction::Like).await.unwrap();
    let outcome = engine.apply_action("ben", "ava", MatchAction::Like).await.unwrap();

    assert!(outcome.matched);
    let text = outcome.record.enrichment.expect("insight should be stored");
    assert!(text.contains("User ava"));

    // Persisted, not just returned.
    let key = amora_algo::models::PairKey::new("ava", "ben");
    use amora_algo::services::MatchStore;
    let stored = store.find_record(&key).await.unwrap().unwrap();
    assert_eq!(stored.enrichment, Some(text));
}

#[tokio::test]
async fn test_discovery_through_store() {
    let store = Arc::new(InMemoryStore::new());
    let seeker = profile("seeker", 40.7128, -74.0060);
    store.insert_profile(seeker.clone()).await;
    store.insert_profile(profile("near", 40.72, -74.01)).await;
    store.insert_profile(profile("far", 44.0, -74.0)).await;

    let query = GeoQuery {
        bounding_box: amora_algo::core::calculate_bounding_box(
            seeker.latitude,
            seeker.longitude,
            50.0,
        ),
        exclude_user_ids: vec![seeker.user_id.clone()],
        limit: 100,
    };
    let candidates = store.find_candidates(&query).await.unwrap();

    let discovery = DiscoveryEngine::new(compat_engine(Arc::new(NoopInsight)));
    let result = discovery
        .discover(&seeker, candidates, 50.0, &DiscoveryBounds::default(), 10)
        .unwrap();

    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].user_id, "near");
    assert!(result.matches[0].score > 70.0);
}

#[tokio::test]
async fn test_evaluate_detailed_mode_scores() {
    let mut ava = profile("ava", 40.7128, -74.0060);
    let mut ben = profile("ben", 40.72, -74.01);
    ava.interests = vec!["climbing".to_string(), "film".to_string()];
    ben.interests = vec!["film".to_string()];
    ava.values = vec!["curiosity".to_string()];
    ben.values = vec!["curiosity".to_string()];

    let engine = compat_engine(Arc::new(NoopInsight));
    let result = engine.evaluate(&ava, &ben, BlendMode::Detailed).await.unwrap();

    // personality 100*0.4 + interests 100*0.2 + lifestyle 75*0.2 + values 100*0.2
    assert!((result.score - 95.0).abs() < 0.01, "got {}", result.score);
}

#[tokio::test]
async fn test_http_insight_client_success() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/insights")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"text": "you both hate small talk"}"#)
        .create_async()
        .await;

    let client = HttpInsightClient::new(
        server.url(),
        "test-key".to_string(),
        std::time::Duration::from_secs(2),
    )
    .unwrap();

    let ava = profile("ava", 40.7128, -74.0060);
    let ben = profile("ben", 40.72, -74.01);
    let text = client.generate_insight(&ava, &ben, 88.0).await.unwrap();
    assert_eq!(text, "you both hate small talk");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_http_insight_client_error_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/insights")
        .with_status(503)
        .create_async()
        .await;

    let client = HttpInsightClient::new(
        server.url(),
        "test-key".to_string(),
        std::time::Duration::from_secs(2),
    )
    .unwrap();

    let ava = profile("ava", 40.7128, -74.0060);
    let ben = profile("ben", 40.72, -74.01);
    let result = client.generate_insight(&ava, &ben, 88.0).await;
    assert!(matches!(result, Err(EnrichmentError::ApiError(503))));
}

#[tokio::test]
async fn test_http_insight_client_malformed_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/conversation")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"unexpected": true}"#)
        .create_async()
        .await;

    let client = HttpInsightClient::new(
        server.url(),
        "test-key".to_string(),
        std::time::Duration::from_secs(2),
    )
    .unwrap();

    let ava = profile("ava", 40.7128, -74.0060);
    let ben = profile("ben", 40.72, -74.01);
    let result = client
        .analyze_conversation(&ava, &ben, &["hey".to_string()])
        .await;
    assert!(matches!(result, Err(EnrichmentError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_http_insight_client_safety_assessment() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/safety")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"riskLevel": "MEDIUM", "text": "pushy tone in recent messages"}"#)
        .create_async()
        .await;

    let client = HttpInsightClient::new(
        server.url(),
        "test-key".to_string(),
        std::time::Duration::from_secs(2),
    )
    .unwrap();

    let ava = profile("ava", 40.7128, -74.0060);
    let assessment = client
        .analyze_safety_risk(&ava, &["message".to_string()])
        .await
        .unwrap();
    assert_eq!(assessment.risk_level, RiskLevel::Medium);
}

#[tokio::test]
async fn test_http_insight_client_unreachable_host() {
    // Nothing listens here; the transport error is the enrichment failure
    // the engines degrade on.
    let client = HttpInsightClient::new(
        "http://127.0.0.1:9".to_string(),
        "test-key".to_string(),
        std::time::Duration::from_secs(1),
    )
    .unwrap();

    let ava = profile("ava", 40.7128, -74.0060);
    let ben = profile("ben", 40.72, -74.01);
    let result = client.generate_insight(&ava, &ben, 88.0).await;
    assert!(matches!(result, Err(EnrichmentError::RequestError(_))));
}
