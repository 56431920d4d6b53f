//! Amora Algo - Compatibility and matching engine for the Amora dating app
//!
//! This library holds the decision core of the Amora backend: pair
//! compatibility scoring, candidate discovery, the per-pair match state
//! machine, and request rate limiting. Everything around it (routing,
//! persistence, enrichment) is pluggable through the service traits.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    calculate_bounding_box, haversine_distance, score_traits, CompatibilityEngine,
    DiscoveryEngine, EngineError, MatchEngine, RateLimiter, TraitWeights,
};
pub use crate::models::{
    Band, BlendMode, CompatibilityResult, MatchAction, MatchRecord, MatchState, PairKey,
    ScoredCandidate, UserProfile,
};
