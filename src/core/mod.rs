// Core algorithm exports
pub mod compatibility;
pub mod dealbreakers;
pub mod discovery;
pub mod distance;
pub mod matches;
pub mod rate_limit;
pub mod traits;

pub use compatibility::CompatibilityEngine;
pub use discovery::{DiscoveryEngine, DiscoveryResult};
pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
pub use matches::{ActionOutcome, MatchEngine};
pub use rate_limit::RateLimiter;
pub use traits::{score_traits, TraitWeights};

use thiserror::Error;

/// Errors surfaced by the decision engines
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid trait profile for {user_id}: missing {trait_name}")]
    InvalidProfile {
        user_id: String,
        trait_name: &'static str,
    },

    #[error("user cannot act on their own profile")]
    SelfAction,

    #[error("action {0} cannot be submitted")]
    InvalidAction(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error(transparent)]
    Store(#[from] crate::services::StoreError),
}
