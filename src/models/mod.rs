// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Band, BlendMode, BoundingBox, CompatibilityResult, DealBreakerSet, DiscoveryBounds, GeoQuery,
    LifestyleFacts, MatchAction, MatchRecord, MatchSeed, MatchState, PairKey, PairSide,
    ScoredCandidate, SubscriptionTier, TraitProfile, UserProfile,
};
pub use requests::{ActionRequest, DiscoverRequest, EvaluateRequest};
pub use responses::{
    ActionResponse, DiscoverResponse, ErrorResponse, EvaluateResponse, HealthResponse,
    ThrottledResponse,
};
