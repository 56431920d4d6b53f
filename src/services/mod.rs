// Service exports
pub mod cache;
pub mod enrichment;
pub mod memory;
pub mod store;

pub use cache::CompatibilityCache;
pub use enrichment::{
    EnrichmentError, HttpInsightClient, InsightProvider, NoopInsight, RiskLevel, SafetyAssessment,
};
pub use memory::InMemoryStore;
pub use store::{MatchStore, PgStore, ProfileStore, RecordedAction, StoreError};
