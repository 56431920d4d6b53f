use std::time::Duration;

use crate::models::{BlendMode, CompatibilityResult, PairKey};

/// In-process cache for pure compatibility results
///
/// Keyed by canonical pair key plus blend mode, so the symmetric pair maps
/// to one entry regardless of request direction. Only the deterministic
/// phase is cached; enrichment text is per-request and never stored here.
pub struct CompatibilityCache {
    inner: moka::future::Cache<String, CompatibilityResult>,
}

impl CompatibilityCache {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let inner = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner }
    }

    pub async fn get(&self, key: &PairKey, mode: BlendMode) -> Option<CompatibilityResult> {
        let result = self.inner.get(&Self::cache_key(key, mode)).await;
        if result.is_some() {
            tracing::trace!("Compatibility cache hit: {}", key);
        }
        result
    }

    pub async fn insert(&self, key: &PairKey, mode: BlendMode, result: CompatibilityResult) {
        self.inner.insert(Self::cache_key(key, mode), result).await;
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    fn cache_key(key: &PairKey, mode: BlendMode) -> String {
        match mode {
            BlendMode::Standard => format!("compat:standard:{}", key),
            BlendMode::Detailed => format!("compat:detailed:{}", key),
        }
    }
}
