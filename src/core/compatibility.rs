use std::sync::Arc;

use crate::core::dealbreakers::deal_breaker_score;
use crate::core::traits::{score_traits, TraitWeights};
use crate::core::EngineError;
use crate::models::{Band, BlendMode, CompatibilityResult, LifestyleFacts, PairKey, UserProfile};
use crate::services::cache::CompatibilityCache;
use crate::services::enrichment::InsightProvider;

/// Lifestyle sub-score assumed when the pair shares no comparable factors.
/// Optimistic-neutral: the absence of data is not treated as a penalty.
const NEUTRAL_LIFESTYLE: f64 = 75.0;

/// Overlap sub-score assumed when either side declares no entries.
const NEUTRAL_OVERLAP: f64 = 75.0;

/// Weights for the standard three-factor blend. Configurable at startup,
/// defaulting to the canonical 0.6/0.3/0.1 split.
#[derive(Debug, Clone, Copy)]
pub struct BlendWeights {
    pub personality: f64,
    pub lifestyle: f64,
    pub deal_breakers: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            personality: 0.6,
            lifestyle: 0.3,
            deal_breakers: 0.1,
        }
    }
}

/// Pair compatibility engine
///
/// Two-phase by construction: `score_pair` is the pure, deterministic part
/// (deal-breakers, traits, lifestyle, blend, band), and `evaluate` layers the
/// best-effort enrichment call on top. Enrichment can never change a score
/// or fail an evaluation.
#[derive(Clone)]
pub struct CompatibilityEngine {
    blend: BlendWeights,
    insights: Arc<dyn InsightProvider>,
    cache: Arc<CompatibilityCache>,
}

impl CompatibilityEngine {
    pub fn new(
        blend: BlendWeights,
        insights: Arc<dyn InsightProvider>,
        cache: Arc<CompatibilityCache>,
    ) -> Self {
        Self {
            blend,
            insights,
            cache,
        }
    }

    /// Compute the compatibility score and band for a pair. Pure phase:
    /// no I/O, no enrichment, profiles are read-only.
    ///
    /// Fails only when a profile is structurally invalid (a required trait
    /// is absent).
    pub fn score_pair(
        &self,
        a: &UserProfile,
        b: &UserProfile,
        mode: BlendMode,
    ) -> Result<CompatibilityResult, EngineError> {
        validate_traits(a)?;
        validate_traits(b)?;

        let final_score = match mode {
            BlendMode::Standard => {
                let personality = score_traits(&a.traits, &b.traits, &TraitWeights::standard());
                let lifestyle = lifestyle_score(&a.lifestyle, &b.lifestyle);
                let deal_breakers = deal_breaker_score(
                    &a.deal_breakers,
                    &a.lifestyle,
                    &b.deal_breakers,
                    &b.lifestyle,
                );

                personality * self.blend.personality
                    + lifestyle * self.blend.lifestyle
                    + deal_breakers * self.blend.deal_breakers
            }
            BlendMode::Detailed => {
                let personality = score_traits(&a.traits, &b.traits, &TraitWeights::detailed());
                let lifestyle = lifestyle_score(&a.lifestyle, &b.lifestyle);
                let interests = overlap_score(&a.interests, &b.interests);
                let values = overlap_score(&a.values, &b.values);

                personality * 0.4 + interests * 0.2 + lifestyle * 0.2 + values * 0.2
            }
        };

        let score = final_score.clamp(0.0, 100.0);

        Ok(CompatibilityResult {
            score,
            band: Band::from_score(score),
            enrichment: None,
        })
    }

    /// Evaluate a pair: cached pure score, then best-effort enrichment when
    /// the requesting user's tier allows it.
    ///
    /// Any enrichment failure (timeout, transport, malformed response) is
    /// logged and degraded to `enrichment = None`; it never fails the call.
    pub async fn evaluate(
        &self,
        a: &UserProfile,
        b: &UserProfile,
        mode: BlendMode,
    ) -> Result<CompatibilityResult, EngineError> {
        let key = PairKey::new(&a.user_id, &b.user_id);
        let mut result = match self.cache.get(&key, mode).await {
            Some(cached) => cached,
            None => {
                let computed = self.score_pair(a, b, mode)?;
                self.cache.insert(&key, mode, computed.clone()).await;
                computed
            }
        };

        if a.tier.is_paid() {
            result.enrichment = match self.insights.generate_insight(a, b, result.score).await {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!(
                        "Insight generation failed for pair {}, continuing without: {}",
                        key,
                        e
                    );
                    None
                }
            };
        }

        Ok(result)
    }
}

/// Average of `max(0, 100 - 20 * |diff|)` over the factors both sides carry.
/// Defaults to the optimistic-neutral 75 when nothing is comparable.
pub fn lifestyle_score(a: &LifestyleFacts, b: &LifestyleFacts) -> f64 {
    let factors = [
        (a.exercise_frequency, b.exercise_frequency),
        (a.drinking_habits, b.drinking_habits),
        (a.social_level, b.social_level),
        (a.sleep_schedule, b.sleep_schedule),
    ];

    let mut total = 0.0;
    let mut count = 0u32;
    for (fa, fb) in factors {
        if let (Some(fa), Some(fb)) = (fa, fb) {
            let diff = (fa as f64 - fb as f64).abs();
            total += (100.0 - 20.0 * diff).max(0.0);
            count += 1;
        }
    }

    if count == 0 {
        NEUTRAL_LIFESTYLE
    } else {
        total / count as f64
    }
}

/// Shared-entry overlap score for interests/values lists: the shared count
/// relative to the smaller list, scaled to 0-100. Neutral 75 when either
/// side declares nothing.
pub fn overlap_score(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return NEUTRAL_OVERLAP;
    }

    let shared = a.iter().filter(|item| b.contains(item)).count();
    let smaller = a.len().min(b.len());

    100.0 * shared as f64 / smaller as f64
}

fn validate_traits(profile: &UserProfile) -> Result<(), EngineError> {
    if let Some(trait_name) = profile.traits.missing_required() {
        return Err(EngineError::InvalidProfile {
            user_id: profile.user_id.clone(),
            trait_name,
        });
    }
    Ok(())
}
