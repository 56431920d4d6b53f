use crate::core::compatibility::CompatibilityEngine;
use crate::core::distance::haversine_distance;
use crate::core::EngineError;
use crate::models::{BlendMode, DiscoveryBounds, ScoredCandidate, UserProfile};

/// Minimum blended score a candidate needs to surface in discovery.
const DISCOVERY_SCORE_FLOOR: f64 = 70.0;

/// Result of a discovery run
#[derive(Debug)]
pub struct DiscoveryResult {
    pub matches: Vec<ScoredCandidate>,
    pub total_candidates: usize,
}

/// Candidate discovery pipeline
///
/// # Pipeline stages
/// 1. Exclude self, inactive candidates, and demographic misses
/// 2. Great-circle distance cut at `max_distance_mi`
/// 3. Standard-blend compatibility scoring per survivor
/// 4. Score floor, deterministic ordering, truncation
///
/// Results are computed fresh on every call; nothing is retained between
/// runs. Scoring uses the pure phase only, so a candidate list never
/// triggers enrichment calls.
#[derive(Clone)]
pub struct DiscoveryEngine {
    engine: CompatibilityEngine,
}

impl DiscoveryEngine {
    pub fn new(engine: CompatibilityEngine) -> Self {
        Self { engine }
    }

    /// Run the pipeline for a seeker over a candidate pool.
    ///
    /// Candidates whose trait profiles are structurally invalid are dropped
    /// rather than failing the whole run; an invalid seeker profile fails
    /// immediately.
    pub fn discover(
        &self,
        seeker: &UserProfile,
        candidates: Vec<UserProfile>,
        max_distance_mi: f64,
        bounds: &DiscoveryBounds,
        limit: usize,
    ) -> Result<DiscoveryResult, EngineError> {
        // Surface a bad seeker profile before touching the pool.
        self.engine
            .score_pair(seeker, seeker, BlendMode::Standard)?;

        let total_candidates = candidates.len();

        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter(|candidate| candidate.user_id != seeker.user_id)
            .filter(|candidate| candidate.is_active)
            .filter(|candidate| within_bounds(candidate, bounds))
            .filter_map(|candidate| {
                let distance_mi = haversine_distance(
                    seeker.latitude,
                    seeker.longitude,
                    candidate.latitude,
                    candidate.longitude,
                );
                if distance_mi > max_distance_mi {
                    return None;
                }

                let result = match self.engine.score_pair(seeker, &candidate, BlendMode::Standard)
                {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::debug!(
                            "Skipping unscoreable candidate {}: {}",
                            candidate.user_id,
                            e
                        );
                        return None;
                    }
                };

                if result.score <= DISCOVERY_SCORE_FLOOR {
                    return None;
                }

                Some(ScoredCandidate {
                    user_id: candidate.user_id,
                    name: candidate.name,
                    age: candidate.age,
                    gender: candidate.gender,
                    distance_mi,
                    score: result.score,
                    band: result.band,
                })
            })
            .collect();

        // Sort by score (descending), ties broken by user id (ascending) so
        // ordering is stable across runs.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        scored.truncate(limit);

        Ok(DiscoveryResult {
            matches: scored,
            total_candidates,
        })
    }
}

#[inline]
fn within_bounds(candidate: &UserProfile, bounds: &DiscoveryBounds) -> bool {
    if !bounds.preferred_genders.is_empty()
        && !bounds.preferred_genders.contains(&candidate.gender)
    {
        return false;
    }

    if let Some(min_age) = bounds.min_age {
        if candidate.age < min_age {
            return false;
        }
    }

    if let Some(max_age) = bounds.max_age {
        if candidate.age > max_age {
            return false;
        }
    }

    true
}
