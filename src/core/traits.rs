use crate::models::TraitProfile;

/// Neutral value assumed for traits a profile does not carry
const NEUTRAL_TRAIT: f64 = 50.0;

/// Per-trait weights for personality scoring. Each set sums to 1.0 so a
/// pair of identical profiles always lands at exactly 100.
#[derive(Debug, Clone, Copy)]
pub struct TraitWeights {
    pub openness: f64,
    pub conscientiousness: f64,
    pub extraversion: f64,
    pub agreeableness: f64,
    pub neuroticism: f64,
    pub emotional_intelligence: f64,
}

impl TraitWeights {
    /// Weight set used by discovery and match creation.
    pub fn standard() -> Self {
        Self {
            openness: 0.15,
            conscientiousness: 0.20,
            extraversion: 0.18,
            agreeableness: 0.25,
            neuroticism: 0.12,
            emotional_intelligence: 0.10,
        }
    }

    /// Weight set used by the detailed evaluation path, leaning slightly
    /// harder on neuroticism alignment.
    pub fn detailed() -> Self {
        Self {
            openness: 0.15,
            conscientiousness: 0.20,
            extraversion: 0.18,
            agreeableness: 0.22,
            neuroticism: 0.15,
            emotional_intelligence: 0.10,
        }
    }
}

impl Default for TraitWeights {
    fn default() -> Self {
        Self::standard()
    }
}

/// Calculate the personality compatibility score (0-100) for two profiles
///
/// For each trait the contribution is `weight * max(0, 1 - |a - b| / 100)`,
/// so identical values contribute the full weight and a 100-point spread
/// contributes nothing. Contributions are summed and scaled to 0-100.
///
/// Missing values fall back to the neutral 50 rather than failing; required
/// trait presence is checked by the engine before scoring, not here.
/// Symmetric: `score_traits(a, b, w) == score_traits(b, a, w)`.
pub fn score_traits(a: &TraitProfile, b: &TraitProfile, weights: &TraitWeights) -> f64 {
    let total = trait_contribution(a.openness, b.openness, weights.openness)
        + trait_contribution(a.conscientiousness, b.conscientiousness, weights.conscientiousness)
        + trait_contribution(a.extraversion, b.extraversion, weights.extraversion)
        + trait_contribution(a.agreeableness, b.agreeableness, weights.agreeableness)
        + trait_contribution(a.neuroticism, b.neuroticism, weights.neuroticism)
        + trait_contribution(
            a.emotional_intelligence,
            b.emotional_intelligence,
            weights.emotional_intelligence,
        );

    (total * 100.0).clamp(0.0, 100.0)
}

#[inline]
fn trait_contribution(a: Option<f64>, b: Option<f64>, weight: f64) -> f64 {
    let a = a.unwrap_or(NEUTRAL_TRAIT);
    let b = b.unwrap_or(NEUTRAL_TRAIT);
    weight * (1.0 - (a - b).abs() / 100.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(values: [f64; 5]) -> TraitProfile {
        TraitProfile {
            openness: Some(values[0]),
            conscientiousness: Some(values[1]),
            extraversion: Some(values[2]),
            agreeableness: Some(values[3]),
            neuroticism: Some(values[4]),
            emotional_intelligence: None,
        }
    }

    #[test]
    fn test_self_compatibility_is_maximal() {
        let p = profile([70.0, 60.0, 55.0, 80.0, 40.0]);
        let score = score_traits(&p, &p, &TraitWeights::standard());
        assert!((score - 100.0).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_symmetry() {
        let a = profile([70.0, 60.0, 55.0, 80.0, 40.0]);
        let b = profile([30.0, 90.0, 10.0, 65.0, 75.0]);
        let w = TraitWeights::standard();
        assert_eq!(score_traits(&a, &b, &w), score_traits(&b, &a, &w));
    }

    #[test]
    fn test_missing_trait_defaults_to_neutral() {
        let mut a = profile([50.0, 50.0, 50.0, 50.0, 50.0]);
        let b = profile([50.0, 50.0, 50.0, 50.0, 50.0]);
        a.neuroticism = None;

        // Missing neuroticism reads as 50, identical to b's, so still 100.
        let score = score_traits(&a, &b, &TraitWeights::standard());
        assert!((score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_opposite_profiles_keep_only_neutral_contributions() {
        let a = profile([0.0, 0.0, 0.0, 0.0, 0.0]);
        let b = profile([100.0, 100.0, 100.0, 100.0, 100.0]);
        let score = score_traits(&a, &b, &TraitWeights::standard());
        // Emotional intelligence is absent on both sides and reads as 50,
        // so only its 0.10 weight survives the 100-point spreads.
        assert!((score - 10.0).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_weight_sets_sum_to_one() {
        for w in [TraitWeights::standard(), TraitWeights::detailed()] {
            let sum = w.openness
                + w.conscientiousness
                + w.extraversion
                + w.agreeableness
                + w.neuroticism
                + w.emotional_intelligence;
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }
}
