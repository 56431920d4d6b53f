use crate::models::{DealBreakerSet, LifestyleFacts};

/// Check whether a pair survives both users' deal-breakers
///
/// A veto triggers when either party's declared flag matches the other's
/// lifestyle fact (smoking↔smokes, has_kids↔has_kids, pets↔has_pets). Both
/// directions are evaluated independently; the check is symmetric.
pub fn passes(
    a_breakers: &DealBreakerSet,
    a_facts: &LifestyleFacts,
    b_breakers: &DealBreakerSet,
    b_facts: &LifestyleFacts,
) -> bool {
    !vetoes(a_breakers, b_facts) && !vetoes(b_breakers, a_facts)
}

/// Deal-breaker sub-score feeding the standard blend: 100 when the pair
/// passes, 0 on any veto. A hard fail, not a graded penalty.
#[inline]
pub fn deal_breaker_score(
    a_breakers: &DealBreakerSet,
    a_facts: &LifestyleFacts,
    b_breakers: &DealBreakerSet,
    b_facts: &LifestyleFacts,
) -> f64 {
    if passes(a_breakers, a_facts, b_breakers, b_facts) {
        100.0
    } else {
        0.0
    }
}

#[inline]
fn vetoes(breakers: &DealBreakerSet, facts: &LifestyleFacts) -> bool {
    (breakers.smoking && facts.smokes)
        || (breakers.has_kids && facts.has_kids)
        || (breakers.pets && facts.has_pets)
}
