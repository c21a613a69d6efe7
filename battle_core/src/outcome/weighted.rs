//! Weighted categorical outcome draw

use super::{precision_ratio, OutcomeCategory, OutcomeResolver, ResolvedOutcome, RingChallenge};
use crate::ability::{Ability, AbilityKind};
use crate::combatant::Combatant;
use crate::config::{GuardConstants, OutcomeWeights, PrecisionConstants, ResolverKind};
use rand::{Rng, RngCore};

/// Base weights scaled by the clamped precision ratio
///
/// Attacker-favoring categories scale by the ratio, defender-favoring ones
/// by its reciprocal (times the guard scale while the defender guards).
pub fn scaled_weights(
    ratio: f64,
    defender_guarding: bool,
    base: &OutcomeWeights,
    guard: &GuardConstants,
) -> [(OutcomeCategory, f64); 6] {
    let attacker_scale = ratio;
    let mut defender_scale = if ratio > 0.0 { 1.0 / ratio } else { 1.0 };
    if defender_guarding {
        defender_scale *= guard.defender_weight_scale;
    }

    OutcomeCategory::WEIGHTED.map(|category| {
        let weight = match category {
            OutcomeCategory::Counter => base.counter,
            OutcomeCategory::Dodge => base.dodge,
            OutcomeCategory::Block => base.block,
            OutcomeCategory::Hit => base.hit,
            OutcomeCategory::Crit => base.crit,
            OutcomeCategory::Vital => base.vital,
            OutcomeCategory::Miss => 0.0,
        };
        let scale = if category.favors_defender() {
            defender_scale
        } else {
            attacker_scale
        };
        (category, weight * scale)
    })
}

/// First category whose cumulative weight reaches `draw`
///
/// Boundaries are inclusive, so a draw equal to a cumulative total selects
/// the category ending there. Falls back to `Hit` if the draw overshoots.
pub fn pick_weighted(weights: &[(OutcomeCategory, f64)], draw: f64) -> OutcomeCategory {
    let mut upto = 0.0;
    for (category, weight) in weights {
        upto += weight;
        if draw <= upto {
            return *category;
        }
    }
    OutcomeCategory::Hit
}

/// Draw uniformly in `[0, total]` and pick the matching category
pub fn roll_weighted<R: Rng + ?Sized>(
    weights: &[(OutcomeCategory, f64)],
    rng: &mut R,
) -> OutcomeCategory {
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    if !(total > 0.0) {
        return OutcomeCategory::Hit;
    }
    let draw = rng.gen_range(0.0..=total);
    pick_weighted(weights, draw)
}

/// Weighted six-category resolver
#[derive(Debug, Clone)]
pub struct WeightedResolver {
    precision: PrecisionConstants,
    weights: OutcomeWeights,
    guard: GuardConstants,
}

impl WeightedResolver {
    pub fn new(
        precision: PrecisionConstants,
        weights: OutcomeWeights,
        guard: GuardConstants,
    ) -> Self {
        WeightedResolver {
            precision,
            weights,
            guard,
        }
    }

    /// Scaled weights for an attacker/defender pair
    pub fn weights_for(
        &self,
        attacker: &Combatant,
        defender: &Combatant,
    ) -> [(OutcomeCategory, f64); 6] {
        let ratio = precision_ratio(
            attacker,
            defender,
            self.precision.clamp_min,
            self.precision.clamp_max,
        );
        scaled_weights(ratio, defender.is_guarding(), &self.weights, &self.guard)
    }
}

impl OutcomeResolver for WeightedResolver {
    fn kind(&self) -> ResolverKind {
        ResolverKind::Weighted
    }

    fn resolves(&self, kind: AbilityKind) -> bool {
        kind == AbilityKind::Attack
    }

    fn multiplier(&self, category: OutcomeCategory) -> f64 {
        category.weighted_multiplier()
    }

    fn resolve(
        &self,
        attacker: &Combatant,
        defender: &Combatant,
        rng: &mut dyn RngCore,
    ) -> ResolvedOutcome {
        let weights = self.weights_for(attacker, defender);
        let category = roll_weighted(&weights, rng);
        ResolvedOutcome::new(category, self.multiplier(category))
    }

    fn player_challenge(
        &self,
        _attacker: &Combatant,
        _defender: &Combatant,
        _ability: &Ability,
    ) -> Option<RingChallenge> {
        None
    }

    fn applies_jitter(&self) -> bool {
        true
    }

    fn scales_buffs(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    fn even_weights() -> [(OutcomeCategory, f64); 6] {
        scaled_weights(1.0, false, &OutcomeWeights::default(), &GuardConstants::default())
    }

    #[test]
    fn test_even_ratio_keeps_base_weights() {
        let weights = even_weights();
        assert_eq!(weights[0], (OutcomeCategory::Counter, 5.0));
        assert_eq!(weights[3], (OutcomeCategory::Hit, 35.0));
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_guard_doubles_defender_categories() {
        let weights =
            scaled_weights(2.0, true, &OutcomeWeights::default(), &GuardConstants::default());
        // 1 / 2 * 2 = 1.0
        assert!((weights[1].1 - 10.0).abs() < 1e-9);
        assert!((weights[4].1 - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_pick_boundaries_are_inclusive() {
        let weights = even_weights();
        assert_eq!(pick_weighted(&weights, 0.0), OutcomeCategory::Counter);
        assert_eq!(pick_weighted(&weights, 5.0), OutcomeCategory::Counter);
        assert_eq!(pick_weighted(&weights, 5.0001), OutcomeCategory::Dodge);
        assert_eq!(pick_weighted(&weights, 35.0), OutcomeCategory::Block);
        assert_eq!(pick_weighted(&weights, 70.0), OutcomeCategory::Hit);
        assert_eq!(pick_weighted(&weights, 100.0), OutcomeCategory::Vital);
        assert_eq!(pick_weighted(&weights, 100.5), OutcomeCategory::Hit);
    }

    #[test]
    fn test_zero_total_resolves_to_hit() {
        let weights = [(OutcomeCategory::Counter, 0.0), (OutcomeCategory::Vital, 0.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(roll_weighted(&weights, &mut rng), OutcomeCategory::Hit);
    }

    #[test]
    fn test_roll_distribution_roughly_matches_weights() {
        let weights = even_weights();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut counts: HashMap<OutcomeCategory, u32> = HashMap::new();
        let samples = 20_000;
        for _ in 0..samples {
            *counts.entry(roll_weighted(&weights, &mut rng)).or_default() += 1;
        }
        let hit_share = counts[&OutcomeCategory::Hit] as f64 / samples as f64;
        assert!((hit_share - 0.35).abs() < 0.02, "hit share {}", hit_share);
        let counter_share = counts[&OutcomeCategory::Counter] as f64 / samples as f64;
        assert!((counter_share - 0.05).abs() < 0.01, "counter share {}", counter_share);
    }
}
