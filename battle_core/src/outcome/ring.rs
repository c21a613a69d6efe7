//! Ring timing resolution
//!
//! A ring shrinks from outside the hit band toward the center. Pressing while
//! it sits in a band picks that band's outcome:
//!
//! ```text
//! center | vital | crit | hit | (start margin)
//!  miss                          miss
//!  (late)                        (early)
//! ```

use super::{precision_ratio, roll_weighted, OutcomeCategory, OutcomeResolver, ResolvedOutcome};
use crate::ability::{Ability, AbilityKind};
use crate::combatant::Combatant;
use crate::config::{GuardConstants, ResolverKind, RingConstants, RingDistribution};
use crate::types::{AbilityId, CombatantId};
use rand::RngCore;

/// Band boundaries of a ring, as radii from the center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingZones {
    pub center_radius: f64,
    pub vital_outer: f64,
    pub crit_outer: f64,
    pub hit_outer: f64,
    pub start_radius: f64,
}

impl RingZones {
    /// Zones for a ring-clamped precision ratio; better precision widens the
    /// vital and crit bands
    pub fn for_ratio(ratio: f64, ring: &RingConstants) -> Self {
        let vital_width = (ring.vital_zone_width * ratio).max(ring.vital_zone_min_width);
        let crit_width = (ring.crit_zone_width * ratio).max(ring.crit_zone_min_width);
        let vital_outer = ring.center_radius + vital_width;
        let crit_outer = vital_outer + crit_width;
        let hit_outer = crit_outer + ring.hit_zone_width;
        RingZones {
            center_radius: ring.center_radius,
            vital_outer,
            crit_outer,
            hit_outer,
            start_radius: hit_outer + ring.start_margin,
        }
    }

    pub fn classify(&self, radius: f64) -> OutcomeCategory {
        if radius < self.center_radius {
            OutcomeCategory::Miss
        } else if radius <= self.vital_outer {
            OutcomeCategory::Vital
        } else if radius <= self.crit_outer {
            OutcomeCategory::Crit
        } else if radius <= self.hit_outer {
            OutcomeCategory::Hit
        } else {
            OutcomeCategory::Miss
        }
    }
}

/// A pending player timing input
#[derive(Debug, Clone, PartialEq)]
pub struct RingChallenge {
    pub actor: CombatantId,
    pub target: CombatantId,
    pub ability: AbilityId,
    pub ratio: f64,
    pub zones: RingZones,
    /// Current radius of the moving ring
    pub radius: f64,
    pub elapsed: f64,
}

impl RingChallenge {
    pub fn new(
        actor: CombatantId,
        target: CombatantId,
        ability: AbilityId,
        ratio: f64,
        zones: RingZones,
    ) -> Self {
        RingChallenge {
            actor,
            target,
            ability,
            ratio,
            zones,
            radius: zones.start_radius,
            elapsed: 0.0,
        }
    }

    /// Shrink the ring; returns true once it has collapsed
    ///
    /// A collapsed ring resolves as [`RingChallenge::timeout_outcome`], a
    /// plain hit, while a press inside the innermost band misses. Not
    /// pressing at all therefore beats pressing too late; this is intended.
    pub fn advance(&mut self, dt: f64, speed: f64) -> bool {
        let dt = dt.max(0.0);
        self.elapsed += dt;
        self.radius = (self.radius - speed * dt).max(0.0);
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.radius <= 0.0
    }

    /// Outcome of pressing right now
    pub fn press(&self) -> OutcomeCategory {
        self.zones.classify(self.radius)
    }

    /// Outcome when the ring collapses without a press
    pub fn timeout_outcome() -> OutcomeCategory {
        OutcomeCategory::Hit
    }
}

/// Baseline distribution skewed by precision, for combatants that do not
/// press the ring
///
/// `shift = strength * ln(ratio)`: Miss scales by `e^-shift` (and by the
/// guard scale when the defender guards), Crit and Vital by `e^shift`.
pub fn ring_weights(
    ratio: f64,
    defender_guarding: bool,
    ring: &RingConstants,
    guard: &GuardConstants,
) -> [(OutcomeCategory, f64); 4] {
    let base: &RingDistribution = &ring.enemy_baseline;
    let shift = ring.shift_strength * ratio.max(f64::MIN_POSITIVE).ln();
    let mut miss = base.miss * (-shift).exp();
    if defender_guarding {
        miss *= guard.defender_weight_scale;
    }
    [
        (OutcomeCategory::Miss, miss),
        (OutcomeCategory::Hit, base.hit),
        (OutcomeCategory::Crit, base.crit * shift.exp()),
        (OutcomeCategory::Vital, base.vital * shift.exp()),
    ]
}

/// Ring-timing resolver
#[derive(Debug, Clone)]
pub struct RingResolver {
    ring: RingConstants,
    guard: GuardConstants,
}

impl RingResolver {
    pub fn new(ring: RingConstants, guard: GuardConstants) -> Self {
        RingResolver { ring, guard }
    }

    fn ratio(&self, attacker: &Combatant, defender: &Combatant) -> f64 {
        precision_ratio(attacker, defender, self.ring.clamp_min, self.ring.clamp_max)
    }
}

impl OutcomeResolver for RingResolver {
    fn kind(&self) -> ResolverKind {
        ResolverKind::Ring
    }

    fn resolves(&self, kind: AbilityKind) -> bool {
        matches!(kind, AbilityKind::Attack | AbilityKind::Heal | AbilityKind::Buff)
    }

    fn multiplier(&self, category: OutcomeCategory) -> f64 {
        let table = &self.ring.multipliers;
        match category {
            OutcomeCategory::Miss => table.miss,
            OutcomeCategory::Hit => table.hit,
            OutcomeCategory::Crit => table.crit,
            OutcomeCategory::Vital => table.vital,
            other => other.weighted_multiplier(),
        }
    }

    fn resolve(
        &self,
        attacker: &Combatant,
        defender: &Combatant,
        rng: &mut dyn RngCore,
    ) -> ResolvedOutcome {
        let weights = ring_weights(
            self.ratio(attacker, defender),
            defender.is_guarding(),
            &self.ring,
            &self.guard,
        );
        let category = roll_weighted(&weights, rng);
        ResolvedOutcome::new(category, self.multiplier(category))
    }

    fn player_challenge(
        &self,
        attacker: &Combatant,
        defender: &Combatant,
        ability: &Ability,
    ) -> Option<RingChallenge> {
        if !self.resolves(ability.kind) {
            return None;
        }
        let ratio = self.ratio(attacker, defender);
        Some(RingChallenge::new(
            attacker.id,
            defender.id,
            ability.id.clone(),
            ratio,
            RingZones::for_ratio(ratio, &self.ring),
        ))
    }

    fn applies_jitter(&self) -> bool {
        false
    }

    fn scales_buffs(&self) -> bool {
        true
    }
}
