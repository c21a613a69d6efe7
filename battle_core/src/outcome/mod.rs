//! Outcome resolver - accuracy/quality classification of an action
//!
//! Two resolution models sit behind [`OutcomeResolver`]:
//! - Weighted: a categorical draw over counter/dodge/block/hit/crit/vital
//! - Ring: a shrinking timing ring classified into miss/hit/crit/vital bands,
//!   with a skewed categorical draw for combatants that cannot press it

mod ring;
mod weighted;

pub use ring::{ring_weights, RingChallenge, RingResolver, RingZones};
pub use weighted::{pick_weighted, roll_weighted, scaled_weights, WeightedResolver};

use crate::ability::{Ability, AbilityKind};
use crate::combatant::Combatant;
use crate::config::{BattleConfig, ResolverKind};
use crate::stats::pow_ratio;
use crate::types::StatKind;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accuracy/quality classification of a resolved action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCategory {
    Counter,
    Dodge,
    Block,
    Hit,
    Crit,
    Vital,
    /// Ring variant only
    Miss,
}

impl OutcomeCategory {
    /// Stable draw order of the weighted categories
    pub const WEIGHTED: [OutcomeCategory; 6] = [
        OutcomeCategory::Counter,
        OutcomeCategory::Dodge,
        OutcomeCategory::Block,
        OutcomeCategory::Hit,
        OutcomeCategory::Crit,
        OutcomeCategory::Vital,
    ];

    /// Stable draw order of the ring categories
    pub const RING: [OutcomeCategory; 4] = [
        OutcomeCategory::Miss,
        OutcomeCategory::Hit,
        OutcomeCategory::Crit,
        OutcomeCategory::Vital,
    ];

    /// Damage multiplier in the weighted model
    pub fn weighted_multiplier(self) -> f64 {
        match self {
            OutcomeCategory::Counter | OutcomeCategory::Dodge | OutcomeCategory::Miss => 0.0,
            OutcomeCategory::Block => 0.5,
            OutcomeCategory::Hit => 1.0,
            OutcomeCategory::Crit => 1.5,
            OutcomeCategory::Vital => 2.0,
        }
    }

    pub fn is_crit_or_vital(self) -> bool {
        matches!(self, OutcomeCategory::Crit | OutcomeCategory::Vital)
    }

    /// Categories whose weight grows with the defender's scale
    pub fn favors_defender(self) -> bool {
        matches!(
            self,
            OutcomeCategory::Counter | OutcomeCategory::Dodge | OutcomeCategory::Block
        )
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutcomeCategory::Counter => "Counter",
            OutcomeCategory::Dodge => "Dodge",
            OutcomeCategory::Block => "Block",
            OutcomeCategory::Hit => "Hit",
            OutcomeCategory::Crit => "Crit",
            OutcomeCategory::Vital => "Vital",
            OutcomeCategory::Miss => "Miss",
        };
        f.write_str(name)
    }
}

/// A category together with the multiplier it resolved to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedOutcome {
    pub category: OutcomeCategory,
    pub multiplier: f64,
}

impl ResolvedOutcome {
    pub fn new(category: OutcomeCategory, multiplier: f64) -> Self {
        ResolvedOutcome {
            category,
            multiplier,
        }
    }

    /// Plain hit, used for non-resolved abilities and counter retaliation
    pub fn forced_hit() -> Self {
        ResolvedOutcome::new(OutcomeCategory::Hit, 1.0)
    }
}

/// `(attacker precision / defender precision) ^ 0.75`, clamped into
/// `[min, max]`
pub fn precision_ratio(attacker: &Combatant, defender: &Combatant, min: f64, max: f64) -> f64 {
    pow_ratio(
        attacker.effective_stat(StatKind::Precision),
        defender.effective_stat(StatKind::Precision),
    )
    .clamp(min, max)
}

/// Pluggable accuracy model
pub trait OutcomeResolver: Send + Sync + fmt::Debug {
    fn kind(&self) -> ResolverKind;

    /// Whether this model classifies abilities of `kind`; others resolve as a
    /// forced hit
    fn resolves(&self, kind: AbilityKind) -> bool;

    /// Damage multiplier of a category under this model
    fn multiplier(&self, category: OutcomeCategory) -> f64;

    /// Resolve without player input
    fn resolve(
        &self,
        attacker: &Combatant,
        defender: &Combatant,
        rng: &mut dyn RngCore,
    ) -> ResolvedOutcome;

    /// Timing challenge for a player-controlled action, if this model has one
    fn player_challenge(
        &self,
        attacker: &Combatant,
        defender: &Combatant,
        ability: &Ability,
    ) -> Option<RingChallenge>;

    /// Whether attack damage gets the uniform jitter
    fn applies_jitter(&self) -> bool;

    /// Whether buff durations scale with the outcome multiplier
    fn scales_buffs(&self) -> bool;
}

/// Build the resolver selected by the config
pub fn resolver_for(config: &BattleConfig) -> Box<dyn OutcomeResolver> {
    match config.resolver {
        ResolverKind::Weighted => Box::new(WeightedResolver::new(
            config.precision.clone(),
            config.outcome.clone(),
            config.guard.clone(),
        )),
        ResolverKind::Ring => Box::new(RingResolver::new(
            config.ring.clone(),
            config.guard.clone(),
        )),
    }
}
