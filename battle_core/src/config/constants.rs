//! Balance constants injected at battle start

use super::ConfigError;
use crate::types::AbilityId;
use serde::{Deserialize, Serialize};

/// Which readiness model drives the ATB scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    /// Readiness gauge accrues at a per-combatant rate until it crosses a threshold
    #[default]
    Threshold,
    /// Each combatant holds an absolute next-ready time on the battle clock
    Timestamp,
}

/// Which accuracy model resolves action outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    /// Weighted categorical draw over counter/dodge/block/hit/crit/vital
    #[default]
    Weighted,
    /// Timed ring input classified into miss/hit/crit/vital bands
    Ring,
}

/// Tunable battle constants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub scheduler: SchedulerKind,
    pub resolver: ResolverKind,
    pub precision: PrecisionConstants,
    pub outcome: OutcomeWeights,
    pub ring: RingConstants,
    pub costs: CostConstants,
    pub damage: DamageConstants,
    pub guard: GuardConstants,
    pub timing: TimingConstants,
    pub rewards: RewardConstants,
    /// Ability used for counters, item turns and the AI's MP fallback
    pub basic_attack: BasicAttack,
}

/// Newtype so the basic attack id gets a sensible serde default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasicAttack(pub AbilityId);

impl Default for BasicAttack {
    fn default() -> Self {
        BasicAttack(AbilityId::from("attack"))
    }
}

impl BattleConfig {
    /// Config with the given scheduler and resolver and defaults elsewhere
    pub fn with_variants(scheduler: SchedulerKind, resolver: ResolverKind) -> Self {
        BattleConfig {
            scheduler,
            resolver,
            ..Default::default()
        }
    }

    pub fn basic_attack_id(&self) -> &AbilityId {
        &self.basic_attack.0
    }

    /// Check ranges that would otherwise produce NaN or runaway values
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("precision", self.precision.clamp_min, self.precision.clamp_max)?;
        check_range("ring", self.ring.clamp_min, self.ring.clamp_max)?;
        check_range("damage jitter", self.damage.jitter_min, self.damage.jitter_max)?;

        if self.ring.speed <= 0.0 {
            return Err(ConfigError::ValidationError(
                "ring.speed must be positive".to_string(),
            ));
        }
        if self.damage.power_divisor <= 0.0 {
            return Err(ConfigError::ValidationError(
                "damage.power_divisor must be positive".to_string(),
            ));
        }
        if self.costs.mp_vitality_scale <= 0.0 {
            return Err(ConfigError::ValidationError(
                "costs.mp_vitality_scale must be positive".to_string(),
            ));
        }
        if self.timing.ready_threshold <= 0.0
            || self.timing.readiness_cap < self.timing.ready_threshold
        {
            return Err(ConfigError::ValidationError(
                "timing.readiness_cap must be at least timing.ready_threshold".to_string(),
            ));
        }
        if self.timing.dex_ratio_floor <= 0.0 || self.timing.min_delay <= 0.0 {
            return Err(ConfigError::ValidationError(
                "timing.dex_ratio_floor and timing.min_delay must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.timing.initial_delay_fraction) {
            return Err(ConfigError::ValidationError(
                "timing.initial_delay_fraction must be within [0, 1]".to_string(),
            ));
        }
        if self.outcome.total() <= 0.0 || self.ring.enemy_baseline.total() <= 0.0 {
            return Err(ConfigError::ValidationError(
                "outcome weights must sum to a positive total".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_range(name: &str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min <= 0.0 || max < min {
        return Err(ConfigError::ValidationError(format!(
            "{name} clamp range [{min}, {max}] is invalid"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecisionConstants {
    /// Lower bound of the attacker/defender precision ratio
    pub clamp_min: f64,
    /// Upper bound of the attacker/defender precision ratio
    pub clamp_max: f64,
}

impl Default for PrecisionConstants {
    fn default() -> Self {
        PrecisionConstants {
            clamp_min: 0.25,
            clamp_max: 4.0,
        }
    }
}

/// Base weights of the six weighted outcome categories
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeWeights {
    pub counter: f64,
    pub dodge: f64,
    pub block: f64,
    pub hit: f64,
    pub crit: f64,
    pub vital: f64,
}

impl OutcomeWeights {
    pub fn total(&self) -> f64 {
        self.counter + self.dodge + self.block + self.hit + self.crit + self.vital
    }
}

impl Default for OutcomeWeights {
    fn default() -> Self {
        OutcomeWeights {
            counter: 5.0,
            dodge: 10.0,
            block: 20.0,
            hit: 35.0,
            crit: 20.0,
            vital: 10.0,
        }
    }
}

/// Miss/Hit/Crit/Vital table used by the ring variant
///
/// Tables are all-or-nothing in TOML: a partial table would otherwise mix in
/// values from the wrong preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingDistribution {
    pub miss: f64,
    pub hit: f64,
    pub crit: f64,
    pub vital: f64,
}

impl RingDistribution {
    pub fn total(&self) -> f64 {
        self.miss + self.hit + self.crit + self.vital
    }

    /// Damage multipliers for ring outcomes
    pub fn ring_multipliers() -> Self {
        RingDistribution {
            miss: 0.0,
            hit: 1.0,
            crit: 1.35,
            vital: 1.85,
        }
    }

    /// Outcome distribution for combatants that cannot press the ring
    pub fn enemy_baseline() -> Self {
        RingDistribution {
            miss: 0.10,
            hit: 0.75,
            crit: 0.12,
            vital: 0.03,
        }
    }
}

impl Default for RingDistribution {
    fn default() -> Self {
        Self::ring_multipliers()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConstants {
    /// Precision ratio clamp for the ring variant (narrower than the weighted one)
    pub clamp_min: f64,
    pub clamp_max: f64,
    /// Shrink speed of the moving ring, in radius units per second
    pub speed: f64,
    /// Radius of the dead center; pressing inside it is too late
    pub center_radius: f64,
    /// Vital and crit band widths at a precision ratio of 1.0
    pub vital_zone_width: f64,
    pub crit_zone_width: f64,
    pub vital_zone_min_width: f64,
    pub crit_zone_min_width: f64,
    /// Width of the outer hit band
    pub hit_zone_width: f64,
    /// Distance outside the hit band where the ring starts
    pub start_margin: f64,
    pub multipliers: RingDistribution,
    pub enemy_baseline: RingDistribution,
    /// How strongly the precision ratio skews the enemy baseline
    pub shift_strength: f64,
}

impl Default for RingConstants {
    fn default() -> Self {
        RingConstants {
            clamp_min: 0.60,
            clamp_max: 1.60,
            speed: 420.0,
            center_radius: 24.0,
            vital_zone_width: 16.0,
            crit_zone_width: 28.0,
            vital_zone_min_width: 10.0,
            crit_zone_min_width: 18.0,
            hit_zone_width: 60.0,
            start_margin: 120.0,
            multipliers: RingDistribution::ring_multipliers(),
            enemy_baseline: RingDistribution::enemy_baseline(),
            shift_strength: 0.22,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConstants {
    /// MP cost = base * (vitality / scale) ^ exponent
    pub mp_vitality_scale: f64,
    pub mp_vitality_exponent: f64,
    /// Whether the MP paid is added on top of damage and healing
    pub add_mp_cost_to_output: bool,
}

impl Default for CostConstants {
    fn default() -> Self {
        CostConstants {
            mp_vitality_scale: 10_000.0,
            mp_vitality_exponent: 0.50,
            add_mp_cost_to_output: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConstants {
    /// Base damage is effective power divided by this
    pub power_divisor: f64,
    /// Uniform jitter range applied to weighted-variant damage
    pub jitter_min: f64,
    pub jitter_max: f64,
}

impl Default for DamageConstants {
    fn default() -> Self {
        DamageConstants {
            power_divisor: 5.0,
            jitter_min: 0.8,
            jitter_max: 1.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConstants {
    pub damage_taken_multiplier: f64,
    pub regen_multiplier: f64,
    /// Extra scale on defender-favoring outcome weights while guarding
    pub defender_weight_scale: f64,
    pub turns: u32,
}

impl Default for GuardConstants {
    fn default() -> Self {
        GuardConstants {
            damage_taken_multiplier: 0.75,
            regen_multiplier: 2.0,
            defender_weight_scale: 2.0,
            turns: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConstants {
    /// Delay used to seed readiness at battle start
    pub baseline_delay: f64,
    /// Lower bound on the dexterity ratio
    pub dex_ratio_floor: f64,
    pub ready_threshold: f64,
    pub readiness_cap: f64,
    /// Shortest delay a rate can be derived from
    pub min_delay: f64,
    /// Fraction of the seeded delay before a combatant's first turn
    pub initial_delay_fraction: f64,
    /// HP/MP fraction restored at the start of each turn
    pub turn_regen_percent: f64,
    /// Timed buff duration at a vitality ratio of 1.0
    pub buff_base_duration: f64,
}

impl Default for TimingConstants {
    fn default() -> Self {
        TimingConstants {
            baseline_delay: 2.5,
            dex_ratio_floor: 0.15,
            ready_threshold: 100.0,
            readiness_cap: 150.0,
            min_delay: 0.1,
            initial_delay_fraction: 0.5,
            turn_regen_percent: 0.01,
            buff_base_duration: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConstants {
    /// Per-enemy XP = round((level_offset + level) ^ exponent)
    pub level_offset: f64,
    pub exponent: f64,
}

impl Default for RewardConstants {
    fn default() -> Self {
        RewardConstants {
            level_offset: 5.0,
            exponent: 1.5,
        }
    }
}
