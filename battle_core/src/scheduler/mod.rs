//! ATB scheduler - readiness accrual, actor selection and the battle phase machine
//!
//! Two readiness models are supported behind [`ReadinessStrategy`]:
//! - Threshold: a gauge fills at a per-combatant rate and the combatant acts
//!   once it crosses the ready threshold
//! - Timestamp: each combatant holds an absolute next-ready time on the
//!   battle clock
//!
//! Both derive their delays the same way: `round_tenths(base / dexRatio)`
//! where `dexRatio = (dex / referenceDex) ^ 0.75`, floored to stop runaway
//! acceleration.

mod phase;
mod threshold;
mod timestamp;

pub use phase::{BattlePhase, ResolveStep};
pub use threshold::ThresholdReadiness;
pub use timestamp::TimestampReadiness;

use crate::config::{SchedulerKind, TimingConstants};
use crate::stats::{pow_ratio, round_tenths};
use crate::types::CombatantId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Per-combatant scheduling state
///
/// Both models keep every field current so snapshots look the same either
/// way; only the fields a model reads drive its decisions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Readiness {
    /// Threshold model accumulator
    pub gauge: f64,
    /// Gauge gained per second
    pub rate: f64,
    /// Clock value when the current wait began
    pub scheduled_at: f64,
    /// Clock value of the next turn
    pub next_ready_at: f64,
}

/// Pluggable readiness model
pub trait ReadinessStrategy: Send + Sync + fmt::Debug {
    fn kind(&self) -> SchedulerKind;

    /// Initialize a combatant so its first turn lands a fraction of `delay`
    /// into the battle
    fn seed(&self, readiness: &mut Readiness, delay: f64, timing: &TimingConstants);

    /// Accrue readiness over `dt` seconds; `clock` is the already advanced time
    fn advance(&self, readiness: &mut Readiness, dt: f64, clock: f64, timing: &TimingConstants);

    fn is_ready(&self, readiness: &Readiness, clock: f64, timing: &TimingConstants) -> bool;

    /// Ordering key among simultaneously ready combatants; higher goes first
    fn priority(&self, readiness: &Readiness) -> f64;

    /// Called when the combatant's turn begins
    fn on_turn_start(&self, readiness: &mut Readiness, timing: &TimingConstants);

    /// Reset after an action, waiting `delay` seconds from `clock`
    fn schedule(&self, readiness: &mut Readiness, clock: f64, delay: f64, timing: &TimingConstants);

    /// Progress toward the next turn in [0, 1], for display
    fn progress(&self, readiness: &Readiness, clock: f64, timing: &TimingConstants) -> f64;
}

/// Build the strategy for a configured scheduler kind
pub fn strategy_for(kind: SchedulerKind) -> Box<dyn ReadinessStrategy> {
    match kind {
        SchedulerKind::Threshold => Box::new(ThresholdReadiness),
        SchedulerKind::Timestamp => Box::new(TimestampReadiness),
    }
}

/// Exponentiated dexterity ratio, floored
pub fn dex_ratio(actor_dexterity: f64, reference_dexterity: f64, timing: &TimingConstants) -> f64 {
    pow_ratio(actor_dexterity, reference_dexterity).max(timing.dex_ratio_floor)
}

/// Delay in seconds before the next turn, rounded to a tenth
///
/// Never shorter than `min_delay`, so a zero-delay ability cannot pin the
/// clock.
pub fn action_delay(base_delay: f64, dex_ratio: f64, timing: &TimingConstants) -> f64 {
    let ratio = dex_ratio.max(timing.dex_ratio_floor);
    round_tenths(base_delay.max(0.0) / ratio).max(timing.min_delay)
}

/// A ready combatant competing for the next turn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadyCandidate {
    pub id: CombatantId,
    pub priority: f64,
    pub dexterity: f64,
}

/// Pick the next actor among ready candidates
///
/// Higher priority first, then higher effective dexterity, then party slot
/// order (players before enemies, lower index first).
pub fn select_next_actor(candidates: &[ReadyCandidate]) -> Option<CombatantId> {
    candidates
        .iter()
        .min_by(|a, b| {
            b.priority
                .partial_cmp(&a.priority)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    b.dexterity
                        .partial_cmp(&a.dexterity)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|c| c.id)
}
