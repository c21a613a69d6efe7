//! battle_core - Active-time battle core for a party-vs-enemies RPG
//!
//! This library provides:
//! - Stat model: derived attributes from level and weight multipliers
//! - Status registry: turn-counted guards and time-counted buffs
//! - Outcome resolution: weighted roll or player timing ring
//! - Ability effect pipeline: damage, healing, guard and buffs with counters
//! - ATB scheduler: threshold or timestamp readiness with deterministic ties
//! - Battle lifecycle: start, tick, player input, AI turns, end and rewards
//!
//! Every random draw of a battle goes through one seeded RNG, so a seed plus
//! the sequence of inputs reproduces a battle exactly.

pub mod ability;
pub mod battle;
pub mod combatant;
pub mod config;
pub mod effects;
pub mod error;
pub mod outcome;
pub mod prelude;
pub mod scheduler;
pub mod stats;
pub mod status;
pub mod types;

// Re-export core types for convenience
pub use ability::{Ability, AbilityKind, BuffModifier, Targeting};
pub use battle::{
    Battle, BattleEvent, BattleRewards, BattleSnapshot, BattleTickResult, PartyRecord, PartySlot,
};
pub use combatant::{Combatant, ResourceChange, Roster};
pub use config::{
    default_battle_config, default_templates, BattleConfig, ConfigError, ResolverKind,
    SchedulerKind, TemplateLibrary, TemplateSource,
};
pub use effects::{ActionReport, ActionSource, EffectValue};
pub use error::{BattleError, BattleResult};
pub use outcome::{OutcomeCategory, ResolvedOutcome, RingChallenge};
pub use scheduler::{BattlePhase, Readiness};
pub use stats::StatWeights;
pub use status::{StatusChange, StatusEffect, StatusKey, StatusRegistry};
pub use types::{AbilityId, CombatantId, ItemId, Resource, StatKind, Team};
