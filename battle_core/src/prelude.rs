//! Prelude module for convenient imports
//!
//! ```rust
//! use battle_core::prelude::*;
//! ```

// Core types
pub use crate::types::{AbilityId, CombatantId, ItemId, Resource, StatKind, Team};
pub use crate::error::{BattleError, BattleResult};

// Battle
pub use crate::battle::{
    Battle, BattleEvent, BattleRewards, BattleSnapshot, BattleTickResult, PartyRecord, PartySlot,
};
pub use crate::scheduler::BattlePhase;

// Actions
pub use crate::ability::{Ability, AbilityKind, Targeting};
pub use crate::effects::{ActionReport, ActionSource, EffectValue};
pub use crate::outcome::OutcomeCategory;

// Config
pub use crate::config::{
    default_battle_config, default_templates, BattleConfig, ResolverKind, SchedulerKind,
    TemplateLibrary, TemplateSource,
};
