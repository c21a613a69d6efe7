//! Battle error taxonomy

use crate::types::{AbilityId, CombatantId, ItemId};
use thiserror::Error;

/// Errors raised by battle operations
///
/// Invalid references are fatal to the requesting operation: they mean the
/// template data is inconsistent. Everything else is recoverable and the
/// caller is expected to react (re-prompt, fall back, re-check battle end).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BattleError {
    #[error("Unknown entity template: {0}")]
    UnknownEntity(String),
    #[error("Unknown ability: {0}")]
    UnknownAbility(AbilityId),
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    #[error("Not enough MP: needs {needed}, has {available:.0}")]
    InsufficientMp { needed: u32, available: f64 },
    #[error("No valid target")]
    NoValidTarget,
    #[error("Invalid target: {0}")]
    InvalidTarget(CombatantId),
    #[error("{actor} does not know ability {ability}")]
    AbilityNotKnown { actor: CombatantId, ability: AbilityId },
    #[error("Item not in inventory: {0}")]
    ItemUnavailable(ItemId),

    #[error("Operation not valid while {phase}")]
    InvalidPhase { phase: &'static str },
    #[error("Battle is over")]
    BattleOver,
}

impl BattleError {
    /// Whether the caller can react to this error and keep the battle going
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            BattleError::UnknownEntity(_)
                | BattleError::UnknownAbility(_)
                | BattleError::UnknownItem(_)
        )
    }
}

pub type BattleResult<T> = std::result::Result<T, BattleError>;
