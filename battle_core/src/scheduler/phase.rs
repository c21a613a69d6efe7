//! Battle phase state machine

use crate::outcome::RingChallenge;
use crate::types::{AbilityId, CombatantId};

/// What a frozen resolving turn is waiting on
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveStep {
    /// An AI-controlled combatant acts on the next tick
    AiAct,
    /// The player's timing ring is shrinking
    Ring(Box<RingChallenge>),
}

/// Scheduling state of a battle
///
/// Only `Free` advances the clock, readiness and timed statuses; every other
/// phase is a logical pause.
#[derive(Debug, Clone, PartialEq)]
pub enum BattlePhase {
    Free,
    PlayerChoosing {
        actor: CombatantId,
    },
    PlayerTargeting {
        actor: CombatantId,
        ability: AbilityId,
    },
    ActionResolving {
        actor: CombatantId,
        step: ResolveStep,
    },
    Ended {
        victory: bool,
    },
}

impl BattlePhase {
    pub fn name(&self) -> &'static str {
        match self {
            BattlePhase::Free => "free",
            BattlePhase::PlayerChoosing { .. } => "player choosing",
            BattlePhase::PlayerTargeting { .. } => "player targeting",
            BattlePhase::ActionResolving {
                step: ResolveStep::AiAct,
                ..
            } => "ai acting",
            BattlePhase::ActionResolving {
                step: ResolveStep::Ring(_),
                ..
            } => "ring timing",
            BattlePhase::Ended { .. } => "battle ended",
        }
    }

    /// Whether the simulation is paused for a turn
    pub fn is_frozen(&self) -> bool {
        !matches!(self, BattlePhase::Free)
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, BattlePhase::Ended { .. })
    }

    /// Combatant whose turn is in progress
    pub fn active_actor(&self) -> Option<CombatantId> {
        match self {
            BattlePhase::PlayerChoosing { actor }
            | BattlePhase::PlayerTargeting { actor, .. }
            | BattlePhase::ActionResolving { actor, .. } => Some(*actor),
            BattlePhase::Free | BattlePhase::Ended { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_free_runs() {
        assert!(!BattlePhase::Free.is_frozen());
        assert!(BattlePhase::PlayerChoosing {
            actor: CombatantId::player(0)
        }
        .is_frozen());
        assert!(BattlePhase::Ended { victory: true }.is_frozen());
    }

    #[test]
    fn test_active_actor() {
        let phase = BattlePhase::ActionResolving {
            actor: CombatantId::enemy(1),
            step: ResolveStep::AiAct,
        };
        assert_eq!(phase.active_actor(), Some(CombatantId::enemy(1)));
        assert_eq!(phase.name(), "ai acting");
        assert_eq!(BattlePhase::Free.active_actor(), None);
    }
}
