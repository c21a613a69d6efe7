//! Battle events for the presentation layer

use super::rewards::BattleRewards;
use crate::combatant::ResourceChange;
use crate::effects::ActionReport;
use crate::status::StatusChange;
use crate::types::{AbilityId, CombatantId};
use serde::{Deserialize, Serialize};

/// Something the presentation layer may want to render or log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    BattleStarted {
        players: Vec<String>,
        enemies: Vec<String>,
    },
    TurnStarted {
        actor: CombatantId,
        clock: f64,
    },
    ActionResolved(ActionReport),
    /// HP or MP moved; drives the lag-bar animation
    ResourceChanged(ResourceChange),
    StatusApplied {
        combatant: CombatantId,
        status: String,
        change: StatusChange,
    },
    StatusExpired {
        combatant: CombatantId,
        status: String,
    },
    InsufficientMp {
        combatant: CombatantId,
        ability: AbilityId,
        needed: u32,
        available: f64,
    },
    BattleEnded {
        victory: bool,
        rewards: BattleRewards,
    },
}

impl BattleEvent {
    /// Log line, for events that have one
    pub fn log_line(&self) -> Option<String> {
        match self {
            BattleEvent::BattleStarted { enemies, .. } => {
                Some(format!("Battle started vs {}", enemies.join(", ")))
            }
            BattleEvent::ActionResolved(report) => Some(report.summary()),
            BattleEvent::StatusExpired { status, .. } => Some(format!("{status} wore off")),
            BattleEvent::InsufficientMp { needed, available, .. } => Some(format!(
                "Not enough MP! (needs {needed}, has {available:.0})"
            )),
            BattleEvent::BattleEnded { rewards, .. } => Some(rewards.summary()),
            BattleEvent::TurnStarted { .. }
            | BattleEvent::ResourceChanged(_)
            | BattleEvent::StatusApplied { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_lines() {
        let started = BattleEvent::BattleStarted {
            players: vec!["Hero".to_string()],
            enemies: vec!["Goblin".to_string(), "Green Slime".to_string()],
        };
        assert_eq!(
            started.log_line().as_deref(),
            Some("Battle started vs Goblin, Green Slime")
        );

        let turn = BattleEvent::TurnStarted {
            actor: CombatantId::player(0),
            clock: 1.5,
        };
        assert!(turn.log_line().is_none());
    }

    #[test]
    fn test_serializes_with_tag() {
        let event = BattleEvent::StatusExpired {
            combatant: CombatantId::enemy(0),
            status: "Defend".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "status_expired");
        assert_eq!(json["status"], "Defend");
    }
}
