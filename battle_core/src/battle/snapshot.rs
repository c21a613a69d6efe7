//! Read-only battle snapshot for rendering

use super::Battle;
use crate::types::{CombatantId, Team};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub name: String,
    pub description: String,
    pub remaining_turns: Option<u32>,
    pub remaining_seconds: Option<f64>,
    /// Remaining share of a timed status, 0-100
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub id: CombatantId,
    pub name: String,
    pub team: Team,
    pub level: u32,
    pub hp: f64,
    pub max_hp: f64,
    pub mp: f64,
    pub max_mp: f64,
    /// Progress toward the next turn in [0, 1]
    pub readiness: f64,
    pub alive: bool,
    pub statuses: Vec<StatusSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub clock: f64,
    pub phase: String,
    pub active: Option<CombatantId>,
    pub combatants: Vec<CombatantSnapshot>,
}

impl BattleSnapshot {
    pub fn combatant(&self, id: CombatantId) -> Option<&CombatantSnapshot> {
        self.combatants.iter().find(|c| c.id == id)
    }
}

impl Battle {
    /// Capture everything a renderer needs
    pub fn snapshot(&self) -> BattleSnapshot {
        let timing = &self.config.timing;
        let combatants = self
            .roster
            .iter()
            .map(|c| CombatantSnapshot {
                id: c.id,
                name: c.name.clone(),
                team: c.team(),
                level: c.level,
                hp: c.hp(),
                max_hp: c.max_hp(),
                mp: c.mp(),
                max_mp: c.max_mp(),
                readiness: self.scheduler.progress(&c.readiness, self.clock, timing),
                alive: c.is_alive(),
                statuses: c
                    .statuses
                    .iter()
                    .map(|s| StatusSnapshot {
                        name: s.name.clone(),
                        description: s.description.clone(),
                        remaining_turns: s.remaining_turns(),
                        remaining_seconds: s.remaining_seconds(),
                        percent: s.duration_percent(),
                    })
                    .collect(),
            })
            .collect();

        BattleSnapshot {
            clock: self.clock,
            phase: self.phase.name().to_string(),
            active: self.phase.active_actor(),
            combatants,
        }
    }
}
