//! Roster - both parties of a battle, indexed by CombatantId

use super::Combatant;
use crate::types::{CombatantId, StatKind, Team};

/// The two parties; slot order is stable for the whole battle
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: Vec<Combatant>,
    enemies: Vec<Combatant>,
}

impl Roster {
    pub fn new(players: Vec<Combatant>, enemies: Vec<Combatant>) -> Self {
        Roster { players, enemies }
    }

    pub fn party(&self, team: Team) -> &[Combatant] {
        match team {
            Team::Player => &self.players,
            Team::Enemy => &self.enemies,
        }
    }

    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.party(id.team).get(id.index)
    }

    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        match id.team {
            Team::Player => self.players.get_mut(id.index),
            Team::Enemy => self.enemies.get_mut(id.index),
        }
    }

    /// Every combatant, players first
    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.players.iter().chain(self.enemies.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.players.iter_mut().chain(self.enemies.iter_mut())
    }

    /// Ids of living members of a team, in slot order
    pub fn living(&self, team: Team) -> Vec<CombatantId> {
        self.party(team)
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| c.id)
            .collect()
    }

    pub fn is_defeated(&self, team: Team) -> bool {
        self.party(team).iter().all(|c| !c.is_alive())
    }

    /// Winner, if one side has been wiped out
    ///
    /// Checked enemies first, so a simultaneous wipe counts as a victory.
    pub fn decided(&self) -> Option<bool> {
        if self.is_defeated(Team::Enemy) {
            Some(true)
        } else if self.is_defeated(Team::Player) {
            Some(false)
        } else {
            None
        }
    }

    /// Mean effective stat of a team's living members
    ///
    /// An empty team averages to 1.0 so ratios against it stay neutral.
    pub fn average_effective(&self, team: Team, stat: StatKind) -> f64 {
        let values: Vec<f64> = self
            .party(team)
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| c.effective_stat(stat))
            .collect();
        if values.is_empty() {
            return 1.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }
}
