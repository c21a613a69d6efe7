//! Core identifiers and enums shared across the battle engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the battle a combatant fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    Player,
    Enemy,
}

impl Team {
    /// The team this one fights against
    pub fn opposing(self) -> Team {
        match self {
            Team::Player => Team::Enemy,
            Team::Enemy => Team::Player,
        }
    }
}

/// The four weighted attributes every combatant derives its stats from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Vitality,
    Power,
    Dexterity,
    Precision,
}

impl StatKind {
    /// Get all stat kinds
    pub fn all() -> &'static [StatKind] {
        &[
            StatKind::Vitality,
            StatKind::Power,
            StatKind::Dexterity,
            StatKind::Precision,
        ]
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatKind::Vitality => "Vitality",
            StatKind::Power => "Power",
            StatKind::Dexterity => "Dexterity",
            StatKind::Precision => "Precision",
        };
        f.write_str(name)
    }
}

/// Stable reference to a combatant: its team plus its slot in that party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId {
    pub team: Team,
    pub index: usize,
}

impl CombatantId {
    pub fn new(team: Team, index: usize) -> Self {
        CombatantId { team, index }
    }

    pub fn player(index: usize) -> Self {
        CombatantId::new(Team::Player, index)
    }

    pub fn enemy(index: usize) -> Self {
        CombatantId::new(Team::Enemy, index)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.team, self.index)
    }
}

/// Identifier for an ability definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityId(pub String);

impl From<&str> for AbilityId {
    fn from(s: &str) -> Self {
        AbilityId(s.to_string())
    }
}

impl From<String> for AbilityId {
    fn from(s: String) -> Self {
        AbilityId(s)
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier for an item definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId(s)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A combatant resource that the animation layer tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Hp,
    Mp,
}
