//! Ability definitions - immutable reference data looked up by id

mod cost;

pub use cost::mp_cost;

use crate::types::{AbilityId, StatKind, Team};
use serde::{Deserialize, Serialize};

/// What an ability does when it resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityKind {
    Attack,
    Defend,
    Heal,
    Buff,
    /// No runtime effect
    Passive,
}

/// Who an ability may be aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Targeting {
    EnemySingle,
    AllySingle,
    #[serde(rename = "self")]
    SelfOnly,
}

impl Targeting {
    /// The team whose members are valid targets for an actor on `actor_team`
    pub fn target_team(self, actor_team: Team) -> Team {
        match self {
            Targeting::EnemySingle => actor_team.opposing(),
            Targeting::AllySingle | Targeting::SelfOnly => actor_team,
        }
    }
}

/// Multiplicative stat modifier granted by a buff ability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuffModifier {
    pub stat: StatKind,
    /// Factor applied to the effective stat (1.20 = +20%)
    pub multiplier: f64,
    /// Short label baked into the status display name
    pub label: String,
}

/// Ability definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub id: AbilityId,
    pub name: String,
    pub kind: AbilityKind,
    pub targeting: Targeting,
    /// Scheduling cost in seconds
    pub base_delay: f64,
    /// Power multiplier applied to damage and healing
    #[serde(default = "default_mult")]
    pub mult: f64,
    #[serde(default)]
    pub base_mp_cost: f64,
    #[serde(default)]
    pub description: String,
    /// Stat modifier carried by the timed status of a buff
    #[serde(default)]
    pub modifier: Option<BuffModifier>,
}

fn default_mult() -> f64 {
    1.0
}

impl Ability {
    /// Name of the status this ability grants when it is a buff
    ///
    /// Derived from the ability itself so stacking keys never collide across
    /// abilities.
    pub fn buff_status_name(&self) -> String {
        match &self.modifier {
            Some(modifier) => format!("{} ({})", self.name, modifier.label),
            None => format!("{} (Buff)", self.name),
        }
    }

    pub fn is_passive(&self) -> bool {
        self.kind == AbilityKind::Passive
    }

    /// Basic attack used when no template data is at hand
    pub fn basic_attack() -> Self {
        Ability {
            id: AbilityId::from("attack"),
            name: "Attack".to_string(),
            kind: AbilityKind::Attack,
            targeting: Targeting::EnemySingle,
            base_delay: 2.5,
            mult: 1.0,
            base_mp_cost: 0.0,
            description: "Basic attack.".to_string(),
            modifier: None,
        }
    }
}
