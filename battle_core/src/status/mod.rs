//! Status registry - turn-counted and time-counted effects on a combatant

mod active;
pub mod tick;

pub use active::{StatusDuration, StatusEffect};
pub use tick::StatusTickResult;

use crate::ability::BuffModifier;
use crate::types::{AbilityId, StatKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stacking key of a status
///
/// Display names are free text; stacking and stat lookups go through this
/// key so two abilities never share an entry by accident.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "ability", rename_all = "snake_case")]
pub enum StatusKey {
    /// One-turn guard granted by a defend ability
    Guard,
    /// Timed buff granted by the named ability
    Buff(AbilityId),
}

impl StatusKey {
    pub fn buff(ability: impl Into<AbilityId>) -> Self {
        StatusKey::Buff(ability.into())
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKey::Guard => f.write_str("guard"),
            StatusKey::Buff(id) => write!(f, "buff:{id}"),
        }
    }
}

/// Whether an add call created a new entry or extended an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusChange {
    Applied,
    Extended,
}

/// Ordered statuses of one combatant
///
/// Insertion order is kept for display; no rule depends on it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusRegistry {
    effects: Vec<StatusEffect>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add turns to an active turn-counted status, or append a new one
    ///
    /// There is no stacking cap.
    pub fn add_or_extend_turns(
        &mut self,
        key: StatusKey,
        name: &str,
        turns: u32,
        description: &str,
    ) -> StatusChange {
        let existing = self
            .effects
            .iter_mut()
            .find(|s| s.key == key && !s.is_timed() && s.is_active());

        let change = match existing {
            Some(status) => {
                if let StatusDuration::Turns { remaining } = &mut status.duration {
                    *remaining += turns;
                }
                StatusChange::Extended
            }
            None => {
                self.effects
                    .push(StatusEffect::turns(key, name, turns, description));
                StatusChange::Applied
            }
        };
        self.purge_expired();
        change
    }

    /// Extend an active timed status, or append a new one
    ///
    /// Extension grows both remaining and maximum duration so the
    /// percentage-of-max stays meaningful.
    pub fn add_or_extend_timed(
        &mut self,
        key: StatusKey,
        name: &str,
        seconds: f64,
        description: &str,
        modifier: Option<BuffModifier>,
    ) -> StatusChange {
        let seconds = seconds.max(0.0);
        let existing = self
            .effects
            .iter_mut()
            .find(|s| s.key == key && s.is_timed() && s.is_active());

        let change = match existing {
            Some(status) => {
                if let StatusDuration::Timed { remaining, max } = &mut status.duration {
                    *remaining += seconds;
                    *max += seconds;
                }
                StatusChange::Extended
            }
            None => {
                self.effects
                    .push(StatusEffect::timed(key, name, seconds, description, modifier));
                StatusChange::Applied
            }
        };
        self.purge_expired();
        change
    }

    /// Take one turn off a turn-counted status, purging it at zero
    ///
    /// Returns the expired status, if this call ended it.
    pub fn decrement_turns(&mut self, key: &StatusKey) -> Option<StatusEffect> {
        let position = self
            .effects
            .iter()
            .position(|s| &s.key == key && !s.is_timed() && s.is_active())?;

        let status = &mut self.effects[position];
        if let StatusDuration::Turns { remaining } = &mut status.duration {
            *remaining = remaining.saturating_sub(1);
        }
        if status.is_active() {
            None
        } else {
            Some(self.effects.remove(position))
        }
    }

    /// Whether an active entry with this key exists
    pub fn has_active(&self, key: &StatusKey) -> bool {
        self.effects.iter().any(|s| &s.key == key && s.is_active())
    }

    /// Whether an active entry with this exact display name exists
    pub fn has_active_named(&self, name: &str) -> bool {
        self.effects.iter().any(|s| s.name == name && s.is_active())
    }

    pub fn get(&self, key: &StatusKey) -> Option<&StatusEffect> {
        self.effects.iter().find(|s| &s.key == key && s.is_active())
    }

    /// Multipliers of every active status that modifies `stat`
    pub fn modifiers_for(&self, stat: StatKind) -> impl Iterator<Item = f64> + '_ {
        self.effects
            .iter()
            .filter(|s| s.is_active())
            .filter_map(|s| s.modifier.as_ref())
            .filter(move |m| m.stat == stat)
            .map(|m| m.multiplier)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Drop every status
    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Remove expired entries, returning them
    pub fn purge_expired(&mut self) -> Vec<StatusEffect> {
        let (active, expired): (Vec<_>, Vec<_>) =
            self.effects.drain(..).partition(|s| s.is_active());
        self.effects = active;
        expired
    }

    pub(crate) fn effects_mut(&mut self) -> &mut Vec<StatusEffect> {
        &mut self.effects
    }
}
