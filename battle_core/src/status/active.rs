//! StatusEffect - a single status instance on a combatant

use super::StatusKey;
use crate::ability::BuffModifier;
use serde::{Deserialize, Serialize};

/// How a status counts down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusDuration {
    /// Decremented once per completed action of the holder
    Turns { remaining: u32 },
    /// Decays with elapsed battle time while the scheduler runs
    Timed { remaining: f64, max: f64 },
}

/// An active status on a combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Stacking key
    pub key: StatusKey,
    /// Display name
    pub name: String,
    pub duration: StatusDuration,
    pub description: String,
    /// Stat modifier applied while active
    pub modifier: Option<BuffModifier>,
}

impl StatusEffect {
    pub fn turns(
        key: StatusKey,
        name: impl Into<String>,
        turns: u32,
        description: impl Into<String>,
    ) -> Self {
        StatusEffect {
            key,
            name: name.into(),
            duration: StatusDuration::Turns { remaining: turns },
            description: description.into(),
            modifier: None,
        }
    }

    pub fn timed(
        key: StatusKey,
        name: impl Into<String>,
        seconds: f64,
        description: impl Into<String>,
        modifier: Option<BuffModifier>,
    ) -> Self {
        StatusEffect {
            key,
            name: name.into(),
            duration: StatusDuration::Timed {
                remaining: seconds,
                max: seconds,
            },
            description: description.into(),
            modifier,
        }
    }

    pub fn is_timed(&self) -> bool {
        matches!(self.duration, StatusDuration::Timed { .. })
    }

    /// Still has turns or seconds left
    pub fn is_active(&self) -> bool {
        match self.duration {
            StatusDuration::Turns { remaining } => remaining > 0,
            StatusDuration::Timed { remaining, .. } => remaining > 0.0,
        }
    }

    /// Remaining turns, for turn-counted statuses
    pub fn remaining_turns(&self) -> Option<u32> {
        match self.duration {
            StatusDuration::Turns { remaining } => Some(remaining),
            StatusDuration::Timed { .. } => None,
        }
    }

    /// Remaining seconds, for timed statuses
    pub fn remaining_seconds(&self) -> Option<f64> {
        match self.duration {
            StatusDuration::Timed { remaining, .. } => Some(remaining),
            StatusDuration::Turns { .. } => None,
        }
    }

    /// Get percentage of duration remaining (timed statuses only)
    pub fn duration_percent(&self) -> Option<f64> {
        match self.duration {
            StatusDuration::Timed { remaining, max } if max > 0.0 => {
                Some((remaining / max * 100.0).clamp(0.0, 100.0))
            }
            StatusDuration::Timed { .. } => Some(0.0),
            StatusDuration::Turns { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_status_activity() {
        let active = StatusEffect::turns(StatusKey::Guard, "Defend", 1, "");
        assert!(active.is_active());
        assert!(!active.is_timed());
        assert_eq!(active.remaining_turns(), Some(1));
        assert_eq!(active.remaining_seconds(), None);

        let spent = StatusEffect::turns(StatusKey::Guard, "Defend", 0, "");
        assert!(!spent.is_active());
    }

    #[test]
    fn test_timed_status_percent() {
        let mut buff = StatusEffect::timed(StatusKey::buff("rally"), "Rally", 6.0, "", None);
        buff.duration = StatusDuration::Timed {
            remaining: 1.5,
            max: 6.0,
        };
        assert!((buff.duration_percent().unwrap() - 25.0).abs() < 1e-9);
        assert!(buff.is_timed());
    }
}
