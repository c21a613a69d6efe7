//! Effective stats - derived values with active buffs applied

use crate::config::GuardConstants;
use serde::{Deserialize, Serialize};

/// Apply buff multipliers on top of a derived stat
pub fn apply_modifiers(derived: f64, multipliers: impl IntoIterator<Item = f64>) -> f64 {
    multipliers.into_iter().fold(derived, |value, m| value * m)
}

/// Damage-taken and regen multipliers from the guard status
///
/// Kept apart from effective stats: guard never changes an attribute, it
/// only scales incoming damage and turn regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuardMultipliers {
    pub damage_taken: f64,
    pub regen: f64,
}

impl GuardMultipliers {
    /// Multipliers for a combatant that is not guarding
    pub fn neutral() -> Self {
        GuardMultipliers {
            damage_taken: 1.0,
            regen: 1.0,
        }
    }

    pub fn for_guarding(guarding: bool, constants: &GuardConstants) -> Self {
        if guarding {
            GuardMultipliers {
                damage_taken: constants.damage_taken_multiplier,
                regen: constants.regen_multiplier,
            }
        } else {
            Self::neutral()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_multiply() {
        assert!((apply_modifiers(100.0, [1.20]) - 120.0).abs() < 1e-9);
        assert!((apply_modifiers(100.0, [1.20, 1.25]) - 150.0).abs() < 1e-9);
        assert!((apply_modifiers(100.0, std::iter::empty()) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_guard_multipliers() {
        let constants = GuardConstants::default();
        let guarding = GuardMultipliers::for_guarding(true, &constants);
        assert!((guarding.damage_taken - 0.75).abs() < f64::EPSILON);
        assert!((guarding.regen - 2.0).abs() < f64::EPSILON);
        assert_eq!(
            GuardMultipliers::for_guarding(false, &constants),
            GuardMultipliers::neutral()
        );
    }
}
