//! Stat model - derived attributes from level and weight multipliers

mod effective;

pub use effective::{apply_modifiers, GuardMultipliers};

use crate::types::StatKind;
use serde::{Deserialize, Serialize};

/// Exponent used by every attacker/defender stat ratio
pub const RATIO_EXPONENT: f64 = 0.75;

/// Per-stat weight multipliers of a combatant template
///
/// Missing stats weigh 0.0, which derives to `level²`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct StatWeights {
    pub vitality: f64,
    pub power: f64,
    pub dexterity: f64,
    pub precision: f64,
}

impl StatWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a weight; negative weights are stored as 0.0
    pub fn with(mut self, stat: StatKind, weight: f64) -> Self {
        self.set(stat, weight);
        self
    }

    pub fn set(&mut self, stat: StatKind, weight: f64) {
        *self.slot_mut(stat) = weight.max(0.0);
    }

    pub fn get(&self, stat: StatKind) -> f64 {
        self.raw(stat).max(0.0)
    }

    /// Stats whose configured weight is negative
    pub fn negative_entries(&self) -> Vec<StatKind> {
        StatKind::all()
            .iter()
            .copied()
            .filter(|stat| self.raw(*stat) < 0.0)
            .collect()
    }

    fn raw(&self, stat: StatKind) -> f64 {
        match stat {
            StatKind::Vitality => self.vitality,
            StatKind::Power => self.power,
            StatKind::Dexterity => self.dexterity,
            StatKind::Precision => self.precision,
        }
    }

    fn slot_mut(&mut self, stat: StatKind) -> &mut f64 {
        match stat {
            StatKind::Vitality => &mut self.vitality,
            StatKind::Power => &mut self.power,
            StatKind::Dexterity => &mut self.dexterity,
            StatKind::Precision => &mut self.precision,
        }
    }
}

/// `(level * (1 + weight))²`
pub fn derived_stat(level: u32, weight: f64) -> f64 {
    (level as f64 * (1.0 + weight.max(0.0))).powi(2)
}

/// Exponentiated stat ratio `(a / b) ^ 0.75`
///
/// A zero or negative denominator yields 1.0 rather than an error.
pub fn pow_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 || numerator <= 0.0 {
        return 1.0;
    }
    (numerator / denominator).powf(RATIO_EXPONENT)
}

/// Round to one decimal place
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_stat_formula() {
        // (10 * (1 + 1.0))² = 400
        assert!((derived_stat(10, 1.0) - 400.0).abs() < f64::EPSILON);
        // Missing weight: level²
        assert!((derived_stat(6, 0.0) - 36.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_weight_defaults_to_zero() {
        let weights = StatWeights::new().with(StatKind::Power, 1.05);
        assert!((weights.get(StatKind::Power) - 1.05).abs() < f64::EPSILON);
        assert!((weights.get(StatKind::Dexterity) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weights_parse_from_toml_table() {
        #[derive(Deserialize)]
        struct Wrapper {
            weights: StatWeights,
        }
        let toml = r#"
[weights]
Vitality = 1.1
Precision = 1.3
"#;
        let parsed: Wrapper = toml::from_str(toml).unwrap();
        assert!((parsed.weights.get(StatKind::Vitality) - 1.1).abs() < f64::EPSILON);
        assert!((parsed.weights.get(StatKind::Power) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_weight_detected() {
        let weights = StatWeights {
            power: -0.5,
            ..Default::default()
        };
        assert_eq!(weights.negative_entries(), vec![StatKind::Power]);
        assert!((weights.get(StatKind::Power) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pow_ratio_degenerate_inputs() {
        assert!((pow_ratio(100.0, 0.0) - 1.0).abs() < f64::EPSILON);
        assert!((pow_ratio(100.0, -5.0) - 1.0).abs() < f64::EPSILON);
        assert!((pow_ratio(100.0, 100.0) - 1.0).abs() < f64::EPSILON);
        // 16 ^ 0.75 = 8
        assert!((pow_ratio(1600.0, 100.0) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_tenths() {
        assert!((round_tenths(2.449) - 2.4).abs() < 1e-9);
        assert!((round_tenths(2.46) - 2.5).abs() < 1e-9);
    }
}
