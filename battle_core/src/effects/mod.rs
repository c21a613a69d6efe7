//! Ability effect pipeline - turns a resolved outcome into resource and
//! status mutations

mod pipeline;

pub use pipeline::{
    apply_ability, attack_damage, buff_duration, finalize_damage, heal_amount,
    resolve_with_counter,
};

use crate::ability::Ability;
use crate::combatant::Combatant;
use crate::config::{BattleConfig, TemplateSource};
use crate::outcome::{OutcomeCategory, ResolvedOutcome};
use crate::types::{AbilityId, CombatantId, ItemId, Resource};
use serde::{Deserialize, Serialize};

/// Whether a counter outcome may trigger a retaliation
///
/// Retaliations themselves always run with `Suppress`, so a counter can never
/// chain into another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterPolicy {
    Allow,
    Suppress,
}

/// Shared inputs of the pipeline
pub struct EffectContext<'a> {
    pub config: &'a BattleConfig,
    pub templates: &'a dyn TemplateSource,
    /// Apply uniform jitter to attack damage
    pub jitter: bool,
    /// Scale buff durations by the outcome multiplier
    pub scale_buffs: bool,
}

/// What performed an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionSource {
    Ability { id: AbilityId, name: String },
    Item { id: ItemId, name: String },
}

impl ActionSource {
    pub fn name(&self) -> &str {
        match self {
            ActionSource::Ability { name, .. } | ActionSource::Item { name, .. } => name,
        }
    }

    pub fn ability_id(&self) -> Option<&AbilityId> {
        match self {
            ActionSource::Ability { id, .. } => Some(id),
            ActionSource::Item { .. } => None,
        }
    }
}

/// Numeric effect of an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectValue {
    /// HP damage before the target's guard multiplier
    Damage { amount: f64 },
    Healing { amount: f64 },
    /// Item restoration of HP or MP
    Restore { resource: Resource, amount: f64 },
    Guard { turns: u32 },
    Buff { status: String, seconds: f64 },
    /// Passive abilities and items without an effect
    Nothing,
}

/// Everything the presentation layer needs to render one action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    pub actor: CombatantId,
    pub actor_name: String,
    pub target: CombatantId,
    pub target_name: String,
    pub source: ActionSource,
    pub outcome: OutcomeCategory,
    pub multiplier: f64,
    pub value: EffectValue,
    pub mp_spent: u32,
    /// This action is a counter retaliation
    pub is_counter: bool,
    pub target_defeated: bool,
}

impl ActionReport {
    pub fn for_ability(
        caster: &Combatant,
        target: &Combatant,
        ability: &Ability,
        outcome: ResolvedOutcome,
    ) -> Self {
        ActionReport {
            actor: caster.id,
            actor_name: caster.name.clone(),
            target: target.id,
            target_name: target.name.clone(),
            source: ActionSource::Ability {
                id: ability.id.clone(),
                name: ability.name.clone(),
            },
            outcome: outcome.category,
            multiplier: outcome.multiplier,
            value: EffectValue::Nothing,
            mp_spent: 0,
            is_counter: false,
            target_defeated: !target.is_alive(),
        }
    }

    pub fn is_crit_or_vital(&self) -> bool {
        self.outcome.is_crit_or_vital()
    }

    /// Headline number: damage, healing, restoration or buff seconds
    pub fn numeric_result(&self) -> f64 {
        match &self.value {
            EffectValue::Damage { amount }
            | EffectValue::Healing { amount }
            | EffectValue::Restore { amount, .. } => *amount,
            EffectValue::Buff { seconds, .. } => *seconds,
            EffectValue::Guard { turns } => *turns as f64,
            EffectValue::Nothing => 0.0,
        }
    }

    /// One log line
    pub fn summary(&self) -> String {
        let prefix = if self.is_counter { "Counter! " } else { "" };
        let detail = match &self.value {
            EffectValue::Damage { amount } => {
                format!("{} for {:.0} dmg", self.outcome, amount)
            }
            EffectValue::Healing { amount } => format!("healed {:.0} HP", amount),
            EffectValue::Restore { resource, amount } => {
                let label = match resource {
                    Resource::Hp => "HP",
                    Resource::Mp => "MP",
                };
                format!("restored {:.0} {}", amount, label)
            }
            EffectValue::Guard { turns } => format!("defending for {} turn(s)", turns),
            EffectValue::Buff { status, seconds } => format!("{} for {:.1}s", status, seconds),
            EffectValue::Nothing => "no effect".to_string(),
        };
        let mut line = format!(
            "{}{} used {} on {}: {}",
            prefix,
            self.actor_name,
            self.source.name(),
            self.target_name,
            detail
        );
        if self.target_defeated {
            line.push_str(" (defeated)");
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(value: EffectValue) -> ActionReport {
        ActionReport {
            actor: CombatantId::player(0),
            actor_name: "Hero".to_string(),
            target: CombatantId::enemy(0),
            target_name: "Goblin".to_string(),
            source: ActionSource::Ability {
                id: AbilityId::from("attack"),
                name: "Attack".to_string(),
            },
            outcome: OutcomeCategory::Crit,
            multiplier: 1.5,
            value,
            mp_spent: 0,
            is_counter: false,
            target_defeated: false,
        }
    }

    #[test]
    fn test_summary_lines() {
        let damage = report(EffectValue::Damage { amount: 31.0 });
        assert_eq!(damage.summary(), "Hero used Attack on Goblin: Crit for 31 dmg");
        assert!(damage.is_crit_or_vital());
        assert!((damage.numeric_result() - 31.0).abs() < f64::EPSILON);

        let mut counter = report(EffectValue::Damage { amount: 12.0 });
        counter.is_counter = true;
        counter.target_defeated = true;
        assert!(counter.summary().starts_with("Counter! "));
        assert!(counter.summary().ends_with("(defeated)"));
    }

    #[test]
    fn test_source_accessors() {
        let source = ActionSource::Item {
            id: ItemId::from("potion"),
            name: "Potion".to_string(),
        };
        assert_eq!(source.name(), "Potion");
        assert!(source.ability_id().is_none());
    }
}
