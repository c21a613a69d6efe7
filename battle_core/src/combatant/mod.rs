//! Combatant - a battle-scoped instance of an entity template

mod roster;

pub use roster::Roster;

use crate::ability::{mp_cost, Ability};
use crate::config::{CostConstants, EntityTemplate, GuardConstants, LootEntry};
use crate::scheduler::Readiness;
use crate::stats::{apply_modifiers, derived_stat, GuardMultipliers, StatWeights};
use crate::status::{StatusKey, StatusRegistry};
use crate::types::{AbilityId, CombatantId, Resource, StatKind, Team};
use serde::{Deserialize, Serialize};

/// A resource mutation, reported for the bar animation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceChange {
    pub combatant: CombatantId,
    pub resource: Resource,
    pub from: f64,
    pub to: f64,
    pub capacity: f64,
}

impl ResourceChange {
    pub fn delta(&self) -> f64 {
        self.to - self.from
    }

    pub fn is_noop(&self) -> bool {
        (self.to - self.from).abs() < f64::EPSILON
    }
}

/// A combatant in an active battle
///
/// HP and MP are private so every mutation goes through the clamping
/// operations below and `0 <= current <= max` holds after each one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub level: u32,
    pub weights: StatWeights,
    pub abilities: Vec<AbilityId>,
    pub loot: Vec<LootEntry>,
    hp: f64,
    mp: f64,
    pub readiness: Readiness,
    pub statuses: StatusRegistry,
}

impl Combatant {
    /// Build a combatant at full HP and MP
    pub fn from_template(id: CombatantId, template: &EntityTemplate, level: Option<u32>) -> Self {
        let mut combatant = Combatant {
            id,
            name: template.name.clone(),
            level: level.unwrap_or(template.level),
            weights: template.weights.clone(),
            abilities: template.abilities.clone(),
            loot: template.loot.clone(),
            hp: 0.0,
            mp: 0.0,
            readiness: Readiness::default(),
            statuses: StatusRegistry::new(),
        };
        combatant.hp = combatant.max_hp();
        combatant.mp = combatant.max_mp();
        combatant
    }

    pub fn team(&self) -> Team {
        self.id.team
    }

    /// Stat from level and weight only
    pub fn derived_stat(&self, stat: StatKind) -> f64 {
        derived_stat(self.level, self.weights.get(stat))
    }

    /// Derived stat with every matching buff modifier applied
    pub fn effective_stat(&self, stat: StatKind) -> f64 {
        apply_modifiers(self.derived_stat(stat), self.statuses.modifiers_for(stat))
    }

    pub fn max_hp(&self) -> f64 {
        self.derived_stat(StatKind::Vitality)
    }

    pub fn max_mp(&self) -> f64 {
        self.derived_stat(StatKind::Vitality)
    }

    pub fn hp(&self) -> f64 {
        self.hp
    }

    pub fn mp(&self) -> f64 {
        self.mp
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn knows(&self, ability: &AbilityId) -> bool {
        self.abilities.contains(ability)
    }

    pub fn is_guarding(&self) -> bool {
        self.statuses.has_active(&StatusKey::Guard)
    }

    pub fn guard_multipliers(&self, constants: &GuardConstants) -> GuardMultipliers {
        GuardMultipliers::for_guarding(self.is_guarding(), constants)
    }

    /// MP this combatant pays for an ability
    pub fn mp_cost_of(&self, ability: &Ability, constants: &CostConstants) -> u32 {
        mp_cost(ability, self.derived_stat(StatKind::Vitality), constants)
    }

    pub fn can_afford(&self, ability: &Ability, constants: &CostConstants) -> bool {
        self.mp >= self.mp_cost_of(ability, constants) as f64
    }

    /// Lose HP, scaled by the guard multiplier and clamped at 0
    ///
    /// Dead combatants take no further damage.
    pub fn take_damage(&mut self, amount: f64, guard: &GuardConstants) -> ResourceChange {
        let before = self.hp;
        if self.is_alive() {
            let scaled = amount.max(0.0) * self.guard_multipliers(guard).damage_taken;
            self.hp = (self.hp - scaled).max(0.0);
        }
        self.change(Resource::Hp, before)
    }

    /// Gain HP up to max; dead combatants cannot be healed
    pub fn heal_hp(&mut self, amount: f64) -> ResourceChange {
        let before = self.hp;
        if self.is_alive() {
            self.hp = (self.hp + amount.max(0.0)).min(self.max_hp());
        }
        self.change(Resource::Hp, before)
    }

    /// Pay MP; returns `None` without mutating when there is not enough
    pub fn spend_mp(&mut self, amount: f64) -> Option<ResourceChange> {
        let amount = amount.max(0.0);
        if self.mp < amount {
            return None;
        }
        let before = self.mp;
        self.mp -= amount;
        Some(self.change(Resource::Mp, before))
    }

    pub fn restore_mp(&mut self, amount: f64) -> ResourceChange {
        let before = self.mp;
        if self.is_alive() {
            self.mp = (self.mp + amount.max(0.0)).min(self.max_mp());
        }
        self.change(Resource::Mp, before)
    }

    /// Turn-start regeneration: a percentage of max HP and MP, doubled while
    /// guarding
    pub fn apply_turn_regen(
        &mut self,
        percent: f64,
        guard: &GuardConstants,
    ) -> [ResourceChange; 2] {
        let regen = self.guard_multipliers(guard).regen;
        let hp_gain = self.max_hp() * percent * regen;
        let mp_gain = self.max_mp() * percent * regen;
        [self.heal_hp(hp_gain), self.restore_mp(mp_gain)]
    }

    fn change(&self, resource: Resource, before: f64) -> ResourceChange {
        let (to, capacity) = match resource {
            Resource::Hp => (self.hp, self.max_hp()),
            Resource::Mp => (self.mp, self.max_mp()),
        };
        ResourceChange {
            combatant: self.id,
            resource,
            from: before,
            to,
            capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::BuffModifier;

    fn template(level: u32, vitality: f64) -> EntityTemplate {
        EntityTemplate {
            name: "Tester".to_string(),
            level,
            weights: StatWeights::new().with(StatKind::Vitality, vitality),
            abilities: vec![AbilityId::from("attack")],
            loot: Vec::new(),
        }
    }

    #[test]
    fn test_starts_full() {
        // (10 * 2)² = 400
        let combatant = Combatant::from_template(CombatantId::player(0), &template(10, 1.0), None);
        assert!((combatant.hp() - 400.0).abs() < f64::EPSILON);
        assert!((combatant.mp() - 400.0).abs() < f64::EPSILON);
        assert!(combatant.is_alive());
    }

    #[test]
    fn test_level_override() {
        let combatant =
            Combatant::from_template(CombatantId::player(0), &template(10, 0.0), Some(3));
        assert_eq!(combatant.level, 3);
        assert!((combatant.max_hp() - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_damage_clamps_and_kills() {
        let guard = GuardConstants::default();
        let mut combatant =
            Combatant::from_template(CombatantId::enemy(0), &template(10, 0.0), None);
        let change = combatant.take_damage(30.0, &guard);
        assert!((change.delta() + 30.0).abs() < f64::EPSILON);

        let change = combatant.take_damage(500.0, &guard);
        assert!((change.to - 0.0).abs() < f64::EPSILON);
        assert!(!combatant.is_alive());

        // Dead stays dead
        assert!(combatant.heal_hp(50.0).is_noop());
        assert!(combatant.take_damage(10.0, &guard).is_noop());
    }

    #[test]
    fn test_guard_reduces_damage() {
        let guard = GuardConstants::default();
        let mut combatant =
            Combatant::from_template(CombatantId::enemy(0), &template(10, 0.0), None);
        combatant
            .statuses
            .add_or_extend_turns(StatusKey::Guard, "Defend", 1, "");
        assert!(combatant.is_guarding());

        combatant.take_damage(40.0, &guard);
        assert!((combatant.hp() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let guard = GuardConstants::default();
        let mut combatant =
            Combatant::from_template(CombatantId::player(0), &template(10, 0.0), None);
        combatant.take_damage(10.0, &guard);
        let change = combatant.heal_hp(1000.0);
        assert!((change.to - 100.0).abs() < f64::EPSILON);
        assert!((change.capacity - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_spend_mp_insufficient_is_untouched() {
        let mut combatant =
            Combatant::from_template(CombatantId::player(0), &template(2, 0.0), None);
        assert!(combatant.spend_mp(10.0).is_none());
        assert!((combatant.mp() - 4.0).abs() < f64::EPSILON);
        assert!(combatant.spend_mp(4.0).is_some());
        assert!((combatant.mp() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_turn_regen_doubles_while_guarding() {
        let guard = GuardConstants::default();
        let mut combatant =
            Combatant::from_template(CombatantId::player(0), &template(10, 0.0), None);
        combatant.take_damage(50.0, &guard);
        combatant.spend_mp(50.0);

        combatant.apply_turn_regen(0.01, &guard);
        assert!((combatant.hp() - 51.0).abs() < 1e-9);

        combatant
            .statuses
            .add_or_extend_turns(StatusKey::Guard, "Defend", 1, "");
        let [hp, mp] = combatant.apply_turn_regen(0.01, &guard);
        assert!((hp.delta() - 2.0).abs() < 1e-9);
        assert!((mp.delta() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_buff_raises_effective_stat_until_expiry() {
        let mut weights = StatWeights::new();
        weights.set(StatKind::Power, 0.0);
        let mut combatant =
            Combatant::from_template(CombatantId::player(0), &template(10, 0.0), None);
        combatant.weights = weights;
        assert!((combatant.effective_stat(StatKind::Power) - 100.0).abs() < 1e-9);

        combatant.statuses.add_or_extend_timed(
            StatusKey::buff("rally"),
            "Rally (Power +20%)",
            2.0,
            "",
            Some(BuffModifier {
                stat: StatKind::Power,
                multiplier: 1.2,
                label: "Power +20%".to_string(),
            }),
        );
        assert!((combatant.effective_stat(StatKind::Power) - 120.0).abs() < 1e-9);
        assert!((combatant.derived_stat(StatKind::Power) - 100.0).abs() < 1e-9);

        combatant.statuses.tick_timed(2.0);
        assert!((combatant.effective_stat(StatKind::Power) - 100.0).abs() < 1e-9);
    }
}
