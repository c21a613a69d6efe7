//! Template data - entities, abilities and items looked up by id

use super::ConfigError;
use crate::ability::Ability;
use crate::error::{BattleError, BattleResult};
use crate::stats::StatWeights;
use crate::types::{AbilityId, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Read access to template data
///
/// Unknown ids are data-integrity bugs and fail fast.
pub trait TemplateSource: Send + Sync {
    fn entity(&self, name: &str) -> BattleResult<&EntityTemplate>;
    fn ability(&self, id: &AbilityId) -> BattleResult<&Ability>;
    fn item(&self, id: &ItemId) -> BattleResult<&ItemDefinition>;
}

/// One entry of a loot table, rolled independently of the others
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item: ItemId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub numerator: u32,
    pub denominator: u32,
}

fn default_quantity() -> u32 {
    1
}

impl LootEntry {
    /// Drop chance in [0, 1]; a zero denominator never drops
    pub fn chance(&self) -> f64 {
        if self.denominator == 0 {
            return 0.0;
        }
        self.numerator as f64 / self.denominator as f64
    }
}

/// Persistent template a combatant is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTemplate {
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub weights: StatWeights,
    #[serde(default)]
    pub abilities: Vec<AbilityId>,
    #[serde(default)]
    pub loot: Vec<LootEntry>,
}

fn default_level() -> u32 {
    1
}

/// What using an item does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemEffect {
    /// Restore a fraction of max HP
    RestoreHp { fraction: f64 },
    /// Restore a fraction of max MP
    RestoreMp { fraction: f64 },
}

/// Item definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub value: u32,
    #[serde(default = "default_tier")]
    pub tier: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub effect: Option<ItemEffect>,
}

fn default_tier() -> u32 {
    1
}

/// Raw file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TemplatesFile {
    #[serde(default)]
    entities: Vec<EntityTemplate>,
    #[serde(default)]
    abilities: Vec<Ability>,
    #[serde(default)]
    items: Vec<ItemDefinition>,
    #[serde(default)]
    encounters: Vec<Encounter>,
}

/// Named enemy party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub name: String,
    pub enemies: Vec<String>,
}

/// In-memory template store
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    entities: HashMap<String, EntityTemplate>,
    abilities: HashMap<AbilityId, Ability>,
    items: HashMap<ItemId, ItemDefinition>,
    encounters: Vec<Encounter>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_entity(&mut self, entity: EntityTemplate) {
        self.entities.insert(entity.name.clone(), entity);
    }

    pub fn insert_ability(&mut self, ability: Ability) {
        self.abilities.insert(ability.id.clone(), ability);
    }

    pub fn insert_item(&mut self, item: ItemDefinition) {
        self.items.insert(item.id.clone(), item);
    }

    pub fn insert_encounter(&mut self, encounter: Encounter) {
        self.encounters.push(encounter);
    }

    pub fn encounters(&self) -> &[Encounter] {
        &self.encounters
    }

    /// Check every cross reference so missing data surfaces at load time
    pub fn validate(&self) -> Result<(), ConfigError> {
        for entity in self.entities.values() {
            if entity.level == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "entity {} has level 0",
                    entity.name
                )));
            }
            if let Some(stat) = entity.weights.negative_entries().first() {
                return Err(ConfigError::ValidationError(format!(
                    "entity {} has a negative {stat} weight",
                    entity.name
                )));
            }
            for ability in &entity.abilities {
                if !self.abilities.contains_key(ability) {
                    return Err(ConfigError::ValidationError(format!(
                        "entity {} references unknown ability {ability}",
                        entity.name
                    )));
                }
            }
            for entry in &entity.loot {
                if !self.items.contains_key(&entry.item) {
                    return Err(ConfigError::ValidationError(format!(
                        "entity {} drops unknown item {}",
                        entity.name, entry.item
                    )));
                }
            }
        }
        for encounter in &self.encounters {
            for enemy in &encounter.enemies {
                if !self.entities.contains_key(enemy) {
                    return Err(ConfigError::ValidationError(format!(
                        "encounter {} references unknown entity {enemy}",
                        encounter.name
                    )));
                }
            }
        }
        Ok(())
    }

    fn from_file(file: TemplatesFile) -> Result<Self, ConfigError> {
        let mut library = TemplateLibrary::new();
        for ability in file.abilities {
            library.insert_ability(ability);
        }
        for item in file.items {
            library.insert_item(item);
        }
        for entity in file.entities {
            library.insert_entity(entity);
        }
        for encounter in file.encounters {
            library.insert_encounter(encounter);
        }
        library.validate()?;
        Ok(library)
    }
}

impl TemplateSource for TemplateLibrary {
    fn entity(&self, name: &str) -> BattleResult<&EntityTemplate> {
        self.entities
            .get(name)
            .ok_or_else(|| BattleError::UnknownEntity(name.to_string()))
    }

    fn ability(&self, id: &AbilityId) -> BattleResult<&Ability> {
        self.abilities
            .get(id)
            .ok_or_else(|| BattleError::UnknownAbility(id.clone()))
    }

    fn item(&self, id: &ItemId) -> BattleResult<&ItemDefinition> {
        self.items
            .get(id)
            .ok_or_else(|| BattleError::UnknownItem(id.clone()))
    }
}

/// Load template data from a TOML file
pub fn load_templates(path: &Path) -> Result<TemplateLibrary, ConfigError> {
    let file: TemplatesFile = super::load_toml(path)?;
    TemplateLibrary::from_file(file)
}

/// Load template data from a TOML string
pub fn parse_templates(content: &str) -> Result<TemplateLibrary, ConfigError> {
    let file: TemplatesFile = super::parse_toml(content)?;
    TemplateLibrary::from_file(file)
}

/// Default template data shipped with the crate
pub fn default_templates() -> TemplateLibrary {
    let toml = include_str!("../../config/templates.toml");
    parse_templates(toml).unwrap_or_else(|_| {
        let mut library = TemplateLibrary::new();
        library.insert_ability(Ability::basic_attack());
        library
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilityKind;
    use crate::types::StatKind;

    #[test]
    fn test_parse_templates() {
        let toml = r#"
[[abilities]]
id = "attack"
name = "Attack"
kind = "attack"
targeting = "enemy_single"
base_delay = 2.5

[[items]]
id = "potion"
name = "Potion"
value = 25

[items.effect]
type = "restore_hp"
fraction = 0.3

[[entities]]
name = "Green Slime"
level = 5
abilities = ["attack"]

[entities.weights]
Vitality = 0.9

[[entities.loot]]
item = "potion"
numerator = 1
denominator = 6
"#;

        let library = parse_templates(toml).unwrap();
        let slime = library.entity("Green Slime").unwrap();
        assert_eq!(slime.level, 5);
        assert!((slime.weights.get(StatKind::Vitality) - 0.9).abs() < f64::EPSILON);
        assert_eq!(slime.loot[0].quantity, 1);

        let potion = library.item(&ItemId::from("potion")).unwrap();
        assert_eq!(potion.effect, Some(ItemEffect::RestoreHp { fraction: 0.3 }));

        let attack = library.ability(&AbilityId::from("attack")).unwrap();
        assert_eq!(attack.kind, AbilityKind::Attack);
    }

    #[test]
    fn test_unknown_ids_fail_fast() {
        let library = TemplateLibrary::new();
        assert_eq!(
            library.entity("Ghost").unwrap_err(),
            BattleError::UnknownEntity("Ghost".to_string())
        );
        assert!(matches!(
            library.ability(&AbilityId::from("nope")),
            Err(BattleError::UnknownAbility(_))
        ));
        assert!(matches!(
            library.item(&ItemId::from("nope")),
            Err(BattleError::UnknownItem(_))
        ));
    }

    #[test]
    fn test_dangling_ability_reference_rejected() {
        let toml = r#"
[[entities]]
name = "Lonely"
abilities = ["missing"]
"#;
        assert!(matches!(
            parse_templates(toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_loot_chance() {
        let entry = LootEntry {
            item: ItemId::from("potion"),
            quantity: 1,
            numerator: 1,
            denominator: 0,
        };
        assert!((entry.chance() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_templates_load_all() {
        let library = default_templates();
        for name in ["Hero", "Rogue", "Green Slime", "Goblin"] {
            assert!(library.entity(name).is_ok(), "Missing entity: {}", name);
        }
        for id in [
            "attack",
            "defend",
            "quick_jab",
            "power_strike",
            "cure",
            "regen",
            "rally",
            "focus",
        ] {
            assert!(
                library.ability(&AbilityId::from(id)).is_ok(),
                "Missing ability: {}",
                id
            );
        }
        assert_eq!(library.encounters().len(), 2);
    }
}
