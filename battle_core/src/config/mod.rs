//! Configuration loading from TOML files

mod constants;
mod templates;

pub use constants::{
    BasicAttack, BattleConfig, CostConstants, DamageConstants, GuardConstants, OutcomeWeights,
    PrecisionConstants, ResolverKind, RewardConstants, RingConstants, RingDistribution,
    SchedulerKind, TimingConstants,
};
pub use templates::{
    default_templates, load_templates, parse_templates, Encounter, EntityTemplate, ItemDefinition,
    ItemEffect, LootEntry, TemplateLibrary, TemplateSource,
};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_toml(&content)
}

/// Load a TOML string and deserialize it
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}

/// Load and validate a balance configuration file
pub fn load_battle_config(path: &Path) -> Result<BattleConfig, ConfigError> {
    let config: BattleConfig = load_toml(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate a balance configuration string
pub fn parse_battle_config(content: &str) -> Result<BattleConfig, ConfigError> {
    let config: BattleConfig = parse_toml(content)?;
    config.validate()?;
    Ok(config)
}

/// Default balance configuration shipped with the crate
pub fn default_battle_config() -> BattleConfig {
    let toml = include_str!("../../config/balance.toml");
    parse_battle_config(toml).unwrap_or_default()
}
