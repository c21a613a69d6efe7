//! Battle start, end detection and reward settlement

use super::{
    gold_for_level, roll_loot, xp_for_level, Battle, BattleEvent, BattleRewards, PartyRecord,
};
use crate::combatant::{Combatant, Roster};
use crate::config::{BattleConfig, Encounter, TemplateSource};
use crate::error::{BattleError, BattleResult};
use crate::outcome::resolver_for;
use crate::scheduler::{action_delay, dex_ratio, strategy_for, BattlePhase};
use crate::types::{CombatantId, StatKind, Team};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// One combatant to field: a template name and an optional level override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySlot {
    pub name: String,
    #[serde(default)]
    pub level: Option<u32>,
}

impl PartySlot {
    pub fn new(name: impl Into<String>) -> Self {
        PartySlot {
            name: name.into(),
            level: None,
        }
    }

    pub fn at_level(name: impl Into<String>, level: u32) -> Self {
        PartySlot {
            name: name.into(),
            level: Some(level),
        }
    }
}

fn build_party(
    team: Team,
    slots: &[PartySlot],
    templates: &dyn TemplateSource,
) -> BattleResult<Vec<Combatant>> {
    slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let template = templates.entity(&slot.name)?;
            Ok(Combatant::from_template(
                CombatantId::new(team, index),
                template,
                slot.level,
            ))
        })
        .collect()
}

impl Battle {
    /// Instantiate both parties and seed their readiness
    ///
    /// Each combatant's first turn comes after a fraction of the baseline
    /// delay, scaled by its dexterity against the opposing party's average.
    /// Every random draw of the battle comes from `seed`.
    pub fn start(
        players: &[PartySlot],
        enemies: &[PartySlot],
        templates: Arc<dyn TemplateSource>,
        config: BattleConfig,
        seed: u64,
    ) -> BattleResult<Self> {
        if players.is_empty() || enemies.is_empty() {
            return Err(BattleError::NoValidTarget);
        }
        // Counters, item turns and the AI fallback all need the basic attack
        templates.ability(config.basic_attack_id())?;
        let mut roster = Roster::new(
            build_party(Team::Player, players, templates.as_ref())?,
            build_party(Team::Enemy, enemies, templates.as_ref())?,
        );
        for combatant in roster.iter() {
            for ability in &combatant.abilities {
                templates.ability(ability)?;
            }
        }

        let scheduler = strategy_for(config.scheduler);
        let resolver = resolver_for(&config);
        let timing = &config.timing;
        let player_dex = roster.average_effective(Team::Player, StatKind::Dexterity);
        let enemy_dex = roster.average_effective(Team::Enemy, StatKind::Dexterity);
        for combatant in roster.iter_mut() {
            let reference = match combatant.team() {
                Team::Player => enemy_dex,
                Team::Enemy => player_dex,
            };
            let ratio = dex_ratio(combatant.effective_stat(StatKind::Dexterity), reference, timing);
            let delay = action_delay(timing.baseline_delay, ratio, timing);
            scheduler.seed(&mut combatant.readiness, delay, timing);
        }

        let names = |team: Team| -> Vec<String> {
            roster.party(team).iter().map(|c| c.name.clone()).collect()
        };
        let started = BattleEvent::BattleStarted {
            players: names(Team::Player),
            enemies: names(Team::Enemy),
        };
        info!(
            players = ?names(Team::Player),
            enemies = ?names(Team::Enemy),
            scheduler = ?config.scheduler,
            resolver = ?config.resolver,
            seed,
            "battle started"
        );

        Ok(Battle {
            config,
            templates,
            roster,
            clock: 0.0,
            phase: BattlePhase::Free,
            scheduler,
            resolver,
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: vec![started],
            rewards: None,
            rewards_claimed: false,
            turns_taken: 0,
        })
    }

    /// Field the members of a party record against enemies by template name
    pub fn from_party(
        party: &PartyRecord,
        enemies: &[String],
        templates: Arc<dyn TemplateSource>,
        config: BattleConfig,
        seed: u64,
    ) -> BattleResult<Self> {
        let players: Vec<PartySlot> = party
            .members
            .iter()
            .map(|m| PartySlot::at_level(m.name.clone(), m.level))
            .collect();
        let enemies: Vec<PartySlot> = enemies.iter().map(PartySlot::new).collect();
        Self::start(&players, &enemies, templates, config, seed)
    }

    /// Field a party record against a named encounter
    pub fn from_encounter(
        party: &PartyRecord,
        encounter: &Encounter,
        templates: Arc<dyn TemplateSource>,
        config: BattleConfig,
        seed: u64,
    ) -> BattleResult<Self> {
        Self::from_party(party, &encounter.enemies, templates, config, seed)
    }

    /// End the battle if one side is wiped out; true when it has ended
    pub(super) fn check_battle_end(&mut self) -> bool {
        if self.phase.is_ended() {
            return true;
        }
        match self.roster.decided() {
            Some(victory) => {
                self.end_battle(victory);
                true
            }
            None => false,
        }
    }

    fn end_battle(&mut self, victory: bool) {
        let rewards = if victory {
            let constants = &self.config.rewards;
            let mut rewards = BattleRewards {
                victory: true,
                ..BattleRewards::default()
            };
            for enemy in self.roster.party(Team::Enemy) {
                rewards.total_xp += xp_for_level(enemy.level, constants);
                rewards.total_gold += gold_for_level(enemy.level, constants);
                rewards.loot.extend(roll_loot(&enemy.loot, &mut self.rng));
            }
            rewards
        } else {
            BattleRewards::defeat()
        };

        info!(
            victory,
            xp = rewards.total_xp,
            gold = rewards.total_gold,
            loot = rewards.loot.len(),
            clock = self.clock,
            turns = self.turns_taken,
            "battle ended"
        );
        self.events.push(BattleEvent::BattleEnded {
            victory,
            rewards: rewards.clone(),
        });
        self.rewards = Some(rewards);
        self.phase = BattlePhase::Ended { victory };
    }

    /// Credit the rewards to `party`, exactly once
    ///
    /// Returns the rewards on the first call after the battle ended and
    /// `None` afterwards.
    pub fn claim_rewards(
        &mut self,
        party: &mut PartyRecord,
    ) -> BattleResult<Option<BattleRewards>> {
        if !self.phase.is_ended() {
            return Err(BattleError::InvalidPhase {
                phase: self.phase.name(),
            });
        }
        if self.rewards_claimed {
            return Ok(None);
        }
        let Some(rewards) = self.rewards.clone() else {
            return Ok(None);
        };
        party.apply_rewards(&rewards);
        self.rewards_claimed = true;
        info!("{}", rewards.summary());
        Ok(Some(rewards))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_battle_config, default_templates, BasicAttack, EntityTemplate};
    use crate::stats::StatWeights;
    use crate::types::{AbilityId, Team};

    fn templates() -> Arc<dyn TemplateSource> {
        Arc::new(default_templates())
    }

    #[test]
    fn test_start_builds_both_parties() {
        let battle = Battle::start(
            &[PartySlot::new("Hero"), PartySlot::at_level("Rogue", 9)],
            &[PartySlot::new("Goblin")],
            templates(),
            default_battle_config(),
            1,
        )
        .unwrap();

        assert_eq!(battle.party(Team::Player).len(), 2);
        assert_eq!(battle.party(Team::Enemy).len(), 1);
        assert_eq!(battle.party(Team::Player)[1].level, 9);
        assert_eq!(battle.phase(), &BattlePhase::Free);
        assert!(battle
            .roster()
            .iter()
            .all(|c| (c.hp() - c.max_hp()).abs() < 1e-9));
    }

    #[test]
    fn test_start_seeds_first_turns_before_baseline() {
        let battle = Battle::start(
            &[PartySlot::new("Hero")],
            &[PartySlot::new("Green Slime")],
            templates(),
            default_battle_config(),
            1,
        )
        .unwrap();
        let baseline = battle.config().timing.baseline_delay;
        for combatant in battle.roster().iter() {
            assert!(combatant.readiness.next_ready_at > 0.0);
            assert!(combatant.readiness.next_ready_at < baseline * 10.0);
        }
        // The faster side gets the earlier first turn
        let hero = &battle.party(Team::Player)[0];
        let slime = &battle.party(Team::Enemy)[0];
        assert!(hero.readiness.next_ready_at < slime.readiness.next_ready_at);
    }

    #[test]
    fn test_start_rejects_unknown_template_and_empty_party() {
        let unknown = Battle::start(
            &[PartySlot::new("Hero")],
            &[PartySlot::new("Dragon")],
            templates(),
            default_battle_config(),
            1,
        );
        assert!(matches!(unknown, Err(BattleError::UnknownEntity(name)) if name == "Dragon"));

        let empty =
            Battle::start(&[PartySlot::new("Hero")], &[], templates(), default_battle_config(), 1);
        assert!(matches!(empty, Err(BattleError::NoValidTarget)));
    }

    #[test]
    fn test_start_rejects_missing_basic_attack() {
        let mut config = default_battle_config();
        config.basic_attack = BasicAttack(AbilityId::from("slam"));
        let result = Battle::start(
            &[PartySlot::new("Hero")],
            &[PartySlot::new("Goblin")],
            templates(),
            config,
            1,
        );
        assert_eq!(
            result.err(),
            Some(BattleError::UnknownAbility(AbilityId::from("slam")))
        );

        // A known ability missing from the library fails just as early
        let mut library = default_templates();
        library.insert_entity(EntityTemplate {
            name: "Oracle".to_string(),
            level: 3,
            weights: StatWeights::default(),
            abilities: vec![AbilityId::from("attack"), AbilityId::from("foresight")],
            loot: Vec::new(),
        });
        let result = Battle::start(
            &[PartySlot::new("Hero")],
            &[PartySlot::new("Oracle")],
            Arc::new(library),
            default_battle_config(),
            1,
        );
        assert_eq!(
            result.err(),
            Some(BattleError::UnknownAbility(AbilityId::from("foresight")))
        );
    }

    #[test]
    fn test_claim_rewards_before_end_is_rejected() {
        let mut battle = Battle::start(
            &[PartySlot::new("Hero")],
            &[PartySlot::new("Green Slime")],
            templates(),
            default_battle_config(),
            1,
        )
        .unwrap();
        let mut party = PartyRecord::new().with_member("Hero", 6);
        assert!(matches!(
            battle.claim_rewards(&mut party),
            Err(BattleError::InvalidPhase { .. })
        ));
    }

    #[test]
    fn test_start_queues_battle_started() {
        let mut battle = Battle::start(
            &[PartySlot::new("Hero")],
            &[PartySlot::new("Goblin"), PartySlot::new("Green Slime")],
            templates(),
            default_battle_config(),
            1,
        )
        .unwrap();
        let events = battle.drain_events();
        assert_eq!(
            events,
            vec![BattleEvent::BattleStarted {
                players: vec!["Hero".to_string()],
                enemies: vec!["Goblin".to_string(), "Green Slime".to_string()],
            }]
        );
        assert!(battle.drain_events().is_empty());
    }
}
