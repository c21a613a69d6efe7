//! Player input: ability choice, targeting, the ring press and items

use super::{Battle, BattleEvent, PartyRecord};
use crate::ability::{Ability, Targeting};
use crate::config::ItemEffect;
use crate::effects::{ActionReport, ActionSource, EffectValue};
use crate::error::{BattleError, BattleResult};
use crate::outcome::{OutcomeCategory, ResolvedOutcome, RingChallenge};
use crate::scheduler::{BattlePhase, ResolveStep};
use crate::types::{AbilityId, CombatantId, ItemId, Resource, Team};
use std::sync::Arc;
use tracing::{debug, info};

impl Battle {
    /// Pick an ability for the player combatant whose turn it is
    ///
    /// Self-targeted abilities resolve immediately and return their reports;
    /// everything else moves to targeting and returns nothing yet. A
    /// shortfall of MP queues an `InsufficientMp` event and leaves the
    /// player choosing.
    pub fn choose_ability(&mut self, ability_id: &AbilityId) -> BattleResult<Vec<ActionReport>> {
        let actor = match self.phase {
            BattlePhase::PlayerChoosing { actor } => actor,
            _ => return Err(self.phase_guard()),
        };
        let templates = Arc::clone(&self.templates);
        let combatant = self
            .roster
            .get(actor)
            .ok_or(BattleError::InvalidTarget(actor))?;
        if !combatant.knows(ability_id) {
            return Err(BattleError::AbilityNotKnown {
                actor,
                ability: ability_id.clone(),
            });
        }
        let ability = templates.ability(ability_id)?;

        let needed = combatant.mp_cost_of(ability, &self.config.costs);
        if !combatant.can_afford(ability, &self.config.costs) {
            let available = combatant.mp();
            self.events.push(BattleEvent::InsufficientMp {
                combatant: actor,
                ability: ability.id.clone(),
                needed,
                available,
            });
            return Err(BattleError::InsufficientMp { needed, available });
        }

        if ability.targeting == Targeting::SelfOnly {
            return self.launch(actor, actor, ability);
        }
        if self.roster.living(ability.targeting.target_team(actor.team)).is_empty() {
            self.check_battle_end();
            return Err(BattleError::NoValidTarget);
        }

        self.phase = BattlePhase::PlayerTargeting {
            actor,
            ability: ability.id.clone(),
        };
        Ok(Vec::new())
    }

    /// Living combatants the pending ability may target
    pub fn target_candidates(&self) -> Vec<CombatantId> {
        let BattlePhase::PlayerTargeting { actor, ability } = &self.phase else {
            return Vec::new();
        };
        match self.templates.ability(ability) {
            Ok(ability) if ability.targeting == Targeting::SelfOnly => vec![*actor],
            Ok(ability) => self
                .roster
                .living(ability.targeting.target_team(actor.team)),
            Err(_) => Vec::new(),
        }
    }

    /// Back out of targeting to the ability menu
    pub fn cancel_targeting(&mut self) -> BattleResult<()> {
        match self.phase {
            BattlePhase::PlayerTargeting { actor, .. } => {
                self.phase = BattlePhase::PlayerChoosing { actor };
                Ok(())
            }
            _ => Err(self.phase_guard()),
        }
    }

    /// Commit the pending ability against `target`
    ///
    /// Under the ring model this starts the timing challenge and returns no
    /// reports; they arrive from [`Battle::press_ring`] or the tick that
    /// times the ring out.
    pub fn confirm_target(&mut self, target: CombatantId) -> BattleResult<Vec<ActionReport>> {
        let (actor, ability_id) = match &self.phase {
            BattlePhase::PlayerTargeting { actor, ability } => (*actor, ability.clone()),
            _ => return Err(self.phase_guard()),
        };
        if !self.target_candidates().contains(&target) {
            return Err(BattleError::InvalidTarget(target));
        }
        let templates = Arc::clone(&self.templates);
        let ability = templates.ability(&ability_id)?;
        self.launch(actor, target, ability)
    }

    /// Stop the shrinking ring and resolve on the zone it is in
    pub fn press_ring(&mut self) -> BattleResult<Vec<ActionReport>> {
        let (actor, challenge) = match &self.phase {
            BattlePhase::ActionResolving {
                actor,
                step: ResolveStep::Ring(challenge),
            } => (*actor, challenge.clone()),
            _ => return Err(self.phase_guard()),
        };
        let category = challenge.press();
        debug!(actor = %actor, radius = challenge.radius, outcome = %category, "ring pressed");
        self.resolve_ring(actor, &challenge, category)
    }

    /// The pending ring challenge, if any
    pub fn ring(&self) -> Option<&RingChallenge> {
        match &self.phase {
            BattlePhase::ActionResolving {
                step: ResolveStep::Ring(challenge),
                ..
            } => Some(challenge.as_ref()),
            _ => None,
        }
    }

    /// Use an inventory item on a living ally, spending the turn
    pub fn use_item(
        &mut self,
        party: &mut PartyRecord,
        item: &ItemId,
        target: CombatantId,
    ) -> BattleResult<ActionReport> {
        let actor = match self.phase {
            BattlePhase::PlayerChoosing { actor } => actor,
            _ => return Err(self.phase_guard()),
        };
        let templates = Arc::clone(&self.templates);
        let definition = templates.item(item)?;
        let turn_delay = templates.ability(self.config.basic_attack_id())?.base_delay;

        let valid_target = target.team == Team::Player
            && self.roster.get(target).map(|c| c.is_alive()).unwrap_or(false);
        if !valid_target {
            return Err(BattleError::InvalidTarget(target));
        }
        if !party.consume_item(item, 1) {
            return Err(BattleError::ItemUnavailable(item.clone()));
        }

        let actor_name = self
            .roster
            .get(actor)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        let Some(combatant) = self.roster.get_mut(target) else {
            return Err(BattleError::InvalidTarget(target));
        };
        let value = match &definition.effect {
            Some(ItemEffect::RestoreHp { fraction }) => {
                let amount = (combatant.max_hp() * fraction).floor().max(1.0);
                let change = combatant.heal_hp(amount);
                self.events.push(BattleEvent::ResourceChanged(change));
                EffectValue::Restore {
                    resource: Resource::Hp,
                    amount: change.delta(),
                }
            }
            Some(ItemEffect::RestoreMp { fraction }) => {
                let amount = (combatant.max_mp() * fraction).floor().max(1.0);
                let change = combatant.restore_mp(amount);
                self.events.push(BattleEvent::ResourceChanged(change));
                EffectValue::Restore {
                    resource: Resource::Mp,
                    amount: change.delta(),
                }
            }
            None => EffectValue::Nothing,
        };

        let report = ActionReport {
            actor,
            actor_name,
            target,
            target_name: combatant.name.clone(),
            source: ActionSource::Item {
                id: definition.id.clone(),
                name: definition.name.clone(),
            },
            outcome: OutcomeCategory::Hit,
            multiplier: 1.0,
            value,
            mp_spent: 0,
            is_counter: false,
            target_defeated: false,
        };
        info!("{}", report.summary());
        self.events.push(BattleEvent::ActionResolved(report.clone()));

        self.complete_action(actor, target, turn_delay);
        self.check_battle_end();
        Ok(report)
    }

    /// Start the ring or resolve straight away, depending on the model
    fn launch(
        &mut self,
        actor: CombatantId,
        target: CombatantId,
        ability: &Ability,
    ) -> BattleResult<Vec<ActionReport>> {
        let challenge = match (self.roster.get(actor), self.roster.get(target)) {
            (Some(attacker), Some(defender)) => {
                self.resolver.player_challenge(attacker, defender, ability)
            }
            _ => return Err(BattleError::InvalidTarget(target)),
        };
        if let Some(challenge) = challenge {
            debug!(actor = %actor, target = %target, ratio = challenge.ratio, "ring started");
            self.phase = BattlePhase::ActionResolving {
                actor,
                step: ResolveStep::Ring(Box::new(challenge)),
            };
            return Ok(Vec::new());
        }

        let outcome = self.outcome_for(actor, target, ability);
        self.perform_player_action(actor, target, ability, outcome)
    }

    /// Resolve a ring challenge on `category`
    pub(super) fn resolve_ring(
        &mut self,
        actor: CombatantId,
        challenge: &RingChallenge,
        category: OutcomeCategory,
    ) -> BattleResult<Vec<ActionReport>> {
        let templates = Arc::clone(&self.templates);
        let ability = templates.ability(&challenge.ability)?;
        let outcome = ResolvedOutcome::new(category, self.resolver.multiplier(category));
        self.perform_player_action(actor, challenge.target, ability, outcome)
    }

    /// Execute, returning to the ability menu when MP ran short
    fn perform_player_action(
        &mut self,
        actor: CombatantId,
        target: CombatantId,
        ability: &Ability,
        outcome: ResolvedOutcome,
    ) -> BattleResult<Vec<ActionReport>> {
        match self.execute_action(actor, target, ability, outcome) {
            Err(e @ BattleError::InsufficientMp { .. }) => {
                self.phase = BattlePhase::PlayerChoosing { actor };
                Err(e)
            }
            other => other,
        }
    }
}
