//! AI policy: a random usable ability on a random valid target

use super::Battle;
use crate::ability::{Ability, Targeting};
use crate::config::TemplateSource;
use crate::effects::ActionReport;
use crate::error::{BattleError, BattleResult};
use crate::scheduler::{BattlePhase, ResolveStep};
use crate::types::CombatantId;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, warn};

impl Battle {
    /// Let the AI take the current turn
    ///
    /// Works for a queued enemy turn and for a player combatant that is
    /// choosing or targeting (auto-battle).
    pub fn autoplay_turn(&mut self) -> BattleResult<Vec<ActionReport>> {
        let actor = match &self.phase {
            BattlePhase::PlayerChoosing { actor }
            | BattlePhase::PlayerTargeting { actor, .. }
            | BattlePhase::ActionResolving {
                actor,
                step: ResolveStep::AiAct,
            } => *actor,
            _ => return Err(self.phase_guard()),
        };
        self.run_ai_turn(actor)
    }

    pub(super) fn run_ai_turn(&mut self, actor: CombatantId) -> BattleResult<Vec<ActionReport>> {
        let alive = self.roster.get(actor).map(|c| c.is_alive()).unwrap_or(false);
        if !alive {
            debug!(actor = %actor, "skipping turn of a defeated combatant");
            self.phase = BattlePhase::Free;
            return Ok(Vec::new());
        }

        let templates = Arc::clone(&self.templates);
        let ability = self.pick_ai_ability(actor, templates.as_ref())?;
        let Some(target) = self.pick_ai_target(actor, ability) else {
            if self.check_battle_end() {
                return Ok(Vec::new());
            }
            return Err(BattleError::NoValidTarget);
        };
        debug!(actor = %actor, ability = %ability.id, target = %target, "ai chose");

        let outcome = self.outcome_for(actor, target, ability);
        match self.execute_action(actor, target, ability, outcome) {
            Err(BattleError::InsufficientMp { needed, available }) => {
                warn!(actor = %actor, needed, available, "ai turn forfeited: not enough MP");
                self.complete_action(actor, target, ability.base_delay);
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// A random non-passive ability, or the basic attack when none is
    /// usable or the pick is unaffordable
    fn pick_ai_ability<'t>(
        &mut self,
        actor: CombatantId,
        templates: &'t dyn TemplateSource,
    ) -> BattleResult<&'t Ability> {
        let basic = templates.ability(self.config.basic_attack_id())?;
        let Some(combatant) = self.roster.get(actor) else {
            return Ok(basic);
        };

        let mut usable = Vec::with_capacity(combatant.abilities.len());
        for id in &combatant.abilities {
            let ability = templates.ability(id)?;
            if !ability.is_passive() {
                usable.push(ability);
            }
        }
        if usable.is_empty() {
            return Ok(basic);
        }

        let choice = usable[self.rng.gen_range(0..usable.len())];
        if combatant.can_afford(choice, &self.config.costs) {
            Ok(choice)
        } else {
            warn!(
                actor = %actor,
                ability = %choice.id,
                mp = combatant.mp(),
                "not enough MP, falling back to the basic attack"
            );
            Ok(basic)
        }
    }

    fn pick_ai_target(&mut self, actor: CombatantId, ability: &Ability) -> Option<CombatantId> {
        if ability.targeting == Targeting::SelfOnly {
            return Some(actor);
        }
        let pool = self.roster.living(ability.targeting.target_team(actor.team));
        if pool.is_empty() {
            return None;
        }
        Some(pool[self.rng.gen_range(0..pool.len())])
    }
}
