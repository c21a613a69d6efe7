//! Battle - the explicit context every battle operation runs against
//!
//! A `Battle` owns both parties, the clock, the phase machine, the event
//! queue and the single seeded RNG. An external driver calls [`Battle::tick`]
//! once per frame and routes player input through the methods in `input`.

mod ai;
mod events;
mod input;
mod lifecycle;
pub mod rewards;
mod snapshot;

pub use events::BattleEvent;
pub use lifecycle::PartySlot;
pub use rewards::{
    gold_for_level, roll_loot, xp_for_level, BattleRewards, InventoryEntry, LootDrop, PartyMember,
    PartyRecord,
};
pub use snapshot::{BattleSnapshot, CombatantSnapshot, StatusSnapshot};

use crate::ability::{Ability, AbilityKind};
use crate::combatant::{Combatant, Roster};
use crate::config::{BattleConfig, TemplateSource};
use crate::effects::{resolve_with_counter, ActionReport, CounterPolicy, EffectContext};
use crate::error::{BattleError, BattleResult};
use crate::outcome::{OutcomeResolver, ResolvedOutcome, RingChallenge};
use crate::scheduler::{
    action_delay, dex_ratio, select_next_actor, BattlePhase, ReadinessStrategy, ReadyCandidate,
    ResolveStep,
};
use crate::status::StatusKey;
use crate::types::{CombatantId, StatKind, Team};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tracing::{debug, warn};

/// What one call to [`Battle::tick`] did
#[derive(Debug, Clone, Default)]
pub struct BattleTickResult {
    /// Clock time advanced (zero while frozen)
    pub elapsed: f64,
    pub turn_started: Option<CombatantId>,
    pub reports: Vec<ActionReport>,
    /// Timed statuses that ran out this tick
    pub expired: Vec<(CombatantId, String)>,
    /// Set when the battle ended during this tick
    pub ended: Option<bool>,
}

impl BattleTickResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.turn_started.is_none()
            && self.reports.is_empty()
            && self.expired.is_empty()
            && self.ended.is_none()
    }
}

/// Work a tick has to do, decided before any mutation
enum TickStep {
    Idle,
    Run,
    AiAct(CombatantId),
    RingTimeout(CombatantId, Box<RingChallenge>),
}

/// An active battle
pub struct Battle {
    config: BattleConfig,
    templates: Arc<dyn TemplateSource>,
    roster: Roster,
    clock: f64,
    phase: BattlePhase,
    scheduler: Box<dyn ReadinessStrategy>,
    resolver: Box<dyn OutcomeResolver>,
    rng: ChaCha8Rng,
    events: Vec<BattleEvent>,
    rewards: Option<BattleRewards>,
    rewards_claimed: bool,
    turns_taken: u32,
}

impl Battle {
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn phase(&self) -> &BattlePhase {
        &self.phase
    }

    /// Battle clock in seconds; never decreases
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.roster.get(id)
    }

    pub fn party(&self, team: Team) -> &[Combatant] {
        self.roster.party(team)
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_ended()
    }

    /// Rewards, once the battle has ended
    pub fn rewards(&self) -> Option<&BattleRewards> {
        self.rewards.as_ref()
    }

    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the battle by `dt` seconds
    ///
    /// Only the free-running phase moves the clock, readiness and timed
    /// statuses. A pending AI turn resolves on the tick after its freeze, and
    /// a shrinking ring advances and resolves to its timeout outcome when it
    /// collapses.
    pub fn tick(&mut self, dt: f64) -> BattleResult<BattleTickResult> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let speed = self.config.ring.speed;
        let step = match &mut self.phase {
            BattlePhase::Free => TickStep::Run,
            BattlePhase::ActionResolving {
                actor,
                step: ResolveStep::AiAct,
            } => TickStep::AiAct(*actor),
            BattlePhase::ActionResolving {
                actor,
                step: ResolveStep::Ring(challenge),
            } => {
                if challenge.advance(dt, speed) {
                    TickStep::RingTimeout(*actor, challenge.clone())
                } else {
                    TickStep::Idle
                }
            }
            BattlePhase::PlayerChoosing { .. }
            | BattlePhase::PlayerTargeting { .. }
            | BattlePhase::Ended { .. } => TickStep::Idle,
        };

        let was_ended = self.phase.is_ended();
        let mut result = BattleTickResult::new();
        match step {
            TickStep::Idle => {}
            TickStep::Run => self.run_free(dt, &mut result),
            TickStep::AiAct(actor) => result.reports = self.run_ai_turn(actor)?,
            TickStep::RingTimeout(actor, challenge) => {
                debug!(actor = %actor, "ring timed out");
                result.reports =
                    self.resolve_ring(actor, &challenge, RingChallenge::timeout_outcome())?;
            }
        }
        if !was_ended {
            result.ended = self.phase_victory();
        }
        Ok(result)
    }

    fn run_free(&mut self, dt: f64, result: &mut BattleTickResult) {
        self.clock += dt;
        result.elapsed = dt;

        for combatant in self.roster.iter_mut() {
            let ticked = combatant.statuses.tick_timed(dt);
            for status in ticked.expired {
                debug!(combatant = %combatant.id, status = %status.name, "status expired");
                result.expired.push((combatant.id, status.name.clone()));
                self.events.push(BattleEvent::StatusExpired {
                    combatant: combatant.id,
                    status: status.name,
                });
            }
        }

        for combatant in self.roster.iter_mut().filter(|c| c.is_alive()) {
            self.scheduler
                .advance(&mut combatant.readiness, dt, self.clock, &self.config.timing);
        }

        if self.check_battle_end() {
            return;
        }

        let timing = &self.config.timing;
        let candidates: Vec<ReadyCandidate> = self
            .roster
            .iter()
            .filter(|c| c.is_alive())
            .filter(|c| self.scheduler.is_ready(&c.readiness, self.clock, timing))
            .map(|c| ReadyCandidate {
                id: c.id,
                priority: self.scheduler.priority(&c.readiness),
                dexterity: c.effective_stat(StatKind::Dexterity),
            })
            .collect();

        if let Some(actor) = select_next_actor(&candidates) {
            self.begin_turn(actor);
            result.turn_started = Some(actor);
        }
    }

    /// Freeze for `actor`'s turn: top up readiness, apply turn regen, then
    /// hand the turn to the player or queue the AI
    fn begin_turn(&mut self, actor: CombatantId) {
        let timing = &self.config.timing;
        if let Some(combatant) = self.roster.get_mut(actor) {
            self.scheduler.on_turn_start(&mut combatant.readiness, timing);
            let changes = combatant.apply_turn_regen(timing.turn_regen_percent, &self.config.guard);
            self.events.extend(
                changes
                    .into_iter()
                    .filter(|change| !change.is_noop())
                    .map(BattleEvent::ResourceChanged),
            );
        }

        self.turns_taken += 1;
        self.events.push(BattleEvent::TurnStarted {
            actor,
            clock: self.clock,
        });
        debug!(actor = %actor, clock = self.clock, "turn started");

        self.phase = match actor.team {
            Team::Player => BattlePhase::PlayerChoosing { actor },
            Team::Enemy => BattlePhase::ActionResolving {
                actor,
                step: ResolveStep::AiAct,
            },
        };
    }

    /// Drawn outcome for an attack without player input; everything else is
    /// a forced hit
    fn outcome_for(
        &mut self,
        actor: CombatantId,
        target: CombatantId,
        ability: &Ability,
    ) -> ResolvedOutcome {
        if ability.kind != AbilityKind::Attack || !self.resolver.resolves(ability.kind) {
            return ResolvedOutcome::forced_hit();
        }
        match (self.roster.get(actor), self.roster.get(target)) {
            (Some(attacker), Some(defender)) => {
                self.resolver.resolve(attacker, defender, &mut self.rng)
            }
            _ => ResolvedOutcome::forced_hit(),
        }
    }

    /// Run an action through the effect pipeline, then re-check the battle
    /// end and reschedule the actor
    fn execute_action(
        &mut self,
        actor: CombatantId,
        target: CombatantId,
        ability: &Ability,
        outcome: ResolvedOutcome,
    ) -> BattleResult<Vec<ActionReport>> {
        let ctx = EffectContext {
            config: &self.config,
            templates: self.templates.as_ref(),
            jitter: self.resolver.applies_jitter(),
            scale_buffs: self.resolver.scales_buffs(),
        };
        let reports = resolve_with_counter(
            &mut self.roster,
            actor,
            target,
            ability,
            outcome,
            &ctx,
            CounterPolicy::Allow,
            &mut self.rng,
            &mut self.events,
        )?;

        self.events
            .extend(reports.iter().cloned().map(BattleEvent::ActionResolved));
        if !self.check_battle_end() {
            // Defending does not use up a guard turn
            let spends_guard = ability.kind != AbilityKind::Defend;
            self.finish_turn(actor, target, ability.base_delay, spends_guard);
        }
        Ok(reports)
    }

    /// Finish `actor`'s turn: spend a guard turn, schedule the next turn
    /// against the target's dexterity, and unfreeze
    fn complete_action(&mut self, actor: CombatantId, target: CombatantId, base_delay: f64) {
        self.finish_turn(actor, target, base_delay, true);
    }

    fn finish_turn(
        &mut self,
        actor: CombatantId,
        target: CombatantId,
        base_delay: f64,
        spends_guard: bool,
    ) {
        let timing = &self.config.timing;
        let reference = self
            .roster
            .get(target)
            .map(|c| c.effective_stat(StatKind::Dexterity));

        if let Some(combatant) = self.roster.get_mut(actor) {
            let expired = if spends_guard {
                combatant.statuses.decrement_turns(&StatusKey::Guard)
            } else {
                None
            };
            if let Some(expired) = expired {
                debug!(actor = %actor, status = %expired.name, "guard expired");
                self.events.push(BattleEvent::StatusExpired {
                    combatant: actor,
                    status: expired.name,
                });
            }
            let dexterity = combatant.effective_stat(StatKind::Dexterity);
            let ratio = dex_ratio(dexterity, reference.unwrap_or(dexterity), timing);
            let delay = action_delay(base_delay, ratio, timing);
            self.scheduler
                .schedule(&mut combatant.readiness, self.clock, delay, timing);
            debug!(
                actor = %actor,
                delay,
                next_ready_at = combatant.readiness.next_ready_at,
                "rescheduled"
            );
        } else {
            warn!(actor = %actor, "completed action for unknown combatant");
        }

        self.phase = BattlePhase::Free;
    }

    fn phase_victory(&self) -> Option<bool> {
        match self.phase {
            BattlePhase::Ended { victory } => Some(victory),
            _ => None,
        }
    }

    fn phase_guard(&self) -> BattleError {
        match self.phase {
            BattlePhase::Ended { .. } => BattleError::BattleOver,
            ref other => BattleError::InvalidPhase {
                phase: other.name(),
            },
        }
    }
}
