//! Headless battle simulation

use battle_core::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// How the simulated player drives its party
#[derive(Debug, Clone)]
pub struct PlayerPolicy {
    /// Item drunk when a member falls below `potion_threshold` of max HP
    pub potion: ItemId,
    pub potion_threshold: f64,
    /// Attack through the timing ring and press inside the crit band
    pub use_ring: bool,
}

impl Default for PlayerPolicy {
    fn default() -> Self {
        PlayerPolicy {
            potion: ItemId::from("potion"),
            potion_threshold: 0.35,
            use_ring: false,
        }
    }
}

/// Result of one simulated battle
#[derive(Debug, Clone, Default, Serialize)]
pub struct BattleRun {
    /// None when the tick limit ran out first
    pub victory: Option<bool>,
    pub ticks: u64,
    pub clock: f64,
    pub turns: u32,
    pub actions: u32,
    pub crits: u32,
    pub counters: u32,
    pub potions_used: u32,
    pub rewards: Option<BattleRewards>,
}

impl BattleRun {
    /// Tick `battle` until it ends or `max_ticks` elapse
    pub fn run(
        battle: &mut Battle,
        party: &mut PartyRecord,
        policy: &PlayerPolicy,
        dt: f64,
        max_ticks: u64,
    ) -> BattleResult<Self> {
        let mut run = BattleRun::default();

        while run.ticks < max_ticks {
            run.ticks += 1;
            let tick = battle.tick(dt)?;
            run.record(&tick.reports);
            log_events(battle);
            if battle.is_over() {
                break;
            }

            match battle.phase().clone() {
                BattlePhase::PlayerChoosing { actor } => {
                    run.player_turn(battle, party, policy, actor)?;
                }
                BattlePhase::ActionResolving { .. } => {
                    let in_crit_band = battle
                        .ring()
                        .map(|ring| ring.radius <= ring.zones.crit_outer)
                        .unwrap_or(false);
                    if in_crit_band {
                        let reports = battle.press_ring()?;
                        run.record(&reports);
                    }
                }
                _ => {}
            }
            log_events(battle);
            if battle.is_over() {
                break;
            }
        }

        run.clock = battle.clock();
        run.turns = battle.turns_taken();
        if let BattlePhase::Ended { victory } = battle.phase() {
            run.victory = Some(*victory);
            run.rewards = battle.claim_rewards(party)?;
        }
        Ok(run)
    }

    fn player_turn(
        &mut self,
        battle: &mut Battle,
        party: &mut PartyRecord,
        policy: &PlayerPolicy,
        actor: CombatantId,
    ) -> BattleResult<()> {
        let wounded = battle
            .combatant(actor)
            .map(|c| c.hp() < c.max_hp() * policy.potion_threshold)
            .unwrap_or(false);
        if wounded && party.item_count(&policy.potion) > 0 {
            let report = battle.use_item(party, &policy.potion, actor)?;
            self.potions_used += 1;
            self.record(std::slice::from_ref(&report));
            return Ok(());
        }

        if !policy.use_ring {
            let reports = battle.autoplay_turn()?;
            self.record(&reports);
            return Ok(());
        }

        let basic = battle.config().basic_attack_id().clone();
        match battle.choose_ability(&basic) {
            Ok(reports) => self.record(&reports),
            Err(e) if e.is_recoverable() => {
                debug!(actor = %actor, error = %e, "falling back to autoplay");
                let reports = battle.autoplay_turn()?;
                self.record(&reports);
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        if let Some(target) = battle.target_candidates().first().copied() {
            let reports = battle.confirm_target(target)?;
            self.record(&reports);
        }
        Ok(())
    }

    fn record(&mut self, reports: &[ActionReport]) {
        for report in reports {
            self.actions += 1;
            if report.is_crit_or_vital() {
                self.crits += 1;
            }
            if report.is_counter {
                self.counters += 1;
            }
        }
    }

    /// Share of actions that landed a crit or vital, in percent
    pub fn crit_rate(&self) -> f64 {
        if self.actions > 0 {
            self.crits as f64 / self.actions as f64 * 100.0
        } else {
            0.0
        }
    }
}

fn log_events(battle: &mut Battle) {
    for event in battle.drain_events() {
        if let Some(line) = event.log_line() {
            info!(target: "battle_log", "{line}");
        }
    }
}

/// Aggregate over a batch of battles
#[derive(Debug, Clone, Default, Serialize)]
pub struct Tally {
    pub battles: u32,
    pub victories: u32,
    pub defeats: u32,
    pub timeouts: u32,
    pub total_xp: u64,
    pub total_gold: u64,
    pub actions: u32,
    pub crits: u32,
    pub counters: u32,
    pub potions_used: u32,
}

impl Tally {
    pub fn record(&mut self, run: &BattleRun) {
        self.battles += 1;
        match run.victory {
            Some(true) => self.victories += 1,
            Some(false) => self.defeats += 1,
            None => self.timeouts += 1,
        }
        if let Some(rewards) = &run.rewards {
            self.total_xp += rewards.total_xp;
            self.total_gold += rewards.total_gold;
        }
        self.actions += run.actions;
        self.crits += run.crits;
        self.counters += run.counters;
        self.potions_used += run.potions_used;
        info!(
            battle = self.battles,
            victory = ?run.victory,
            clock = run.clock,
            turns = run.turns,
            crit_rate = run.crit_rate(),
            "battle finished"
        );
    }

    /// Crit or vital share over every recorded action, in percent
    pub fn crit_rate(&self) -> f64 {
        if self.actions > 0 {
            self.crits as f64 / self.actions as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Victories over decided battles, in percent
    pub fn win_rate(&self) -> f64 {
        let decided = self.victories + self.defeats;
        if decided > 0 {
            self.victories as f64 / decided as f64 * 100.0
        } else {
            0.0
        }
    }
}
