//! Effect application - MP payment, then a kind-specific effect

use super::{ActionReport, CounterPolicy, EffectContext, EffectValue};
use crate::ability::{Ability, AbilityKind};
use crate::battle::BattleEvent;
use crate::combatant::Roster;
use crate::config::BattleConfig;
use crate::error::{BattleError, BattleResult};
use crate::outcome::{OutcomeCategory, ResolvedOutcome};
use crate::stats::{pow_ratio, round_tenths};
use crate::status::{StatusChange, StatusKey};
use crate::types::{CombatantId, StatKind};
use rand::{Rng, RngCore};
use tracing::{debug, warn};

const GUARD_STATUS_NAME: &str = "Defend";
const GUARD_DESCRIPTION: &str = "-25% damage taken, x2 regen, doubles defensive outcome weights.";

/// Unjittered attack damage
///
/// `(P / divisor) * (P / P_target) ^ 0.75 * outcome * ability.mult`, plus the
/// MP paid when the config adds it to the output.
pub fn attack_damage(
    caster_power: f64,
    target_power: f64,
    outcome_multiplier: f64,
    ability_multiplier: f64,
    mp_cost: u32,
    config: &BattleConfig,
) -> f64 {
    let base = caster_power / config.damage.power_divisor;
    let ratio = pow_ratio(caster_power, target_power);
    let mut damage = base * ratio * outcome_multiplier * ability_multiplier;
    if config.costs.add_mp_cost_to_output {
        damage += mp_cost as f64;
    }
    damage
}

/// Apply optional jitter, round to the nearest integer, floor at 0
pub fn finalize_damage<R: Rng + ?Sized>(raw: f64, jitter: Option<(f64, f64)>, rng: &mut R) -> f64 {
    let factor = match jitter {
        Some((min, max)) if max > min => rng.gen_range(min..max),
        Some((min, _)) => min,
        None => 1.0,
    };
    (raw * factor).round().max(0.0)
}

/// Healing amount, rounded and floored at 0
///
/// Same shape as attack damage with the vitality ratio as the scaling term;
/// never jittered.
pub fn heal_amount(
    caster_power: f64,
    caster_vitality: f64,
    target_vitality: f64,
    outcome_multiplier: f64,
    ability_multiplier: f64,
    mp_cost: u32,
    config: &BattleConfig,
) -> f64 {
    let base = caster_power / config.damage.power_divisor;
    let ratio = pow_ratio(caster_vitality, target_vitality);
    let mut heal = base * ratio * outcome_multiplier * ability_multiplier;
    if config.costs.add_mp_cost_to_output {
        heal += mp_cost as f64;
    }
    heal.round().max(0.0)
}

/// Timed buff duration in seconds, rounded to a tenth
pub fn buff_duration(
    caster_vitality: f64,
    target_vitality: f64,
    base_seconds: f64,
    outcome_scale: Option<f64>,
) -> f64 {
    let ratio = pow_ratio(caster_vitality, target_vitality);
    let scale = outcome_scale.unwrap_or(1.0).max(0.0);
    round_tenths(base_seconds * ratio * scale)
}

/// Apply one ability from `caster` to `target`
///
/// Passive abilities do nothing. MP is paid before anything else; when the
/// caster cannot pay, an `InsufficientMp` event is pushed and the call fails
/// with nothing mutated.
#[allow(clippy::too_many_arguments)]
pub fn apply_ability(
    roster: &mut Roster,
    caster_id: CombatantId,
    target_id: CombatantId,
    ability: &Ability,
    outcome: ResolvedOutcome,
    ctx: &EffectContext<'_>,
    rng: &mut dyn RngCore,
    events: &mut Vec<BattleEvent>,
) -> BattleResult<ActionReport> {
    let config = ctx.config;
    let caster = roster
        .get(caster_id)
        .ok_or(BattleError::InvalidTarget(caster_id))?;
    let target = roster
        .get(target_id)
        .ok_or(BattleError::InvalidTarget(target_id))?;

    let mut report = ActionReport::for_ability(caster, target, ability, outcome);
    if ability.is_passive() {
        return Ok(report);
    }

    let cost = caster.mp_cost_of(ability, &config.costs);
    let caster_power = caster.effective_stat(StatKind::Power);
    let caster_vitality = caster.effective_stat(StatKind::Vitality);
    let target_power = target.effective_stat(StatKind::Power);
    let target_vitality = target.effective_stat(StatKind::Vitality);

    if cost > 0 {
        let caster = roster
            .get_mut(caster_id)
            .ok_or(BattleError::InvalidTarget(caster_id))?;
        let available = caster.mp();
        match caster.spend_mp(cost as f64) {
            Some(change) => events.push(BattleEvent::ResourceChanged(change)),
            None => {
                events.push(BattleEvent::InsufficientMp {
                    combatant: caster_id,
                    ability: ability.id.clone(),
                    needed: cost,
                    available,
                });
                return Err(BattleError::InsufficientMp {
                    needed: cost,
                    available,
                });
            }
        }
        report.mp_spent = cost;
    }

    match ability.kind {
        AbilityKind::Attack => {
            let raw = attack_damage(
                caster_power,
                target_power,
                outcome.multiplier,
                ability.mult,
                cost,
                config,
            );
            let jitter = ctx
                .jitter
                .then_some((config.damage.jitter_min, config.damage.jitter_max));
            let damage = finalize_damage(raw, jitter, rng);

            let target = roster
                .get_mut(target_id)
                .ok_or(BattleError::InvalidTarget(target_id))?;
            let change = target.take_damage(damage, &config.guard);
            report.target_defeated = !target.is_alive();
            events.push(BattleEvent::ResourceChanged(change));
            report.value = EffectValue::Damage { amount: damage };
        }
        AbilityKind::Heal => {
            let amount = heal_amount(
                caster_power,
                caster_vitality,
                target_vitality,
                outcome.multiplier,
                ability.mult,
                cost,
                config,
            );
            let target = roster
                .get_mut(target_id)
                .ok_or(BattleError::InvalidTarget(target_id))?;
            let change = target.heal_hp(amount);
            events.push(BattleEvent::ResourceChanged(change));
            report.value = EffectValue::Healing { amount };
        }
        AbilityKind::Defend => {
            let turns = config.guard.turns;
            let caster = roster
                .get_mut(caster_id)
                .ok_or(BattleError::InvalidTarget(caster_id))?;
            let change = caster.statuses.add_or_extend_turns(
                StatusKey::Guard,
                GUARD_STATUS_NAME,
                turns,
                GUARD_DESCRIPTION,
            );
            events.push(BattleEvent::StatusApplied {
                combatant: caster_id,
                status: GUARD_STATUS_NAME.to_string(),
                change,
            });
            report.value = EffectValue::Guard { turns };
        }
        AbilityKind::Buff => {
            let scale = ctx.scale_buffs.then_some(outcome.multiplier);
            let seconds = buff_duration(
                caster_vitality,
                target_vitality,
                config.timing.buff_base_duration,
                scale,
            );
            let status = ability.buff_status_name();
            let target = roster
                .get_mut(target_id)
                .ok_or(BattleError::InvalidTarget(target_id))?;
            let change = target.statuses.add_or_extend_timed(
                StatusKey::Buff(ability.id.clone()),
                &status,
                seconds,
                &ability.description,
                ability.modifier.clone(),
            );
            if seconds > 0.0 || change == StatusChange::Extended {
                events.push(BattleEvent::StatusApplied {
                    combatant: target_id,
                    status: status.clone(),
                    change,
                });
            }
            report.value = EffectValue::Buff { status, seconds };
        }
        AbilityKind::Passive => {}
    }

    debug!(
        actor = %caster_id,
        target = %target_id,
        ability = %ability.id,
        outcome = %outcome.category,
        "{}",
        report.summary()
    );
    Ok(report)
}

/// Apply an ability, then the defender's retaliation on a counter outcome
///
/// The retaliation is the basic attack with a forced hit and runs with
/// `CounterPolicy::Suppress`. It is skipped when either side is down or the
/// battle is already decided.
#[allow(clippy::too_many_arguments)]
pub fn resolve_with_counter(
    roster: &mut Roster,
    caster_id: CombatantId,
    target_id: CombatantId,
    ability: &Ability,
    outcome: ResolvedOutcome,
    ctx: &EffectContext<'_>,
    policy: CounterPolicy,
    rng: &mut dyn RngCore,
    events: &mut Vec<BattleEvent>,
) -> BattleResult<Vec<ActionReport>> {
    let primary = apply_ability(roster, caster_id, target_id, ability, outcome, ctx, rng, events)?;
    let mut reports = vec![primary];

    let countered = outcome.category == OutcomeCategory::Counter
        && ability.kind == AbilityKind::Attack
        && policy == CounterPolicy::Allow;
    if !countered || roster.decided().is_some() {
        return Ok(reports);
    }

    let both_standing = [caster_id, target_id]
        .iter()
        .all(|id| roster.get(*id).map(|c| c.is_alive()).unwrap_or(false));
    if !both_standing {
        return Ok(reports);
    }

    let basic = ctx.templates.ability(ctx.config.basic_attack_id())?;
    match resolve_with_counter(
        roster,
        target_id,
        caster_id,
        basic,
        ResolvedOutcome::forced_hit(),
        ctx,
        CounterPolicy::Suppress,
        rng,
        events,
    ) {
        Ok(retaliation) => {
            reports.extend(retaliation.into_iter().map(|mut report| {
                report.is_counter = true;
                report
            }));
        }
        Err(BattleError::InsufficientMp { needed, available }) => {
            warn!(
                defender = %target_id,
                needed,
                available,
                "counter skipped: not enough MP for the basic attack"
            );
        }
        Err(e) => return Err(e),
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Combatant;
    use crate::config::{EntityTemplate, TemplateLibrary};
    use crate::stats::StatWeights;
    use crate::types::AbilityId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config_without_cost_bonus() -> BattleConfig {
        let mut config = BattleConfig::default();
        config.costs.add_mp_cost_to_output = false;
        config
    }

    fn unit(id: CombatantId, level: u32, weights: StatWeights) -> Combatant {
        let template = EntityTemplate {
            name: format!("{id}"),
            level,
            weights,
            abilities: vec![AbilityId::from("attack")],
            loot: Vec::new(),
        };
        Combatant::from_template(id, &template, None)
    }

    fn duel() -> Roster {
        // Power 100, Vitality 400 on both sides
        let weights = StatWeights::new().with(StatKind::Vitality, 1.0);
        Roster::new(
            vec![unit(CombatantId::player(0), 10, weights.clone())],
            vec![unit(CombatantId::enemy(0), 10, weights)],
        )
    }

    fn templates() -> TemplateLibrary {
        let mut library = TemplateLibrary::new();
        library.insert_ability(Ability::basic_attack());
        library
    }

    fn ability(kind: AbilityKind, cost: f64) -> Ability {
        let mut ability = Ability::basic_attack();
        ability.id = AbilityId::from(format!("{kind:?}").to_lowercase());
        ability.name = format!("{kind:?}");
        ability.kind = kind;
        ability.base_mp_cost = cost;
        ability
    }

    #[test]
    fn test_reference_damage_scenario() {
        // (100 / 5) * 1 * 1 * 1 = 20
        let config = config_without_cost_bonus();
        let damage = attack_damage(100.0, 100.0, 1.0, 1.0, 0, &config);
        assert!((damage - 20.0).abs() < 1e-9);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!((finalize_damage(damage, None, &mut rng) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mp_cost_added_to_output() {
        let config = BattleConfig::default();
        let damage = attack_damage(100.0, 100.0, 0.0, 1.0, 12, &config);
        assert!((damage - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let value = finalize_damage(100.0, Some((0.8, 1.2)), &mut rng);
            assert!((80.0..=120.0).contains(&value));
        }
        // Degenerate range multiplies by its bound
        assert!((finalize_damage(100.0, Some((1.0, 1.0)), &mut rng) - 100.0).abs() < f64::EPSILON);
        assert!((finalize_damage(-5.0, None, &mut rng) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_buff_duration() {
        assert!((buff_duration(100.0, 100.0, 6.0, None) - 6.0).abs() < 1e-9);
        // 6 * 16 ^ 0.75 = 48
        assert!((buff_duration(1600.0, 100.0, 6.0, None) - 48.0).abs() < 1e-9);
        // 6 * 1.35 = 8.1
        assert!((buff_duration(100.0, 100.0, 6.0, Some(1.35)) - 8.1).abs() < 1e-9);
        assert!((buff_duration(100.0, 100.0, 6.0, Some(0.0)) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_attack_applies_damage_and_events() {
        let config = config_without_cost_bonus();
        let library = templates();
        let ctx = EffectContext {
            config: &config,
            templates: &library,
            jitter: false,
            scale_buffs: false,
        };
        let mut roster = duel();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();

        let report = apply_ability(
            &mut roster,
            CombatantId::player(0),
            CombatantId::enemy(0),
            &Ability::basic_attack(),
            ResolvedOutcome::forced_hit(),
            &ctx,
            &mut rng,
            &mut events,
        )
        .unwrap();

        assert_eq!(report.value, EffectValue::Damage { amount: 20.0 });
        let enemy = roster.get(CombatantId::enemy(0)).unwrap();
        assert!((enemy.hp() - 380.0).abs() < 1e-9);
        assert!(matches!(events[0], BattleEvent::ResourceChanged(_)));
    }

    #[test]
    fn test_insufficient_mp_mutates_nothing() {
        let config = BattleConfig::default();
        let library = templates();
        let ctx = EffectContext {
            config: &config,
            templates: &library,
            jitter: false,
            scale_buffs: false,
        };
        let mut roster = duel();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();

        let result = apply_ability(
            &mut roster,
            CombatantId::player(0),
            CombatantId::enemy(0),
            &ability(AbilityKind::Attack, 10_000.0),
            ResolvedOutcome::forced_hit(),
            &ctx,
            &mut rng,
            &mut events,
        );

        assert!(matches!(result, Err(BattleError::InsufficientMp { .. })));
        assert!((roster.get(CombatantId::player(0)).unwrap().mp() - 400.0).abs() < f64::EPSILON);
        assert!((roster.get(CombatantId::enemy(0)).unwrap().hp() - 400.0).abs() < f64::EPSILON);
        assert!(matches!(events.as_slice(), [BattleEvent::InsufficientMp { .. }]));
    }

    #[test]
    fn test_passive_has_no_effect() {
        let config = BattleConfig::default();
        let library = templates();
        let ctx = EffectContext {
            config: &config,
            templates: &library,
            jitter: true,
            scale_buffs: false,
        };
        let mut roster = duel();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();

        let report = apply_ability(
            &mut roster,
            CombatantId::enemy(0),
            CombatantId::enemy(0),
            &ability(AbilityKind::Passive, 50.0),
            ResolvedOutcome::forced_hit(),
            &ctx,
            &mut rng,
            &mut events,
        )
        .unwrap();
        assert_eq!(report.value, EffectValue::Nothing);
        assert_eq!(report.mp_spent, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_defend_and_buff_grant_statuses() {
        let config = BattleConfig::default();
        let library = templates();
        let ctx = EffectContext {
            config: &config,
            templates: &library,
            jitter: false,
            scale_buffs: false,
        };
        let mut roster = duel();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();
        let hero = CombatantId::player(0);

        apply_ability(
            &mut roster,
            hero,
            hero,
            &ability(AbilityKind::Defend, 0.0),
            ResolvedOutcome::forced_hit(),
            &ctx,
            &mut rng,
            &mut events,
        )
        .unwrap();
        assert!(roster.get(hero).unwrap().is_guarding());

        let report = apply_ability(
            &mut roster,
            hero,
            hero,
            &ability(AbilityKind::Buff, 0.0),
            ResolvedOutcome::forced_hit(),
            &ctx,
            &mut rng,
            &mut events,
        )
        .unwrap();
        assert_eq!(
            report.value,
            EffectValue::Buff {
                status: "Buff (Buff)".to_string(),
                seconds: 6.0
            }
        );
        assert!(roster.get(hero).unwrap().statuses.has_active_named("Buff (Buff)"));
    }

    #[test]
    fn test_counter_retaliates_once() {
        let config = config_without_cost_bonus();
        let library = templates();
        let ctx = EffectContext {
            config: &config,
            templates: &library,
            jitter: false,
            scale_buffs: false,
        };
        let mut roster = duel();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();

        let reports = resolve_with_counter(
            &mut roster,
            CombatantId::player(0),
            CombatantId::enemy(0),
            &Ability::basic_attack(),
            ResolvedOutcome::new(OutcomeCategory::Counter, 0.0),
            &ctx,
            CounterPolicy::Allow,
            &mut rng,
            &mut events,
        )
        .unwrap();

        assert_eq!(reports.len(), 2);
        assert!(!reports[0].is_counter);
        assert!(reports[1].is_counter);
        assert_eq!(reports[1].actor, CombatantId::enemy(0));
        assert_eq!(reports[1].outcome, OutcomeCategory::Hit);
        assert!((roster.get(CombatantId::player(0)).unwrap().hp() - 380.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_counter_once_the_battle_is_decided() {
        let config = config_without_cost_bonus();
        let library = templates();
        let ctx = EffectContext {
            config: &config,
            templates: &library,
            jitter: false,
            scale_buffs: false,
        };
        let mut roster = duel();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();

        // 20 * 20 = 400 takes the only enemy down with the primary hit
        let reports = resolve_with_counter(
            &mut roster,
            CombatantId::player(0),
            CombatantId::enemy(0),
            &Ability::basic_attack(),
            ResolvedOutcome::new(OutcomeCategory::Counter, 20.0),
            &ctx,
            CounterPolicy::Allow,
            &mut rng,
            &mut events,
        )
        .unwrap();

        assert_eq!(reports.len(), 1);
        assert!(reports[0].target_defeated);
        assert_eq!(roster.decided(), Some(true));
        assert!((roster.get(CombatantId::player(0)).unwrap().hp() - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_counter_suppressed() {
        let config = config_without_cost_bonus();
        let library = templates();
        let ctx = EffectContext {
            config: &config,
            templates: &library,
            jitter: false,
            scale_buffs: false,
        };
        let mut roster = duel();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();

        let reports = resolve_with_counter(
            &mut roster,
            CombatantId::player(0),
            CombatantId::enemy(0),
            &Ability::basic_attack(),
            ResolvedOutcome::new(OutcomeCategory::Counter, 0.0),
            &ctx,
            CounterPolicy::Suppress,
            &mut rng,
            &mut events,
        )
        .unwrap();
        assert_eq!(reports.len(), 1);
    }
}
