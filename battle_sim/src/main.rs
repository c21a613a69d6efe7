//! battle_sim - Headless driver for seeded auto-battles
//!
//! Runs a party through random encounters, carrying XP, gold and the
//! inventory from one battle to the next, and reports the tally.

mod simulation;

use battle_core::config::{load_battle_config, load_templates};
use battle_core::prelude::*;
use battle_core::ConfigError;
use clap::{Parser, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use simulation::{BattleRun, PlayerPolicy, Tally};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Readiness model
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchedulerArg {
    Threshold,
    Timestamp,
}

impl From<SchedulerArg> for SchedulerKind {
    fn from(arg: SchedulerArg) -> Self {
        match arg {
            SchedulerArg::Threshold => SchedulerKind::Threshold,
            SchedulerArg::Timestamp => SchedulerKind::Timestamp,
        }
    }
}

/// Outcome model
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResolverArg {
    Weighted,
    Ring,
}

impl From<ResolverArg> for ResolverKind {
    fn from(arg: ResolverArg) -> Self {
        match arg {
            ResolverArg::Weighted => ResolverKind::Weighted,
            ResolverArg::Ring => ResolverKind::Ring,
        }
    }
}

/// Headless battle simulator - seeded auto-battles on the ATB core
#[derive(Parser, Debug)]
#[command(name = "battle_sim")]
#[command(about = "Run seeded auto-battles and report the outcome tally")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of battles to run back to back
    #[arg(long, default_value_t = 10)]
    battles: u32,

    /// Balance constants (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Entity, ability, item and encounter templates (TOML)
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Override the configured readiness model
    #[arg(long, value_enum)]
    scheduler: Option<SchedulerArg>,

    /// Override the configured outcome model
    #[arg(long, value_enum)]
    resolver: Option<ResolverArg>,

    /// Seconds per tick
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Maximum ticks per battle before it counts as a timeout
    #[arg(long, default_value_t = 200_000)]
    max_ticks: u64,

    /// Potions the party starts with
    #[arg(long, default_value_t = 3)]
    potions: u32,

    /// Attack through the timing ring instead of auto-play
    #[arg(long)]
    press_ring: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Error)]
enum SimError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("battle: {0}")]
    Battle(#[from] BattleError),
    #[error("no encounters defined in the templates")]
    NoEncounters,
    #[error("report: {0}")]
    Report(#[from] serde_json::Error),
}

/// JSON output structure
#[derive(Serialize)]
struct Report<'a> {
    seed: u64,
    scheduler: SchedulerKind,
    resolver: ResolverKind,
    tally: &'a Tally,
    win_rate: f64,
    crit_rate: f64,
    party: &'a PartyRecord,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), SimError> {
    let mut config = match &args.config {
        Some(path) => load_battle_config(path)?,
        None => default_battle_config(),
    };
    if let Some(scheduler) = args.scheduler {
        config.scheduler = scheduler.into();
    }
    if let Some(resolver) = args.resolver {
        config.resolver = resolver.into();
    }
    config.validate()?;

    let library = match &args.templates {
        Some(path) => load_templates(path)?,
        None => default_templates(),
    };
    let encounters = library.encounters().to_vec();
    if encounters.is_empty() {
        return Err(SimError::NoEncounters);
    }
    let templates: Arc<dyn TemplateSource> = Arc::new(library);

    let seed = args.seed.unwrap_or_else(|| rand::random());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    info!(seed, scheduler = ?config.scheduler, resolver = ?config.resolver, "starting simulation");

    let policy = PlayerPolicy {
        use_ring: args.press_ring,
        ..PlayerPolicy::default()
    };
    let mut party = PartyRecord::new()
        .with_member("Hero", 6)
        .with_member("Rogue", 6)
        .with_item(policy.potion.clone(), args.potions);

    let mut tally = Tally::default();
    for _ in 0..args.battles {
        let encounter = &encounters[rng.gen_range(0..encounters.len())];
        let mut battle = Battle::from_encounter(
            &party,
            encounter,
            Arc::clone(&templates),
            config.clone(),
            rng.gen(),
        )?;
        info!(encounter = %encounter.name, "encounter");

        let run = BattleRun::run(&mut battle, &mut party, &policy, args.dt, args.max_ticks)?;
        if let Some(rewards) = &run.rewards {
            info!("{}", rewards.summary());
        }
        tally.record(&run);
    }

    if args.json {
        let report = Report {
            seed,
            scheduler: config.scheduler,
            resolver: config.resolver,
            tally: &tally,
            win_rate: tally.win_rate(),
            crit_rate: tally.crit_rate(),
            party: &party,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("seed {seed}: {} battles", tally.battles);
        println!(
            "  victories {}  defeats {}  timeouts {}  (win rate {:.1}%)",
            tally.victories,
            tally.defeats,
            tally.timeouts,
            tally.win_rate()
        );
        println!(
            "  actions {}  crits {} ({:.1}%)  counters {}  potions used {}",
            tally.actions,
            tally.crits,
            tally.crit_rate(),
            tally.counters,
            tally.potions_used
        );
        println!("  xp {}  gold {}", tally.total_xp, tally.total_gold);
        for entry in &party.inventory {
            println!("  {} x{}", entry.item, entry.amount);
        }
    }
    Ok(())
}
