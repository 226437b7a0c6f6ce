use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use game_core::{LogEvent, PlayerCommand, Scenario, Simulation, TickReport};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the scenario file (.json or .toml)
    #[arg(short, long)]
    scenario: PathBuf,
    /// Override the per-tick cap on AI turns
    #[arg(long)]
    max_ai_actions: Option<usize>,
    /// Stop after this many game turns even if the fight is still going
    #[arg(short, long, default_value_t = 500)]
    turns: u64,
    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Default, Serialize)]
struct RunSummary {
    name: String,
    seed: u64,
    turns: u64,
    ticks: u64,
    busy_ticks: u64,
    outcome: &'static str,
    player_hp: Option<i32>,
    creatures_left: usize,
    attacks: usize,
    deaths: usize,
    spells_cast: usize,
    summons: usize,
    snapshot_hash: u64,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let scenario: Scenario = if is_toml {
        toml::from_str(&text).with_context(|| "Failed to deserialize scenario TOML")?
    } else {
        Scenario::from_json_str(&text).with_context(|| "Failed to deserialize scenario JSON")?
    };
    Ok(scenario)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut scenario = load_scenario(&args.scenario)?;
    if let Some(cap) = args.max_ai_actions {
        scenario.config.scheduler.max_ai_actions_per_tick = cap;
    }
    let mut sim = Simulation::from_scenario(&scenario)
        .with_context(|| format!("Scenario {} is not playable", args.scenario.display()))?;

    let busy_ticks = Rc::new(Cell::new(0_u64));
    let counter = Rc::clone(&busy_ticks);
    sim.scheduler_mut().subscribe(Box::new(move |_: &TickReport| counter.set(counter.get() + 1)));

    info!(name = %scenario.name, seed = scenario.seed, "scenario loaded");
    let mut script = scenario.commands.iter().copied().peekable();
    while !sim.is_finished() && sim.world().turn < args.turns {
        let command = script.peek().copied().unwrap_or(PlayerCommand::Wait);
        let report = sim.step(command);
        if report.consumed_command() {
            script.next();
        }
    }

    let summary = summarize(&scenario, &sim, busy_ticks.get());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Run complete: {}", summary.name);
        println!(
            "Outcome: {} after {} turns ({} ticks, {} busy)",
            summary.outcome, summary.turns, summary.ticks, summary.busy_ticks
        );
        println!("Player HP: {:?}", summary.player_hp);
        println!("Creatures left: {}", summary.creatures_left);
        println!(
            "Attacks: {}, deaths: {}, spells: {}, summons: {}",
            summary.attacks, summary.deaths, summary.spells_cast, summary.summons
        );
        println!("Snapshot Hash: {}", summary.snapshot_hash);
    }

    Ok(())
}

fn summarize(scenario: &Scenario, sim: &Simulation, busy_ticks: u64) -> RunSummary {
    let world = sim.world();
    let creatures_left = world.actors.values().filter(|actor| actor.brain.is_some()).count();
    let outcome = match (world.player().is_some(), creatures_left) {
        (false, _) => "defeat",
        (true, 0) => "victory",
        (true, _) => "unfinished",
    };
    let count = |pred: fn(&LogEvent) -> bool| world.log.iter().filter(|event| pred(event)).count();

    RunSummary {
        name: scenario.name.clone(),
        seed: sim.seed(),
        turns: world.turn,
        ticks: sim.scheduler().ticks(),
        busy_ticks,
        outcome,
        player_hp: world.player().and_then(|p| p.health.as_ref()).map(|hp| hp.current),
        creatures_left,
        attacks: count(|event| matches!(event, LogEvent::Attacked { .. })),
        deaths: count(|event| matches!(event, LogEvent::Died { .. })),
        spells_cast: count(|event| matches!(event, LogEvent::SpellCast { .. })),
        summons: count(|event| matches!(event, LogEvent::Summoned { .. })),
        snapshot_hash: sim.snapshot_hash(),
    }
}
