use anyhow::{Result, bail};
use clap::Parser;
use game_core::content::spawn_actor;
use game_core::energy::MIN_SPEED;
use game_core::{ActorKind, Map, PlayerCommand, Pos, SimConfig, Simulation, World};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 1000)]
    turns: u32,
    #[arg(short, long, default_value_t = 8)]
    creatures: u32,
}

const CREATURES: [ActorKind; 7] = [
    ActorKind::Goblin,
    ActorKind::Archer,
    ActorKind::Acolyte,
    ActorKind::Necromancer,
    ActorKind::Skeleton,
    ActorKind::Turret,
    ActorKind::Hydra,
];

const COMMANDS: [PlayerCommand; 9] = [
    PlayerCommand::Wait,
    PlayerCommand::Move { dy: -1, dx: 0 },
    PlayerCommand::Move { dy: -1, dx: 1 },
    PlayerCommand::Move { dy: 0, dx: 1 },
    PlayerCommand::Move { dy: 1, dx: 1 },
    PlayerCommand::Move { dy: 1, dx: 0 },
    PlayerCommand::Move { dy: 1, dx: -1 },
    PlayerCommand::Move { dy: 0, dx: -1 },
    PlayerCommand::Move { dy: -1, dx: -1 },
];

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn random_pos(rng: &mut ChaCha8Rng, width: i32, height: i32) -> Pos {
    let y = 1 + (rng.next_u64() % (height - 2) as u64) as i32;
    let x = 1 + (rng.next_u64() % (width - 2) as u64) as i32;
    Pos { y, x }
}

fn build_world(rng: &mut ChaCha8Rng, creatures: u32) -> World {
    let (width, height) = (24, 16);
    let mut world = World::new(Map::new(width as usize, height as usize), SimConfig::default());
    spawn_actor(&mut world, ActorKind::Player, random_pos(rng, width, height));
    for _ in 0..creatures {
        let pos = random_pos(rng, width, height);
        if world.is_open(pos) {
            let kind = choose(rng, &CREATURES);
            spawn_actor(&mut world, kind, pos);
        }
    }
    world
}

fn check_invariants(sim: &Simulation) -> Result<()> {
    let world = sim.world();
    for actor in world.actors.values() {
        if let Some(hp) = &actor.health
            && hp.current > hp.max
        {
            bail!("Invariant failed: {:?} HP {} > max {}", actor.kind, hp.current, hp.max);
        }
        if let Some(pos) = actor.pos
            && !world.map.is_walkable(pos)
        {
            bail!("Invariant failed: {:?} inside a wall at {:?}", actor.kind, pos);
        }
        if let Some(ledger) = &actor.energy
            && ledger.current_speed() < MIN_SPEED
        {
            bail!("Invariant failed: {:?} speed below the floor", actor.kind);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    println!("Starting Fuzz harness on seed {} for max {} turns...", args.seed, args.turns);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let world = build_world(&mut rng, args.creatures);
    let mut sim = Simulation::new(args.seed, world);

    let mut ai_turns = 0;
    for _ in 0..args.turns {
        if sim.is_finished() {
            break;
        }
        let report = sim.step(choose(&mut rng, &COMMANDS));
        if let Some(tick) = &report.tick
            && tick.turns.len() > sim.world().config.scheduler.max_ai_actions_per_tick
        {
            bail!("Invariant failed: tick {} exceeded the AI cap", tick.tick);
        }
        ai_turns += report.ai_turns.len();
        check_invariants(&sim)?;
    }

    let outcome = if sim.world().player().is_none() { "defeat" } else { "survived" };
    println!(
        "Fuzzing complete: {} after {} turns, {} AI turns. Hash: {}",
        outcome,
        sim.world().turn,
        ai_turns,
        sim.snapshot_hash()
    );
    Ok(())
}
