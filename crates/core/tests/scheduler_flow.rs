use game_core::content::spawn_actor;
use game_core::{
    ActionId, ActorKind, DecisionPhase, LogEvent, Map, PlayerCommand, Pos, SimConfig, Simulation,
    World,
};

fn open_world(width: usize, height: usize) -> World {
    World::new(Map::new(width, height), SimConfig::default())
}

fn player_hp(sim: &Simulation) -> i32 {
    sim.world().player().and_then(|p| p.health.as_ref()).map_or(0, |hp| hp.current)
}

#[test]
fn archer_closes_to_range_then_shoots_without_crowding() {
    let mut world = open_world(16, 9);
    let player = spawn_actor(&mut world, ActorKind::Player, Pos { y: 4, x: 2 });
    let archer = spawn_actor(&mut world, ActorKind::Archer, Pos { y: 4, x: 10 });
    let mut sim = Simulation::new(21, world);

    let mut shots = 0;
    for _ in 0..10 {
        let report = sim.step(PlayerCommand::Wait);
        for turn in report.ai_turns.iter().filter(|turn| turn.actor == archer) {
            if turn.action == ActionId::RangedAttack {
                shots += 1;
                assert_eq!(turn.phase, DecisionPhase::Engaging);
            }
        }
        let world = sim.world();
        let (Some(a), Some(p)) = (world.position_of(archer), world.position_of(player)) else {
            panic!("both actors should survive ten turns");
        };
        assert!(a.distance(p) > 2.0, "archer must keep its distance");
    }

    assert!(shots >= 3, "archer should fire repeatedly once in range, fired {shots}");
    assert!(player_hp(&sim) < 30);
}

#[test]
fn necromancer_raises_a_skeleton_when_the_player_is_in_range() {
    let mut world = open_world(14, 9);
    spawn_actor(&mut world, ActorKind::Player, Pos { y: 4, x: 2 });
    let necro = spawn_actor(&mut world, ActorKind::Necromancer, Pos { y: 4, x: 9 });
    let mut sim = Simulation::new(3, world);

    for _ in 0..4 {
        sim.step(PlayerCommand::Wait);
    }

    let summoned = sim.world().log.iter().any(|event| {
        matches!(event, LogEvent::Summoned { summoner, kind: ActorKind::Skeleton, .. }
            if *summoner == necro)
    });
    assert!(summoned, "necromancer should summon within a few turns");
    let necro_mana = sim.world().actors[necro].mana.as_ref().map(|m| m.current);
    assert!(necro_mana.is_some_and(|mana| mana < 20));
}

#[test]
fn killing_the_player_ends_the_run() {
    let mut world = open_world(8, 8);
    let player = spawn_actor(&mut world, ActorKind::Player, Pos { y: 3, x: 3 });
    spawn_actor(&mut world, ActorKind::Goblin, Pos { y: 3, x: 4 });
    if let Some(hp) = world.actors[player].health.as_mut() {
        hp.current = 1;
    }
    let mut sim = Simulation::new(8, world);

    let mut steps = 0;
    while !sim.is_finished() && steps < 5 {
        sim.step(PlayerCommand::Wait);
        steps += 1;
    }

    assert!(sim.is_finished());
    assert!(sim.world().player_id.is_none());
    assert!(sim.world().log.iter().any(|event| {
        matches!(event, LogEvent::Died { actor, kind: ActorKind::Player } if *actor == player)
    }));

    // The run keeps ticking safely without a player.
    let report = sim.step(PlayerCommand::Wait);
    assert!(report.player_outcome.is_none());
}

#[test]
fn crowded_ticks_spill_over_under_the_backpressure_cap() {
    let mut world = open_world(30, 6);
    for i in 0..8 {
        spawn_actor(&mut world, ActorKind::Skeleton, Pos { y: 2, x: 2 + i * 3 });
    }
    let mut sim = Simulation::new(4, world);

    let report = sim.step(PlayerCommand::Wait);
    let tick = report.tick.expect("tick runs");
    assert_eq!(tick.actions_processed, 5);
    assert_eq!(tick.deferred, 3);
    assert!(report.player_outcome.is_none(), "no player to gate on");
    assert!(sim.world().log.contains(&LogEvent::TickProcessed { tick: 1, actions: 5 }));
}

#[test]
fn global_turn_advances_once_per_step() {
    let mut world = open_world(10, 10);
    spawn_actor(&mut world, ActorKind::Player, Pos { y: 2, x: 2 });
    spawn_actor(&mut world, ActorKind::Skeleton, Pos { y: 7, x: 7 });
    let mut sim = Simulation::new(2, world);

    for expected in 0..12 {
        let report = sim.step(PlayerCommand::Wait);
        assert_eq!(report.turn, expected);
    }
    assert_eq!(sim.world().turn, 12);
    assert_eq!(sim.scheduler().ticks(), 12);
}
