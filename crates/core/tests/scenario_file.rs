use std::fs;
use std::path::{Path, PathBuf};

use game_core::{ActorKind, PlayerCommand, Scenario, SimError, Simulation, SpellId};
use tempfile::tempdir;

fn make_test_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

const ARENA: &str = r#"{
    "name": "hydra pit",
    "seed": 77,
    "width": 12,
    "height": 10,
    "player": { "y": 5, "x": 2 },
    "creatures": [
        { "kind": "hydra", "pos": { "y": 5, "x": 9 } },
        { "kind": "acolyte", "pos": { "y": 2, "x": 9 }, "spells": ["ember"] }
    ],
    "commands": [
        { "action": "move", "dy": 0, "dx": 1 },
        { "action": "wait" }
    ],
    "config": { "arena_mode": true, "action_costs": { "wait": 400 } },
    "spells": [
        { "id": "ember", "mana_cost": 2, "range": 4.0, "cooldown": 1,
          "effect": { "type": "bolt", "damage": 1 } }
    ]
}"#;

#[test]
fn scenario_loads_from_disk_and_runs() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "arena.json");
    fs::write(&path, ARENA).unwrap();

    let scenario = Scenario::load_json(&path).unwrap();
    assert_eq!(scenario.name, "hydra pit");
    assert_eq!(scenario.commands.len(), 2);
    assert!(scenario.config.arena_mode);
    assert_eq!(scenario.config.action_costs.wait, 400);
    assert_eq!(scenario.config.action_costs.move_cost, 1000, "unspecified costs keep defaults");

    let mut sim = Simulation::from_scenario(&scenario).unwrap();
    let acolyte = sim
        .world()
        .actors
        .values()
        .find(|actor| actor.kind == ActorKind::Acolyte)
        .map(|actor| actor.id)
        .unwrap();
    assert_eq!(sim.world().actors[acolyte].known_spells, vec![SpellId::from("ember")]);
    assert!(sim.world().actors[acolyte].brain.as_ref().unwrap().keep_target);

    for command in scenario.commands.iter().copied().cycle().take(8) {
        sim.step(command);
    }
    assert_eq!(sim.world().turn, 8);
}

#[test]
fn missing_scenario_file_reports_its_path() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "nope.json");

    match Scenario::load_json(&path) {
        Err(SimError::Io { path: reported, .. }) => assert_eq!(reported, path),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("loading a missing file must fail"),
    }
}

#[test]
fn malformed_scenario_file_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "broken.json");
    fs::write(&path, r#"{ "width": 10, "height": "tall" }"#).unwrap();

    assert!(matches!(Scenario::load_json(&path), Err(SimError::Parse(_))));
}

#[test]
fn scripted_commands_round_trip_through_the_scenario_format() {
    let scenario = Scenario::from_json_str(ARENA).unwrap();
    assert_eq!(
        scenario.commands,
        vec![PlayerCommand::Move { dy: 0, dx: 1 }, PlayerCommand::Wait]
    );
}
