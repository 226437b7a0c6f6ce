//! Serde-loadable scenario descriptions: map, spawns, tunables and a scripted command list.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::content::{SpellCatalog, SpellDef, build_actor};
use crate::error::SimError;
use crate::sim::PlayerCommand;
use crate::state::{Map, World};
use crate::types::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatureSpawn {
    pub kind: ActorKind,
    pub pos: Pos,
    /// Replaces the template's spell list when present.
    #[serde(default)]
    pub spells: Option<Vec<SpellId>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub walls: Vec<Pos>,
    #[serde(default)]
    pub player: Option<Pos>,
    #[serde(default)]
    pub creatures: Vec<CreatureSpawn>,
    #[serde(default)]
    pub commands: Vec<PlayerCommand>,
    #[serde(default)]
    pub config: SimConfig,
    /// Added to the built-in spells, replacing any with the same id.
    #[serde(default)]
    pub spells: Vec<SpellDef>,
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_json(path: &Path) -> Result<Self, SimError> {
        let text = fs::read_to_string(path)
            .map_err(|source| SimError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text)
    }

    pub fn spell_catalog(&self) -> SpellCatalog {
        let mut spells = SpellCatalog::builtin();
        spells.extend(self.spells.iter().cloned());
        spells
    }

    /// Lays out the map and spawns every actor, rejecting overlapping or blocked spawns.
    pub fn build_world(&self, spells: &SpellCatalog) -> Result<World, SimError> {
        if self.width < 3 || self.height < 3 {
            return Err(SimError::InvalidScenario(format!(
                "map must be at least 3x3, got {}x{}",
                self.width, self.height
            )));
        }
        let mut map = Map::new(self.width, self.height);
        for wall in &self.walls {
            if !map.in_bounds(*wall) {
                return Err(invalid("wall", *wall, "is out of bounds"));
            }
            map.set_tile(*wall, TileKind::Wall);
        }

        let mut world = World::new(map, self.config.clone());
        if let Some(pos) = self.player {
            check_spawn(&world, "player", pos)?;
            let player = build_actor(&world, ActorKind::Player, pos);
            world.spawn(player);
        }
        for spawn in &self.creatures {
            if spawn.kind == ActorKind::Player {
                return Err(invalid("creature", spawn.pos, "cannot be a second player"));
            }
            check_spawn(&world, "creature", spawn.pos)?;
            let mut actor = build_actor(&world, spawn.kind, spawn.pos);
            if let Some(known) = &spawn.spells {
                actor.known_spells = known.clone();
            }
            if let Some(missing) = actor.known_spells.iter().find(|id| spells.get(id).is_none()) {
                return Err(SimError::UnknownSpell(missing.clone()));
            }
            world.spawn(actor);
        }
        Ok(world)
    }
}

fn check_spawn(world: &World, what: &str, pos: Pos) -> Result<(), SimError> {
    if !world.map.in_bounds(pos) {
        return Err(invalid(what, pos, "is out of bounds"));
    }
    if !world.map.is_walkable(pos) {
        return Err(invalid(what, pos, "is on a wall"));
    }
    if world.actor_at(pos).is_some() {
        return Err(invalid(what, pos, "overlaps another actor"));
    }
    Ok(())
}

fn invalid(what: &str, pos: Pos, problem: &str) -> SimError {
    SimError::InvalidScenario(format!("{what} at ({}, {}) {problem}", pos.y, pos.x))
}
