//! Shared fixtures for the unit test suites.
//! This module exists to avoid repeating world and context setup across modules.
//! It does not own production gameplay logic.

use crate::ai::{DecisionState, TurnContext};
use crate::config::SimConfig;
use crate::state::{Actor, CombatStats, Map, ResourcePool, World};
use crate::types::*;

pub(crate) fn arena_world(width: usize, height: usize) -> World {
    World::new(Map::new(width, height), SimConfig::default())
}

/// A detached AI actor at full 20/20 health with a default melee brain.
pub(crate) fn brained_actor() -> Actor {
    let mut actor = Actor::new(ActorKind::Goblin);
    actor.pos = Some(Pos { y: 1, x: 1 });
    actor.health = Some(ResourcePool::full(20));
    actor.combat = Some(CombatStats { attack: 3, defense: 0 });
    actor.brain = Some(DecisionState::default());
    actor
}

/// Context for a kiter with `min 3 < in range <= 5` bands, holding a target at `distance`.
pub(crate) fn kiter_context(distance: f64) -> TurnContext {
    TurnContext {
        turn: 0,
        target: Some(EntityId::default()),
        distance_to_target: distance,
        attack_range: 5.0,
        attack_cooldown: 0,
        preferred_min_dist: 3.0,
        preferred_max_dist: 5.0,
        player_exists: true,
        has_clear_shot: true,
        spell: None,
    }
}
