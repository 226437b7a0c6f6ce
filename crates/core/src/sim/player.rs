//! Player input path. The scheduler only gates the player; commands arrive here and pay their
//! own energy cost.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::actions::strike;
use crate::state::World;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerCommand {
    Wait,
    /// One step in any of the eight directions. Stepping into a creature attacks it.
    Move { dy: i32, dx: i32 },
}

/// Applies `command` for the player. Failed commands spend no energy.
pub(super) fn apply_command(world: &mut World, command: PlayerCommand) -> ActionOutcome {
    let Some(player_id) = world.player_id else {
        return ActionOutcome::failed();
    };
    match command {
        PlayerCommand::Wait => {
            if spend(world, player_id, ActionKind::Wait) {
                ActionOutcome::done()
            } else {
                ActionOutcome::failed()
            }
        }
        PlayerCommand::Move { dy, dx } => step_or_bump(world, player_id, dy, dx),
    }
}

fn step_or_bump(world: &mut World, player_id: EntityId, dy: i32, dx: i32) -> ActionOutcome {
    if (dy, dx) == (0, 0) || dy.abs() > 1 || dx.abs() > 1 {
        return ActionOutcome::failed();
    }
    let Some(from) = world.position_of(player_id) else {
        return ActionOutcome::failed();
    };
    let to = from.offset(dy, dx);

    if let Some(defender) = world.actor_at(to) {
        if !spend(world, player_id, ActionKind::Attack) {
            return ActionOutcome::failed();
        }
        return strike(world, player_id, defender);
    }
    if !world.map.is_walkable(to) {
        trace!(?to, "player bumped a wall");
        return ActionOutcome::failed();
    }
    if !spend(world, player_id, ActionKind::Move) {
        return ActionOutcome::failed();
    }
    if let Some(player) = world.actors.get_mut(player_id) {
        player.pos = Some(to);
    }
    ActionOutcome::done()
}

fn spend(world: &mut World, id: EntityId, kind: ActionKind) -> bool {
    world
        .actors
        .get_mut(id)
        .and_then(|actor| actor.energy.as_mut())
        .is_some_and(|ledger| ledger.spend_energy(kind))
}
