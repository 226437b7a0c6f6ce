//! Generic leaf actions shared by every archetype, plus the movement and combat primitives the
//! player input path reuses.
//! This module does not choose actions; the decision engine hands it an action id.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::ai::TurnContext;
use crate::content::{SpellEffect, spawn_adjacent};
use crate::state::World;
use crate::types::*;

/// Executes any action id a behavior profile does not override.
pub trait ActionExecutor {
    fn execute(
        &mut self,
        world: &mut World,
        action: ActionId,
        actor: EntityId,
        ctx: &TurnContext,
    ) -> ActionOutcome;
}

pub struct StandardExecutor {
    rng: ChaCha8Rng,
}

impl StandardExecutor {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    fn move_randomly(&mut self, world: &mut World, id: EntityId) -> ActionOutcome {
        let Some(pos) = world.position_of(id) else {
            return ActionOutcome::failed();
        };
        let open: Vec<Pos> = pos.neighbors().into_iter().filter(|p| world.is_open(*p)).collect();
        if open.is_empty() {
            return ActionOutcome::failed();
        }
        let pick = open[(self.rng.next_u64() % open.len() as u64) as usize];
        relocate(world, id, pick);
        ActionOutcome::done()
    }
}

impl ActionExecutor for StandardExecutor {
    fn execute(
        &mut self,
        world: &mut World,
        action: ActionId,
        actor: EntityId,
        ctx: &TurnContext,
    ) -> ActionOutcome {
        match action {
            ActionId::SeekPlayer => seek_player(world, actor),
            ActionId::MoveTowardTarget => match target_pos(world, ctx) {
                Some(goal) => step_toward(world, actor, goal),
                None => ActionOutcome::failed(),
            },
            ActionId::MoveAwayFromTarget => match target_pos(world, ctx) {
                Some(threat) => step_away(world, actor, threat),
                None => ActionOutcome::failed(),
            },
            ActionId::MoveRandomly => self.move_randomly(world, actor),
            ActionId::MeleeAttack => attack_target(world, actor, ctx, false),
            ActionId::RangedAttack => attack_target(world, actor, ctx, true),
            ActionId::CastSpell => cast_spell(world, actor, ctx),
            ActionId::Regrow => {
                debug!(?actor, "regrow has no generic implementation");
                ActionOutcome::failed()
            }
            ActionId::Idle => ActionOutcome::done(),
        }
    }
}

fn target_pos(world: &World, ctx: &TurnContext) -> Option<Pos> {
    ctx.target.and_then(|target| world.position_of(target))
}

fn relocate(world: &mut World, id: EntityId, to: Pos) {
    if let Some(actor) = world.actors.get_mut(id) {
        actor.pos = Some(to);
    }
}

fn seek_player(world: &mut World, id: EntityId) -> ActionOutcome {
    let Some(player_id) = world.player_id else {
        return ActionOutcome::failed();
    };
    let Some(brain) = world.actors.get_mut(id).and_then(|actor| actor.brain.as_mut()) else {
        return ActionOutcome::failed();
    };
    brain.target = Some(player_id);
    match world.position_of(player_id) {
        Some(goal) => step_toward(world, id, goal),
        None => ActionOutcome::failed(),
    }
}

/// Takes the open neighbouring step that most reduces distance to `goal`.
pub fn step_toward(world: &mut World, id: EntityId, goal: Pos) -> ActionOutcome {
    let Some(from) = world.position_of(id) else {
        return ActionOutcome::failed();
    };
    let current = from.distance(goal);
    let best = from
        .neighbors()
        .into_iter()
        .filter(|p| world.is_open(*p))
        .map(|p| (p, p.distance(goal)))
        .filter(|(_, d)| *d < current)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    match best {
        Some((to, _)) => {
            relocate(world, id, to);
            ActionOutcome::done()
        }
        None => ActionOutcome::failed(),
    }
}

/// Takes the open neighbouring step that most increases distance from `threat`.
pub fn step_away(world: &mut World, id: EntityId, threat: Pos) -> ActionOutcome {
    let Some(from) = world.position_of(id) else {
        return ActionOutcome::failed();
    };
    let current = from.distance(threat);
    let best = from
        .neighbors()
        .into_iter()
        .filter(|p| world.is_open(*p))
        .map(|p| (p, p.distance(threat)))
        .filter(|(_, d)| *d > current)
        .fold(None::<(Pos, f64)>, |best, candidate| match best {
            Some(b) if b.1 >= candidate.1 => Some(b),
            _ => Some(candidate),
        });
    match best {
        Some((to, _)) => {
            relocate(world, id, to);
            ActionOutcome::done()
        }
        None => ActionOutcome::failed(),
    }
}

fn attack_target(
    world: &mut World,
    id: EntityId,
    ctx: &TurnContext,
    ranged: bool,
) -> ActionOutcome {
    let Some(target) = ctx.target else {
        return ActionOutcome::failed();
    };
    if ctx.distance_to_target > ctx.attack_range {
        return ActionOutcome::failed();
    }
    if ranged && !has_clear_shot(world, id, target) {
        trace!(?id, "no line of sight");
        return ActionOutcome::failed();
    }
    strike(world, id, target)
}

fn has_clear_shot(world: &World, from: EntityId, to: EntityId) -> bool {
    match (world.position_of(from), world.position_of(to)) {
        (Some(a), Some(b)) => world.map.has_line_of_sight(a, b),
        _ => false,
    }
}

/// Resolves a physical blow: `max(1, attack - defense)` damage.
pub fn strike(world: &mut World, attacker: EntityId, defender: EntityId) -> ActionOutcome {
    let Some(attack) = world.actors.get(attacker).and_then(|a| a.combat).map(|c| c.attack) else {
        return ActionOutcome::failed();
    };
    let defense = world.actors.get(defender).and_then(|d| d.combat).map_or(0, |c| c.defense);
    apply_damage(world, attacker, defender, (attack - defense).max(1))
}

/// Damages `defender`'s health and removes it from the world when it drops to zero.
pub fn apply_damage(
    world: &mut World,
    attacker: EntityId,
    defender: EntityId,
    amount: i32,
) -> ActionOutcome {
    let Some(target) = world.actors.get_mut(defender) else {
        return ActionOutcome::failed();
    };
    let kind = target.kind;
    let Some(health) = target.health.as_mut() else {
        return ActionOutcome::failed();
    };
    let is_dead = health.drain(amount);
    world.narrate(LogEvent::Attacked { attacker, defender, damage: amount });
    if is_dead {
        debug!(?defender, ?kind, "actor died");
        world.remove_actor(defender);
        world.narrate(LogEvent::Died { actor: defender, kind });
    }
    ActionOutcome::hit(amount, is_dead)
}

fn cast_spell(world: &mut World, id: EntityId, ctx: &TurnContext) -> ActionOutcome {
    let Some(spell) = &ctx.spell else {
        return ActionOutcome::failed();
    };
    let Some(caster) = world.actors.get(id) else {
        return ActionOutcome::failed();
    };
    if caster.mana_available() < spell.mana_cost {
        return ActionOutcome::failed();
    }
    let Some(origin) = caster.pos else {
        return ActionOutcome::failed();
    };
    if !spell.is_self_targeted() && ctx.distance_to_target > spell.range {
        return ActionOutcome::failed();
    }
    if matches!(spell.effect, SpellEffect::Bolt { .. })
        && !ctx.target.is_some_and(|target| has_clear_shot(world, id, target))
    {
        trace!(?id, spell = %spell.id, "bolt blocked");
        return ActionOutcome::failed();
    }
    if let SpellEffect::Summon { .. } = spell.effect
        && !origin.neighbors().into_iter().any(|p| world.is_open(p))
    {
        return ActionOutcome::failed();
    }

    if spell.mana_cost > 0 {
        let spent = world
            .actors
            .get_mut(id)
            .and_then(|caster| caster.mana.as_mut())
            .is_some_and(|mana| mana.spend(spell.mana_cost));
        if !spent {
            return ActionOutcome::failed();
        }
    }
    world.narrate(LogEvent::SpellCast { caster: id, spell: spell.id.clone() });

    match spell.effect {
        SpellEffect::Bolt { damage } => match ctx.target {
            Some(target) => apply_damage(world, id, target, damage),
            None => ActionOutcome::failed(),
        },
        SpellEffect::Heal { amount } => {
            let healed = world
                .actors
                .get_mut(id)
                .and_then(|caster| caster.health.as_mut())
                .map_or(0, |hp| hp.restore(amount));
            ActionOutcome { success: true, damage: Some(-healed), is_dead: false }
        }
        SpellEffect::Summon { kind } => match spawn_adjacent(world, kind, origin) {
            Some(minion) => {
                world.narrate(LogEvent::Summoned { summoner: id, minion, kind });
                ActionOutcome::done()
            }
            None => ActionOutcome::failed(),
        },
    }
}
