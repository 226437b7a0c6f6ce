//! Per-actor decision engine: builds a turn context, walks the archetype's tree and dispatches
//! the chosen leaf to a custom profile action or the generic executor.
//! It does not own energy accounting: the scheduler checks the chosen leaf's cost between
//! `decide` and `act` and charges for it once the turn is done.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::actions::ActionExecutor;
use crate::behavior::{BehaviorCatalog, BehaviorProfile};
use crate::content::{MELEE_REACH, SpellCatalog, SpellEffect};
use crate::state::{Actor, World};
use crate::types::*;

mod spells;


pub use spells::select_spell;

/// Mutable AI memory carried by an actor. Turn stamps only ever move forward.
#[derive(Clone, Debug)]
pub struct DecisionState {
    /// Archetype implied by the creature's nature, if any.
    pub declared: Option<Archetype>,
    /// Resolved on the first turn and cached; later capability changes do not re-resolve.
    pub archetype: Option<Archetype>,
    pub target: Option<EntityId>,
    pub phase: DecisionPhase,
    pub last_attack_at: Option<u64>,
    pub last_spell_cast: BTreeMap<SpellId, u64>,
    pub last_special_at: Option<u64>,
    pub attack_range: f64,
    pub attack_cooldown: u64,
    pub special_cooldown: u64,
    pub preferred_min_dist: f64,
    pub preferred_max_dist: f64,
    /// Arena combat keeps the target even after it dies.
    pub keep_target: bool,
}

impl Default for DecisionState {
    fn default() -> Self {
        Self {
            declared: None,
            archetype: None,
            target: None,
            phase: DecisionPhase::Idle,
            last_attack_at: None,
            last_spell_cast: BTreeMap::new(),
            last_special_at: None,
            attack_range: MELEE_REACH,
            attack_cooldown: 0,
            special_cooldown: 0,
            preferred_min_dist: 0.0,
            preferred_max_dist: MELEE_REACH,
            keep_target: false,
        }
    }
}

/// A never-used ability is always ready.
pub(crate) fn cooldown_elapsed(last_used_at: Option<u64>, turn: u64, cooldown: u64) -> bool {
    last_used_at.is_none_or(|at| turn.saturating_sub(at) >= cooldown)
}

fn stamp(slot: &mut Option<u64>, turn: u64) {
    *slot = Some(slot.map_or(turn, |at| at.max(turn)));
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectedSpell {
    pub id: SpellId,
    pub mana_cost: i32,
    pub range: f64,
    pub effect: SpellEffect,
}

impl SelectedSpell {
    /// Heals land on the caster, so range never gates them.
    pub fn is_self_targeted(&self) -> bool {
        matches!(self.effect, SpellEffect::Heal { .. })
    }

    pub fn needs_line_of_sight(&self) -> bool {
        matches!(self.effect, SpellEffect::Bolt { .. })
    }
}

/// Snapshot of everything a decision tree may look at, rebuilt every turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnContext {
    pub turn: u64,
    pub target: Option<EntityId>,
    /// Infinite when either position cannot be resolved.
    pub distance_to_target: f64,
    pub attack_range: f64,
    pub attack_cooldown: u64,
    pub preferred_min_dist: f64,
    pub preferred_max_dist: f64,
    pub player_exists: bool,
    /// Nothing blocks a straight line from the actor to its target.
    pub has_clear_shot: bool,
    pub spell: Option<SelectedSpell>,
}

/// A leaf chosen for one actor, together with the context it was chosen in.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub actor: EntityId,
    pub archetype: Archetype,
    pub action: ActionId,
    pub ctx: TurnContext,
}

impl Decision {
    pub fn cost(&self) -> ActionKind {
        self.action.cost_kind()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TurnReport {
    pub actor: EntityId,
    pub archetype: Archetype,
    pub action: ActionId,
    pub outcome: ActionOutcome,
    pub phase: DecisionPhase,
}

/// Infers an archetype from innate capabilities when the creature does not declare one.
pub fn resolve_archetype(actor: &Actor) -> Archetype {
    let brain = actor.brain.as_ref();
    if let Some(declared) = brain.and_then(|brain| brain.declared) {
        return declared;
    }
    if !actor.known_spells.is_empty() {
        return Archetype::Spellcaster;
    }
    if brain.is_some_and(|brain| brain.attack_range > MELEE_REACH) {
        return Archetype::RangedKiter;
    }
    Archetype::MeleeDefault
}

pub struct DecisionEngine<'a> {
    catalog: &'a BehaviorCatalog,
    spells: &'a SpellCatalog,
}

impl<'a> DecisionEngine<'a> {
    pub fn new(catalog: &'a BehaviorCatalog, spells: &'a SpellCatalog) -> Self {
        Self { catalog, spells }
    }

    /// Runs one AI turn for `id` without any energy checks. Returns `None` when the actor has no
    /// brain, no profile, or no longer exists.
    pub fn take_turn(
        &self,
        world: &mut World,
        executor: &mut dyn ActionExecutor,
        id: EntityId,
    ) -> Option<TurnReport> {
        let decision = self.decide(world, id)?;
        self.act(world, executor, decision)
    }

    /// Walks the actor's tree and returns the chosen leaf. Nothing is executed yet, though the
    /// archetype gets cached and a vanished target is forgotten.
    pub fn decide(&self, world: &mut World, id: EntityId) -> Option<Decision> {
        let archetype = self.prepare(world, id)?;
        let Some(profile) = self.catalog.profile(archetype) else {
            debug!(?id, ?archetype, "no behavior profile registered");
            return None;
        };

        let actor = world.actors.get(id)?;
        let ctx = self.build_context(world, actor, profile);
        let action = profile.tree.evaluate(actor, &ctx);
        trace!(?id, %action, distance = ctx.distance_to_target, "decision");
        Some(Decision { actor: id, archetype, action, ctx })
    }

    /// Dispatches a decision to the profile override or the executor and folds the outcome into
    /// the actor's decision state.
    pub fn act(
        &self,
        world: &mut World,
        executor: &mut dyn ActionExecutor,
        decision: Decision,
    ) -> Option<TurnReport> {
        let Decision { actor: id, archetype, action, ctx } = decision;
        let profile = self.catalog.profile(archetype)?;
        let outcome = match profile.custom_action(action) {
            Some(custom) => custom(world, id, &ctx),
            None => executor.execute(world, action, id, &ctx),
        };

        let phase = DecisionPhase::for_action(action);
        let turn = world.turn;
        if let Some(brain) = world.actors.get_mut(id).and_then(|actor| actor.brain.as_mut()) {
            brain.phase = phase;
            if action.is_offensive() {
                stamp(&mut brain.last_attack_at, turn);
            }
            if action == ActionId::CastSpell
                && outcome.success
                && let Some(spell) = &ctx.spell
            {
                let at = brain.last_spell_cast.entry(spell.id.clone()).or_insert(turn);
                *at = (*at).max(turn);
            }
            if outcome.is_dead && !brain.keep_target {
                brain.target = None;
            }
        }

        Some(TurnReport { actor: id, archetype, action, outcome, phase })
    }

    /// Caches the archetype on first use and forgets targets that left the world.
    fn prepare(&self, world: &mut World, id: EntityId) -> Option<Archetype> {
        let actor = world.actors.get(id)?;
        let brain = actor.brain.as_ref()?;
        let archetype = brain.archetype.unwrap_or_else(|| resolve_archetype(actor));
        let stale_target = brain.target.filter(|target| !world.actors.contains_key(*target));

        let brain = world.actors.get_mut(id)?.brain.as_mut()?;
        brain.archetype = Some(archetype);
        if stale_target.is_some() {
            trace!(?id, "target no longer exists");
            brain.target = None;
        }
        Some(archetype)
    }

    pub fn build_context(
        &self,
        world: &World,
        actor: &Actor,
        profile: &BehaviorProfile,
    ) -> TurnContext {
        let fallback = DecisionState::default();
        let brain = actor.brain.as_ref().unwrap_or(&fallback);
        let target = brain.target.filter(|target| world.actors.contains_key(*target));
        let target_pos = target.and_then(|t| world.position_of(t));
        let (distance_to_target, has_clear_shot) = match (actor.pos, target_pos) {
            (Some(from), Some(to)) => (from.distance(to), world.map.has_line_of_sight(from, to)),
            _ => (f64::INFINITY, false),
        };
        TurnContext {
            turn: world.turn,
            target,
            distance_to_target,
            attack_range: brain.attack_range,
            attack_cooldown: brain.attack_cooldown,
            preferred_min_dist: brain.preferred_min_dist,
            preferred_max_dist: brain.preferred_max_dist,
            player_exists: world.player().is_some(),
            has_clear_shot,
            spell: select_spell(actor, profile, self.spells, world.turn),
        }
    }
}
