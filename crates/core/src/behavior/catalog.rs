use std::collections::BTreeMap;

use tracing::debug;

use super::tree::{Condition, Node};
use crate::ai::TurnContext;
use crate::content::{keys, spawn_adjacent};
use crate::state::World;
use crate::types::*;

/// Archetype-specific leaf behavior that overrides the generic executor for one action id.
pub type CustomAction = fn(&mut World, EntityId, &TurnContext) -> ActionOutcome;

/// Health percentage below which a hydra tries to regrow.
const HYDRA_REGROW_THRESHOLD: u32 = 50;

pub struct BehaviorProfile {
    pub tree: Node,
    actions: BTreeMap<ActionId, CustomAction>,
    spell_priorities: BTreeMap<SpellId, u32>,
}

impl BehaviorProfile {
    pub fn new(tree: Node) -> Self {
        Self { tree, actions: BTreeMap::new(), spell_priorities: BTreeMap::new() }
    }

    pub fn with_action(mut self, id: ActionId, action: CustomAction) -> Self {
        self.actions.insert(id, action);
        self
    }

    /// Lower numbers win during spell selection.
    pub fn with_spell_priority(mut self, spell: &str, priority: u32) -> Self {
        self.spell_priorities.insert(SpellId::from(spell), priority);
        self
    }

    pub fn custom_action(&self, id: ActionId) -> Option<CustomAction> {
        self.actions.get(&id).copied()
    }

    pub fn spell_priority(&self, spell: &SpellId) -> Option<u32> {
        self.spell_priorities.get(spell).copied()
    }

    pub fn has_spell_priorities(&self) -> bool {
        !self.spell_priorities.is_empty()
    }
}

/// Registry of behavior profiles, built once and read-only afterwards.
pub struct BehaviorCatalog {
    profiles: BTreeMap<Archetype, BehaviorProfile>,
}

impl BehaviorCatalog {
    pub fn empty() -> Self {
        Self { profiles: BTreeMap::new() }
    }

    pub fn builtin() -> Self {
        Self::empty()
            .with_profile(Archetype::MeleeDefault, BehaviorProfile::new(melee_tree()))
            .with_profile(Archetype::RangedKiter, BehaviorProfile::new(kiter_tree()))
            .with_profile(
                Archetype::Spellcaster,
                BehaviorProfile::new(spellcaster_tree())
                    .with_spell_priority(keys::SPELL_FIREBOLT, 1)
                    .with_spell_priority(keys::SPELL_FROST_SHARD, 2)
                    .with_spell_priority(keys::SPELL_MEND, 3),
            )
            .with_profile(
                Archetype::Summoner,
                BehaviorProfile::new(summoner_tree())
                    .with_spell_priority(keys::SPELL_RAISE_SKELETON, 1)
                    .with_spell_priority(keys::SPELL_FROST_SHARD, 2),
            )
            .with_profile(
                Archetype::Stationary,
                BehaviorProfile::new(stationary_tree())
                    .with_spell_priority(keys::SPELL_SPIT, 1)
                    .with_action(ActionId::SeekPlayer, acquire_target),
            )
            .with_profile(
                Archetype::Hydra,
                BehaviorProfile::new(hydra_tree()).with_action(ActionId::Regrow, regrow),
            )
    }

    pub fn with_profile(mut self, archetype: Archetype, profile: BehaviorProfile) -> Self {
        self.profiles.insert(archetype, profile);
        self
    }

    pub fn profile(&self, archetype: Archetype) -> Option<&BehaviorProfile> {
        self.profiles.get(&archetype)
    }
}

impl Default for BehaviorCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn without_target() -> Node {
    Node::branch(
        Condition::PlayerExists,
        Node::leaf(ActionId::SeekPlayer),
        Node::leaf(ActionId::MoveRandomly),
    )
}

fn with_target(when: Node) -> Node {
    Node::branch(Condition::HasTarget, when, without_target())
}

fn attack_or_approach(attack: ActionId) -> Node {
    Node::branch(
        Condition::TargetInAttackRange,
        Node::branch(Condition::AttackReady, Node::leaf(attack), Node::leaf(ActionId::Idle)),
        Node::leaf(ActionId::MoveTowardTarget),
    )
}

fn cast_when_possible(fallback: Node) -> Node {
    Node::branch(
        Condition::All(vec![
            Condition::SpellSelected,
            Condition::SpellInRange,
            Condition::SpellHasLineOfSight,
        ]),
        Node::leaf(ActionId::CastSpell),
        fallback,
    )
}

fn melee_tree() -> Node {
    with_target(attack_or_approach(ActionId::MeleeAttack))
}

fn kiter_tree() -> Node {
    with_target(Node::branch(
        Condition::TargetTooClose,
        Node::leaf(ActionId::MoveAwayFromTarget),
        attack_or_approach(ActionId::RangedAttack),
    ))
}

fn spellcaster_tree() -> Node {
    with_target(cast_when_possible(attack_or_approach(ActionId::MeleeAttack)))
}

fn summoner_tree() -> Node {
    with_target(Node::branch(
        Condition::TargetTooClose,
        Node::leaf(ActionId::MoveAwayFromTarget),
        cast_when_possible(attack_or_approach(ActionId::MeleeAttack)),
    ))
}

fn stationary_tree() -> Node {
    Node::branch(
        Condition::HasTarget,
        cast_when_possible(Node::leaf(ActionId::Idle)),
        Node::branch(
            Condition::PlayerExists,
            Node::leaf(ActionId::SeekPlayer),
            Node::leaf(ActionId::Idle),
        ),
    )
}

fn hydra_tree() -> Node {
    with_target(Node::branch(
        Condition::All(vec![
            Condition::HealthBelowPercent(HYDRA_REGROW_THRESHOLD),
            Condition::SpecialReady,
        ]),
        Node::leaf(ActionId::Regrow),
        attack_or_approach(ActionId::MeleeAttack),
    ))
}

/// Stationary actors lock onto the player without moving.
fn acquire_target(world: &mut World, id: EntityId, _ctx: &TurnContext) -> ActionOutcome {
    let Some(player_id) = world.player_id else {
        return ActionOutcome::failed();
    };
    let Some(brain) = world.actors.get_mut(id).and_then(|actor| actor.brain.as_mut()) else {
        return ActionOutcome::failed();
    };
    brain.target = Some(player_id);
    ActionOutcome::done()
}

/// Heals a quarter of max health and sprouts a new head next to the body.
fn regrow(world: &mut World, id: EntityId, _ctx: &TurnContext) -> ActionOutcome {
    let turn = world.turn;
    let Some(actor) = world.actors.get_mut(id) else {
        return ActionOutcome::failed();
    };
    let Some(pos) = actor.pos else {
        return ActionOutcome::failed();
    };
    let healed = actor.health.as_mut().map_or(0, |hp| {
        let amount = hp.max / 4;
        hp.restore(amount)
    });
    if let Some(brain) = actor.brain.as_mut() {
        brain.last_special_at = Some(brain.last_special_at.map_or(turn, |at| at.max(turn)));
    }
    world.narrate(LogEvent::Regrew { actor: id, healed });
    if let Some(head) = spawn_adjacent(world, ActorKind::HydraHead, pos) {
        let kind = ActorKind::HydraHead;
        world.narrate(LogEvent::Summoned { summoner: id, minion: head, kind });
    } else {
        debug!(?id, "no room to sprout a hydra head");
    }
    ActionOutcome::done()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn every_archetype_has_a_profile() {
        let catalog = BehaviorCatalog::builtin();
        for archetype in [
            Archetype::MeleeDefault,
            Archetype::RangedKiter,
            Archetype::Summoner,
            Archetype::Spellcaster,
            Archetype::Stationary,
            Archetype::Hydra,
        ] {
            assert!(catalog.profile(archetype).is_some(), "{archetype:?} missing");
        }
    }

    #[test]
    fn stationary_tree_never_moves() {
        let catalog = BehaviorCatalog::builtin();
        let profile = catalog.profile(Archetype::Stationary).expect("stationary profile");
        for leaf in profile.tree.leaves() {
            assert!(
                matches!(leaf, ActionId::Idle | ActionId::CastSpell | ActionId::SeekPlayer),
                "unexpected turret leaf {leaf}"
            );
        }
        assert!(profile.custom_action(ActionId::SeekPlayer).is_some(), "turrets must not chase");
    }

    #[test]
    fn untargeted_actors_seek_the_player_or_wander() {
        let catalog = BehaviorCatalog::builtin();
        let profile = catalog.profile(Archetype::MeleeDefault).expect("melee profile");
        let actor = brained_actor();
        let mut ctx = kiter_context(f64::INFINITY);
        ctx.target = None;
        assert_eq!(profile.tree.evaluate(&actor, &ctx), ActionId::SeekPlayer);
        ctx.player_exists = false;
        assert_eq!(profile.tree.evaluate(&actor, &ctx), ActionId::MoveRandomly);
    }

    #[test]
    fn wounded_hydra_prefers_regrow_over_attacking() {
        let catalog = BehaviorCatalog::builtin();
        let profile = catalog.profile(Archetype::Hydra).expect("hydra profile");
        let mut actor = brained_actor();
        if let Some(brain) = actor.brain.as_mut() {
            brain.special_cooldown = 10;
        }
        let mut ctx = kiter_context(1.0);
        ctx.preferred_min_dist = 0.0;
        ctx.attack_range = 1.5;
        ctx.turn = 20;

        assert_eq!(profile.tree.evaluate(&actor, &ctx), ActionId::MeleeAttack);

        if let Some(hp) = actor.health.as_mut() {
            hp.current = 4;
        }
        assert_eq!(profile.tree.evaluate(&actor, &ctx), ActionId::Regrow);

        if let Some(brain) = actor.brain.as_mut() {
            brain.last_special_at = Some(15);
        }
        assert_eq!(profile.tree.evaluate(&actor, &ctx), ActionId::MeleeAttack);
    }
}
