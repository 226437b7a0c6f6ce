use serde::{Deserialize, Serialize};

use crate::ai::{TurnContext, cooldown_elapsed};
use crate::state::Actor;
use crate::types::ActionId;

/// Pure predicate over an actor and its turn context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    HasTarget,
    PlayerExists,
    /// Target is at or inside the preferred minimum distance.
    TargetTooClose,
    TargetInAttackRange,
    AttackReady,
    SpellSelected,
    SpellInRange,
    /// Bolts need a clear line to the target; other effects pass.
    SpellHasLineOfSight,
    HealthBelowPercent(u32),
    SpecialReady,
    Not(Box<Condition>),
    All(Vec<Condition>),
}

impl Condition {
    pub fn holds(&self, actor: &Actor, ctx: &TurnContext) -> bool {
        match self {
            Condition::HasTarget => ctx.target.is_some(),
            Condition::PlayerExists => ctx.player_exists,
            Condition::TargetTooClose => ctx.distance_to_target <= ctx.preferred_min_dist,
            Condition::TargetInAttackRange => {
                ctx.distance_to_target > ctx.preferred_min_dist
                    && ctx.distance_to_target <= ctx.attack_range
            }
            Condition::AttackReady => {
                let last = actor.brain.as_ref().and_then(|brain| brain.last_attack_at);
                cooldown_elapsed(last, ctx.turn, ctx.attack_cooldown)
            }
            Condition::SpellSelected => ctx.spell.is_some(),
            Condition::SpellInRange => ctx.spell.as_ref().is_some_and(|spell| {
                spell.is_self_targeted() || ctx.distance_to_target <= spell.range
            }),
            Condition::SpellHasLineOfSight => ctx
                .spell
                .as_ref()
                .is_some_and(|spell| !spell.needs_line_of_sight() || ctx.has_clear_shot),
            Condition::HealthBelowPercent(threshold) => {
                actor.health.as_ref().is_some_and(|hp| hp.percent() < *threshold)
            }
            Condition::SpecialReady => actor.brain.as_ref().is_some_and(|brain| {
                cooldown_elapsed(brain.last_special_at, ctx.turn, brain.special_cooldown)
            }),
            Condition::Not(inner) => !inner.holds(actor, ctx),
            Condition::All(all) => all.iter().all(|condition| condition.holds(actor, ctx)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Branch { when: Condition, then: Box<Node>, otherwise: Box<Node> },
    Leaf(ActionId),
}

impl Node {
    pub fn leaf(action: ActionId) -> Node {
        Node::Leaf(action)
    }

    pub fn branch(when: Condition, then: Node, otherwise: Node) -> Node {
        Node::Branch { when, then: Box::new(then), otherwise: Box::new(otherwise) }
    }

    /// Descends from this node to a leaf. Always terminates since trees are finite and acyclic.
    pub fn evaluate(&self, actor: &Actor, ctx: &TurnContext) -> ActionId {
        let mut node = self;
        loop {
            match node {
                Node::Leaf(action) => return *action,
                Node::Branch { when, then, otherwise } => {
                    node = if when.holds(actor, ctx) { then } else { otherwise };
                }
            }
        }
    }

    pub fn leaves(&self) -> Vec<ActionId> {
        match self {
            Node::Leaf(action) => vec![*action],
            Node::Branch { then, otherwise, .. } => {
                let mut leaves = then.leaves();
                leaves.extend(otherwise.leaves());
                leaves
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::SelectedSpell;
    use crate::content::SpellEffect;
    use crate::test_support::*;
    use crate::types::SpellId;

    fn kiter_tree() -> Node {
        Node::branch(
            Condition::TargetTooClose,
            Node::leaf(ActionId::MoveAwayFromTarget),
            Node::branch(
                Condition::TargetInAttackRange,
                Node::leaf(ActionId::RangedAttack),
                Node::leaf(ActionId::MoveTowardTarget),
            ),
        )
    }

    #[test]
    fn distance_bands_route_to_retreat_attack_and_approach() {
        let actor = brained_actor();
        let tree = kiter_tree();
        let cases = [
            (2.0, ActionId::MoveAwayFromTarget),
            (3.0, ActionId::MoveAwayFromTarget),
            (4.0, ActionId::RangedAttack),
            (5.0, ActionId::RangedAttack),
            (7.0, ActionId::MoveTowardTarget),
            (f64::INFINITY, ActionId::MoveTowardTarget),
        ];
        for (distance, expected) in cases {
            let ctx = kiter_context(distance);
            assert_eq!(tree.evaluate(&actor, &ctx), expected, "distance {distance}");
            assert_eq!(tree.evaluate(&actor, &ctx), expected, "evaluation must be repeatable");
        }
    }

    #[test]
    fn attack_readiness_tracks_cooldown_stamp() {
        let mut actor = brained_actor();
        let mut ctx = kiter_context(4.0);
        ctx.attack_cooldown = 3;
        assert!(Condition::AttackReady.holds(&actor, &ctx), "never attacked means ready");

        if let Some(brain) = actor.brain.as_mut() {
            brain.last_attack_at = Some(10);
        }
        ctx.turn = 12;
        assert!(!Condition::AttackReady.holds(&actor, &ctx));
        ctx.turn = 13;
        assert!(Condition::AttackReady.holds(&actor, &ctx));
    }

    #[test]
    fn composite_conditions_combine_children() {
        let actor = brained_actor();
        let ctx = kiter_context(4.0);
        let both = Condition::All(vec![Condition::HasTarget, Condition::TargetInAttackRange]);
        assert!(both.holds(&actor, &ctx));
        assert!(!Condition::Not(Box::new(both)).holds(&actor, &ctx));
        assert!(Condition::All(vec![]).holds(&actor, &ctx));
    }

    #[test]
    fn heals_are_always_in_range() {
        let actor = brained_actor();
        let mut ctx = kiter_context(f64::INFINITY);
        ctx.spell = Some(SelectedSpell {
            id: SpellId::from("mend"),
            mana_cost: 6,
            range: 0.0,
            effect: SpellEffect::Heal { amount: 8 },
        });
        assert!(Condition::SpellInRange.holds(&actor, &ctx));

        ctx.spell = Some(SelectedSpell {
            id: SpellId::from("spit"),
            mana_cost: 0,
            range: 5.0,
            effect: SpellEffect::Bolt { damage: 2 },
        });
        assert!(!Condition::SpellInRange.holds(&actor, &ctx));
    }

    #[test]
    fn walled_off_bolts_fail_the_sight_check() {
        let actor = brained_actor();
        let mut ctx = kiter_context(4.0);
        ctx.spell = Some(SelectedSpell {
            id: SpellId::from("spit"),
            mana_cost: 0,
            range: 5.0,
            effect: SpellEffect::Bolt { damage: 2 },
        });
        assert!(Condition::SpellHasLineOfSight.holds(&actor, &ctx));
        ctx.has_clear_shot = false;
        assert!(!Condition::SpellHasLineOfSight.holds(&actor, &ctx));

        ctx.spell = Some(SelectedSpell {
            id: SpellId::from("mend"),
            mana_cost: 6,
            range: 0.0,
            effect: SpellEffect::Heal { amount: 8 },
        });
        assert!(Condition::SpellHasLineOfSight.holds(&actor, &ctx), "heals need no sight line");
    }

    #[test]
    fn trees_deserialize_from_content_json() {
        let json = r#"{ "branch": {
            "when": "has_target",
            "then": { "leaf": "melee_attack" },
            "otherwise": { "branch": {
                "when": { "not": "player_exists" },
                "then": { "leaf": "move_randomly" },
                "otherwise": { "leaf": "seek_player" }
            } }
        } }"#;
        let tree: Node = serde_json::from_str(json).expect("tree JSON should parse");
        assert_eq!(
            tree.leaves(),
            vec![ActionId::MeleeAttack, ActionId::MoveRandomly, ActionId::SeekPlayer]
        );
        let actor = brained_actor();
        let mut ctx = kiter_context(f64::INFINITY);
        ctx.target = None;
        ctx.player_exists = false;
        assert_eq!(tree.evaluate(&actor, &ctx), ActionId::MoveRandomly);
    }
}
