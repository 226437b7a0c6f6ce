use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::error::SimError;

new_key_type! {
    pub struct EntityId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn offset(self, dy: i32, dx: i32) -> Pos {
        Pos { y: self.y + dy, x: self.x + dx }
    }

    /// Euclidean distance in tiles.
    pub fn distance(self, other: Pos) -> f64 {
        let dy = f64::from(self.y - other.y);
        let dx = f64::from(self.x - other.x);
        (dy * dy + dx * dx).sqrt()
    }

    /// The eight surrounding tiles, clockwise from north.
    pub fn neighbors(self) -> [Pos; 8] {
        [
            self.offset(-1, 0),
            self.offset(-1, 1),
            self.offset(0, 1),
            self.offset(1, 1),
            self.offset(1, 0),
            self.offset(1, -1),
            self.offset(0, -1),
            self.offset(-1, -1),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TileKind {
    Wall,
    Floor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Player,
    Goblin,
    Archer,
    Acolyte,
    Necromancer,
    Skeleton,
    Turret,
    Hydra,
    HydraHead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Move,
    Attack,
    Use,
    Cast,
    Wait,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    MeleeDefault,
    RangedKiter,
    Summoner,
    Spellcaster,
    Stationary,
    Hydra,
}

/// Coarse AI state derived from the last dispatched action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPhase {
    #[default]
    Idle,
    Seeking,
    Engaging,
    Retreating,
    Casting,
}

impl DecisionPhase {
    pub fn for_action(action: ActionId) -> Self {
        match action {
            ActionId::SeekPlayer | ActionId::MoveTowardTarget => DecisionPhase::Seeking,
            ActionId::MeleeAttack | ActionId::RangedAttack => DecisionPhase::Engaging,
            ActionId::CastSpell | ActionId::Regrow => DecisionPhase::Casting,
            ActionId::MoveAwayFromTarget => DecisionPhase::Retreating,
            ActionId::MoveRandomly | ActionId::Idle => DecisionPhase::Idle,
        }
    }

    /// Only weapon attacks engage. Casting and regrowing are paid like any other move.
    pub fn is_engaged(self) -> bool {
        matches!(self, DecisionPhase::Engaging)
    }
}

/// Leaf identifier of a decision tree.
///
/// Content refers to actions by their snake_case name; everything past the
/// catalog/executor boundary matches on the enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionId {
    SeekPlayer,
    MoveTowardTarget,
    MoveAwayFromTarget,
    MoveRandomly,
    MeleeAttack,
    RangedAttack,
    CastSpell,
    Regrow,
    Idle,
}

impl ActionId {
    pub const ALL: [ActionId; 9] = [
        ActionId::SeekPlayer,
        ActionId::MoveTowardTarget,
        ActionId::MoveAwayFromTarget,
        ActionId::MoveRandomly,
        ActionId::MeleeAttack,
        ActionId::RangedAttack,
        ActionId::CastSpell,
        ActionId::Regrow,
        ActionId::Idle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionId::SeekPlayer => "seek_player",
            ActionId::MoveTowardTarget => "move_toward_target",
            ActionId::MoveAwayFromTarget => "move_away_from_target",
            ActionId::MoveRandomly => "move_randomly",
            ActionId::MeleeAttack => "melee_attack",
            ActionId::RangedAttack => "ranged_attack",
            ActionId::CastSpell => "cast_spell",
            ActionId::Regrow => "regrow",
            ActionId::Idle => "idle",
        }
    }

    /// Attacks and casts stamp the actor's attack cooldown.
    pub fn is_offensive(self) -> bool {
        matches!(self, ActionId::MeleeAttack | ActionId::RangedAttack | ActionId::CastSpell)
    }

    /// Energy bucket a turn that dispatched this leaf is charged against.
    pub fn cost_kind(self) -> ActionKind {
        if DecisionPhase::for_action(self).is_engaged() {
            ActionKind::Attack
        } else {
            ActionKind::Move
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionId {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionId::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| SimError::UnknownAction(s.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpellId(pub String);

impl SpellId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SpellId {
    fn from(value: &str) -> Self {
        SpellId(value.to_string())
    }
}

impl fmt::Display for SpellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Uniform result of any dispatched action, custom or generic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub damage: Option<i32>,
    pub is_dead: bool,
}

impl ActionOutcome {
    pub fn failed() -> Self {
        Self::default()
    }

    pub fn done() -> Self {
        Self { success: true, ..Self::default() }
    }

    pub fn hit(damage: i32, is_dead: bool) -> Self {
        Self { success: true, damage: Some(damage), is_dead }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Health,
    Mana,
}

/// Player-facing narration. The simulation appends to this journal and never reads it back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEvent {
    Attacked { attacker: EntityId, defender: EntityId, damage: i32 },
    Died { actor: EntityId, kind: ActorKind },
    SpellCast { caster: EntityId, spell: SpellId },
    Summoned { summoner: EntityId, minion: EntityId, kind: ActorKind },
    Regenerated { actor: EntityId, pool: PoolKind, amount: i32 },
    Regrew { actor: EntityId, healed: i32 },
    TickProcessed { tick: u64, actions: u32 },
}
