use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ai::DecisionState;
use crate::energy::EnergyLedger;
use crate::error::SimError;
use crate::state::{Actor, CombatStats, ResourcePool, World};
use crate::types::*;

pub mod keys {
    pub const SPELL_FIREBOLT: &str = "firebolt";
    pub const SPELL_FROST_SHARD: &str = "frost_shard";
    pub const SPELL_MEND: &str = "mend";
    pub const SPELL_RAISE_SKELETON: &str = "raise_skeleton";
    pub const SPELL_SPIT: &str = "spit";
}

/// Melee reach that still covers diagonal neighbours.
pub const MELEE_REACH: f64 = 1.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpellEffect {
    Bolt { damage: i32 },
    Heal { amount: i32 },
    Summon { kind: ActorKind },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpellDef {
    pub id: SpellId,
    pub mana_cost: i32,
    pub range: f64,
    pub cooldown: u64,
    pub effect: SpellEffect,
}

/// Data-defined spell table keyed by id.
#[derive(Clone, Debug, Default)]
pub struct SpellCatalog {
    spells: BTreeMap<SpellId, SpellDef>,
}

impl SpellCatalog {
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        for spell in [
            spell(keys::SPELL_FIREBOLT, 5, 6.0, 3, SpellEffect::Bolt { damage: 6 }),
            spell(keys::SPELL_FROST_SHARD, 3, 5.0, 0, SpellEffect::Bolt { damage: 3 }),
            spell(keys::SPELL_MEND, 6, 0.0, 5, SpellEffect::Heal { amount: 8 }),
            spell(
                keys::SPELL_RAISE_SKELETON,
                10,
                8.0,
                8,
                SpellEffect::Summon { kind: ActorKind::Skeleton },
            ),
            spell(keys::SPELL_SPIT, 0, 5.0, 2, SpellEffect::Bolt { damage: 2 }),
        ] {
            catalog.insert(spell);
        }
        catalog
    }

    /// Parses a JSON array of spell definitions.
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let defs: Vec<SpellDef> = serde_json::from_str(json)?;
        let mut catalog = Self::default();
        catalog.extend(defs);
        Ok(catalog)
    }

    pub fn insert(&mut self, def: SpellDef) {
        self.spells.insert(def.id.clone(), def);
    }

    /// Later definitions replace earlier ones with the same id.
    pub fn extend(&mut self, defs: impl IntoIterator<Item = SpellDef>) {
        for def in defs {
            self.insert(def);
        }
    }

    pub fn get(&self, id: &SpellId) -> Option<&SpellDef> {
        self.spells.get(id)
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }
}

fn spell(id: &str, mana_cost: i32, range: f64, cooldown: u64, effect: SpellEffect) -> SpellDef {
    SpellDef { id: SpellId::from(id), mana_cost, range, cooldown, effect }
}

pub struct CreatureTemplate {
    pub hp: i32,
    pub hp_regen: Option<(i32, u64)>,
    pub mana: Option<(i32, i32, u64)>,
    pub attack: i32,
    pub defense: i32,
    pub speed: u32,
    pub spells: &'static [&'static str],
    pub archetype: Option<Archetype>,
    pub attack_range: f64,
    pub attack_cooldown: u64,
    pub preferred_min_dist: f64,
    pub preferred_max_dist: f64,
    pub special_cooldown: u64,
}

const BASE_TEMPLATE: CreatureTemplate = CreatureTemplate {
    hp: 10,
    hp_regen: None,
    mana: None,
    attack: 2,
    defense: 0,
    speed: 100,
    spells: &[],
    archetype: None,
    attack_range: MELEE_REACH,
    attack_cooldown: 0,
    preferred_min_dist: 0.0,
    preferred_max_dist: MELEE_REACH,
    special_cooldown: 0,
};

pub fn get_template(kind: ActorKind) -> CreatureTemplate {
    match kind {
        ActorKind::Player => CreatureTemplate {
            hp: 30,
            hp_regen: Some((1, 10)),
            attack: 5,
            defense: 1,
            ..BASE_TEMPLATE
        },
        ActorKind::Goblin => CreatureTemplate { attack: 3, speed: 120, ..BASE_TEMPLATE },
        ActorKind::Archer => CreatureTemplate {
            hp: 8,
            attack: 3,
            attack_range: 5.0,
            attack_cooldown: 1,
            preferred_min_dist: 2.0,
            preferred_max_dist: 5.0,
            ..BASE_TEMPLATE
        },
        ActorKind::Acolyte => CreatureTemplate {
            hp: 9,
            mana: Some((15, 2, 5)),
            spells: &[keys::SPELL_FIREBOLT, keys::SPELL_FROST_SHARD],
            ..BASE_TEMPLATE
        },
        ActorKind::Necromancer => CreatureTemplate {
            hp: 14,
            mana: Some((20, 2, 5)),
            spells: &[keys::SPELL_RAISE_SKELETON, keys::SPELL_FROST_SHARD],
            archetype: Some(Archetype::Summoner),
            preferred_min_dist: 3.0,
            preferred_max_dist: 8.0,
            ..BASE_TEMPLATE
        },
        ActorKind::Skeleton => CreatureTemplate { hp: 6, speed: 90, ..BASE_TEMPLATE },
        ActorKind::Turret => CreatureTemplate {
            hp: 20,
            defense: 2,
            spells: &[keys::SPELL_SPIT],
            archetype: Some(Archetype::Stationary),
            ..BASE_TEMPLATE
        },
        ActorKind::Hydra => CreatureTemplate {
            hp: 40,
            hp_regen: Some((1, 4)),
            attack: 6,
            defense: 2,
            speed: 80,
            archetype: Some(Archetype::Hydra),
            special_cooldown: 10,
            ..BASE_TEMPLATE
        },
        ActorKind::HydraHead => CreatureTemplate {
            hp: 8,
            spells: &[keys::SPELL_SPIT],
            archetype: Some(Archetype::Stationary),
            ..BASE_TEMPLATE
        },
    }
}

/// Builds an actor with every capability slot its template calls for.
pub fn build_actor(world: &World, kind: ActorKind, pos: Pos) -> Actor {
    let template = get_template(kind);
    let config = &world.config;

    let mut actor = Actor::new(kind);
    actor.pos = Some(pos);
    actor.energy = Some(EnergyLedger::with_costs(
        template.speed,
        config.energy_per_tick,
        config.action_costs.clone(),
    ));
    let mut health = ResourcePool::full(template.hp);
    if let Some((amount, interval)) = template.hp_regen {
        health = health.with_regen(amount, interval);
    }
    actor.health = Some(health);
    actor.mana = template
        .mana
        .map(|(max, amount, interval)| ResourcePool::full(max).with_regen(amount, interval));
    actor.combat = Some(CombatStats { attack: template.attack, defense: template.defense });
    actor.known_spells = template.spells.iter().map(|id| SpellId::from(*id)).collect();

    if kind != ActorKind::Player {
        actor.brain = Some(DecisionState {
            declared: template.archetype,
            attack_range: template.attack_range,
            attack_cooldown: template.attack_cooldown,
            preferred_min_dist: template.preferred_min_dist,
            preferred_max_dist: template.preferred_max_dist,
            special_cooldown: template.special_cooldown,
            keep_target: config.arena_mode,
            ..DecisionState::default()
        });
    }
    actor
}

pub fn spawn_actor(world: &mut World, kind: ActorKind, pos: Pos) -> EntityId {
    let actor = build_actor(world, kind, pos);
    world.spawn(actor)
}

/// Spawns `kind` on the first open tile around `origin`, clockwise from north.
pub fn spawn_adjacent(world: &mut World, kind: ActorKind, origin: Pos) -> Option<EntityId> {
    let spot = origin.neighbors().into_iter().find(|pos| world.is_open(*pos))?;
    Some(spawn_actor(world, kind, spot))
}
