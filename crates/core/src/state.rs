use slotmap::SlotMap;

use crate::ai::DecisionState;
use crate::config::SimConfig;
use crate::energy::EnergyLedger;
use crate::types::*;

/// Fixed-amount regeneration gated by a turn interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Regen {
    pub amount: i32,
    pub interval: u64,
    pub last_regen_at: u64,
}

/// A capped resource such as health or mana.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourcePool {
    pub current: i32,
    pub max: i32,
    pub regen: Option<Regen>,
}

impl ResourcePool {
    pub fn full(max: i32) -> Self {
        Self { current: max, max, regen: None }
    }

    pub fn with_regen(mut self, amount: i32, interval: u64) -> Self {
        self.regen = Some(Regen { amount, interval, last_regen_at: 0 });
        self
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn percent(&self) -> u32 {
        if self.max <= 0 {
            return 0;
        }
        (self.current.max(0) as u32 * 100) / self.max as u32
    }

    /// Applies one regeneration step if the interval has elapsed since the last one.
    ///
    /// Elapsed intervals do not stack: a pool that was not visited for several intervals still
    /// gains a single fixed amount. Full pools are skipped without touching the stamp.
    pub fn regenerate(&mut self, turn: u64) -> Option<i32> {
        if self.is_full() {
            return None;
        }
        let regen = self.regen.as_mut()?;
        if turn.saturating_sub(regen.last_regen_at) < regen.interval {
            return None;
        }
        let before = self.current;
        self.current = (self.current + regen.amount).min(self.max);
        regen.last_regen_at = turn;
        Some(self.current - before)
    }

    pub fn spend(&mut self, amount: i32) -> bool {
        if self.current < amount {
            return false;
        }
        self.current -= amount;
        true
    }

    pub fn restore(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.current = (self.current + amount).min(self.max);
        self.current - before
    }

    /// Returns true when the pool is depleted.
    pub fn drain(&mut self, amount: i32) -> bool {
        self.current = (self.current - amount).max(0);
        self.current == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatStats {
    pub attack: i32,
    pub defense: i32,
}

/// An entity in the world. Every capability is an optional slot; systems skip actors that
/// lack the slot they need.
#[derive(Clone, Debug)]
pub struct Actor {
    pub id: EntityId,
    pub kind: ActorKind,
    pub pos: Option<Pos>,
    pub energy: Option<EnergyLedger>,
    pub health: Option<ResourcePool>,
    pub mana: Option<ResourcePool>,
    pub combat: Option<CombatStats>,
    pub known_spells: Vec<SpellId>,
    pub brain: Option<DecisionState>,
}

impl Actor {
    pub fn new(kind: ActorKind) -> Self {
        Self {
            id: EntityId::default(), // Will be overwritten on spawn
            kind,
            pos: None,
            energy: None,
            health: None,
            mana: None,
            combat: None,
            known_spells: Vec::new(),
            brain: None,
        }
    }

    pub fn mana_available(&self) -> i32 {
        self.mana.as_ref().map_or(0, |pool| pool.current)
    }
}

#[derive(Clone)]
pub struct Map {
    pub internal_width: usize,
    pub internal_height: usize,
    pub tiles: Vec<TileKind>,
}

impl Map {
    /// An open room enclosed by a one-tile wall border.
    pub fn new(width: usize, height: usize) -> Self {
        let mut tiles = vec![TileKind::Floor; width * height];
        for x in 0..width {
            tiles[x] = TileKind::Wall;
            tiles[(height - 1) * width + x] = TileKind::Wall;
        }
        for y in 0..height {
            tiles[y * width] = TileKind::Wall;
            tiles[y * width + (width - 1)] = TileKind::Wall;
        }
        Self { internal_width: width, internal_height: height, tiles }
    }

    pub fn tile_at(&self, pos: Pos) -> TileKind {
        if !self.in_bounds(pos) {
            return TileKind::Wall;
        }
        self.tiles[self.index(pos)]
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.internal_width
            && (pos.y as usize) < self.internal_height
    }

    pub fn set_tile(&mut self, pos: Pos, tile: TileKind) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.tiles[idx] = tile;
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.tile_at(pos) == TileKind::Floor
    }

    /// Supercover line walk; only walls strictly between the endpoints block sight.
    pub fn has_line_of_sight(&self, origin: Pos, target: Pos) -> bool {
        let dx = target.x - origin.x;
        let dy = target.y - origin.y;
        let sx = dx.signum();
        let sy = dy.signum();
        let total_x = dx.abs();
        let total_y = dy.abs();

        let mut x = origin.x;
        let mut y = origin.y;
        let mut step_x = 0;
        let mut step_y = 0;

        while step_x < total_x || step_y < total_y {
            let lhs = (1 + 2 * step_x) * total_y;
            let rhs = (1 + 2 * step_y) * total_x;
            if lhs == rhs {
                x += sx;
                y += sy;
                step_x += 1;
                step_y += 1;
            } else if lhs < rhs {
                x += sx;
                step_x += 1;
            } else {
                y += sy;
                step_y += 1;
            }

            if x == target.x && y == target.y {
                break;
            }
            if self.tile_at(Pos { y, x }) == TileKind::Wall {
                return false;
            }
        }
        true
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.internal_width + (pos.x as usize)
    }
}

/// Explicit simulation context threaded through the scheduler, engine and executor.
pub struct World {
    pub map: Map,
    pub actors: SlotMap<EntityId, Actor>,
    pub player_id: Option<EntityId>,
    /// Global game turn. Advanced once per completed external turn by the input path; the
    /// scheduler and decision engine only read it.
    pub turn: u64,
    pub config: SimConfig,
    pub log: Vec<LogEvent>,
}

impl World {
    pub fn new(map: Map, config: SimConfig) -> Self {
        Self {
            map,
            actors: SlotMap::with_key(),
            player_id: None,
            turn: 0,
            config,
            log: Vec::new(),
        }
    }

    pub fn spawn(&mut self, actor: Actor) -> EntityId {
        let is_player = actor.kind == ActorKind::Player;
        let id = self.actors.insert(actor);
        self.actors[id].id = id;
        if is_player {
            self.player_id = Some(id);
        }
        id
    }

    pub fn remove_actor(&mut self, id: EntityId) -> Option<Actor> {
        if self.player_id == Some(id) {
            self.player_id = None;
        }
        self.actors.remove(id)
    }

    pub fn player(&self) -> Option<&Actor> {
        self.player_id.and_then(|id| self.actors.get(id))
    }

    pub fn position_of(&self, id: EntityId) -> Option<Pos> {
        self.actors.get(id).and_then(|actor| actor.pos)
    }

    pub fn actor_at(&self, pos: Pos) -> Option<EntityId> {
        self.actors.iter().find(|(_, actor)| actor.pos == Some(pos)).map(|(id, _)| id)
    }

    /// Walkable and not occupied by another actor.
    pub fn is_open(&self, pos: Pos) -> bool {
        self.map.is_walkable(pos) && self.actor_at(pos).is_none()
    }

    pub fn narrate(&mut self, event: LogEvent) {
        self.log.push(event);
    }
}
