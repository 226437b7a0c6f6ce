//! Energy ledger that gates how often an actor may act.
//! Actors bank energy every tick in proportion to their speed and pay a per-action cost.
//! It does not own tick ordering; see the scheduler for that.

use serde::{Deserialize, Serialize};

use crate::types::ActionKind;

pub const ENERGY_PER_TICK: u32 = 1000;
pub const BASE_SPEED: u32 = 100;
pub const MIN_SPEED: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionCosts {
    #[serde(rename = "move")]
    pub move_cost: u32,
    pub attack: u32,
    #[serde(rename = "use")]
    pub use_item: u32,
    pub cast: u32,
    pub wait: u32,
}

impl ActionCosts {
    pub fn cost(&self, kind: ActionKind) -> u32 {
        match kind {
            ActionKind::Move => self.move_cost,
            ActionKind::Attack => self.attack,
            ActionKind::Use => self.use_item,
            ActionKind::Cast => self.cast,
            ActionKind::Wait => self.wait,
        }
    }
}

impl Default for ActionCosts {
    fn default() -> Self {
        Self { move_cost: 1000, attack: 1000, use_item: 1000, cast: 1500, wait: 500 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnergyLedger {
    energy: u32,
    base_speed: u32,
    current_speed: u32,
    energy_per_tick: u32,
    costs: ActionCosts,
}

impl EnergyLedger {
    pub fn new(base_speed: u32) -> Self {
        Self::with_costs(base_speed, ENERGY_PER_TICK, ActionCosts::default())
    }

    pub fn with_costs(base_speed: u32, energy_per_tick: u32, costs: ActionCosts) -> Self {
        let base_speed = base_speed.max(MIN_SPEED);
        Self { energy: 0, base_speed, current_speed: base_speed, energy_per_tick, costs }
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn set_energy(&mut self, energy: u32) {
        self.energy = energy;
    }

    pub fn base_speed(&self) -> u32 {
        self.base_speed
    }

    pub fn current_speed(&self) -> u32 {
        self.current_speed
    }

    pub fn cost(&self, kind: ActionKind) -> u32 {
        self.costs.cost(kind)
    }

    /// Amount banked by one call to [`Self::gain_energy`] at the current speed.
    ///
    /// Floors the fractional part, so speeds that are not multiples of 100 slowly lose energy
    /// relative to an exact rational accrual.
    pub fn energy_per_gain(&self) -> u32 {
        let scaled = u64::from(self.energy_per_tick) * u64::from(self.current_speed)
            / u64::from(BASE_SPEED);
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }

    pub fn gain_energy(&mut self) -> u32 {
        let gained = self.energy_per_gain();
        self.energy = self.energy.saturating_add(gained);
        gained
    }

    pub fn can_act(&self, kind: ActionKind) -> bool {
        self.energy >= self.costs.cost(kind)
    }

    /// Deducts the full cost of `kind`, or nothing at all when it is unaffordable.
    pub fn spend_energy(&mut self, kind: ActionKind) -> bool {
        let cost = self.costs.cost(kind);
        if self.energy < cost {
            return false;
        }
        self.energy -= cost;
        true
    }

    pub fn modify_speed(&mut self, delta: i32) {
        let speed = (i64::from(self.base_speed) + i64::from(delta)).max(i64::from(MIN_SPEED));
        self.current_speed = u32::try_from(speed).unwrap_or(u32::MAX);
    }

    pub fn reset_speed(&mut self) {
        self.current_speed = self.base_speed;
    }

    /// Ceiling estimate of ticks until `kind` becomes affordable. Advisory only.
    pub fn turns_to_next_action(&self, kind: ActionKind) -> u32 {
        let deficit = self.costs.cost(kind).saturating_sub(self.energy);
        if deficit == 0 {
            return 0;
        }
        let per_tick = self.energy_per_gain();
        if per_tick == 0 {
            return u32::MAX;
        }
        deficit.div_ceil(per_tick)
    }
}
