//! Per-tick turn scheduler.
//! Primes and accrues energy, runs passive regeneration, orders ready actors, and hands AI actors
//! to the decision engine under a per-tick cap. The player is only gated here; its actions come
//! from the input path.

use std::cmp::Reverse;
use std::collections::VecDeque;

use slotmap::SecondaryMap;
use tracing::{debug, info, trace};

use crate::actions::ActionExecutor;
use crate::ai::{DecisionEngine, TurnReport};
use crate::config::SchedulerConfig;
use crate::state::World;
use crate::types::*;

pub type TickListener = Box<dyn FnMut(&TickReport)>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// Actors primed with one action's worth of energy this tick.
    pub initialized: Vec<EntityId>,
    pub player_ready: bool,
    pub actions_processed: u32,
    pub turns: Vec<TurnReport>,
    /// Ready AI actors left in the queue by the per-tick cap.
    pub deferred: usize,
}

pub struct TurnScheduler {
    config: SchedulerConfig,
    tick: u64,
    processing: bool,
    seen: SecondaryMap<EntityId, ()>,
    listeners: Vec<TickListener>,
}

impl TurnScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            tick: 0,
            processing: false,
            seen: SecondaryMap::new(),
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Registers a callback fired after every tick that processed at least one action.
    pub fn subscribe(&mut self, listener: TickListener) {
        self.listeners.push(listener);
    }

    /// Runs one tick. Returns `None` without side effects if a tick is already in progress.
    pub fn update(
        &mut self,
        world: &mut World,
        engine: &DecisionEngine<'_>,
        executor: &mut dyn ActionExecutor,
    ) -> Option<TickReport> {
        if self.processing {
            debug!("tick already in progress; ignoring update");
            return None;
        }
        self.processing = true;
        self.tick += 1;

        let mut report = TickReport { tick: self.tick, ..TickReport::default() };
        report.initialized = self.initialize_energy(world);
        accrue_energy(world, &report.initialized);
        regenerate(world);

        let mut queue = ready_queue(world);
        if world.player_id.is_some() && queue.front().copied() == world.player_id {
            report.player_ready = true;
            report.actions_processed = 1;
        } else {
            report.turns = self.process_queue(world, engine, executor, &mut queue);
            report.actions_processed = report.turns.len() as u32;
            report.deferred = queue.iter().filter(|id| Some(**id) != world.player_id).count();
        }

        self.processing = false;
        if report.actions_processed > 0 {
            self.emit(world, &report);
        }
        Some(report)
    }

    /// Resolves ready AI actors without accruing energy. The input path calls this after it has
    /// executed the player's action.
    pub fn run_ai_phase(
        &mut self,
        world: &mut World,
        engine: &DecisionEngine<'_>,
        executor: &mut dyn ActionExecutor,
    ) -> Vec<TurnReport> {
        let mut queue = ready_queue(world);
        self.process_queue(world, engine, executor, &mut queue)
    }

    fn process_queue(
        &mut self,
        world: &mut World,
        engine: &DecisionEngine<'_>,
        executor: &mut dyn ActionExecutor,
        queue: &mut VecDeque<EntityId>,
    ) -> Vec<TurnReport> {
        let mut turns = Vec::new();
        while turns.len() < self.config.max_ai_actions_per_tick {
            let Some(id) = queue.pop_front() else {
                break;
            };
            if Some(id) == world.player_id {
                continue;
            }
            // Killed earlier in this tick.
            let Some(actor) = world.actors.get(id) else {
                continue;
            };
            if actor.brain.is_none() {
                continue;
            }
            let Some(decision) = engine.decide(world, id) else {
                continue;
            };
            let cost = decision.cost();
            if let Some(ledger) = world.actors.get(id).and_then(|a| a.energy.as_ref())
                && !ledger.can_act(cost)
            {
                let energy = ledger.energy();
                debug!(?id, action = %decision.action, ?cost, energy, "turn skipped to save up");
                continue;
            }
            let Some(report) = engine.act(world, executor, decision) else {
                continue;
            };
            if let Some(ledger) = world.actors.get_mut(id).and_then(|a| a.energy.as_mut())
                && !ledger.spend_energy(cost)
            {
                debug!(?id, ?cost, "energy changed while acting; turn left unpaid");
            }
            turns.push(report);
        }
        turns
    }

    /// Gives first-seen actors with an empty ledger exactly one standard action's worth of
    /// energy so fresh spawns can act right away.
    fn initialize_energy(&mut self, world: &mut World) -> Vec<EntityId> {
        let mut initialized = Vec::new();
        for (id, actor) in world.actors.iter_mut() {
            let Some(ledger) = actor.energy.as_mut() else {
                continue;
            };
            if self.seen.insert(id, ()).is_some() {
                continue;
            }
            if ledger.energy() == 0 {
                ledger.set_energy(ledger.cost(ActionKind::Move));
                initialized.push(id);
            }
        }
        initialized
    }

    fn emit(&mut self, world: &mut World, report: &TickReport) {
        info!(
            tick = report.tick,
            actions = report.actions_processed,
            player_ready = report.player_ready,
            deferred = report.deferred,
            "tick processed"
        );
        world.narrate(LogEvent::TickProcessed {
            tick: report.tick,
            actions: report.actions_processed,
        });
        for listener in &mut self.listeners {
            listener(report);
        }
    }
}

impl Default for TurnScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

/// Actors primed this tick already hold a full action and skip accrual.
fn accrue_energy(world: &mut World, primed: &[EntityId]) {
    for (id, actor) in world.actors.iter_mut() {
        if primed.contains(&id) {
            continue;
        }
        if let Some(ledger) = actor.energy.as_mut() {
            let gained = ledger.gain_energy();
            trace!(?id, gained, energy = ledger.energy(), "accrued");
        }
    }
}

fn regenerate(world: &mut World) {
    let turn = world.turn;
    let mut events = Vec::new();
    for (id, actor) in world.actors.iter_mut() {
        if let Some(amount) = actor.health.as_mut().and_then(|pool| pool.regenerate(turn)) {
            events.push(LogEvent::Regenerated { actor: id, pool: PoolKind::Health, amount });
        }
        if let Some(amount) = actor.mana.as_mut().and_then(|pool| pool.regenerate(turn)) {
            events.push(LogEvent::Regenerated { actor: id, pool: PoolKind::Mana, amount });
        }
    }
    world.log.extend(events);
}

/// Actors able to afford a move, highest energy first. Equal energy keeps registry order and the
/// player, when ready, is always at the front.
pub fn ready_queue(world: &World) -> VecDeque<EntityId> {
    let mut ready: Vec<(EntityId, u32)> = world
        .actors
        .iter()
        .filter_map(|(id, actor)| {
            let ledger = actor.energy.as_ref()?;
            ledger.can_act(ActionKind::Move).then_some((id, ledger.energy()))
        })
        .collect();
    ready.sort_by_key(|(_, energy)| Reverse(*energy));

    let mut queue: VecDeque<EntityId> = ready.into_iter().map(|(id, _)| id).collect();
    if let Some(player_id) = world.player_id
        && let Some(index) = queue.iter().position(|id| *id == player_id)
    {
        queue.remove(index);
        queue.push_front(player_id);
    }
    queue
}
