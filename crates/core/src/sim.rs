//! Headless simulation facade.
//! This module exists to own every long-lived piece (world, scheduler, catalogs, executor) and to
//! drive one external game turn per `step`. It does not own decision or scheduling policy.

use tracing::debug;

use crate::actions::StandardExecutor;
use crate::ai::{DecisionEngine, TurnReport};
use crate::behavior::BehaviorCatalog;
use crate::content::SpellCatalog;
use crate::error::SimError;
use crate::scenario::Scenario;
use crate::scheduler::{TickReport, TurnScheduler};
use crate::state::World;
use crate::types::*;

mod hash;
mod player;

pub use player::PlayerCommand;

#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// Global turn the step ran in.
    pub turn: u64,
    pub tick: Option<TickReport>,
    /// `Some` when the player was ready and the command was applied.
    pub player_outcome: Option<ActionOutcome>,
    /// AI turns from the tick itself and from the phase after player input.
    pub ai_turns: Vec<TurnReport>,
}

impl StepReport {
    pub fn consumed_command(&self) -> bool {
        self.player_outcome.is_some()
    }
}

pub struct Simulation {
    seed: u64,
    world: World,
    scheduler: TurnScheduler,
    catalog: BehaviorCatalog,
    spells: SpellCatalog,
    executor: StandardExecutor,
}

impl Simulation {
    pub fn new(seed: u64, world: World) -> Self {
        let scheduler = TurnScheduler::new(world.config.scheduler.clone());
        Self {
            seed,
            world,
            scheduler,
            catalog: BehaviorCatalog::builtin(),
            spells: SpellCatalog::builtin(),
            executor: StandardExecutor::new(seed),
        }
    }

    pub fn from_scenario(scenario: &Scenario) -> Result<Self, SimError> {
        let spells = scenario.spell_catalog();
        let world = scenario.build_world(&spells)?;
        Ok(Self::new(scenario.seed, world).with_spells(spells))
    }

    pub fn with_spells(mut self, spells: SpellCatalog) -> Self {
        self.spells = spells;
        self
    }

    pub fn with_catalog(mut self, catalog: BehaviorCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut TurnScheduler {
        &mut self.scheduler
    }

    /// Runs one scheduler tick. When the player comes up ready, applies `command` and lets the AI
    /// act on the new situation. Advances the global turn afterwards.
    pub fn step(&mut self, command: PlayerCommand) -> StepReport {
        let engine = DecisionEngine::new(&self.catalog, &self.spells);
        let turn = self.world.turn;
        let tick = self.scheduler.update(&mut self.world, &engine, &mut self.executor);

        let mut player_outcome = None;
        let mut ai_turns = Vec::new();
        if let Some(tick) = &tick {
            ai_turns.extend(tick.turns.iter().cloned());
            if tick.player_ready {
                let outcome = player::apply_command(&mut self.world, command);
                debug!(turn, ?command, success = outcome.success, "player input applied");
                player_outcome = Some(outcome);
                let executor = &mut self.executor;
                ai_turns.extend(self.scheduler.run_ai_phase(&mut self.world, &engine, executor));
            }
        }

        self.world.turn += 1;
        StepReport { turn, tick, player_outcome, ai_turns }
    }

    /// Over once the player is gone or no creature with a brain remains.
    pub fn is_finished(&self) -> bool {
        self.world.player().is_none()
            || !self.world.actors.values().any(|actor| actor.brain.is_some())
    }
}
