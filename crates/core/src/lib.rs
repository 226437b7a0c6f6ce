pub mod actions;
pub mod ai;
pub mod behavior;
pub mod config;
pub mod content;
pub mod energy;
pub mod error;
pub mod scenario;
pub mod scheduler;
pub mod sim;
pub mod state;
pub mod types;

#[cfg(test)]
mod test_support;

pub use actions::{ActionExecutor, StandardExecutor};
pub use ai::{Decision, DecisionEngine, DecisionState, TurnContext, TurnReport};
pub use behavior::{BehaviorCatalog, BehaviorProfile, Condition, Node};
pub use config::{SchedulerConfig, SimConfig};
pub use content::{SpellCatalog, SpellDef, SpellEffect};
pub use energy::{ActionCosts, EnergyLedger};
pub use error::SimError;
pub use scenario::{CreatureSpawn, Scenario};
pub use scheduler::{TickReport, TurnScheduler};
pub use sim::{PlayerCommand, Simulation, StepReport};
pub use state::{Actor, Map, ResourcePool, World};
pub use types::*;
