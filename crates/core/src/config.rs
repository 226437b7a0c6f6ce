//! Tunables shared by the ledger, the scheduler and creature spawning.
//! Every field has a default so partial tables in scenario files deserialize cleanly.

use serde::{Deserialize, Serialize};

use crate::energy::{ActionCosts, ENERGY_PER_TICK};

pub const DEFAULT_MAX_AI_ACTIONS_PER_TICK: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Backpressure cap: AI turns resolved per tick. Ready actors past the cap wait for a
    /// later tick.
    pub max_ai_actions_per_tick: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { max_ai_actions_per_tick: DEFAULT_MAX_AI_ACTIONS_PER_TICK }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub energy_per_tick: u32,
    pub action_costs: ActionCosts,
    pub scheduler: SchedulerConfig,
    /// Arena combat: AI actors keep their target after it dies.
    pub arena_mode: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            energy_per_tick: ENERGY_PER_TICK,
            action_costs: ActionCosts::default(),
            scheduler: SchedulerConfig::default(),
            arena_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_table_keeps_remaining_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "scheduler": { "max_ai_actions_per_tick": 2 } }"#)
                .expect("partial config should parse");
        assert_eq!(config.scheduler.max_ai_actions_per_tick, 2);
        assert_eq!(config.energy_per_tick, 1000);
        assert_eq!(config.action_costs, ActionCosts::default());
        assert!(!config.arena_mode);
    }
}
