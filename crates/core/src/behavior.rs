//! Declarative per-archetype decision trees and the registry that holds them.
//! Trees are immutable and shared by every actor of an archetype.
//! Per-actor variability lives in `DecisionState` and `TurnContext`, never in a tree.

mod catalog;
mod tree;

pub use catalog::{BehaviorCatalog, BehaviorProfile, CustomAction};
pub use tree::{Condition, Node};
