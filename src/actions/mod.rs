//! Actions: named, player-triggered operations with typed inputs.
//!
//! - `selection`: the input slots an action declares
//! - `definition`: action definitions, the registry and result records
//! - `executor`: argument resolution, validation, execution and the
//!   availability search

pub mod definition;
pub mod executor;
pub mod selection;

pub use definition::{ActionDefinition, ActionRecord, ActionRegistry, ActionResult, ConditionFn, ExecuteFn};
pub use executor::ActionExecutor;
pub use selection::{ChoiceSource, DependsOn, Selection, SelectionContext, SelectionKind};
