//! # turn-flow
//!
//! A declarative turn-structure interpreter and action-validation layer
//! for multiplayer turn-based games.
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic**: The engine knows nothing about cards, boards or
//!    scoring. Games describe their turn structure as a tree of flow
//!    nodes and expose their state through the `Host` trait.
//!
//! 2. **N-Player First**: Every API takes the player count from the host.
//!    No convenience methods assume 2 players.
//!
//! 3. **Resumable**: The interpreter suspends whenever a player must
//!    decide, and its position can be serialized and restored against the
//!    same tree without re-running side effects.
//!
//! ## Architecture
//!
//! - **Explicit stack**: Flow nodes are immutable and shared through
//!   `Arc`; execution state lives in a stack of frames owned by the
//!   engine.
//!
//! - **Persistent Data Structures**: Variable bindings use `im-rs` so
//!   snapshots for positions are O(1).
//!
//! - **Availability search**: An action is offered only if some legal
//!   assignment of its selections exists, found by a depth-first search
//!   that branches on declared dependencies.
//!
//! ## Modules
//!
//! - `core`: Players, elements, values, configuration and errors
//! - `actions`: Selections, action definitions, validation and execution
//! - `host`: The `Host` trait games implement
//! - `flow`: Flow nodes, the interpreter and positions
//! - `games`: Example games

pub mod core;
pub mod actions;
pub mod host;
pub mod flow;
pub mod games;

// Re-export commonly used types
pub use crate::core::{
    PlayerId, PlayerMap, ElementId,
    Value, Variables, Args, RawArgs,
    EngineConfig,
    ActionError, FlowError, ValidationError,
};

pub use crate::actions::{
    ActionDefinition, ActionRegistry, ActionResult, ActionRecord, ActionExecutor,
    Selection, SelectionContext, SelectionKind,
};

pub use crate::host::Host;

pub use crate::flow::{
    FlowEngine, FlowDefinition, FlowState, AwaitingPlayer, ResumeOutcome, Position,
    FlowNode, FlowContext, FlowContextMut,
    LoopNode, EachPlayerNode, ForEachNode, ActionStepNode, SimultaneousStepNode,
    SwitchNode, IfNode, PhaseNode,
};
