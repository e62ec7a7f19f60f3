//! Turn-structure interpreter.
//!
//! - `node`: the declarative node tree and its builders
//! - `context`: what guards, collections and hooks can see
//! - `frame`: activation records for the interpreter stack
//! - `engine`: the run loop, `start`/`resume` and state snapshots
//! - `position`: serializable continuations and `restore`

pub mod context;
pub mod engine;
pub mod frame;
pub mod node;
pub mod position;

pub use context::{FlowContext, FlowContextMut};
pub use engine::{AwaitingPlayer, FlowDefinition, FlowEngine, FlowState, ResumeOutcome, WinnersFn};
pub use frame::{FlowFrame, FrameData, PlayerSlot, StepState};
pub use node::{
    ActionStepNode, EachPlayerNode, FlowNode, ForEachNode, IfNode, LoopNode, NodeKind, NodeRef, PhaseNode,
    SimultaneousStepNode, SwitchNode,
};
pub use position::Position;
