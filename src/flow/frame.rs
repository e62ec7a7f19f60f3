//! Activation records for the interpreter stack.
//!
//! One `FlowFrame` exists per node currently executing, so the stack depth
//! always equals the nesting depth in the static tree. Frames are owned by
//! the engine and never shared.

use crate::core::{PlayerId, Value};

use super::node::NodeRef;

/// A suspended or running node.
pub struct FlowFrame<H> {
    pub node: NodeRef<H>,
    /// Child cursor: the child currently running, or the branch taken.
    pub index: usize,
    /// Set when the node is finished; the frame is popped on the next visit.
    pub completed: bool,
    /// Passes made by looping nodes, moves made in an action step.
    pub iterations: u32,
    /// First-visit work (snapshots, skip checks, enter hooks) has run.
    pub entered: bool,
    /// A child has been pushed for the current cursor.
    pub pushed: bool,
    pub data: FrameData,
}

impl<H> FlowFrame<H> {
    pub fn new(node: NodeRef<H>) -> Self {
        Self {
            node,
            index: 0,
            completed: false,
            iterations: 0,
            entered: false,
            pushed: false,
            data: FrameData::None,
        }
    }
}

/// Per-kind scratch data.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FrameData {
    #[default]
    None,
    /// EachPlayer: the order snapshotted on entry.
    Players(Vec<PlayerId>),
    /// ForEach: the collection computed on entry.
    Items(Vec<Value>),
    /// ActionStep: who is acting and what they may do.
    Step(StepState),
    /// SimultaneousActionStep: one slot per participant.
    Simultaneous(Vec<PlayerSlot>),
    /// Phase: the enclosing phase to restore on exit.
    Phase { previous: Option<String> },
}

/// Suspended ActionStep state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepState {
    pub player: PlayerId,
    pub available: Vec<String>,
}

/// One participant of a simultaneous step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerSlot {
    pub player: PlayerId,
    pub moves: u32,
    pub done: bool,
    pub available: Vec<String>,
}

impl PlayerSlot {
    #[must_use]
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            moves: 0,
            done: false,
            available: Vec::new(),
        }
    }
}
