//! Serializable continuations.
//!
//! A `Position` records, for every frame on the stack, the child cursor
//! plus whatever counters and entry-time snapshots that frame holds.
//! `restore()` rebuilds the stack by walking the same static tree from the
//! root along that path. No side effects run during the walk: Execute
//! nodes are never revisited and phase hooks are not fired.
//!
//! Frame state is keyed by depth: the frame at depth 2 stores its counter
//! under `"d2"`. A simultaneous step at that depth keeps its participants
//! under `"d2"` in `player_lists`, its finished players under `"d2.done"`
//! and each participant's move count under `"d2.p{index}"`. A for-each
//! frame keeps the collection it computed on entry under `"d2"` in
//! `items`.
//!
//! A position is only meaningful with the identical node tree and a host
//! in the same state. Guard and collection callbacks must be
//! deterministic for the walk to land on the same frames.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::info;

use crate::core::{FlowError, PlayerId, Value, Variables};
use crate::host::Host;

use super::context::FlowContext;
use super::engine::{each_player_order, FlowEngine, FlowState};
use super::frame::{FlowFrame, FrameData, PlayerSlot};
use super::node::{NodeKind, NodeRef};

/// Saved interpreter state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Child cursor per stack depth, root first.
    pub path: SmallVec<[usize; 8]>,
    /// Counters keyed by depth.
    pub iterations: BTreeMap<String, u32>,
    /// The host's current player.
    pub player_index: usize,
    pub variables: Variables,
    /// Player snapshots keyed by depth.
    #[serde(default)]
    pub player_lists: BTreeMap<String, Vec<usize>>,
    /// For-each collections keyed by depth.
    #[serde(default)]
    pub items: BTreeMap<String, Vec<Value>>,
}

impl Position {
    /// Number of frames this position rebuilds.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// A position with an empty path restores to a completed flow.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.path.is_empty()
    }

    pub fn to_json(&self) -> Result<String, FlowError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compact binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FlowError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FlowError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

fn depth_key(depth: usize) -> String {
    format!("d{depth}")
}

fn invalid(message: impl Into<String>) -> FlowError {
    FlowError::InvalidPosition(message.into())
}

impl<H: Host> FlowEngine<H> {
    /// Capture the current suspension.
    #[must_use]
    pub fn get_position(&self, host: &H) -> Position {
        let mut position = Position {
            path: SmallVec::new(),
            iterations: BTreeMap::new(),
            player_index: host.current_player().index(),
            variables: self.variables.clone(),
            player_lists: BTreeMap::new(),
            items: BTreeMap::new(),
        };

        for (depth, frame) in self.stack.iter().enumerate() {
            let key = depth_key(depth);
            position.path.push(frame.index);
            if frame.iterations > 0 {
                position.iterations.insert(key.clone(), frame.iterations);
            }

            match &frame.data {
                FrameData::Players(players) => {
                    position
                        .player_lists
                        .insert(key, players.iter().map(|p| p.index()).collect());
                }
                FrameData::Items(items) => {
                    position.items.insert(key, items.clone());
                }
                FrameData::Simultaneous(slots) => {
                    for slot in slots.iter().filter(|slot| slot.moves > 0) {
                        position
                            .iterations
                            .insert(format!("{key}.p{}", slot.player.index()), slot.moves);
                    }
                    position.player_lists.insert(
                        format!("{key}.done"),
                        slots.iter().filter(|s| s.done).map(|s| s.player.index()).collect(),
                    );
                    position
                        .player_lists
                        .insert(key, slots.iter().map(|s| s.player.index()).collect());
                }
                _ => {}
            }
        }

        position
    }

    /// Rebuild the stack from `position` and continue the run loop.
    ///
    /// Any in-progress state and the action history are discarded. On error
    /// the engine keeps its previous state.
    pub fn restore(&mut self, host: &mut H, position: &Position) -> Result<FlowState, FlowError> {
        let root = self.root()?;
        let player_count = host.player_count();
        let player = PlayerId::from_index(position.player_index, player_count).ok_or_else(|| {
            invalid(format!(
                "player index {} out of range for {player_count} players",
                position.player_index
            ))
        })?;

        host.set_current_player(player);
        let (stack, phase) = rebuild(&*host, root, position)?;

        self.reset();
        self.variables = position.variables.clone();
        self.stack = stack;
        self.current_phase = phase;

        info!(depth = self.stack.len(), %player, "flow restored");
        if self.stack.is_empty() {
            self.complete = true;
        } else {
            self.run(host)?;
        }

        Ok(self.get_state(host))
    }
}

/// Walk the tree along `position.path`, producing the frames and the
/// innermost phase name.
fn rebuild<H: Host>(
    host: &H,
    root: NodeRef<H>,
    position: &Position,
) -> Result<(Vec<FlowFrame<H>>, Option<String>), FlowError> {
    let ctx = FlowContext::new(host, &position.variables);
    let mut stack = Vec::with_capacity(position.path.len());
    let mut phase: Option<String> = None;
    let mut node = root;

    let Some(last) = position.path.len().checked_sub(1) else {
        return Ok((stack, phase));
    };

    for (depth, &index) in position.path.iter().enumerate() {
        let key = depth_key(depth);
        let mut frame = FlowFrame::new(Arc::clone(&node));
        frame.index = index;
        frame.iterations = position.iterations.get(&key).copied().unwrap_or(0);
        frame.entered = true;

        frame.data = match &node.kind {
            NodeKind::EachPlayer(cfg) => {
                let players = match position.player_lists.get(&key) {
                    Some(indices) => seats(indices, host.player_count())?,
                    None => each_player_order(cfg, &ctx),
                };
                if index >= players.len() {
                    return Err(invalid(format!("each-player cursor {index} past {} players", players.len())));
                }
                FrameData::Players(players)
            }
            NodeKind::ForEach(cfg) => {
                let items = match position.items.get(&key) {
                    Some(items) => items.clone(),
                    None => (cfg.collection)(&ctx),
                };
                if index >= items.len() {
                    return Err(invalid(format!("for-each cursor {index} past {} items", items.len())));
                }
                FrameData::Items(items)
            }
            NodeKind::Phase(cfg) => FrameData::Phase {
                previous: phase.replace(cfg.name.clone()),
            },
            NodeKind::SimultaneousActionStep(cfg) => {
                let participants = match position.player_lists.get(&key) {
                    Some(indices) => seats(indices, host.player_count())?,
                    None => match &cfg.players {
                        Some(f) => f(&ctx),
                        None => host.players(),
                    },
                };
                let done = position.player_lists.get(&format!("{key}.done"));

                let slots = participants
                    .into_iter()
                    .map(|player| {
                        let mut slot = PlayerSlot::new(player);
                        slot.moves = position
                            .iterations
                            .get(&format!("{key}.p{}", player.index()))
                            .copied()
                            .unwrap_or(0);
                        slot.done = match done {
                            Some(done) => done.contains(&player.index()),
                            None => cfg.skip_player.as_ref().is_some_and(|skip| skip(&ctx, player)),
                        };
                        slot
                    })
                    .collect();
                FrameData::Simultaneous(slots)
            }
            _ => FrameData::None,
        };

        if depth == last {
            if !matches!(node.kind, NodeKind::ActionStep(_) | NodeKind::SimultaneousActionStep(_)) {
                return Err(invalid(format!("path ends at a {} node", node.kind_name())));
            }
            stack.push(frame);
            break;
        }

        frame.pushed = true;
        let child = node
            .child(index)
            .ok_or_else(|| invalid(format!("{} has no child {index} at depth {depth}", node.label())))?;
        stack.push(frame);
        node = child;
    }

    Ok((stack, phase))
}

fn seats(indices: &[usize], player_count: usize) -> Result<Vec<PlayerId>, FlowError> {
    indices
        .iter()
        .map(|&i| PlayerId::from_index(i, player_count).ok_or_else(|| invalid(format!("unknown player index {i}"))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Position {
        let mut variables = Variables::new();
        variables.insert("round".to_string(), Value::Int(3));
        variables.insert("player".to_string(), Value::Player(PlayerId::new(1)));

        let mut position = Position {
            path: SmallVec::from_slice(&[0, 1, 0]),
            iterations: BTreeMap::new(),
            player_index: 1,
            variables,
            player_lists: BTreeMap::new(),
            items: BTreeMap::new(),
        };
        position.iterations.insert("d0".to_string(), 3);
        position.player_lists.insert("d1".to_string(), vec![0, 1]);
        position.items.insert("d2".to_string(), vec![Value::Int(4), Value::from("x")]);
        position
    }

    #[test]
    fn test_json_round_trip() {
        let position = sample();
        let json = position.to_json().unwrap();

        assert!(json.contains("\"player_index\":1"));
        assert_eq!(Position::from_json(&json).unwrap(), position);
    }

    #[test]
    fn test_bytes_round_trip() {
        let position = sample();
        let bytes = position.to_bytes().unwrap();

        assert_eq!(Position::from_bytes(&bytes).unwrap(), position);
    }

    #[test]
    fn test_json_without_player_lists() {
        let json = r#"{"path":[],"iterations":{},"player_index":0,"variables":{}}"#;
        let position = Position::from_json(json).unwrap();

        assert!(position.is_complete());
        assert!(position.player_lists.is_empty());
        assert!(position.items.is_empty());
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(matches!(Position::from_json("{"), Err(FlowError::Json(_))));
        assert!(matches!(Position::from_bytes(&[1, 2]), Err(FlowError::Encoding(_))));
    }
}
