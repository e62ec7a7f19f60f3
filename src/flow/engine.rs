//! The flow interpreter.
//!
//! `FlowEngine` walks a `FlowDefinition`'s node tree with an explicit
//! stack of frames. The run loop repeatedly visits the top frame, which
//! either pushes a child, completes, or suspends for player input:
//!
//! 1. `start()` pushes the root and runs until the stack empties (the
//!    flow is complete) or an action step suspends.
//! 2. `resume()` performs the chosen action through the host, updates the
//!    suspended step's move count and runs again.
//! 3. `get_position()` / `restore()` serialize the suspension and rebuild
//!    it by re-walking the same tree (see `position.rs`).
//!
//! Only ActionStep and SimultaneousActionStep ever suspend. The engine is
//! single-threaded and callbacks cannot reach it: they only ever see the
//! host and the variable bindings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::actions::{ActionExecutor, ActionRecord, ActionResult};
use crate::core::{Args, EngineConfig, FlowError, PlayerId, RawArgs, ValidationError, Value, Variables};
use crate::host::Host;

use super::context::{FlowContext, FlowContextMut};
use super::frame::{FlowFrame, FrameData, PlayerSlot, StepState};
use super::node::{EachPlayerNode, FlowNode, Guard, NodeKind, NodeRef};

/// Callback computing the winners of a finished flow.
pub type WinnersFn<H> = Arc<dyn Fn(&FlowContext<'_, H>) -> Vec<PlayerId>>;

/// A complete flow: the node tree plus game-level hooks.
pub struct FlowDefinition<H> {
    pub root: NodeRef<H>,
    /// Bindings installed by `start()`.
    pub variables: Variables,
    /// Checked before every frame visit; ends the flow when true.
    pub complete_when: Option<Guard<H>>,
    pub winners: Option<WinnersFn<H>>,
}

impl<H> FlowDefinition<H> {
    pub fn new(root: impl Into<FlowNode<H>>) -> Self {
        Self {
            root: Arc::new(root.into()),
            variables: Variables::new(),
            complete_when: None,
            winners: None,
        }
    }

    /// Add an initial variable binding.
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn complete_when(mut self, guard: impl Fn(&FlowContext<'_, H>) -> bool + 'static) -> Self {
        self.complete_when = Some(Arc::new(guard));
        self
    }

    #[must_use]
    pub fn winners(mut self, f: impl Fn(&FlowContext<'_, H>) -> Vec<PlayerId> + 'static) -> Self {
        self.winners = Some(Arc::new(f));
        self
    }
}

/// A player who may act in the current suspension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwaitingPlayer {
    pub player: PlayerId,
    pub available_actions: Vec<String>,
}

/// Snapshot of the engine returned by every run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowState {
    pub complete: bool,
    pub awaiting_input: bool,
    pub current_player: PlayerId,
    /// Actions open to `current_player` in a single-player step.
    pub available_actions: Vec<String>,
    pub prompt: Option<String>,
    /// Everyone who may act right now, with their options.
    pub awaiting_players: Vec<AwaitingPlayer>,
    pub current_phase: Option<String>,
}

/// What `resume()` produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResumeOutcome {
    pub result: ActionResult,
    pub state: FlowState,
}

/// Result of visiting the top frame.
enum Visit<H> {
    Push(NodeRef<H>),
    Complete,
    Suspend,
}

/// Turn-structure interpreter. One per game.
pub struct FlowEngine<H> {
    pub(crate) definition: Option<FlowDefinition<H>>,
    pub(crate) config: EngineConfig,
    pub(crate) stack: Vec<FlowFrame<H>>,
    pub(crate) variables: Variables,
    pub(crate) current_phase: Option<String>,
    pub(crate) complete: bool,
    pub(crate) awaiting_input: bool,
    pub(crate) history: Vec<ActionRecord>,
}

impl<H> Default for FlowEngine<H> {
    fn default() -> Self {
        Self {
            definition: None,
            config: EngineConfig::default(),
            stack: Vec::new(),
            variables: Variables::new(),
            current_phase: None,
            complete: false,
            awaiting_input: false,
            history: Vec::new(),
        }
    }
}

impl<H: Host> FlowEngine<H> {
    pub fn new(definition: FlowDefinition<H>) -> Self {
        Self::with_config(definition, EngineConfig::default())
    }

    pub fn with_config(definition: FlowDefinition<H>, config: EngineConfig) -> Self {
        Self {
            definition: Some(definition),
            config,
            ..Self::default()
        }
    }

    /// Replace the definition. Any in-progress state is discarded.
    pub fn set_definition(&mut self, definition: FlowDefinition<H>) {
        self.definition = Some(definition);
        self.reset();
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Successful actions since `start()`/`restore()`.
    #[must_use]
    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    #[must_use]
    pub fn is_awaiting_input(&self) -> bool {
        self.awaiting_input
    }

    pub(crate) fn reset(&mut self) {
        self.stack.clear();
        self.history.clear();
        self.current_phase = None;
        self.complete = false;
        self.awaiting_input = false;
    }

    pub(crate) fn root(&self) -> Result<NodeRef<H>, FlowError> {
        self.definition
            .as_ref()
            .map(|def| Arc::clone(&def.root))
            .ok_or(FlowError::NoFlowDefinition)
    }

    /// Begin the flow from the root.
    pub fn start(&mut self, host: &mut H) -> Result<FlowState, FlowError> {
        let root = self.root()?;
        self.reset();
        self.variables = self
            .definition
            .as_ref()
            .map(|def| def.variables.clone())
            .unwrap_or_default();

        info!(root = %root.label(), "flow started");
        self.stack.push(FlowFrame::new(root));
        self.run(host)?;

        Ok(self.get_state(host))
    }

    /// Perform an action for the suspended step, then continue the flow.
    ///
    /// Arguments arrive in wire form and are resolved against the action's
    /// selections. `player` may be omitted for single-player steps.
    pub fn resume(
        &mut self,
        host: &mut H,
        action: &str,
        raw: &RawArgs,
        player: Option<PlayerId>,
    ) -> Result<ResumeOutcome, FlowError> {
        let acting = self.acting_player(host, player)?;
        let args = match host.action(action) {
            Some(definition) => ActionExecutor::resolve_args(host, &definition, acting, raw),
            None => Args::default(),
        };

        self.perform(host, action, acting, args)
    }

    /// Like `resume()`, with arguments that are already resolved.
    pub fn resume_with_args(
        &mut self,
        host: &mut H,
        action: &str,
        mut args: Args,
        player: Option<PlayerId>,
    ) -> Result<ResumeOutcome, FlowError> {
        let acting = self.acting_player(host, player)?;
        if let Some(definition) = host.action(action) {
            ActionExecutor::fill_skipped(host, &definition, acting, &mut args);
        }

        self.perform(host, action, acting, args)
    }

    /// Snapshot of the engine as the host should present it.
    #[must_use]
    pub fn get_state(&self, host: &H) -> FlowState {
        let mut state = FlowState {
            complete: self.complete,
            awaiting_input: self.awaiting_input,
            current_player: host.current_player(),
            available_actions: Vec::new(),
            prompt: None,
            awaiting_players: Vec::new(),
            current_phase: self.current_phase.clone(),
        };

        if !self.awaiting_input {
            return state;
        }

        if let Some(frame) = self.stack.last() {
            match (&frame.node.kind, &frame.data) {
                (NodeKind::ActionStep(node), FrameData::Step(step)) => {
                    state.current_player = step.player;
                    state.available_actions = step.available.clone();
                    state.prompt = node.prompt.clone();
                    state.awaiting_players.push(AwaitingPlayer {
                        player: step.player,
                        available_actions: step.available.clone(),
                    });
                }
                (NodeKind::SimultaneousActionStep(node), FrameData::Simultaneous(slots)) => {
                    state.prompt = node.prompt.clone();
                    state.awaiting_players = slots
                        .iter()
                        .filter(|slot| !slot.done)
                        .map(|slot| AwaitingPlayer {
                            player: slot.player,
                            available_actions: slot.available.clone(),
                        })
                        .collect();
                }
                _ => {}
            }
        }

        state
    }

    /// Winners according to the definition's winners callback.
    #[must_use]
    pub fn get_winners(&self, host: &H) -> Vec<PlayerId> {
        self.definition
            .as_ref()
            .and_then(|def| def.winners.as_ref())
            .map(|winners| winners(&FlowContext::new(host, &self.variables)))
            .unwrap_or_default()
    }

    // === Run loop ===

    pub(crate) fn run(&mut self, host: &mut H) -> Result<(), FlowError> {
        self.awaiting_input = false;

        loop {
            if self.definition_complete(host) {
                info!("flow complete by definition");
                self.stack.clear();
                self.complete = true;
                return Ok(());
            }

            let Some(top) = self.stack.last() else {
                info!("flow complete");
                self.complete = true;
                return Ok(());
            };

            if top.completed {
                if let Some(frame) = self.stack.pop() {
                    debug!(node = %frame.node.label(), depth = self.stack.len(), "frame popped");
                }
                continue;
            }

            match self.visit(host)? {
                Visit::Push(node) => {
                    debug!(node = %node.label(), depth = self.stack.len(), "frame pushed");
                    self.stack.push(FlowFrame::new(node));
                }
                Visit::Complete => {
                    if let Some(frame) = self.stack.last_mut() {
                        frame.completed = true;
                    }
                }
                Visit::Suspend => {
                    self.awaiting_input = true;
                    info!(depth = self.stack.len(), player = %host.current_player(), "awaiting input");
                    return Ok(());
                }
            }
        }
    }

    fn definition_complete(&self, host: &H) -> bool {
        self.definition
            .as_ref()
            .and_then(|def| def.complete_when.as_ref())
            .is_some_and(|guard| guard(&FlowContext::new(host, &self.variables)))
    }

    fn visit(&mut self, host: &mut H) -> Result<Visit<H>, FlowError> {
        let depth = self.stack.len() - 1;
        let node = Arc::clone(&self.stack[depth].node);

        match &node.kind {
            NodeKind::Sequence(children) => {
                let frame = &mut self.stack[depth];
                if frame.pushed {
                    frame.index += 1;
                    frame.pushed = false;
                }
                match children.get(frame.index) {
                    Some(child) => {
                        frame.pushed = true;
                        Ok(Visit::Push(Arc::clone(child)))
                    }
                    None => Ok(Visit::Complete),
                }
            }

            NodeKind::Loop(cfg) => {
                self.stack[depth].pushed = false;
                if let Some(guard) = &cfg.while_ {
                    if !guard(&FlowContext::new(host, &self.variables)) {
                        return Ok(Visit::Complete);
                    }
                }

                let limit = cfg.max_iterations.unwrap_or(self.config.max_iterations);
                let frame = &mut self.stack[depth];
                if frame.iterations >= limit {
                    return Err(FlowError::IterationLimit {
                        node: node.label(),
                        limit,
                    });
                }
                frame.iterations += 1;
                frame.pushed = true;
                Ok(Visit::Push(Arc::clone(&cfg.body)))
            }

            NodeKind::EachPlayer(cfg) => {
                if !self.stack[depth].entered {
                    let players = each_player_order(cfg, &FlowContext::new(host, &self.variables));
                    debug!(node = %node.label(), ?players, "player order snapshotted");
                    let frame = &mut self.stack[depth];
                    frame.entered = true;
                    frame.index = 0;
                    frame.data = FrameData::Players(players);
                } else if self.stack[depth].pushed {
                    let frame = &mut self.stack[depth];
                    frame.index += 1;
                    frame.pushed = false;
                }

                let limit = cfg.max_iterations.unwrap_or(self.config.max_iterations);
                let frame = &mut self.stack[depth];
                let player = match &frame.data {
                    FrameData::Players(players) => players.get(frame.index).copied(),
                    _ => None,
                };
                let Some(player) = player else {
                    return Ok(Visit::Complete);
                };
                if frame.index as u32 >= limit {
                    return Err(FlowError::IterationLimit {
                        node: node.label(),
                        limit,
                    });
                }
                frame.iterations = frame.index as u32 + 1;
                frame.pushed = true;

                self.variables.insert(cfg.variable.clone(), Value::Player(player));
                host.set_current_player(player);
                Ok(Visit::Push(Arc::clone(&cfg.body)))
            }

            NodeKind::ForEach(cfg) => {
                if !self.stack[depth].entered {
                    let items = (cfg.collection)(&FlowContext::new(host, &self.variables));
                    let frame = &mut self.stack[depth];
                    frame.entered = true;
                    frame.index = 0;
                    frame.data = FrameData::Items(items);
                } else if self.stack[depth].pushed {
                    let frame = &mut self.stack[depth];
                    frame.index += 1;
                    frame.pushed = false;
                }

                let limit = cfg.max_iterations.unwrap_or(self.config.max_iterations);
                let frame = &mut self.stack[depth];
                let item = match &frame.data {
                    FrameData::Items(items) => items.get(frame.index).cloned(),
                    _ => None,
                };
                let Some(item) = item else {
                    return Ok(Visit::Complete);
                };
                if frame.index as u32 >= limit {
                    return Err(FlowError::IterationLimit {
                        node: node.label(),
                        limit,
                    });
                }
                frame.iterations = frame.index as u32 + 1;
                frame.pushed = true;

                self.variables.insert(cfg.variable.clone(), item);
                Ok(Visit::Push(Arc::clone(&cfg.body)))
            }

            NodeKind::ActionStep(cfg) => {
                if !self.stack[depth].entered {
                    self.stack[depth].entered = true;
                    let skip = cfg
                        .skip_if
                        .as_ref()
                        .is_some_and(|guard| guard(&FlowContext::new(host, &self.variables)));
                    if skip {
                        debug!(node = %node.label(), "action step skipped");
                        return Ok(Visit::Complete);
                    }
                }

                let player = match &cfg.player {
                    Some(f) => f(&FlowContext::new(host, &self.variables)),
                    None => host.current_player(),
                };
                host.set_current_player(player);

                let available = legal_actions(host, player, &cfg.actions);
                let frame = &mut self.stack[depth];

                if available.is_empty() {
                    let min_moves = cfg.min_moves.unwrap_or(0);
                    if frame.iterations < min_moves {
                        return Err(FlowError::MinMovesUnmet {
                            node: node.label(),
                            player,
                            min_moves,
                            moves: frame.iterations,
                        });
                    }
                    debug!(node = %node.label(), %player, "no actions available, step complete");
                    return Ok(Visit::Complete);
                }

                frame.data = FrameData::Step(StepState { player, available });
                Ok(Visit::Suspend)
            }

            NodeKind::SimultaneousActionStep(cfg) => {
                if !self.stack[depth].entered {
                    let ctx = FlowContext::new(&*host, &self.variables);
                    let participants = match &cfg.players {
                        Some(f) => f(&ctx),
                        None => host.players(),
                    };
                    let slots = participants
                        .into_iter()
                        .map(|player| {
                            let mut slot = PlayerSlot::new(player);
                            slot.done = cfg.skip_player.as_ref().is_some_and(|skip| skip(&ctx, player));
                            slot
                        })
                        .collect();
                    let frame = &mut self.stack[depth];
                    frame.entered = true;
                    frame.data = FrameData::Simultaneous(slots);
                }

                let ctx = FlowContext::new(&*host, &self.variables);
                if cfg.all_done.as_ref().is_some_and(|guard| guard(&ctx)) {
                    debug!(node = %node.label(), "all players done");
                    return Ok(Visit::Complete);
                }

                let FrameData::Simultaneous(slots) = &mut self.stack[depth].data else {
                    return Ok(Visit::Complete);
                };
                for slot in slots.iter_mut().filter(|slot| !slot.done) {
                    if cfg.player_done.as_ref().is_some_and(|f| f(&ctx, slot.player)) {
                        slot.done = true;
                        continue;
                    }
                    slot.available = legal_actions(&*host, slot.player, &cfg.actions);
                    if slot.available.is_empty() {
                        debug!(node = %node.label(), player = %slot.player, "no actions available, player done");
                        slot.done = true;
                    }
                }

                if slots.iter().all(|slot| slot.done) {
                    Ok(Visit::Complete)
                } else {
                    Ok(Visit::Suspend)
                }
            }

            NodeKind::Switch(cfg) => {
                if self.stack[depth].pushed {
                    return Ok(Visit::Complete);
                }

                let value = (cfg.on)(&FlowContext::new(host, &self.variables));
                let branch = match cfg.cases.iter().position(|(case, _)| *case == value) {
                    Some(index) => Some((index, Arc::clone(&cfg.cases[index].1))),
                    None => cfg.default.as_ref().map(|d| (cfg.cases.len(), Arc::clone(d))),
                };

                match branch {
                    Some((index, child)) => {
                        debug!(node = %node.label(), %value, branch = index, "switch resolved");
                        let frame = &mut self.stack[depth];
                        frame.index = index;
                        frame.pushed = true;
                        Ok(Visit::Push(child))
                    }
                    None => {
                        debug!(node = %node.label(), %value, "no matching case");
                        Ok(Visit::Complete)
                    }
                }
            }

            NodeKind::If(cfg) => {
                if self.stack[depth].pushed {
                    return Ok(Visit::Complete);
                }

                let holds = (cfg.condition)(&FlowContext::new(host, &self.variables));
                let branch = if holds {
                    Some((0, Arc::clone(&cfg.then)))
                } else {
                    cfg.otherwise.as_ref().map(|o| (1, Arc::clone(o)))
                };

                match branch {
                    Some((index, child)) => {
                        let frame = &mut self.stack[depth];
                        frame.index = index;
                        frame.pushed = true;
                        Ok(Visit::Push(child))
                    }
                    None => Ok(Visit::Complete),
                }
            }

            NodeKind::Execute(callback) => {
                callback(&mut FlowContextMut::new(host, &mut self.variables));
                Ok(Visit::Complete)
            }

            NodeKind::Phase(cfg) => {
                if !self.stack[depth].pushed {
                    let previous = self.current_phase.replace(cfg.name.clone());
                    let frame = &mut self.stack[depth];
                    frame.entered = true;
                    frame.pushed = true;
                    frame.data = FrameData::Phase { previous };

                    info!(phase = %cfg.name, "entering phase");
                    if let Some(on_enter) = &cfg.on_enter {
                        on_enter(&mut FlowContextMut::new(host, &mut self.variables));
                    }
                    return Ok(Visit::Push(Arc::clone(&cfg.body)));
                }

                if let Some(on_exit) = &cfg.on_exit {
                    on_exit(&mut FlowContextMut::new(host, &mut self.variables));
                }
                let previous = match std::mem::take(&mut self.stack[depth].data) {
                    FrameData::Phase { previous } => previous,
                    _ => None,
                };
                info!(phase = %cfg.name, "leaving phase");
                self.current_phase = previous;
                Ok(Visit::Complete)
            }
        }
    }

    // === Resume ===

    fn acting_player(&self, host: &H, requested: Option<PlayerId>) -> Result<PlayerId, FlowError> {
        if !self.awaiting_input {
            return Err(FlowError::NotAwaitingInput);
        }

        match self.stack.last().map(|frame| &frame.data) {
            Some(FrameData::Step(step)) => Ok(requested.unwrap_or(step.player)),
            Some(FrameData::Simultaneous(slots)) => {
                let mut awaiting = slots.iter().filter(|slot| !slot.done).map(|slot| slot.player);
                match requested {
                    Some(player) if awaiting.any(|p| p == player) => Ok(player),
                    Some(player) => Err(FlowError::PlayerNotAwaiting { player }),
                    None => {
                        let first = awaiting.next();
                        match (first, awaiting.next()) {
                            (Some(only), None) => Ok(only),
                            _ => Err(FlowError::PlayerNotAwaiting {
                                player: host.current_player(),
                            }),
                        }
                    }
                }
            }
            _ => Err(FlowError::NotAwaitingInput),
        }
    }

    fn perform(
        &mut self,
        host: &mut H,
        action: &str,
        player: PlayerId,
        args: Args,
    ) -> Result<ResumeOutcome, FlowError> {
        let depth = self.stack.len() - 1;

        if host.action(action).is_none() {
            let err = ValidationError::UnknownAction(action.to_string());
            return Ok(self.rejected(host, err.to_string()));
        }

        let allowed = match &self.stack[depth].data {
            FrameData::Step(step) if step.player != player => {
                return Ok(self.rejected(host, format!("it is not {player}'s turn")));
            }
            FrameData::Step(step) => step.available.iter().any(|a| a == action),
            FrameData::Simultaneous(slots) => slots
                .iter()
                .find(|slot| slot.player == player)
                .is_some_and(|slot| slot.available.iter().any(|a| a == action)),
            _ => false,
        };
        if !allowed {
            let err = ValidationError::NotAvailable {
                action: action.to_string(),
                player,
            };
            return Ok(self.rejected(host, err.to_string()));
        }

        let result = host.perform_action(action, player, &args);
        if !result.success {
            return Ok(ResumeOutcome {
                result,
                state: self.get_state(host),
            });
        }

        info!(action, %player, "action performed");
        if self.config.record_history {
            let undoable = host.action(action).map_or(true, |def| def.undoable);
            self.history.push(ActionRecord {
                player,
                action: action.to_string(),
                args: args.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
                undoable,
                sequence: self.history.len() as u32,
            });
        }

        self.after_move(host, depth, player);
        self.run(host)?;

        Ok(ResumeOutcome {
            result,
            state: self.get_state(host),
        })
    }

    fn rejected(&self, host: &H, error: String) -> ResumeOutcome {
        warn!(error = %error, "action rejected by flow");
        ResumeOutcome {
            result: ActionResult::failure(error),
            state: self.get_state(host),
        }
    }

    /// Count a successful move and decide whether the step is finished.
    fn after_move(&mut self, host: &H, depth: usize, player: PlayerId) {
        let node = Arc::clone(&self.stack[depth].node);

        match &node.kind {
            NodeKind::ActionStep(cfg) => {
                let moves = self.stack[depth].iterations + 1;
                let min_moves = cfg.min_moves.unwrap_or(0);
                let done = match (cfg.max_moves, &cfg.repeat_until) {
                    (Some(max), _) if moves >= max => true,
                    (_, Some(until)) => moves >= min_moves && until(&FlowContext::new(host, &self.variables)),
                    (None, None) => moves >= min_moves.max(1),
                    (Some(_), None) => false,
                };

                let frame = &mut self.stack[depth];
                frame.iterations = moves;
                if done {
                    debug!(node = %node.label(), moves, "action step complete");
                    frame.completed = true;
                }
            }
            NodeKind::SimultaneousActionStep(cfg) => {
                if let FrameData::Simultaneous(slots) = &mut self.stack[depth].data {
                    if let Some(slot) = slots.iter_mut().find(|slot| slot.player == player) {
                        slot.moves += 1;
                        if slot.moves >= cfg.max_moves {
                            slot.done = true;
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// Player order for an EachPlayer pass.
pub(crate) fn each_player_order<H: Host>(cfg: &EachPlayerNode<H>, ctx: &FlowContext<'_, H>) -> Vec<PlayerId> {
    // Seats past the last representable PlayerId are never visited
    let Some(last) = PlayerId::all(ctx.host().player_count()).last() else {
        return Vec::new();
    };
    let count = last.index() + 1;
    if count < ctx.host().player_count() {
        warn!(players = ctx.host().player_count(), seats = count, "player count exceeds seat range");
    }

    let first = match &cfg.starting_player {
        Some(f) => f(ctx),
        None if cfg.reverse => last,
        None => PlayerId::new(0),
    };

    let mut order: Vec<PlayerId> = PlayerId::rotation(first, count).collect();
    if cfg.reverse {
        order[1..].reverse();
    }

    order
        .into_iter()
        .filter(|&p| cfg.filter.as_ref().map_or(true, |f| f(ctx, p)))
        .collect()
}

/// Step actions that the host allows and that have a legal assignment,
/// in the step's declared order.
pub(crate) fn legal_actions<H: Host>(host: &H, player: PlayerId, actions: &[String]) -> Vec<String> {
    let allowed = host.available_actions(player);

    actions
        .iter()
        .filter(|name| allowed.contains(name))
        .filter(|name| match host.action(name) {
            Some(definition) => ActionExecutor::is_action_available(host, &definition, player),
            None => {
                warn!(action = %name, "action step names an unregistered action");
                false
            }
        })
        .cloned()
        .collect()
}
