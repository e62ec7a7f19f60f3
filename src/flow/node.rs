//! Flow nodes: the static, declarative turn structure.
//!
//! A flow is a tree of `FlowNode`s built once by the game definition and
//! never mutated while it runs. Each node is a tagged `NodeKind`; the
//! engine dispatches on it with an exhaustive match.
//!
//! ## Example
//!
//! ```
//! use turn_flow::flow::{ActionStepNode, EachPlayerNode, FlowNode, LoopNode};
//!
//! # struct Game;
//! let round: FlowNode<Game> = LoopNode::new(
//!     EachPlayerNode::new(ActionStepNode::new(["draw", "play", "pass"]).prompt("Your turn")),
//! )
//! .while_(|ctx| ctx.int("round") < 10)
//! .into();
//!
//! assert_eq!(round.kind_name(), "loop");
//! ```

use std::sync::Arc;

use crate::core::{PlayerId, Value};

use super::context::{FlowContext, FlowContextMut};

/// Shared reference to a node. Frames hold these; nodes never point back.
pub type NodeRef<H> = Arc<FlowNode<H>>;

pub type Guard<H> = Arc<dyn Fn(&FlowContext<'_, H>) -> bool>;
pub type Hook<H> = Arc<dyn Fn(&mut FlowContextMut<'_, H>)>;
pub type PlayerFn<H> = Arc<dyn Fn(&FlowContext<'_, H>) -> PlayerId>;
pub type PlayersFn<H> = Arc<dyn Fn(&FlowContext<'_, H>) -> Vec<PlayerId>>;
pub type PlayerPredicate<H> = Arc<dyn Fn(&FlowContext<'_, H>, PlayerId) -> bool>;
pub type CollectionFn<H> = Arc<dyn Fn(&FlowContext<'_, H>) -> Vec<Value>>;
pub type ValueFn<H> = Arc<dyn Fn(&FlowContext<'_, H>) -> Value>;

/// A node in the flow tree.
pub struct FlowNode<H> {
    /// Label used in logs and errors.
    pub name: Option<String>,
    pub kind: NodeKind<H>,
}

/// Node kinds and their configuration.
pub enum NodeKind<H> {
    /// Run children left to right.
    Sequence(Vec<NodeRef<H>>),
    Loop(LoopNode<H>),
    EachPlayer(EachPlayerNode<H>),
    ForEach(ForEachNode<H>),
    ActionStep(ActionStepNode<H>),
    SimultaneousActionStep(SimultaneousStepNode<H>),
    Switch(SwitchNode<H>),
    If(IfNode<H>),
    /// Run a side-effecting callback.
    Execute(Hook<H>),
    Phase(PhaseNode<H>),
}

impl<H> FlowNode<H> {
    fn from_kind(kind: NodeKind<H>) -> Self {
        Self { name: None, kind }
    }

    pub fn sequence(children: impl IntoIterator<Item = FlowNode<H>>) -> Self {
        Self::from_kind(NodeKind::Sequence(children.into_iter().map(Arc::new).collect()))
    }

    pub fn execute(callback: impl Fn(&mut FlowContextMut<'_, H>) + 'static) -> Self {
        Self::from_kind(NodeKind::Execute(Arc::new(callback)))
    }

    /// Attach a diagnostic label.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Sequence(_) => "sequence",
            NodeKind::Loop(_) => "loop",
            NodeKind::EachPlayer(_) => "each-player",
            NodeKind::ForEach(_) => "for-each",
            NodeKind::ActionStep(_) => "action-step",
            NodeKind::SimultaneousActionStep(_) => "simultaneous-action-step",
            NodeKind::Switch(_) => "switch",
            NodeKind::If(_) => "if",
            NodeKind::Execute(_) => "execute",
            NodeKind::Phase(_) => "phase",
        }
    }

    /// Name if set, otherwise the kind name.
    #[must_use]
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.kind_name().to_string())
    }

    /// The child a frame of this node runs when its cursor is `index`.
    ///
    /// Single-body nodes ignore the index. Switch uses `cases.len()` for
    /// its default branch; If uses `0` for `then` and `1` for `otherwise`.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<NodeRef<H>> {
        match &self.kind {
            NodeKind::Sequence(children) => children.get(index).cloned(),
            NodeKind::Loop(node) => Some(Arc::clone(&node.body)),
            NodeKind::EachPlayer(node) => Some(Arc::clone(&node.body)),
            NodeKind::ForEach(node) => Some(Arc::clone(&node.body)),
            NodeKind::Phase(node) => Some(Arc::clone(&node.body)),
            NodeKind::Switch(node) => match node.cases.get(index) {
                Some((_, branch)) => Some(Arc::clone(branch)),
                None if index == node.cases.len() => node.default.clone(),
                None => None,
            },
            NodeKind::If(node) => match index {
                0 => Some(Arc::clone(&node.then)),
                1 => node.otherwise.clone(),
                _ => None,
            },
            NodeKind::ActionStep(_) | NodeKind::SimultaneousActionStep(_) | NodeKind::Execute(_) => None,
        }
    }
}

impl<H> std::fmt::Debug for FlowNode<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowNode")
            .field("name", &self.name)
            .field("kind", &self.kind_name())
            .finish()
    }
}

/// Repeat a body while a guard holds.
pub struct LoopNode<H> {
    pub while_: Option<Guard<H>>,
    pub body: NodeRef<H>,
    /// Overrides `EngineConfig::max_iterations`.
    pub max_iterations: Option<u32>,
}

impl<H> LoopNode<H> {
    /// A loop with no guard; it ends only by hitting its cap or by the
    /// flow definition reporting completion.
    pub fn new(body: impl Into<FlowNode<H>>) -> Self {
        Self {
            while_: None,
            body: Arc::new(body.into()),
            max_iterations: None,
        }
    }

    #[must_use]
    pub fn while_(mut self, guard: impl Fn(&FlowContext<'_, H>) -> bool + 'static) -> Self {
        self.while_ = Some(Arc::new(guard));
        self
    }

    #[must_use]
    pub fn max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = Some(max);
        self
    }
}

/// Run a body once per player.
///
/// The player order is computed once when the node is entered and then
/// fixed for that pass.
pub struct EachPlayerNode<H> {
    /// Variable bound to the player for each pass.
    pub variable: String,
    pub body: NodeRef<H>,
    pub filter: Option<PlayerPredicate<H>>,
    pub starting_player: Option<PlayerFn<H>>,
    /// Iterate counter-clockwise.
    pub reverse: bool,
    pub max_iterations: Option<u32>,
}

impl<H> EachPlayerNode<H> {
    pub fn new(body: impl Into<FlowNode<H>>) -> Self {
        Self {
            variable: "player".to_string(),
            body: Arc::new(body.into()),
            filter: None,
            starting_player: None,
            reverse: false,
            max_iterations: None,
        }
    }

    #[must_use]
    pub fn variable(mut self, name: impl Into<String>) -> Self {
        self.variable = name.into();
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Fn(&FlowContext<'_, H>, PlayerId) -> bool + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    #[must_use]
    pub fn starting_player(mut self, f: impl Fn(&FlowContext<'_, H>) -> PlayerId + 'static) -> Self {
        self.starting_player = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    #[must_use]
    pub fn max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = Some(max);
        self
    }
}

/// Run a body once per item of a computed collection.
pub struct ForEachNode<H> {
    pub variable: String,
    pub collection: CollectionFn<H>,
    pub body: NodeRef<H>,
    pub max_iterations: Option<u32>,
}

impl<H> ForEachNode<H> {
    pub fn new(
        variable: impl Into<String>,
        collection: impl Fn(&FlowContext<'_, H>) -> Vec<Value> + 'static,
        body: impl Into<FlowNode<H>>,
    ) -> Self {
        Self {
            variable: variable.into(),
            collection: Arc::new(collection),
            body: Arc::new(body.into()),
            max_iterations: None,
        }
    }

    #[must_use]
    pub fn max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = Some(max);
        self
    }
}

/// Suspend until one designated player performs an action.
pub struct ActionStepNode<H> {
    /// Designated player; defaults to the host's current player.
    pub player: Option<PlayerFn<H>>,
    pub actions: Vec<String>,
    pub prompt: Option<String>,
    pub min_moves: Option<u32>,
    pub max_moves: Option<u32>,
    pub repeat_until: Option<Guard<H>>,
    pub skip_if: Option<Guard<H>>,
}

impl<H> ActionStepNode<H> {
    pub fn new<S: Into<String>>(actions: impl IntoIterator<Item = S>) -> Self {
        Self {
            player: None,
            actions: actions.into_iter().map(Into::into).collect(),
            prompt: None,
            min_moves: None,
            max_moves: None,
            repeat_until: None,
            skip_if: None,
        }
    }

    #[must_use]
    pub fn player(mut self, f: impl Fn(&FlowContext<'_, H>) -> PlayerId + 'static) -> Self {
        self.player = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    #[must_use]
    pub fn min_moves(mut self, min: u32) -> Self {
        self.min_moves = Some(min);
        self
    }

    #[must_use]
    pub fn max_moves(mut self, max: u32) -> Self {
        self.max_moves = Some(max);
        self
    }

    #[must_use]
    pub fn repeat_until(mut self, guard: impl Fn(&FlowContext<'_, H>) -> bool + 'static) -> Self {
        self.repeat_until = Some(Arc::new(guard));
        self
    }

    #[must_use]
    pub fn skip_if(mut self, guard: impl Fn(&FlowContext<'_, H>) -> bool + 'static) -> Self {
        self.skip_if = Some(Arc::new(guard));
        self
    }
}

/// Suspend until every participating player is done.
pub struct SimultaneousStepNode<H> {
    /// Participants; defaults to every seated player.
    pub players: Option<PlayersFn<H>>,
    pub actions: Vec<String>,
    pub prompt: Option<String>,
    /// Players for which this returns true start out done.
    pub skip_player: Option<PlayerPredicate<H>>,
    /// Marks a player done before their move budget runs out.
    pub player_done: Option<PlayerPredicate<H>>,
    /// Ends the whole step.
    pub all_done: Option<Guard<H>>,
    /// Moves each player makes before being done.
    pub max_moves: u32,
}

impl<H> SimultaneousStepNode<H> {
    pub fn new<S: Into<String>>(actions: impl IntoIterator<Item = S>) -> Self {
        Self {
            players: None,
            actions: actions.into_iter().map(Into::into).collect(),
            prompt: None,
            skip_player: None,
            player_done: None,
            all_done: None,
            max_moves: 1,
        }
    }

    #[must_use]
    pub fn players(mut self, f: impl Fn(&FlowContext<'_, H>) -> Vec<PlayerId> + 'static) -> Self {
        self.players = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    #[must_use]
    pub fn skip_player(mut self, f: impl Fn(&FlowContext<'_, H>, PlayerId) -> bool + 'static) -> Self {
        self.skip_player = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn player_done(mut self, f: impl Fn(&FlowContext<'_, H>, PlayerId) -> bool + 'static) -> Self {
        self.player_done = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn all_done(mut self, guard: impl Fn(&FlowContext<'_, H>) -> bool + 'static) -> Self {
        self.all_done = Some(Arc::new(guard));
        self
    }

    #[must_use]
    pub fn max_moves(mut self, max: u32) -> Self {
        self.max_moves = max.max(1);
        self
    }
}

/// Branch on a discriminant value.
pub struct SwitchNode<H> {
    pub on: ValueFn<H>,
    pub cases: Vec<(Value, NodeRef<H>)>,
    pub default: Option<NodeRef<H>>,
}

impl<H> SwitchNode<H> {
    pub fn new(on: impl Fn(&FlowContext<'_, H>) -> Value + 'static) -> Self {
        Self {
            on: Arc::new(on),
            cases: Vec::new(),
            default: None,
        }
    }

    #[must_use]
    pub fn case(mut self, value: impl Into<Value>, branch: impl Into<FlowNode<H>>) -> Self {
        self.cases.push((value.into(), Arc::new(branch.into())));
        self
    }

    #[must_use]
    pub fn default(mut self, branch: impl Into<FlowNode<H>>) -> Self {
        self.default = Some(Arc::new(branch.into()));
        self
    }
}

/// Branch on a predicate.
pub struct IfNode<H> {
    pub condition: Guard<H>,
    pub then: NodeRef<H>,
    pub otherwise: Option<NodeRef<H>>,
}

impl<H> IfNode<H> {
    pub fn new(
        condition: impl Fn(&FlowContext<'_, H>) -> bool + 'static,
        then: impl Into<FlowNode<H>>,
    ) -> Self {
        Self {
            condition: Arc::new(condition),
            then: Arc::new(then.into()),
            otherwise: None,
        }
    }

    #[must_use]
    pub fn otherwise(mut self, branch: impl Into<FlowNode<H>>) -> Self {
        self.otherwise = Some(Arc::new(branch.into()));
        self
    }
}

/// A named sub-tree with enter/exit hooks.
pub struct PhaseNode<H> {
    pub name: String,
    pub body: NodeRef<H>,
    pub on_enter: Option<Hook<H>>,
    pub on_exit: Option<Hook<H>>,
}

impl<H> PhaseNode<H> {
    pub fn new(name: impl Into<String>, body: impl Into<FlowNode<H>>) -> Self {
        Self {
            name: name.into(),
            body: Arc::new(body.into()),
            on_enter: None,
            on_exit: None,
        }
    }

    #[must_use]
    pub fn on_enter(mut self, hook: impl Fn(&mut FlowContextMut<'_, H>) + 'static) -> Self {
        self.on_enter = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_exit(mut self, hook: impl Fn(&mut FlowContextMut<'_, H>) + 'static) -> Self {
        self.on_exit = Some(Arc::new(hook));
        self
    }
}

macro_rules! impl_into_node {
    ($($config:ident => $variant:ident),* $(,)?) => {
        $(
            impl<H> From<$config<H>> for FlowNode<H> {
                fn from(config: $config<H>) -> Self {
                    FlowNode::from_kind(NodeKind::$variant(config))
                }
            }
        )*
    };
}

impl_into_node! {
    LoopNode => Loop,
    EachPlayerNode => EachPlayer,
    ForEachNode => ForEach,
    ActionStepNode => ActionStep,
    SimultaneousStepNode => SimultaneousActionStep,
    SwitchNode => Switch,
    IfNode => If,
    PhaseNode => Phase,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoHost;

    fn step(name: &str) -> FlowNode<NoHost> {
        ActionStepNode::new([name]).into()
    }

    #[test]
    fn test_sequence_children() {
        let seq = FlowNode::sequence([step("a"), step("b")]).named("turn");

        assert_eq!(seq.label(), "turn");
        assert!(seq.child(1).is_some());
        assert!(seq.child(2).is_none());
    }

    #[test]
    fn test_switch_default_index() {
        let switch: FlowNode<NoHost> = SwitchNode::new(|_| Value::Int(1))
            .case(1, step("a"))
            .case(2, step("b"))
            .default(step("c"))
            .into();

        assert_eq!(switch.kind_name(), "switch");
        assert!(switch.child(2).is_some());
        assert!(switch.child(3).is_none());
    }

    #[test]
    fn test_if_branches() {
        let without_else: FlowNode<NoHost> = IfNode::new(|_| true, step("a")).into();
        assert!(without_else.child(0).is_some());
        assert!(without_else.child(1).is_none());

        let with_else: FlowNode<NoHost> = IfNode::new(|_| true, step("a")).otherwise(step("b")).into();
        assert!(with_else.child(1).is_some());
    }

    #[test]
    fn test_leaves_have_no_children() {
        assert!(step("a").child(0).is_none());
        assert!(FlowNode::<NoHost>::execute(|_| {}).child(0).is_none());
        assert_eq!(step("a").label(), "action-step");
    }

    #[test]
    fn test_simultaneous_max_moves_at_least_one() {
        let node: SimultaneousStepNode<NoHost> = SimultaneousStepNode::new(["bid"]).max_moves(0);
        assert_eq!(node.max_moves, 1);
    }
}
