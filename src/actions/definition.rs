//! Action definitions, the registry hosts keep them in, and the records
//! produced when they run.
//!
//! An action is a name, an ordered list of selections, an optional
//! availability condition and an execute callback. The engine doesn't
//! interpret any of it beyond validation; the callback is the only place
//! game state changes.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{ActionError, Args, PlayerId, RawArgs};

use super::selection::{Selection, SelectionContext};

/// Availability gate, evaluated with empty arguments.
pub type ConditionFn<H> = Arc<dyn Fn(&SelectionContext<'_, H>) -> bool>;

/// The effect of an action.
pub type ExecuteFn<H> = Arc<dyn Fn(&mut H, PlayerId, &Args) -> Result<(), ActionError>>;

/// A named, player-triggerable operation.
///
/// ## Example
///
/// ```
/// use turn_flow::actions::{ActionDefinition, Selection};
///
/// struct Game {
///     score: i64,
/// }
///
/// let score: ActionDefinition<Game> = ActionDefinition::new("score", |game: &mut Game, _, _| {
///     game.score += 1;
///     Ok(())
/// })
/// .prompt("Score a point")
/// .not_undoable();
///
/// assert_eq!(score.name, "score");
/// assert!(!score.undoable);
/// assert!(score.selections.is_empty());
/// ```
pub struct ActionDefinition<H> {
    pub name: String,
    pub prompt: Option<String>,
    /// Resolved in declared order.
    pub selections: Vec<Selection<H>>,
    pub condition: Option<ConditionFn<H>>,
    pub undoable: bool,
    pub execute: ExecuteFn<H>,
}

impl<H> std::fmt::Debug for ActionDefinition<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("name", &self.name)
            .field("selections", &self.selections)
            .field("undoable", &self.undoable)
            .finish_non_exhaustive()
    }
}

impl<H> ActionDefinition<H> {
    /// Create an action with no selections.
    pub fn new(
        name: impl Into<String>,
        execute: impl Fn(&mut H, PlayerId, &Args) -> Result<(), ActionError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            prompt: None,
            selections: Vec::new(),
            condition: None,
            undoable: true,
            execute: Arc::new(execute),
        }
    }

    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Append a selection (builder pattern).
    #[must_use]
    pub fn selection(mut self, selection: Selection<H>) -> Self {
        self.selections.push(selection);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: impl Fn(&SelectionContext<'_, H>) -> bool + 'static) -> Self {
        self.condition = Some(Arc::new(condition));
        self
    }

    #[must_use]
    pub fn not_undoable(mut self) -> Self {
        self.undoable = false;
        self
    }

    #[must_use]
    pub fn get_selection(&self, name: &str) -> Option<&Selection<H>> {
        self.selections.iter().find(|s| s.name == name)
    }

    /// True when a later selection declares a dependency on `name`.
    #[must_use]
    pub fn is_depended_on(&self, name: &str) -> bool {
        self.selections.iter().any(|s| s.dependency() == Some(name))
    }
}

/// Catalogue of registered actions, keyed by name.
///
/// Hosts embed one of these and answer `Host::action` from it.
pub struct ActionRegistry<H> {
    actions: FxHashMap<String, Arc<ActionDefinition<H>>>,
    /// Registration order, so listings are deterministic.
    order: Vec<String>,
}

impl<H> Default for ActionRegistry<H> {
    fn default() -> Self {
        Self {
            actions: FxHashMap::default(),
            order: Vec::new(),
        }
    }
}

impl<H> ActionRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action, replacing any existing action with the same name.
    pub fn register(&mut self, action: ActionDefinition<H>) {
        let name = action.name.clone();
        if self.actions.insert(name.clone(), Arc::new(action)).is_none() {
            self.order.push(name);
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<ActionDefinition<H>>> {
        self.actions.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered action names in registration order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Outcome of performing an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// A performed action, kept in the engine's history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player: PlayerId,
    pub action: String,
    /// Arguments in wire form.
    pub args: RawArgs,
    pub undoable: bool,
    /// Position of this record in the history.
    pub sequence: u32,
}
