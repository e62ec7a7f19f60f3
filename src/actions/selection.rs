//! Selections: the typed input slots of an action.
//!
//! Each selection is resolved in declared order. Enumerable kinds
//! (`Choice`, `Player`, `Element`) produce a finite choice set from the
//! current context; `Text` and `Number` are free-form and constrained only
//! structurally.
//!
//! A `Choice` selection may declare a dependency on an earlier selection:
//! its choice set is narrowed by the value already resolved for that
//! selection. Declared dependencies are what the availability search
//! branches on (see `ActionExecutor::is_action_available`).

use std::sync::Arc;

use regex::Regex;

use crate::core::{Args, ElementId, PlayerId, Value};

/// Read-only context handed to selection callbacks.
pub struct SelectionContext<'a, H> {
    /// The host game.
    pub host: &'a H,
    /// The player building the action.
    pub player: PlayerId,
    /// Arguments resolved so far.
    pub args: &'a Args,
}

impl<'a, H> SelectionContext<'a, H> {
    pub fn new(host: &'a H, player: PlayerId, args: &'a Args) -> Self {
        Self { host, player, args }
    }

    /// Look up an already-resolved argument.
    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&'a Value> {
        self.args.get(name)
    }
}

/// Callback producing a choice set.
pub type ChoicesFn<H> = Arc<dyn Fn(&SelectionContext<'_, H>) -> Vec<Value>>;

/// Callback producing candidate elements.
pub type ElementsFn<H> = Arc<dyn Fn(&SelectionContext<'_, H>) -> Vec<ElementId>>;

/// Filter over candidate players.
pub type PlayerFilterFn<H> = Arc<dyn Fn(&SelectionContext<'_, H>, PlayerId) -> bool>;

/// Filter over candidate elements.
pub type ElementFilterFn<H> = Arc<dyn Fn(&SelectionContext<'_, H>, ElementId) -> bool>;

/// Narrowing predicate: `(candidate, prior value, context)`.
pub type DependencyFn<H> = Arc<dyn Fn(&Value, &Value, &SelectionContext<'_, H>) -> bool>;

/// Final caller-supplied check on a resolved value.
pub type ValidateFn<H> = Arc<dyn Fn(&Value, &SelectionContext<'_, H>) -> Result<(), String>>;

/// Where a `Choice` selection gets its candidates.
pub enum ChoiceSource<H> {
    /// A fixed list declared with the action.
    Static(Vec<Value>),
    /// Computed from the current context.
    Dynamic(ChoicesFn<H>),
}

impl<H> Clone for ChoiceSource<H> {
    fn clone(&self) -> Self {
        match self {
            ChoiceSource::Static(values) => ChoiceSource::Static(values.clone()),
            ChoiceSource::Dynamic(f) => ChoiceSource::Dynamic(Arc::clone(f)),
        }
    }
}

/// Declared dependency of a `Choice` selection on an earlier selection.
pub struct DependsOn<H> {
    /// Name of the earlier selection.
    pub selection: String,
    /// Keeps a candidate when it is compatible with the prior value.
    pub filter: DependencyFn<H>,
}

impl<H> Clone for DependsOn<H> {
    fn clone(&self) -> Self {
        Self {
            selection: self.selection.clone(),
            filter: Arc::clone(&self.filter),
        }
    }
}

/// Kind-specific selection configuration.
pub enum SelectionKind<H> {
    Choice {
        choices: ChoiceSource<H>,
        depends_on: Option<DependsOn<H>>,
    },
    Player {
        filter: Option<PlayerFilterFn<H>>,
    },
    Element {
        elements: ElementsFn<H>,
        filter: Option<ElementFilterFn<H>>,
    },
    Text {
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<Regex>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
        integer: bool,
    },
}

impl<H> Clone for SelectionKind<H> {
    fn clone(&self) -> Self {
        match self {
            SelectionKind::Choice { choices, depends_on } => SelectionKind::Choice {
                choices: choices.clone(),
                depends_on: depends_on.clone(),
            },
            SelectionKind::Player { filter } => SelectionKind::Player {
                filter: filter.clone(),
            },
            SelectionKind::Element { elements, filter } => SelectionKind::Element {
                elements: Arc::clone(elements),
                filter: filter.clone(),
            },
            SelectionKind::Text {
                min_length,
                max_length,
                pattern,
            } => SelectionKind::Text {
                min_length: *min_length,
                max_length: *max_length,
                pattern: pattern.clone(),
            },
            SelectionKind::Number { min, max, integer } => SelectionKind::Number {
                min: *min,
                max: *max,
                integer: *integer,
            },
        }
    }
}

/// One named, typed input slot of an action.
///
/// ## Example
///
/// ```
/// use turn_flow::actions::Selection;
/// use turn_flow::core::Value;
///
/// struct Game;
///
/// let color: Selection<Game> = Selection::choice("color", vec![Value::from("red"), Value::from("blue")])
///     .prompt("Pick a color")
///     .skip_if_only_one();
///
/// assert!(color.is_enumerable());
/// assert!(color.skip_if_only_one);
/// ```
pub struct Selection<H> {
    pub name: String,
    pub prompt: Option<String>,
    /// An optional selection may be left unresolved.
    pub optional: bool,
    /// Resolve automatically when exactly one legal choice exists.
    pub skip_if_only_one: bool,
    pub validate: Option<ValidateFn<H>>,
    pub kind: SelectionKind<H>,
}

impl<H> Clone for Selection<H> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            prompt: self.prompt.clone(),
            optional: self.optional,
            skip_if_only_one: self.skip_if_only_one,
            validate: self.validate.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl<H> std::fmt::Debug for Selection<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("name", &self.name)
            .field("kind", &self.kind_name())
            .field("optional", &self.optional)
            .field("skip_if_only_one", &self.skip_if_only_one)
            .finish()
    }
}

impl<H> Selection<H> {
    fn with_kind(name: impl Into<String>, kind: SelectionKind<H>) -> Self {
        Self {
            name: name.into(),
            prompt: None,
            optional: false,
            skip_if_only_one: false,
            validate: None,
            kind,
        }
    }

    /// A choice from a fixed list.
    pub fn choice(name: impl Into<String>, choices: Vec<Value>) -> Self {
        Self::with_kind(
            name,
            SelectionKind::Choice {
                choices: ChoiceSource::Static(choices),
                depends_on: None,
            },
        )
    }

    /// A choice from a list computed at selection time.
    pub fn dynamic_choice(
        name: impl Into<String>,
        choices: impl Fn(&SelectionContext<'_, H>) -> Vec<Value> + 'static,
    ) -> Self {
        Self::with_kind(
            name,
            SelectionKind::Choice {
                choices: ChoiceSource::Dynamic(Arc::new(choices)),
                depends_on: None,
            },
        )
    }

    /// Choose any player (narrow with `player_filter`).
    pub fn player(name: impl Into<String>) -> Self {
        Self::with_kind(name, SelectionKind::Player { filter: None })
    }

    /// Choose one of the elements produced by `elements`.
    pub fn element(
        name: impl Into<String>,
        elements: impl Fn(&SelectionContext<'_, H>) -> Vec<ElementId> + 'static,
    ) -> Self {
        Self::with_kind(
            name,
            SelectionKind::Element {
                elements: Arc::new(elements),
                filter: None,
            },
        )
    }

    /// Free-form text input.
    pub fn text(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            SelectionKind::Text {
                min_length: None,
                max_length: None,
                pattern: None,
            },
        )
    }

    /// Numeric input.
    pub fn number(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            SelectionKind::Number {
                min: None,
                max: None,
                integer: false,
            },
        )
    }

    // === Shared options ===

    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn skip_if_only_one(mut self) -> Self {
        self.skip_if_only_one = true;
        self
    }

    /// Add a final check run after the kind-specific constraints.
    #[must_use]
    pub fn validate(
        mut self,
        check: impl Fn(&Value, &SelectionContext<'_, H>) -> Result<(), String> + 'static,
    ) -> Self {
        self.validate = Some(Arc::new(check));
        self
    }

    // === Kind-specific options ===
    //
    // Builders for a kind other than the selection's own are ignored.

    /// Narrow a `Choice` selection by the value of an earlier selection.
    #[must_use]
    pub fn depends_on(
        mut self,
        selection: impl Into<String>,
        filter: impl Fn(&Value, &Value, &SelectionContext<'_, H>) -> bool + 'static,
    ) -> Self {
        if let SelectionKind::Choice { depends_on, .. } = &mut self.kind {
            *depends_on = Some(DependsOn {
                selection: selection.into(),
                filter: Arc::new(filter),
            });
        }
        self
    }

    #[must_use]
    pub fn player_filter(
        mut self,
        f: impl Fn(&SelectionContext<'_, H>, PlayerId) -> bool + 'static,
    ) -> Self {
        if let SelectionKind::Player { filter } = &mut self.kind {
            *filter = Some(Arc::new(f));
        }
        self
    }

    #[must_use]
    pub fn element_filter(
        mut self,
        f: impl Fn(&SelectionContext<'_, H>, ElementId) -> bool + 'static,
    ) -> Self {
        if let SelectionKind::Element { filter, .. } = &mut self.kind {
            *filter = Some(Arc::new(f));
        }
        self
    }

    #[must_use]
    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        if let SelectionKind::Text {
            min_length,
            max_length,
            ..
        } = &mut self.kind
        {
            *min_length = min;
            *max_length = max;
        }
        self
    }

    /// Require text input to match `regex`.
    #[must_use]
    pub fn pattern(mut self, regex: Regex) -> Self {
        if let SelectionKind::Text { pattern, .. } = &mut self.kind {
            *pattern = Some(regex);
        }
        self
    }

    #[must_use]
    pub fn range(mut self, min_value: Option<f64>, max_value: Option<f64>) -> Self {
        if let SelectionKind::Number { min, max, .. } = &mut self.kind {
            *min = min_value;
            *max = max_value;
        }
        self
    }

    #[must_use]
    pub fn integer(mut self) -> Self {
        if let SelectionKind::Number { integer, .. } = &mut self.kind {
            *integer = true;
        }
        self
    }

    // === Introspection ===

    /// Kind name, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            SelectionKind::Choice { .. } => "choice",
            SelectionKind::Player { .. } => "player",
            SelectionKind::Element { .. } => "element",
            SelectionKind::Text { .. } => "text",
            SelectionKind::Number { .. } => "number",
        }
    }

    /// True for kinds with a finite choice set.
    #[must_use]
    pub fn is_enumerable(&self) -> bool {
        matches!(
            self.kind,
            SelectionKind::Choice { .. } | SelectionKind::Player { .. } | SelectionKind::Element { .. }
        )
    }

    /// Name of the earlier selection this one depends on, if declared.
    #[must_use]
    pub fn dependency(&self) -> Option<&str> {
        match &self.kind {
            SelectionKind::Choice {
                depends_on: Some(dep),
                ..
            } => Some(&dep.selection),
            _ => None,
        }
    }
}
