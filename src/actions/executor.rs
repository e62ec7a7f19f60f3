//! Action validation, execution and the availability search.
//!
//! ## Availability search
//!
//! `is_action_available` decides whether *some* legal full assignment of
//! an action's selections exists, without performing the action. It walks
//! the selections in declared order:
//!
//! - Text and Number selections never block and are never branched.
//! - An enumerable selection that no later selection declares a
//!   dependency on is only checked for a non-empty choice set (optional
//!   ones are skipped entirely).
//! - An enumerable selection that a later selection depends on is
//!   branched: every legal value is tried depth-first, and the search
//!   stops at the first value that leads to a full legal path. Optional
//!   ones also try being left unresolved.
//!
//! Choice callbacks that read earlier arguments without declaring the
//! dependency are not branched on, so the search can report an action as
//! available when only such an undeclared combination would fail.
//!
//! A Choice that declares a dependency on a Text or Number selection sees
//! no prior value during the search, so its dependency filter never
//! passes and the action is reported unavailable. Depend on enumerable
//! selections only.

use tracing::{debug, warn};

use crate::core::{ActionError, Args, PlayerId, RawArgs, ValidationError, Value};
use crate::host::Host;

use super::definition::{ActionDefinition, ActionResult};
use super::selection::{ChoiceSource, Selection, SelectionContext, SelectionKind};

/// Stateless validator/runner for action definitions.
pub struct ActionExecutor;

impl ActionExecutor {
    /// Map serialized arguments back to live values.
    ///
    /// Selections are processed in declared order so dependent choice sets
    /// see the values resolved before them. Unresolvable player or element
    /// references are left out rather than reported; validation then
    /// treats them as missing. Selections marked skip-if-only-one that were
    /// not supplied are filled in when exactly one legal choice exists.
    pub fn resolve_args<H: Host>(
        host: &H,
        action: &ActionDefinition<H>,
        player: PlayerId,
        raw: &RawArgs,
    ) -> Args {
        let mut args = Args::default();

        for selection in &action.selections {
            match raw.get(&selection.name) {
                Some(json) if !json.is_null() => {
                    match Self::resolve_value(host, selection, player, &args, json) {
                        Some(value) => {
                            args.insert(selection.name.clone(), value);
                        }
                        None => debug!(
                            selection = %selection.name,
                            raw = %json,
                            "argument did not resolve"
                        ),
                    }
                }
                _ => Self::fill_if_single(host, selection, player, &mut args),
            }
        }

        args
    }

    /// Fill in every unsupplied skip-if-only-one selection that has exactly
    /// one legal choice.
    pub fn fill_skipped<H: Host>(
        host: &H,
        action: &ActionDefinition<H>,
        player: PlayerId,
        args: &mut Args,
    ) {
        for selection in &action.selections {
            if !args.contains_key(&selection.name) {
                Self::fill_if_single(host, selection, player, args);
            }
        }
    }

    fn fill_if_single<H: Host>(host: &H, selection: &Selection<H>, player: PlayerId, args: &mut Args) {
        if !selection.skip_if_only_one || !selection.is_enumerable() {
            return;
        }

        let mut choices = Self::get_choices(host, selection, player, args);
        if Self::should_skip(selection, &choices) {
            if let Some(only) = choices.pop() {
                debug!(selection = %selection.name, value = %only, "auto-resolved single choice");
                args.insert(selection.name.clone(), only);
            }
        }
    }

    fn resolve_value<H: Host>(
        host: &H,
        selection: &Selection<H>,
        player: PlayerId,
        args: &Args,
        json: &serde_json::Value,
    ) -> Option<Value> {
        match &selection.kind {
            SelectionKind::Player { .. } => {
                let index = usize::try_from(json.as_u64()?).ok()?;
                PlayerId::from_index(index, host.player_count()).map(Value::Player)
            }
            SelectionKind::Element { .. } => {
                let id = u32::try_from(json.as_u64()?).ok()?;
                host.resolve_element(id).map(Value::Element)
            }
            SelectionKind::Choice { .. } => {
                let matched = Self::get_choices(host, selection, player, args)
                    .into_iter()
                    .find(|choice| choice.to_json() == *json);
                Some(matched.unwrap_or_else(|| Value::from_json(json)))
            }
            SelectionKind::Text { .. } | SelectionKind::Number { .. } => Some(Value::from_json(json)),
        }
    }

    /// Legal values for an enumerable selection given the partial
    /// arguments. Text and Number selections have no choice set.
    ///
    /// A Choice selection with a declared dependency is narrowed by the
    /// prior selection's value; if that value hasn't been resolved the
    /// choice set is empty.
    pub fn get_choices<H: Host>(
        host: &H,
        selection: &Selection<H>,
        player: PlayerId,
        args: &Args,
    ) -> Vec<Value> {
        let ctx = SelectionContext::new(host, player, args);

        match &selection.kind {
            SelectionKind::Choice { choices, depends_on } => {
                let base = match choices {
                    ChoiceSource::Static(values) => values.clone(),
                    ChoiceSource::Dynamic(f) => f(&ctx),
                };

                match depends_on {
                    None => base,
                    Some(dep) => match args.get(&dep.selection) {
                        Some(prior) => base
                            .into_iter()
                            .filter(|candidate| (dep.filter)(candidate, prior, &ctx))
                            .collect(),
                        None => Vec::new(),
                    },
                }
            }
            SelectionKind::Player { filter } => PlayerId::all(host.player_count())
                .filter(|&p| filter.as_ref().map_or(true, |f| f(&ctx, p)))
                .map(Value::Player)
                .collect(),
            SelectionKind::Element { elements, filter } => elements(&ctx)
                .into_iter()
                .filter(|&e| filter.as_ref().map_or(true, |f| f(&ctx, e)))
                .map(Value::Element)
                .collect(),
            SelectionKind::Text { .. } | SelectionKind::Number { .. } => Vec::new(),
        }
    }

    /// True exactly when the selection is marked skip-if-only-one and
    /// there is exactly one legal choice.
    #[must_use]
    pub fn should_skip<H>(selection: &Selection<H>, choices: &[Value]) -> bool {
        selection.skip_if_only_one && choices.len() == 1
    }

    /// Selections the caller still has to supply, in declared order.
    ///
    /// Selections that would be auto-resolved are not listed.
    pub fn open_selections<H: Host>(
        host: &H,
        action: &ActionDefinition<H>,
        player: PlayerId,
        args: &Args,
    ) -> Vec<String> {
        let mut working = args.clone();
        let mut open = Vec::new();

        for selection in &action.selections {
            if working.contains_key(&selection.name) {
                continue;
            }
            Self::fill_if_single(host, selection, player, &mut working);
            if !working.contains_key(&selection.name) {
                open.push(selection.name.clone());
            }
        }

        open
    }

    /// Kind-specific structural checks, then the selection's own
    /// `validate` predicate.
    pub fn validate_selection<H: Host>(
        host: &H,
        selection: &Selection<H>,
        value: &Value,
        player: PlayerId,
        args: &Args,
    ) -> Result<(), ValidationError> {
        let name = selection.name.as_str();

        match &selection.kind {
            SelectionKind::Player { .. } if value.as_player().is_none() => {
                return Err(ValidationError::invalid(name, "expected a player"));
            }
            SelectionKind::Element { .. } if value.as_element().is_none() => {
                return Err(ValidationError::invalid(name, "expected an element"));
            }
            SelectionKind::Choice { .. } | SelectionKind::Player { .. } | SelectionKind::Element { .. } => {
                let choices = Self::get_choices(host, selection, player, args);
                if !choices.contains(value) {
                    return Err(ValidationError::invalid(
                        name,
                        format!("{value} is not a legal choice"),
                    ));
                }
            }
            SelectionKind::Text {
                min_length,
                max_length,
                pattern,
            } => {
                let text = value
                    .as_str()
                    .ok_or_else(|| ValidationError::invalid(name, "expected text"))?;
                let length = text.chars().count();

                if let Some(min) = min_length.filter(|&min| length < min) {
                    return Err(ValidationError::invalid(
                        name,
                        format!("must be at least {min} characters"),
                    ));
                }
                if let Some(max) = max_length.filter(|&max| length > max) {
                    return Err(ValidationError::invalid(
                        name,
                        format!("must be at most {max} characters"),
                    ));
                }
                if let Some(re) = pattern.as_ref().filter(|re| !re.is_match(text)) {
                    return Err(ValidationError::invalid(
                        name,
                        format!("must match pattern {}", re.as_str()),
                    ));
                }
            }
            SelectionKind::Number { min, max, integer } => {
                let number = value
                    .as_number()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| ValidationError::invalid(name, "expected a number"))?;

                if *integer && number.fract() != 0.0 {
                    return Err(ValidationError::invalid(name, "must be a whole number"));
                }
                if let Some(min) = min.filter(|&min| number < min) {
                    return Err(ValidationError::invalid(name, format!("must be at least {min}")));
                }
                if let Some(max) = max.filter(|&max| number > max) {
                    return Err(ValidationError::invalid(name, format!("must be at most {max}")));
                }
            }
        }

        if let Some(check) = &selection.validate {
            let ctx = SelectionContext::new(host, player, args);
            check(value, &ctx).map_err(|reason| ValidationError::invalid(name, reason))?;
        }

        Ok(())
    }

    /// Availability condition first, then every selection in order.
    pub fn validate_action<H: Host>(
        host: &H,
        action: &ActionDefinition<H>,
        player: PlayerId,
        args: &Args,
    ) -> Result<(), ValidationError> {
        if !Self::condition_holds(host, action, player) {
            return Err(ValidationError::ConditionFailed(action.name.clone()));
        }

        for selection in &action.selections {
            match args.get(&selection.name) {
                Some(value) => Self::validate_selection(host, selection, value, player, args)?,
                None if selection.optional => {}
                None => return Err(ValidationError::MissingSelection(selection.name.clone())),
            }
        }

        Ok(())
    }

    /// Validate, then run the execute callback.
    ///
    /// Validation failures and callback errors both come back as an
    /// unsuccessful `ActionResult`.
    pub fn execute_action<H: Host>(
        host: &mut H,
        action: &ActionDefinition<H>,
        player: PlayerId,
        args: &Args,
    ) -> ActionResult {
        if let Err(err) = Self::validate_action(host, action, player, args) {
            warn!(action = %action.name, %player, error = %err, "action rejected");
            return ActionResult::failure(err.to_string());
        }

        match (action.execute)(host, player, args) {
            Ok(()) => {
                debug!(action = %action.name, %player, "action executed");
                ActionResult::ok()
            }
            Err(ActionError(message)) => {
                warn!(action = %action.name, %player, error = %message, "action failed");
                ActionResult::failure(message)
            }
        }
    }

    /// Whether some full argument assignment would pass `validate_action`.
    pub fn is_action_available<H: Host>(host: &H, action: &ActionDefinition<H>, player: PlayerId) -> bool {
        if !Self::condition_holds(host, action, player) {
            return false;
        }

        let mut args = Args::default();
        Self::search(host, action, player, 0, &mut args)
    }

    fn condition_holds<H: Host>(host: &H, action: &ActionDefinition<H>, player: PlayerId) -> bool {
        let empty = Args::default();
        action
            .condition
            .as_ref()
            .map_or(true, |condition| condition(&SelectionContext::new(host, player, &empty)))
    }

    fn search<H: Host>(
        host: &H,
        action: &ActionDefinition<H>,
        player: PlayerId,
        index: usize,
        args: &mut Args,
    ) -> bool {
        let Some(selection) = action.selections.get(index) else {
            return true;
        };

        if !selection.is_enumerable() {
            return Self::search(host, action, player, index + 1, args);
        }

        let branch = action.is_depended_on(&selection.name);
        if selection.optional && !branch {
            return Self::search(host, action, player, index + 1, args);
        }

        let choices = Self::get_choices(host, selection, player, args);

        if !branch {
            return !choices.is_empty() && Self::search(host, action, player, index + 1, args);
        }

        for choice in choices {
            args.insert(selection.name.clone(), choice);
            if Self::search(host, action, player, index + 1, args) {
                args.remove(&selection.name);
                return true;
            }
        }
        args.remove(&selection.name);

        selection.optional && Self::search(host, action, player, index + 1, args)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::actions::ActionRegistry;
    use crate::core::ElementId;
    use regex::Regex;

    /// Minimal host: players plus a fixed set of elements.
    struct Table {
        players: usize,
        current: PlayerId,
        elements: Vec<u32>,
        registry: ActionRegistry<Table>,
        log: Vec<String>,
    }

    impl Table {
        fn new(players: usize) -> Self {
            Self {
                players,
                current: PlayerId::new(0),
                elements: vec![10, 11, 12],
                registry: ActionRegistry::new(),
                log: Vec::new(),
            }
        }
    }

    impl Host for Table {
        fn player_count(&self) -> usize {
            self.players
        }

        fn current_player(&self) -> PlayerId {
            self.current
        }

        fn set_current_player(&mut self, player: PlayerId) {
            self.current = player;
        }

        fn action(&self, name: &str) -> Option<Arc<ActionDefinition<Self>>> {
            self.registry.get(name)
        }

        fn available_actions(&self, _player: PlayerId) -> Vec<String> {
            self.registry.names().to_vec()
        }

        fn resolve_element(&self, id: u32) -> Option<ElementId> {
            self.elements.contains(&id).then_some(ElementId::new(id))
        }
    }

    fn noop() -> ActionDefinition<Table> {
        ActionDefinition::new("noop", |t: &mut Table, p, _| {
            t.log.push(format!("noop by {}", p.index()));
            Ok(())
        })
    }

    fn p0() -> PlayerId {
        PlayerId::new(0)
    }

    fn texts(values: &[&str]) -> Vec<Value> {
        values.iter().map(|v| Value::from(*v)).collect()
    }

    #[test]
    fn test_player_choices_respect_filter() {
        let table = Table::new(3);
        let sel = Selection::player("target").player_filter(|ctx, p| p != ctx.player);

        let choices = ActionExecutor::get_choices(&table, &sel, p0(), &Args::default());
        assert_eq!(
            choices,
            vec![Value::Player(PlayerId::new(1)), Value::Player(PlayerId::new(2))]
        );
    }

    #[test]
    fn test_dependent_choices_need_prior_value() {
        let table = Table::new(2);
        let sel = Selection::choice("size", texts(&["small", "large"]))
            .depends_on("item", |candidate, prior, _| {
                prior.as_str() == Some("hat") || candidate.as_str() == Some("large")
            });

        let mut args = Args::default();
        assert!(ActionExecutor::get_choices(&table, &sel, p0(), &args).is_empty());

        args.insert("item".to_string(), Value::from("coat"));
        assert_eq!(
            ActionExecutor::get_choices(&table, &sel, p0(), &args),
            texts(&["large"])
        );

        args.insert("item".to_string(), Value::from("hat"));
        assert_eq!(ActionExecutor::get_choices(&table, &sel, p0(), &args).len(), 2);
    }

    #[test]
    fn test_should_skip() {
        let sel: Selection<Table> = Selection::choice("c", texts(&["a"])).skip_if_only_one();
        assert!(ActionExecutor::should_skip(&sel, &texts(&["a"])));
        assert!(!ActionExecutor::should_skip(&sel, &texts(&["a", "b"])));

        let plain: Selection<Table> = Selection::choice("c", texts(&["a"]));
        assert!(!ActionExecutor::should_skip(&plain, &texts(&["a"])));
    }

    #[test]
    fn test_resolve_args_maps_wire_values() {
        let table = Table::new(2);
        let action = noop()
            .selection(Selection::player("target"))
            .selection(Selection::element("card", |ctx: &SelectionContext<'_, Table>| {
                ctx.host.elements.iter().map(|&e| ElementId::new(e)).collect()
            }))
            .selection(Selection::choice("mode", texts(&["fast", "slow"])))
            .selection(Selection::number("amount"));

        let raw: RawArgs = serde_json::from_value(serde_json::json!({
            "target": 1,
            "card": 11,
            "mode": "slow",
            "amount": 3
        }))
        .unwrap();

        let args = ActionExecutor::resolve_args(&table, &action, p0(), &raw);
        assert_eq!(args.get("target"), Some(&Value::Player(PlayerId::new(1))));
        assert_eq!(args.get("card"), Some(&Value::Element(ElementId::new(11))));
        assert_eq!(args.get("mode"), Some(&Value::from("slow")));
        assert_eq!(args.get("amount"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_resolve_args_drops_unresolvable_references() {
        let table = Table::new(2);
        let action = noop()
            .selection(Selection::player("target"))
            .selection(Selection::element("card", |_: &SelectionContext<'_, Table>| vec![]));

        let raw: RawArgs =
            serde_json::from_value(serde_json::json!({"target": 5, "card": 99})).unwrap();

        let args = ActionExecutor::resolve_args(&table, &action, p0(), &raw);
        assert!(args.is_empty());
        assert_eq!(
            ActionExecutor::validate_action(&table, &action, p0(), &args),
            Err(ValidationError::MissingSelection("target".to_string()))
        );
    }

    #[test]
    fn test_resolve_args_fills_single_choice() {
        let table = Table::new(2);
        let action = noop()
            .selection(Selection::choice("only", texts(&["x"])).skip_if_only_one())
            .selection(Selection::choice("many", texts(&["a", "b"])).skip_if_only_one());

        let args = ActionExecutor::resolve_args(&table, &action, p0(), &RawArgs::new());
        assert_eq!(args.get("only"), Some(&Value::from("x")));
        assert!(args.get("many").is_none());

        assert_eq!(
            ActionExecutor::open_selections(&table, &action, p0(), &Args::default()),
            vec!["many".to_string()]
        );
    }

    #[test]
    fn test_validate_text_constraints() {
        let table = Table::new(1);
        let sel = Selection::text("name")
            .length(Some(2), Some(5))
            .pattern(Regex::new("^[a-z]+$").unwrap());
        let args = Args::default();

        let check = |v: Value| ActionExecutor::validate_selection(&table, &sel, &v, p0(), &args);

        assert!(check(Value::from("abc")).is_ok());
        assert!(check(Value::from("a")).is_err());
        assert!(check(Value::from("abcdef")).is_err());
        assert!(check(Value::from("ABC")).is_err());
        assert!(check(Value::Int(3)).is_err());
    }

    #[test]
    fn test_validate_number_constraints() {
        let table = Table::new(1);
        let sel = Selection::number("bid").range(Some(1.0), Some(10.0)).integer();
        let args = Args::default();

        let check = |v: Value| ActionExecutor::validate_selection(&table, &sel, &v, p0(), &args);

        assert!(check(Value::Int(5)).is_ok());
        assert!(check(Value::Float(5.0)).is_ok());
        assert!(check(Value::Float(5.5)).is_err());
        assert!(check(Value::Int(0)).is_err());
        assert!(check(Value::Int(11)).is_err());
        assert!(check(Value::from("5")).is_err());
    }

    #[test]
    fn test_validate_predicate_runs_after_structural_checks() {
        let table = Table::new(1);
        let sel = Selection::number("n").validate(|v, _| {
            if v.as_int() == Some(13) {
                Err("unlucky".to_string())
            } else {
                Ok(())
            }
        });
        let args = Args::default();

        assert!(ActionExecutor::validate_selection(&table, &sel, &Value::Int(12), p0(), &args).is_ok());
        let err = ActionExecutor::validate_selection(&table, &sel, &Value::Int(13), p0(), &args).unwrap_err();
        assert_eq!(err, ValidationError::invalid("n", "unlucky"));
    }

    #[test]
    fn test_validate_action_condition_and_optional() {
        let table = Table::new(2);
        let action = noop()
            .selection(Selection::choice("note", texts(&["hi"])).optional())
            .condition(|ctx| ctx.player == PlayerId::new(1));

        assert_eq!(
            ActionExecutor::validate_action(&table, &action, p0(), &Args::default()),
            Err(ValidationError::ConditionFailed("noop".to_string()))
        );
        assert!(ActionExecutor::validate_action(&table, &action, PlayerId::new(1), &Args::default()).is_ok());
    }

    #[test]
    fn test_execute_action_converts_errors() {
        let mut table = Table::new(1);
        let failing = ActionDefinition::new("fail", |_: &mut Table, _, _| Err("broken".into()));

        let result = ActionExecutor::execute_action(&mut table, &failing, p0(), &Args::default());
        assert_eq!(result, ActionResult::failure("broken"));

        let result = ActionExecutor::execute_action(&mut table, &noop(), p0(), &Args::default());
        assert!(result.success);
        assert_eq!(table.log, vec!["noop by 0".to_string()]);
    }

    #[test]
    fn test_execute_action_rejects_invalid_args() {
        let mut table = Table::new(1);
        let action = noop().selection(Selection::choice("c", texts(&["a"])));

        let mut args = Args::default();
        args.insert("c".to_string(), Value::from("z"));

        let result = ActionExecutor::execute_action(&mut table, &action, p0(), &args);
        assert!(!result.success);
        assert!(table.log.is_empty());
    }

    #[test]
    fn test_availability_non_empty_checks() {
        let table = Table::new(2);

        let blocked = noop().selection(Selection::choice("c", vec![]));
        assert!(!ActionExecutor::is_action_available(&table, &blocked, p0()));

        let optional = noop().selection(Selection::choice("c", vec![]).optional());
        assert!(ActionExecutor::is_action_available(&table, &optional, p0()));

        let free_form = noop().selection(Selection::text("t")).selection(Selection::number("n"));
        assert!(ActionExecutor::is_action_available(&table, &free_form, p0()));
    }

    #[test]
    fn test_availability_branches_on_declared_dependency() {
        let table = Table::new(2);
        let compatible = |ok: &'static str| {
            noop()
                .selection(Selection::choice("item", texts(&["sword", "bow"])))
                .selection(
                    Selection::choice("slot", texts(&["hand"]))
                        .depends_on("item", move |_, prior, _| prior.as_str() == Some(ok)),
                )
        };

        assert!(ActionExecutor::is_action_available(&table, &compatible("bow"), p0()));
        assert!(!ActionExecutor::is_action_available(&table, &compatible("axe"), p0()));
    }

    #[test]
    fn test_availability_undeclared_dependency_is_approximate() {
        let table = Table::new(2);
        // The second selection reads "item" without declaring it, so the
        // search never branches on "item" and sees an empty prior.
        let action = noop()
            .selection(Selection::choice("item", texts(&["sword"])))
            .selection(Selection::dynamic_choice("slot", |ctx: &SelectionContext<'_, Table>| {
                match ctx.arg("item") {
                    Some(item) if item.as_str() == Some("sword") => vec![],
                    _ => texts(&["hand"]),
                }
            }));

        assert!(ActionExecutor::is_action_available(&table, &action, p0()));

        let mut args = Args::default();
        args.insert("item".to_string(), Value::from("sword"));
        args.insert("slot".to_string(), Value::from("hand"));
        assert!(ActionExecutor::validate_action(&table, &action, p0(), &args).is_err());
    }

    #[test]
    fn test_availability_dependency_on_free_form_input() {
        let table = Table::new(2);
        let action = noop().selection(Selection::text("name")).selection(
            Selection::choice("title", texts(&["sir"])).depends_on("name", |_, prior, _| prior.as_str().is_some()),
        );

        // Valid once a name is supplied, but the search never fills one in
        let mut args = Args::default();
        args.insert("name".to_string(), Value::from("ada"));
        args.insert("title".to_string(), Value::from("sir"));
        assert!(ActionExecutor::validate_action(&table, &action, p0(), &args).is_ok());
        assert!(!ActionExecutor::is_action_available(&table, &action, p0()));
    }
}
