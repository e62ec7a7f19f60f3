//! Error types.
//!
//! Two families, matching how callers are expected to react:
//!
//! - `FlowError`: fatal interpreter errors. They mean the flow or the
//!   call sequence is mis-declared and are never recovered by the engine.
//! - `ValidationError` / `ActionError`: action-level failures. They are
//!   folded into an unsuccessful `ActionResult` and the player may retry.

use thiserror::Error;

use super::player::PlayerId;

/// Fatal interpreter errors.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("no flow definition has been set")]
    NoFlowDefinition,

    #[error("flow is not awaiting input")]
    NotAwaitingInput,

    #[error("{player} is not awaiting input in the current step")]
    PlayerNotAwaiting { player: PlayerId },

    #[error("node '{node}' exceeded its iteration limit of {limit}")]
    IterationLimit { node: String, limit: u32 },

    #[error("action step '{node}' needs {min_moves} moves from {player}, has {moves}, and no actions are available")]
    MinMovesUnmet {
        node: String,
        player: PlayerId,
        min_moves: u32,
        moves: u32,
    },

    #[error("position does not match the flow definition: {0}")]
    InvalidPosition(String),

    #[error("failed to encode position: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("failed to parse position: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons an action or one of its selections is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("action '{0}' is not registered")]
    UnknownAction(String),

    #[error("action '{action}' is not available to {player}")]
    NotAvailable { action: String, player: PlayerId },

    #[error("action '{0}' cannot be performed right now")]
    ConditionFailed(String),

    #[error("missing required selection '{0}'")]
    MissingSelection(String),

    #[error("invalid value for selection '{selection}': {reason}")]
    InvalidSelection { selection: String, reason: String },
}

impl ValidationError {
    pub(crate) fn invalid(selection: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidSelection {
            selection: selection.to_string(),
            reason: reason.into(),
        }
    }
}

/// Error raised by an action's execute callback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ActionError(pub String);

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        ActionError(message.to_string())
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        ActionError(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_error_messages() {
        assert_eq!(FlowError::NotAwaitingInput.to_string(), "flow is not awaiting input");

        let err = FlowError::IterationLimit {
            node: "main".to_string(),
            limit: 5,
        };
        assert_eq!(err.to_string(), "node 'main' exceeded its iteration limit of 5");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::invalid("target", "not a legal choice");
        assert_eq!(
            err.to_string(),
            "invalid value for selection 'target': not a legal choice"
        );
    }

    #[test]
    fn test_action_error_from_str() {
        let err: ActionError = "out of gold".into();
        assert_eq!(err.to_string(), "out of gold");
    }
}
