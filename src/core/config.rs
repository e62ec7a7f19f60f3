//! Engine configuration.
//!
//! Games tune the interpreter at startup through `EngineConfig`. The
//! struct deserializes from any serde format so it can live alongside the
//! rest of a game's data files; missing fields take their defaults.

use serde::{Deserialize, Serialize};

/// Default iteration cap for Loop, EachPlayer and ForEach nodes.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10_000;

/// Interpreter-wide settings.
///
/// ```
/// use turn_flow::core::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{"max_iterations": 50}"#).unwrap();
/// assert_eq!(config.max_iterations, 50);
/// assert!(config.record_history);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Iteration cap applied to looping nodes that don't declare their own.
    /// Exceeding it is a fatal flow error.
    pub max_iterations: u32,

    /// Keep an `ActionRecord` for every successful action.
    pub record_history: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            record_history: true,
        }
    }
}

impl EngineConfig {
    /// Override the default iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Disable action history recording.
    #[must_use]
    pub fn without_history(mut self) -> Self {
        self.record_history = false;
        self
    }
}
