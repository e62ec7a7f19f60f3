//! Core types: players, elements, values, configuration and errors.
//!
//! Everything here is game-agnostic. Games describe their own state
//! through `Value`s and opaque `ElementId`s rather than extending these
//! types.

pub mod player;
pub mod element;
pub mod value;
pub mod config;
pub mod error;

pub use player::{PlayerId, PlayerMap};
pub use element::ElementId;
pub use value::{Args, RawArgs, Value, Variables};
pub use config::{EngineConfig, DEFAULT_MAX_ITERATIONS};
pub use error::{ActionError, FlowError, ValidationError};
