//! Dynamic values shared between the engine and game callbacks.
//!
//! ## Value
//!
//! A closed sum type covering everything a flow variable, a selection
//! choice or a resolved action argument can hold. Players and elements
//! are first-class so callbacks receive live references rather than raw
//! indices.
//!
//! ## Wire form
//!
//! Values convert to plain JSON for transport: players become their seat
//! index and elements their numeric id. The conversion back is lossy for
//! exactly those two cases, which is why argument resolution goes through
//! the owning selection (see `ActionExecutor::resolve_args`).

use im::HashMap as ImHashMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::element::ElementId;
use super::player::PlayerId;

/// A dynamically typed flow/argument value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Player(PlayerId),
    Element(ElementId),
    List(Vec<Value>),
}

/// The shared name -> value binding table.
///
/// Persistent map: cloning for a `Position` snapshot shares structure.
pub type Variables = ImHashMap<String, Value>;

/// Resolved action arguments, keyed by selection name.
pub type Args = FxHashMap<String, Value>;

/// Serialized action arguments as they arrive from a transport.
pub type RawArgs = serde_json::Map<String, serde_json::Value>;

impl Value {
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Numeric view of `Int` and `Float` values.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_player(&self) -> Option<PlayerId> {
        match self {
            Value::Player(p) => Some(*p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_element(&self) -> Option<ElementId> {
        match self {
            Value::Element(e) => Some(*e),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Truthiness used by guard helpers: `Null`, `false`, `0` and empty
    /// text/lists are false.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Player(_) | Value::Element(_) => true,
            Value::List(items) => !items.is_empty(),
        }
    }

    /// Convert to the plain JSON wire form.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Value::Text(s) => Json::String(s.clone()),
            Value::Player(p) => Json::from(p.index()),
            Value::Element(e) => Json::from(e.raw()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
        }
    }

    /// Convert from the plain JSON wire form.
    ///
    /// Objects have no counterpart and become `Null`. Numbers become `Int`
    /// when they are integral.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null | Json::Object(_) => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float))
                .unwrap_or(Value::Null),
            Json::String(s) => Value::Text(s.clone()),
            Json::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<PlayerId> for Value {
    fn from(p: PlayerId) -> Self {
        Value::Player(p)
    }
}

impl From<ElementId> for Value {
    fn from(e: ElementId) -> Self {
        Value::Element(e)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Player(p) => write!(f, "{p}"),
            Value::Element(e) => write!(f, "{e}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}
