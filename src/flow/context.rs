//! Contexts handed to flow callbacks.
//!
//! Guards, collections and player callbacks receive a read-only
//! `FlowContext`. Execute nodes and phase hooks receive a
//! `FlowContextMut`, the only way a callback can change variable bindings
//! or the host.

use crate::core::{PlayerId, Value, Variables};
use crate::host::Host;

/// Read-only view of the host and the variable bindings.
pub struct FlowContext<'a, H> {
    host: &'a H,
    variables: &'a Variables,
}

impl<'a, H> FlowContext<'a, H> {
    pub fn new(host: &'a H, variables: &'a Variables) -> Self {
        Self { host, variables }
    }

    #[must_use]
    pub fn host(&self) -> &'a H {
        self.host
    }

    #[must_use]
    pub fn variables(&self) -> &'a Variables {
        self.variables
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.variables.get(name)
    }

    /// Integer variable, `0` when unset or not an integer.
    #[must_use]
    pub fn int(&self, name: &str) -> i64 {
        self.get(name).and_then(Value::as_int).unwrap_or(0)
    }

    /// Player bound to `name`, e.g. by an EachPlayer node.
    #[must_use]
    pub fn player_var(&self, name: &str) -> Option<PlayerId> {
        self.get(name).and_then(Value::as_player)
    }
}

impl<H: Host> FlowContext<'_, H> {
    /// The host's current player.
    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.host.current_player()
    }
}

/// Mutable view used by Execute nodes and phase hooks.
pub struct FlowContextMut<'a, H> {
    host: &'a mut H,
    variables: &'a mut Variables,
}

impl<'a, H> FlowContextMut<'a, H> {
    pub fn new(host: &'a mut H, variables: &'a mut Variables) -> Self {
        Self { host, variables }
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &*self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut *self.host
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    #[must_use]
    pub fn int(&self, name: &str) -> i64 {
        self.get(name).and_then(Value::as_int).unwrap_or(0)
    }

    /// Bind `name` in the shared table.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    /// Read-only view for calling guard-style helpers.
    #[must_use]
    pub fn view(&self) -> FlowContext<'_, H> {
        FlowContext::new(&*self.host, &*self.variables)
    }
}

impl<H: Host> FlowContextMut<'_, H> {
    #[must_use]
    pub fn current_player(&self) -> PlayerId {
        self.host.current_player()
    }
}
