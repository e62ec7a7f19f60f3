//! The host facade.
//!
//! The engine never touches game state directly. Everything it needs from
//! the game goes through `Host`:
//! - The player collection (stable zero-based seats plus a current-player
//!   pointer)
//! - The action catalogue
//! - An independent, host-owned legality filter
//! - `perform_action`, the only channel through which the flow mutates
//!   external state
//!
//! Games implement the required methods; the provided ones delegate to
//! `ActionExecutor` and rarely need overriding.

use std::sync::Arc;

use tracing::warn;

use crate::actions::{ActionDefinition, ActionExecutor, ActionResult};
use crate::core::{Args, ElementId, PlayerId, ValidationError};

/// Host game facade.
pub trait Host: Sized + 'static {
    /// Number of seated players. Seats are `0..player_count`.
    fn player_count(&self) -> usize;

    /// The player the host currently considers active.
    fn current_player(&self) -> PlayerId;

    /// Move the current-player pointer. Called by EachPlayer and by action
    /// steps when they designate a player.
    fn set_current_player(&mut self, player: PlayerId);

    /// Look up a registered action.
    fn action(&self, name: &str) -> Option<Arc<ActionDefinition<Self>>>;

    /// Names of the actions the host allows `player` to take right now.
    ///
    /// Applied in addition to the selection availability search.
    fn available_actions(&self, player: PlayerId) -> Vec<String>;

    /// Resolve a serialized element id to a live element.
    ///
    /// Returning `None` leaves the argument unresolved.
    fn resolve_element(&self, id: u32) -> Option<ElementId> {
        Some(ElementId::new(id))
    }

    /// Validate and run an action.
    fn perform_action(&mut self, name: &str, player: PlayerId, args: &Args) -> ActionResult {
        match self.action(name) {
            Some(action) => ActionExecutor::execute_action(self, &action, player, args),
            None => {
                warn!(action = name, "perform_action called for an unregistered action");
                ActionResult::failure(ValidationError::UnknownAction(name.to_string()).to_string())
            }
        }
    }

    /// All seated players in seat order.
    fn players(&self) -> Vec<PlayerId> {
        PlayerId::all(self.player_count()).collect()
    }
}
