//! Simple "War" game for exercising the engine.
//!
//! A minimal game driven entirely by a flow definition:
//! - Each player starts with 20 life and a shuffled deck of cards
//! - Cards have a power value from 1 to 5
//! - On your turn: draw a card, play a card to damage an opponent, or pass
//! - Players at 0 life drop out; the last one standing wins
//!
//! Supports 2-8 players to verify N-player generality.

mod game;

pub use game::{actions, SimpleGame, SimpleGameBuilder};
