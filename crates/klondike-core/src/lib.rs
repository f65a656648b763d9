//! Klondike solitaire game engine
//!
//! This crate provides the rules of single-deck Klondike:
//! - Cards, the standard deck and a Fisher-Yates shuffle
//! - The deal layout, move validation and move execution
//! - Drawing from the stock and recycling the waste
//! - Click and drag routing for a UI layer, with timed feedback
//!
//! # Architecture
//!
//! [`GameState`] is an immutable snapshot: each command borrows it and
//! returns a complete new snapshot plus the [`GameEvent`]s it produced.
//! [`Game`] is the stateful wrapper a host holds on to. It can be compiled
//! to:
//! - Native Rust for tests and embedding
//! - WebAssembly for a browser front end (feature `wasm`)
//!
//! # Modules
//!
//! - [`card`]: Suits, ranks, cards and the deck
//! - [`pile`]: Pile identifiers and selection state
//! - [`actions`]: UI actions and resulting events
//! - [`game`]: The rule engine
//! - [`session`]: A running game with feedback timers
//! - [`config`]: Session settings

pub mod actions;
pub mod card;
pub mod config;
pub mod game;
pub mod pile;
pub mod session;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use card::{shuffle_deck, standard_deck, Card, Color, Rank, Suit, DECK_SIZE};
pub use config::EngineConfig;
pub use game::{GameError, GameState, Transition};
pub use pile::{Focus, PileId, PileRef, TABLEAU_COUNT};
pub use session::Game;
