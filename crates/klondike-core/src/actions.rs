//! Player actions and the events they produce.
//!
//! Actions are what the presentation layer sends in; events describe what
//! the engine did in response.

use crate::card::Card;
use crate::pile::{PileId, PileRef};
use serde::{Deserialize, Serialize};

/// All inputs the engine accepts from the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameAction {
    /// Deal a fresh shuffled game
    Reset,
    /// Turn the top stock card over, or recycle the waste
    Draw,
    /// Click a card or an empty pile slot. A negative index means "top".
    SelectOrMove { pile: PileId, index: i32 },
    /// Pick up a card (and everything above it) with the pointer. A
    /// negative index means "top".
    BeginDrag { pile: PileId, index: i32 },
    /// Drop the dragged card; `target` is `None` when the pointer was not
    /// over any pile
    DragResolve {
        from: PileRef,
        target: Option<(PileId, i32)>,
    },
    /// Abandon the drag without trying a move
    CancelDrag,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new game was dealt
    NewGame,

    /// A card moved from the stock to the waste
    CardDrawn { card: Card },

    /// The waste was turned back over into the stock
    WasteRecycled { count: usize },

    /// Both stock and waste are empty
    NothingToDraw,

    /// A source card was armed by a click
    CardSelected { source: PileRef },

    /// A selection or drag ended without moving anything
    SelectionCleared,

    /// A drag gesture picked up one or more cards
    DragStarted { source: PileRef, count: usize },

    /// A drag gesture was abandoned
    DragCancelled,

    /// Cards moved between piles
    CardsMoved {
        from: PileId,
        to: PileId,
        cards: Vec<Card>,
    },

    /// A face-down tableau card was turned up after the cards above it left
    CardRevealed { pile: PileId, card: Card },

    /// The attempted move broke the rules; nothing changed
    InvalidMove {
        from: PileRef,
        to: Option<PileId>,
    },

    /// All four foundations are complete
    GameWon,
}

impl GameEvent {
    /// Human-readable status line for the events that have one
    pub fn status(&self) -> Option<String> {
        match self {
            GameEvent::NewGame => Some("New game dealt".to_string()),
            GameEvent::CardDrawn { card } => Some(format!("Drew {}", card)),
            GameEvent::WasteRecycled { .. } => Some("Recycled the waste pile".to_string()),
            GameEvent::NothingToDraw => Some("No more cards to draw".to_string()),
            GameEvent::InvalidMove { .. } => Some("Invalid move".to_string()),
            GameEvent::GameWon => Some("You won!".to_string()),
            _ => None,
        }
    }
}
