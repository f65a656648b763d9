//! Pile identifiers and card addressing.

use crate::card::Suit;
use crate::game::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of tableau columns
pub const TABLEAU_COUNT: usize = 7;

/// Identifies one of the thirteen piles on the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PileId {
    /// Face-down draw pile
    Stock,
    /// Face-up discard pile fed by draws
    Waste,
    /// Ascending single-suit pile
    Foundation(Suit),
    /// Build column (0-6)
    Tableau(usize),
}

impl PileId {
    /// Every pile, stock first
    pub const ALL: [PileId; 13] = [
        PileId::Stock,
        PileId::Waste,
        PileId::Foundation(Suit::Hearts),
        PileId::Foundation(Suit::Diamonds),
        PileId::Foundation(Suit::Clubs),
        PileId::Foundation(Suit::Spades),
        PileId::Tableau(0),
        PileId::Tableau(1),
        PileId::Tableau(2),
        PileId::Tableau(3),
        PileId::Tableau(4),
        PileId::Tableau(5),
        PileId::Tableau(6),
    ];

    /// Tableau column, checked against the column count
    pub fn tableau(column: usize) -> Result<PileId, GameError> {
        if column < TABLEAU_COUNT {
            Ok(PileId::Tableau(column))
        } else {
            Err(GameError::TableauOutOfRange(column))
        }
    }

    /// Reject tableau ids that point past the last column
    pub fn validate(&self) -> Result<(), GameError> {
        match self {
            PileId::Tableau(column) => PileId::tableau(*column).map(|_| ()),
            _ => Ok(()),
        }
    }

    pub fn is_tableau(&self) -> bool {
        matches!(self, PileId::Tableau(_))
    }
}

impl fmt::Display for PileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PileId::Stock => write!(f, "stock"),
            PileId::Waste => write!(f, "waste"),
            PileId::Foundation(suit) => write!(f, "foundation:{}", suit.name()),
            PileId::Tableau(column) => write!(f, "tableau:{}", column),
        }
    }
}

impl FromStr for PileId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || GameError::UnknownPile(s.to_string());

        match s.split_once(':') {
            None => match s {
                "stock" => Ok(PileId::Stock),
                "waste" => Ok(PileId::Waste),
                _ => Err(unknown()),
            },
            Some(("foundation", suit)) => Suit::from_name(suit)
                .map(PileId::Foundation)
                .ok_or_else(unknown),
            Some(("tableau", column)) => {
                let column: usize = column.parse().map_err(|_| unknown())?;
                PileId::tableau(column)
            }
            Some(_) => Err(unknown()),
        }
    }
}

/// A card position: a pile plus a 0-based index from the bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PileRef {
    pub pile: PileId,
    pub index: usize,
}

impl PileRef {
    pub fn new(pile: PileId, index: usize) -> Self {
        Self { pile, index }
    }
}

impl fmt::Display for PileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.pile, self.index)
    }
}

/// What the player is currently holding, if anything.
///
/// Selection and drag share one field so they can never both be active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Focus {
    /// Nothing selected
    #[default]
    Idle,
    /// A source card armed by a click
    Selected(PileRef),
    /// A source card picked up by a drag gesture
    Dragging(PileRef),
}

impl Focus {
    pub fn selection(&self) -> Option<PileRef> {
        match self {
            Focus::Selected(source) => Some(*source),
            _ => None,
        }
    }

    pub fn drag(&self) -> Option<PileRef> {
        match self {
            Focus::Dragging(source) => Some(*source),
            _ => None,
        }
    }
}
