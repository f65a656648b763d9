//! Core game state machine.
//!
//! This module contains the `GameState` snapshot and all rule logic. Every
//! command borrows the current snapshot and returns a complete new one, so
//! a half-applied move is never observable.

use crate::actions::GameEvent;
use crate::card::{shuffle_deck, standard_deck, Card, Rank, Suit, DECK_SIZE};
use crate::pile::{Focus, PileId, PileRef, TABLEAU_COUNT};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Cards in a complete foundation
const FOUNDATION_SIZE: usize = 13;

/// Errors that signal a caller bug, never a bad move
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Unknown pile: {0}")]
    UnknownPile(String),

    #[error("Tableau column {0} does not exist")]
    TableauOutOfRange(usize),

    #[error("No card at {pile} index {index}")]
    IndexOutOfRange { pile: PileId, index: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result of a command: the next snapshot and what happened
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

impl Transition {
    fn new(state: GameState, events: Vec<GameEvent>) -> Self {
        Self { state, events }
    }
}

/// The complete table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Face-down draw pile, top is the last element
    pub stock: Vec<Card>,
    /// Face-up discard pile, top is the last element
    pub waste: Vec<Card>,
    /// One pile per suit, indexed by [`Suit::index`]
    pub foundations: [Vec<Card>; 4],
    /// Build columns, bottom card first
    pub tableaus: [Vec<Card>; TABLEAU_COUNT],
    /// Current click selection or drag
    pub focus: Focus,
}

impl GameState {
    /// Shuffle a fresh deck and deal it
    pub fn deal_new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = standard_deck();
        shuffle_deck(&mut deck, rng);
        Self::from_deck(deck)
    }

    /// Deal a deck in the given order.
    ///
    /// The last element is the top of the deck and is dealt first. Round `r`
    /// puts one card on each column from `r` to 6, so column `k` ends up with
    /// `k + 1` cards, the last of which is turned face up. Whatever is left
    /// becomes the stock.
    pub fn from_deck(mut deck: Vec<Card>) -> Self {
        let mut tableaus: [Vec<Card>; TABLEAU_COUNT] = Default::default();

        for round in 0..TABLEAU_COUNT {
            for (column, pile) in tableaus.iter_mut().enumerate().skip(round) {
                if let Some(card) = deck.pop() {
                    let card = if column == round {
                        card.flipped_up()
                    } else {
                        card.flipped_down()
                    };
                    pile.push(card);
                }
            }
        }

        Self {
            stock: deck.into_iter().map(Card::flipped_down).collect(),
            tableaus,
            ..Self::default()
        }
    }

    /// Cards in a pile, bottom first
    pub fn pile(&self, id: PileId) -> Result<&[Card], GameError> {
        match id {
            PileId::Stock => Ok(&self.stock),
            PileId::Waste => Ok(&self.waste),
            PileId::Foundation(suit) => Ok(self.foundation(suit)),
            PileId::Tableau(column) => self
                .tableaus
                .get(column)
                .map(Vec::as_slice)
                .ok_or(GameError::TableauOutOfRange(column)),
        }
    }

    fn pile_mut(&mut self, id: PileId) -> Result<&mut Vec<Card>, GameError> {
        match id {
            PileId::Stock => Ok(&mut self.stock),
            PileId::Waste => Ok(&mut self.waste),
            PileId::Foundation(suit) => Ok(&mut self.foundations[suit.index()]),
            PileId::Tableau(column) => self
                .tableaus
                .get_mut(column)
                .ok_or(GameError::TableauOutOfRange(column)),
        }
    }

    pub fn foundation(&self, suit: Suit) -> &[Card] {
        &self.foundations[suit.index()]
    }

    /// The card at an exact position
    pub fn card_at(&self, at: PileRef) -> Result<&Card, GameError> {
        self.pile(at.pile)?
            .get(at.index)
            .ok_or(GameError::IndexOutOfRange {
                pile: at.pile,
                index: at.index,
            })
    }

    /// Total cards across every pile
    pub fn count_cards(&self) -> usize {
        PileId::ALL
            .iter()
            .filter_map(|&id| self.pile(id).ok())
            .map(<[Card]>::len)
            .sum()
    }

    /// Whether the table holds each of the 52 cards exactly once
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::with_capacity(DECK_SIZE);
        for id in PileId::ALL {
            if let Ok(pile) = self.pile(id) {
                for card in pile {
                    if !seen.insert(*card) {
                        return false;
                    }
                }
            }
        }
        seen.len() == DECK_SIZE
    }

    /// All four foundations hold a full suit
    pub fn is_won(&self) -> bool {
        self.foundations.iter().all(|f| f.len() == FOUNDATION_SIZE)
    }

    /// The card a move from `from` would pick up by its base.
    ///
    /// Waste and foundation only give up their top card; a tableau can be
    /// lifted from any position. The stock is never a move source.
    fn source_card(&self, from: PileRef) -> Option<&Card> {
        let pile = self.pile(from.pile).ok()?;
        match from.pile {
            PileId::Stock => None,
            PileId::Waste | PileId::Foundation(_) => {
                if pile.len().checked_sub(1) == Some(from.index) {
                    pile.last()
                } else {
                    None
                }
            }
            PileId::Tableau(_) => pile.get(from.index),
        }
    }

    /// Cards that would travel with a drag started at `from`, in order.
    ///
    /// Empty when the position holds no face-up movable card.
    pub fn draggable_sequence(&self, from: PileRef) -> Result<Vec<Card>, GameError> {
        let pile = self.pile(from.pile)?;
        let sequence = match self.source_card(from) {
            Some(card) if card.face_up => pile[from.index..].to_vec(),
            _ => Vec::new(),
        };
        Ok(sequence)
    }

    /// Check a move against the rules without changing anything.
    ///
    /// `to_index` names the card being dropped on; `None` or an index past
    /// the end means the top of the destination.
    pub fn is_valid_move(&self, from: PileRef, to: PileId, to_index: Option<usize>) -> bool {
        let card = match self.source_card(from) {
            Some(card) if card.face_up => card,
            _ => return false,
        };

        match to {
            PileId::Foundation(suit) => {
                if card.suit != suit {
                    return false;
                }
                // Foundations take one card at a time
                let source_len = self.pile(from.pile).map(<[Card]>::len).unwrap_or(0);
                if source_len.checked_sub(1) != Some(from.index) {
                    return false;
                }
                match self.foundation(suit).last() {
                    None => card.rank == Rank::Ace,
                    Some(top) => top.rank.next() == Some(card.rank),
                }
            }

            PileId::Tableau(column) => {
                let Some(pile) = self.tableaus.get(column) else {
                    return false;
                };
                match pile.last() {
                    None => card.rank == Rank::King,
                    Some(top) => {
                        let top_index = pile.len() - 1;
                        let index = to_index.filter(|&i| i < pile.len()).unwrap_or(top_index);
                        index == top_index && card.stacks_on(top)
                    }
                }
            }

            PileId::Stock | PileId::Waste => false,
        }
    }

    /// Perform a validated move, `None` if the move is not legal
    pub fn apply_move(&self, from: PileRef, to: PileId, to_index: Option<usize>) -> Option<GameState> {
        self.execute_move(from, to, to_index).map(|t| t.state)
    }

    fn execute_move(&self, from: PileRef, to: PileId, to_index: Option<usize>) -> Option<Transition> {
        if !self.is_valid_move(from, to, to_index) {
            return None;
        }

        let mut next = self.clone();
        let mut events = Vec::new();

        let source = next.pile_mut(from.pile).ok()?;
        let moved = source.split_off(from.index);

        if from.pile.is_tableau() {
            if let Some(top) = source.last_mut() {
                if !top.face_up {
                    top.face_up = true;
                    events.insert(
                        0,
                        GameEvent::CardRevealed {
                            pile: from.pile,
                            card: *top,
                        },
                    );
                }
            }
        }

        next.pile_mut(to).ok()?.extend_from_slice(&moved);
        next.focus = Focus::Idle;

        events.insert(
            0,
            GameEvent::CardsMoved {
                from: from.pile,
                to,
                cards: moved,
            },
        );

        if !self.is_won() && next.is_won() {
            events.push(GameEvent::GameWon);
        }

        Some(Transition::new(next, events))
    }

    /// Attempt a move and report the outcome.
    ///
    /// Dropping onto the source pile just clears focus. Focus is always
    /// cleared afterwards.
    pub fn try_move(&self, from: PileRef, to: PileId, to_index: Option<usize>) -> Transition {
        if from.pile == to {
            return self.with_focus(Focus::Idle, vec![GameEvent::SelectionCleared]);
        }

        match self.execute_move(from, to, to_index) {
            Some(transition) => transition,
            None => self.with_focus(
                Focus::Idle,
                vec![GameEvent::InvalidMove { from, to: Some(to) }],
            ),
        }
    }

    /// Turn over the top stock card, or recycle the waste when the stock is
    /// empty.
    pub fn draw(&self) -> Transition {
        let mut next = self.clone();
        next.focus = Focus::Idle;

        let event = if let Some(card) = next.stock.pop() {
            let card = card.flipped_up();
            next.waste.push(card);
            GameEvent::CardDrawn { card }
        } else if !next.waste.is_empty() {
            let count = next.waste.len();
            next.stock = next
                .waste
                .drain(..)
                .rev()
                .map(Card::flipped_down)
                .collect();
            GameEvent::WasteRecycled { count }
        } else {
            GameEvent::NothingToDraw
        };

        Transition::new(next, vec![event])
    }

    /// Click routing.
    ///
    /// With nothing selected, a click on a face-up movable card arms it.
    /// With a card armed, the click is the move target. `index` of `None`
    /// means the top of the clicked pile.
    pub fn select_or_move(&self, pile: PileId, index: Option<usize>) -> Result<Transition, GameError> {
        pile.validate()?;

        if let Focus::Selected(source) = self.focus {
            return Ok(self.try_move(source, pile, index));
        }

        let len = self.pile(pile)?.len();
        let index = match index {
            Some(i) if i < len => i,
            _ if len > 0 => len - 1,
            _ => return Ok(self.with_focus(Focus::Idle, Vec::new())),
        };
        let source = PileRef::new(pile, index);

        let transition = match self.source_card(source) {
            Some(card) if card.face_up => {
                self.with_focus(Focus::Selected(source), vec![GameEvent::CardSelected { source }])
            }
            _ => self.with_focus(Focus::Idle, Vec::new()),
        };
        Ok(transition)
    }

    /// Pick up the movable run at `from`. Any selection is dropped.
    pub fn begin_drag(&self, from: PileRef) -> Result<Transition, GameError> {
        let cards = self.draggable_sequence(from)?;
        if cards.is_empty() {
            return Ok(self.with_focus(self.focus, Vec::new()));
        }

        Ok(self.with_focus(
            Focus::Dragging(from),
            vec![GameEvent::DragStarted {
                source: from,
                count: cards.len(),
            }],
        ))
    }

    /// Finish a drag gesture.
    ///
    /// A `target` of `None` means the pointer was released away from every
    /// pile, which counts as an invalid move.
    pub fn drag_resolve(
        &self,
        from: PileRef,
        target: Option<(PileId, Option<usize>)>,
    ) -> Result<Transition, GameError> {
        from.pile.validate()?;

        match target {
            Some((to, to_index)) => {
                to.validate()?;
                Ok(self.try_move(from, to, to_index))
            }
            None => Ok(self.with_focus(
                Focus::Idle,
                vec![GameEvent::InvalidMove { from, to: None }],
            )),
        }
    }

    /// Drop the drag without attempting a move
    pub fn cancel_drag(&self) -> Transition {
        match self.focus {
            Focus::Dragging(_) => self.with_focus(Focus::Idle, vec![GameEvent::DragCancelled]),
            _ => self.with_focus(self.focus, Vec::new()),
        }
    }

    fn with_focus(&self, focus: Focus, events: Vec<GameEvent>) -> Transition {
        let mut next = self.clone();
        next.focus = focus;
        Transition::new(next, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn up(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit).flipped_up()
    }

    fn down(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn at(pile: PileId, index: usize) -> PileRef {
        PileRef::new(pile, index)
    }

    /// Card identity plus orientation, since `Card` equality ignores the face
    fn faces(cards: &[Card]) -> Vec<(Suit, Rank, bool)> {
        cards.iter().map(|c| (c.suit, c.rank, c.face_up)).collect()
    }

    /// Every pile with orientation, for whole-table comparisons
    fn table(state: &GameState) -> Vec<Vec<(Suit, Rank, bool)>> {
        PileId::ALL
            .iter()
            .map(|&id| faces(state.pile(id).unwrap()))
            .collect()
    }

    #[test]
    fn test_deal_layout() {
        let mut rng = StdRng::seed_from_u64(1);
        let game = GameState::deal_new(&mut rng);

        for (k, column) in game.tableaus.iter().enumerate() {
            assert_eq!(column.len(), k + 1);
            let (last, rest) = column.split_last().unwrap();
            assert!(last.face_up);
            assert!(rest.iter().all(|c| !c.face_up));
        }
        assert_eq!(game.tableaus.iter().map(Vec::len).sum::<usize>(), 28);
        assert_eq!(game.stock.len(), 24);
        assert!(game.stock.iter().all(|c| !c.face_up));
        assert!(game.waste.is_empty());
        assert!(game.foundations.iter().all(Vec::is_empty));
        assert_eq!(game.focus, Focus::Idle);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_deal_order_is_reproducible() {
        let deck = standard_deck();
        let game = GameState::from_deck(deck.clone());

        // Top of the deck lands on column 0, the next on column 1
        assert_eq!(game.tableaus[0], vec![deck[51]]);
        assert_eq!(game.tableaus[1][0], deck[50]);
        // Round 1 starts at column 1 with the eighth card
        assert_eq!(game.tableaus[1][1], deck[44]);
        assert_eq!(game.stock, deck[..24].to_vec());
    }

    #[test]
    fn test_foundation_acceptance() {
        let mut game = GameState::default();
        game.waste = vec![up(Rank::Ace, Suit::Hearts)];
        let from = at(PileId::Waste, 0);

        assert!(game.is_valid_move(from, PileId::Foundation(Suit::Hearts), None));
        assert!(!game.is_valid_move(from, PileId::Foundation(Suit::Spades), None));

        game.waste = vec![up(Rank::Two, Suit::Hearts)];
        assert!(!game.is_valid_move(from, PileId::Foundation(Suit::Hearts), None));

        game.foundations[Suit::Hearts.index()] = vec![up(Rank::Ace, Suit::Hearts)];
        assert!(game.is_valid_move(from, PileId::Foundation(Suit::Hearts), None));

        game.waste = vec![up(Rank::Three, Suit::Hearts)];
        assert!(!game.is_valid_move(from, PileId::Foundation(Suit::Hearts), None));
    }

    #[test]
    fn test_tableau_acceptance() {
        let mut game = GameState::default();
        game.tableaus[0] = vec![down(Rank::Two, Suit::Clubs), up(Rank::Eight, Suit::Hearts)];
        game.waste = vec![up(Rank::Seven, Suit::Spades)];
        let from = at(PileId::Waste, 0);

        assert!(game.is_valid_move(from, PileId::Tableau(0), Some(1)));
        assert!(game.is_valid_move(from, PileId::Tableau(0), None));
        // Past the end means "top"
        assert!(game.is_valid_move(from, PileId::Tableau(0), Some(9)));
        // No inserting mid-stack
        assert!(!game.is_valid_move(from, PileId::Tableau(0), Some(0)));

        game.waste = vec![up(Rank::Seven, Suit::Diamonds)];
        assert!(!game.is_valid_move(from, PileId::Tableau(0), None));

        game.waste = vec![up(Rank::Six, Suit::Spades)];
        assert!(!game.is_valid_move(from, PileId::Tableau(0), None));
    }

    #[test]
    fn test_empty_tableau_takes_only_kings() {
        let mut game = GameState::default();
        game.waste = vec![up(Rank::King, Suit::Clubs)];
        assert!(game.is_valid_move(at(PileId::Waste, 0), PileId::Tableau(3), None));

        game.waste = vec![up(Rank::Queen, Suit::Clubs)];
        assert!(!game.is_valid_move(at(PileId::Waste, 0), PileId::Tableau(3), None));
    }

    #[test]
    fn test_face_down_or_missing_source_rejected() {
        let mut game = GameState::default();
        game.tableaus[0] = vec![down(Rank::King, Suit::Clubs), up(Rank::Queen, Suit::Hearts)];

        assert!(!game.is_valid_move(at(PileId::Tableau(0), 0), PileId::Tableau(1), None));
        assert!(!game.is_valid_move(at(PileId::Tableau(0), 5), PileId::Tableau(1), None));
        assert!(!game.is_valid_move(at(PileId::Waste, 0), PileId::Tableau(1), None));
        assert!(!game.is_valid_move(at(PileId::Tableau(0), 1), PileId::Waste, None));
        assert!(!game.is_valid_move(at(PileId::Tableau(0), 1), PileId::Stock, None));
    }

    #[test]
    fn test_only_top_of_waste_moves() {
        let mut game = GameState::default();
        game.waste = vec![up(Rank::King, Suit::Clubs), up(Rank::Five, Suit::Hearts)];
        assert!(!game.is_valid_move(at(PileId::Waste, 0), PileId::Tableau(0), None));
    }

    #[test]
    fn test_suffix_move_preserves_order_and_reveals() {
        let mut game = GameState::default();
        game.tableaus[0] = vec![
            down(Rank::Four, Suit::Hearts),
            down(Rank::Ten, Suit::Clubs),
            up(Rank::Seven, Suit::Spades),
            up(Rank::Six, Suit::Diamonds),
        ];
        game.tableaus[1] = vec![up(Rank::Eight, Suit::Hearts)];

        let next = game
            .apply_move(at(PileId::Tableau(0), 2), PileId::Tableau(1), None)
            .unwrap();

        assert_eq!(
            faces(&next.tableaus[1]),
            faces(&[
                up(Rank::Eight, Suit::Hearts),
                up(Rank::Seven, Suit::Spades),
                up(Rank::Six, Suit::Diamonds),
            ])
        );
        assert_eq!(next.tableaus[0].len(), 2);
        assert!(next.tableaus[0][1].face_up);
        assert!(!next.tableaus[0][0].face_up);
        // The previous snapshot is untouched
        assert_eq!(game.tableaus[0].len(), 4);
        assert!(!game.tableaus[0][1].face_up);
    }

    #[test]
    fn test_multi_card_run_cannot_go_to_foundation() {
        let mut game = GameState::default();
        game.foundations[Suit::Spades.index()] = vec![up(Rank::Ace, Suit::Spades)];
        game.tableaus[0] = vec![up(Rank::Two, Suit::Spades), up(Rank::Ace, Suit::Hearts)];

        assert!(!game.is_valid_move(
            at(PileId::Tableau(0), 0),
            PileId::Foundation(Suit::Spades),
            None
        ));
    }

    #[test]
    fn test_invalid_move_changes_nothing() {
        let mut game = GameState::default();
        game.tableaus[0] = vec![up(Rank::Five, Suit::Hearts)];
        game.tableaus[1] = vec![up(Rank::Nine, Suit::Clubs)];
        game.focus = Focus::Selected(at(PileId::Tableau(0), 0));

        assert!(game
            .apply_move(at(PileId::Tableau(0), 0), PileId::Tableau(1), None)
            .is_none());

        let t = game.try_move(at(PileId::Tableau(0), 0), PileId::Tableau(1), None);
        assert_eq!(table(&t.state), table(&game));
        assert_eq!(t.state.focus, Focus::Idle);
        assert!(matches!(t.events[..], [GameEvent::InvalidMove { .. }]));
    }

    #[test]
    fn test_same_pile_is_quiet_no_op() {
        let mut game = GameState::default();
        game.tableaus[2] = vec![up(Rank::Five, Suit::Hearts)];
        game.focus = Focus::Selected(at(PileId::Tableau(2), 0));

        let t = game.try_move(at(PileId::Tableau(2), 0), PileId::Tableau(2), Some(0));
        assert_eq!(table(&t.state), table(&game));
        assert_eq!(t.state.focus, Focus::Idle);
        assert_eq!(t.events, vec![GameEvent::SelectionCleared]);
    }

    #[test]
    fn test_draw_and_recycle() {
        let mut game = GameState::default();
        game.stock = vec![
            down(Rank::Ace, Suit::Clubs),
            down(Rank::Two, Suit::Clubs),
            down(Rank::Three, Suit::Clubs),
        ];

        let mut state = game.clone();
        for _ in 0..3 {
            state = state.draw().state;
        }
        assert!(state.stock.is_empty());
        assert_eq!(
            state.waste,
            vec![
                up(Rank::Three, Suit::Clubs),
                up(Rank::Two, Suit::Clubs),
                up(Rank::Ace, Suit::Clubs),
            ]
        );
        assert!(state.waste.iter().all(|c| c.face_up));

        let waste_before = state.waste.clone();
        let t = state.draw();
        assert_eq!(t.events, vec![GameEvent::WasteRecycled { count: 3 }]);
        assert!(t.state.waste.is_empty());
        let mut reversed = waste_before.clone();
        reversed.reverse();
        let reversed: Vec<Card> = reversed.into_iter().map(Card::flipped_down).collect();
        assert_eq!(faces(&t.state.stock), faces(&reversed));
        assert_eq!(t.state.stock, game.stock);

        // Drawing everything again restores the same waste order
        let mut state = t.state;
        for _ in 0..3 {
            state = state.draw().state;
        }
        assert_eq!(state.waste, waste_before);
    }

    #[test]
    fn test_draw_with_nothing_left() {
        let game = GameState::default();
        let t = game.draw();
        assert_eq!(t.events, vec![GameEvent::NothingToDraw]);
        assert_eq!(table(&t.state), table(&game));
        assert_eq!(t.state.focus, game.focus);
    }

    #[test]
    fn test_click_arms_then_moves() {
        let mut game = GameState::default();
        game.tableaus[0] = vec![down(Rank::Two, Suit::Hearts), up(Rank::Seven, Suit::Spades)];
        game.tableaus[1] = vec![up(Rank::Eight, Suit::Hearts)];

        let armed = game.select_or_move(PileId::Tableau(0), Some(1)).unwrap();
        assert_eq!(armed.state.focus, Focus::Selected(at(PileId::Tableau(0), 1)));

        let moved = armed.state.select_or_move(PileId::Tableau(1), Some(0)).unwrap();
        assert_eq!(moved.state.focus, Focus::Idle);
        assert_eq!(moved.state.tableaus[1].last(), Some(&up(Rank::Seven, Suit::Spades)));
        assert!(moved.state.tableaus[0][0].face_up);
        assert!(moved
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::CardRevealed { .. })));
    }

    #[test]
    fn test_click_on_face_down_does_not_arm() {
        let mut game = GameState::default();
        game.tableaus[0] = vec![down(Rank::Two, Suit::Hearts), up(Rank::Seven, Suit::Spades)];

        let t = game.select_or_move(PileId::Tableau(0), Some(0)).unwrap();
        assert_eq!(t.state.focus, Focus::Idle);
        assert!(t.events.is_empty());

        let t = game.select_or_move(PileId::Stock, None).unwrap();
        assert_eq!(t.state.focus, Focus::Idle);
    }

    #[test]
    fn test_unknown_tableau_is_contract_error() {
        let game = GameState::default();
        assert_eq!(
            game.select_or_move(PileId::Tableau(7), None).unwrap_err(),
            GameError::TableauOutOfRange(7)
        );
        assert!(game.card_at(at(PileId::Waste, 0)).is_err());
    }

    #[test]
    fn test_drag_clears_selection_and_resolves() {
        let mut game = GameState::default();
        game.waste = vec![up(Rank::King, Suit::Hearts)];
        game.tableaus[0] = vec![up(Rank::Four, Suit::Clubs)];
        game.focus = Focus::Selected(at(PileId::Tableau(0), 0));

        let source = at(PileId::Waste, 0);
        let dragging = game.begin_drag(source).unwrap();
        assert_eq!(dragging.state.focus, Focus::Dragging(source));
        assert_eq!(dragging.state.focus.selection(), None);

        let dropped = dragging
            .state
            .drag_resolve(source, Some((PileId::Tableau(4), None)))
            .unwrap();
        assert_eq!(faces(&dropped.state.tableaus[4]), faces(&[up(Rank::King, Suit::Hearts)]));
        assert!(dropped.state.waste.is_empty());
        assert_eq!(dropped.state.focus, Focus::Idle);
    }

    #[test]
    fn test_drag_released_off_target_is_invalid() {
        let mut game = GameState::default();
        game.waste = vec![up(Rank::King, Suit::Hearts)];
        let source = at(PileId::Waste, 0);
        let dragging = game.begin_drag(source).unwrap().state;

        let t = dragging.drag_resolve(source, None).unwrap();
        assert_eq!(faces(&t.state.waste), faces(&game.waste));
        assert_eq!(t.state.focus, Focus::Idle);
        assert_eq!(t.events, vec![GameEvent::InvalidMove { from: source, to: None }]);
    }

    #[test]
    fn test_draggable_sequence() {
        let mut game = GameState::default();
        game.tableaus[0] = vec![
            down(Rank::Nine, Suit::Hearts),
            up(Rank::Seven, Suit::Spades),
            up(Rank::Six, Suit::Hearts),
        ];
        game.waste = vec![up(Rank::Two, Suit::Clubs), up(Rank::Three, Suit::Clubs)];

        assert_eq!(
            game.draggable_sequence(at(PileId::Tableau(0), 1)).unwrap(),
            vec![up(Rank::Seven, Suit::Spades), up(Rank::Six, Suit::Hearts)]
        );
        assert!(game.draggable_sequence(at(PileId::Tableau(0), 0)).unwrap().is_empty());
        assert_eq!(
            game.draggable_sequence(at(PileId::Waste, 1)).unwrap(),
            vec![up(Rank::Three, Suit::Clubs)]
        );
        assert!(game.draggable_sequence(at(PileId::Waste, 0)).unwrap().is_empty());
        assert!(game.draggable_sequence(at(PileId::Stock, 0)).unwrap().is_empty());
        assert!(game.draggable_sequence(at(PileId::Tableau(8), 0)).is_err());
    }

    #[test]
    fn test_huge_source_index_is_rejected_not_panicking() {
        let mut game = GameState::default();
        game.waste = vec![up(Rank::King, Suit::Hearts)];
        game.foundations[Suit::Hearts.index()] = vec![up(Rank::Ace, Suit::Hearts)];
        game.tableaus[0] = vec![up(Rank::Two, Suit::Hearts)];

        for pile in [PileId::Waste, PileId::Foundation(Suit::Hearts), PileId::Tableau(0)] {
            let from = at(pile, usize::MAX);
            assert!(game.draggable_sequence(from).unwrap().is_empty());
            assert!(!game.is_valid_move(from, PileId::Foundation(Suit::Hearts), None));
            assert!(!game.is_valid_move(from, PileId::Tableau(1), None));

            let t = game.begin_drag(from).unwrap();
            assert!(t.events.is_empty());
            assert_eq!(t.state.focus, Focus::Idle);
        }
    }

    #[test]
    fn test_table_comparison_sees_orientation() {
        let mut face_down = GameState::default();
        face_down.tableaus[0] = vec![down(Rank::Five, Suit::Clubs)];
        let mut face_up = GameState::default();
        face_up.tableaus[0] = vec![up(Rank::Five, Suit::Clubs)];

        assert_ne!(table(&face_down), table(&face_up));
    }

    #[test]
    fn test_win_detection_and_single_signal() {
        let mut game = GameState::default();
        for suit in Suit::ALL {
            game.foundations[suit.index()] = Rank::ALL.iter().map(|&r| up(r, suit)).collect();
        }
        assert!(game.is_won());

        let king = game.foundations[Suit::Spades.index()].pop().unwrap();
        assert!(!game.is_won());
        game.waste.push(king);

        let t = game.try_move(at(PileId::Waste, 0), PileId::Foundation(Suit::Spades), None);
        assert!(t.state.is_won());
        assert_eq!(t.events.last(), Some(&GameEvent::GameWon));

        // Leaving the won state is silent
        let won = t.state;
        let t = won.try_move(
            at(PileId::Foundation(Suit::Spades), 12),
            PileId::Tableau(0),
            None,
        );
        assert!(!t.state.is_won());
        assert!(!t.events.contains(&GameEvent::GameWon));
    }
}
