//! A running game as seen by the host UI.
//!
//! `Game` holds the current snapshot and swaps it for the next one after
//! every command. It also owns the short-lived feedback the UI flashes: the
//! status message and the invalid-move flag. Those clear when the host
//! reports enough elapsed time through [`Game::advance`].

use crate::actions::{GameAction, GameEvent};
use crate::card::Card;
use crate::config::EngineConfig;
use crate::game::{GameError, GameState, Transition};
use crate::pile::{PileId, PileRef};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A value that expires after a fixed time
#[derive(Debug, Clone)]
struct Timed<T> {
    value: T,
    remaining: Duration,
}

impl<T> Timed<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            remaining: ttl,
        }
    }

    /// Count down; returns false once expired
    fn tick(&mut self, elapsed: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(elapsed);
        !self.remaining.is_zero()
    }
}

/// Map a UI index to a card position; negative means the top of the pile
pub fn top_or_index(index: i32) -> Option<usize> {
    usize::try_from(index).ok()
}

fn session_rng(config: &EngineConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// One game session
pub struct Game {
    state: GameState,
    config: EngineConfig,
    rng: StdRng,
    message: Option<Timed<String>>,
    invalid_move: Option<Timed<()>>,
}

impl Game {
    /// Start a session and deal the first game
    pub fn new(config: EngineConfig) -> Result<Self, GameError> {
        config.validate()?;

        let mut rng = session_rng(&config);
        let state = GameState::deal_new(&mut rng);
        info!(seed = ?config.seed, "New game dealt");

        Ok(Self::assemble(state, config, rng))
    }

    /// Start a session from an existing position without dealing
    pub fn from_state(state: GameState, config: EngineConfig) -> Result<Self, GameError> {
        config.validate()?;

        let rng = session_rng(&config);
        debug!(seed = ?config.seed, cards = state.count_cards(), "Session resumed");

        Ok(Self::assemble(state, config, rng))
    }

    fn assemble(state: GameState, config: EngineConfig, rng: StdRng) -> Self {
        Self {
            state,
            config,
            rng,
            message: None,
            invalid_move: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current status message, if one is showing
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.value.as_str())
    }

    /// False while the invalid-move flag is raised
    pub fn last_move_valid(&self) -> bool {
        self.invalid_move.is_none()
    }

    pub fn is_won(&self) -> bool {
        self.state.is_won()
    }

    pub fn draggable_sequence(&self, pile: PileId, index: usize) -> Result<Vec<Card>, GameError> {
        self.state.draggable_sequence(PileRef::new(pile, index))
    }

    /// Throw the table away and deal again
    pub fn reset(&mut self) -> Vec<GameEvent> {
        let state = GameState::deal_new(&mut self.rng);
        info!("New game dealt");
        self.invalid_move = None;
        self.commit(Transition {
            state,
            events: vec![GameEvent::NewGame],
        })
    }

    pub fn draw(&mut self) -> Vec<GameEvent> {
        let transition = self.state.draw();
        debug!(stock = transition.state.stock.len(), waste = transition.state.waste.len(), "Draw");
        self.commit(transition)
    }

    /// Click on a pile; negative `index` targets the top card
    pub fn select_or_move(&mut self, pile: PileId, index: i32) -> Result<Vec<GameEvent>, GameError> {
        debug!(%pile, index, "Click");
        let transition = self
            .state
            .select_or_move(pile, top_or_index(index))
            .map_err(|e| {
                warn!(error = %e, "Rejected click");
                e
            })?;
        Ok(self.commit(transition))
    }

    /// Pick up cards with the pointer; negative `index` targets the top card
    pub fn begin_drag(&mut self, pile: PileId, index: i32) -> Result<Vec<GameEvent>, GameError> {
        debug!(%pile, index, "Drag start");
        let index = match top_or_index(index) {
            Some(index) => index,
            None => self.state.pile(pile)?.len().saturating_sub(1),
        };
        let transition = self
            .state
            .begin_drag(PileRef::new(pile, index))
            .map_err(|e| {
                warn!(error = %e, "Rejected drag");
                e
            })?;
        Ok(self.commit(transition))
    }

    pub fn drag_resolve(
        &mut self,
        from: PileRef,
        target: Option<(PileId, i32)>,
    ) -> Result<Vec<GameEvent>, GameError> {
        debug!(%from, ?target, "Drag end");
        let target = target.map(|(pile, index)| (pile, top_or_index(index)));
        let transition = self
            .state
            .drag_resolve(from, target)
            .map_err(|e| {
                warn!(error = %e, "Rejected drop");
                e
            })?;
        Ok(self.commit(transition))
    }

    pub fn cancel_drag(&mut self) -> Vec<GameEvent> {
        let transition = self.state.cancel_drag();
        self.commit(transition)
    }

    /// Dispatch a serialised action
    pub fn apply_action(&mut self, action: GameAction) -> Result<Vec<GameEvent>, GameError> {
        match action {
            GameAction::Reset => Ok(self.reset()),
            GameAction::Draw => Ok(self.draw()),
            GameAction::SelectOrMove { pile, index } => self.select_or_move(pile, index),
            GameAction::BeginDrag { pile, index } => self.begin_drag(pile, index),
            GameAction::DragResolve { from, target } => self.drag_resolve(from, target),
            GameAction::CancelDrag => Ok(self.cancel_drag()),
        }
    }

    /// Let feedback timers run down by `elapsed`
    pub fn advance(&mut self, elapsed: Duration) {
        if let Some(flag) = self.invalid_move.as_mut() {
            if !flag.tick(elapsed) {
                self.invalid_move = None;
            }
        }
        if let Some(message) = self.message.as_mut() {
            if !message.tick(elapsed) {
                self.message = None;
            }
        }
    }

    fn commit(&mut self, transition: Transition) -> Vec<GameEvent> {
        let Transition { state, events } = transition;
        self.state = state;

        for event in &events {
            match event {
                GameEvent::InvalidMove { from, to } => {
                    debug!(%from, ?to, "Invalid move");
                    self.invalid_move = Some(Timed::new((), self.config.invalid_move_flash()));
                }
                GameEvent::GameWon => info!("Game won"),
                _ => {}
            }
            if let Some(status) = event.status() {
                self.message = Some(Timed::new(status, self.config.message_ttl()));
            }
        }

        events
    }
}
