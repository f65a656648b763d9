//! WebAssembly bindings for the Klondike engine.
//!
//! Piles cross the boundary as id strings (`"tableau:3"`), everything else
//! as JSON.

use wasm_bindgen::prelude::*;

use crate::actions::GameAction;
use crate::config::EngineConfig;
use crate::pile::{PileId, PileRef};
use crate::session::Game;
use std::time::Duration;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn parse_pile(pile: &str) -> Result<PileId, JsValue> {
    pile.parse()
        .map_err(|e| JsValue::from_str(&format!("Invalid pile: {}", e)))
}

fn events_json(events: &[crate::GameEvent]) -> String {
    serde_json::to_string(events).unwrap_or_else(|_| "[]".to_string())
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    game: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a session from a JSON config (`"{}"` for defaults)
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmGame, JsValue> {
        let config = EngineConfig::from_json(config_json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let game = Game::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmGame { game })
    }

    /// Get the current game state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(self.game.state()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Current status message, if any
    #[wasm_bindgen(js_name = getMessage)]
    pub fn get_message(&self) -> Option<String> {
        self.game.message().map(str::to_string)
    }

    #[wasm_bindgen(js_name = lastMoveValid)]
    pub fn last_move_valid(&self) -> bool {
        self.game.last_move_valid()
    }

    #[wasm_bindgen(js_name = isWon)]
    pub fn is_won(&self) -> bool {
        self.game.is_won()
    }

    /// Deal a new game, returns events JSON
    pub fn reset(&mut self) -> String {
        events_json(&self.game.reset())
    }

    /// Draw from the stock, returns events JSON
    pub fn draw(&mut self) -> String {
        events_json(&self.game.draw())
    }

    /// Click on a card or slot, returns events JSON
    #[wasm_bindgen(js_name = selectOrMove)]
    pub fn select_or_move(&mut self, pile: &str, index: i32) -> Result<String, JsValue> {
        let pile = parse_pile(pile)?;
        self.game
            .select_or_move(pile, index)
            .map(|events| events_json(&events))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, pile: &str, index: i32) -> Result<String, JsValue> {
        let pile = parse_pile(pile)?;
        self.game
            .begin_drag(pile, index)
            .map(|events| events_json(&events))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Drop a dragged card; pass `None` for `target_pile` when released
    /// outside every pile
    #[wasm_bindgen(js_name = dragResolve)]
    pub fn drag_resolve(
        &mut self,
        source_pile: &str,
        source_index: usize,
        target_pile: Option<String>,
        target_index: i32,
    ) -> Result<String, JsValue> {
        let from = PileRef::new(parse_pile(source_pile)?, source_index);
        let target = match target_pile {
            Some(pile) => Some((parse_pile(&pile)?, target_index)),
            None => None,
        };
        self.game
            .drag_resolve(from, target)
            .map(|events| events_json(&events))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&mut self) -> String {
        events_json(&self.game.cancel_drag())
    }

    /// Cards a drag from this position would carry, as JSON
    #[wasm_bindgen(js_name = draggableSequence)]
    pub fn draggable_sequence(&self, pile: &str, index: usize) -> Result<String, JsValue> {
        let pile = parse_pile(pile)?;
        let cards = self
            .game
            .draggable_sequence(pile, index)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(serde_json::to_string(&cards).unwrap_or_else(|_| "[]".to_string()))
    }

    /// Apply an action from JSON, returns events JSON or error
    #[wasm_bindgen(js_name = applyAction)]
    pub fn apply_action(&mut self, action_json: &str) -> Result<String, JsValue> {
        let action: GameAction = serde_json::from_str(action_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid action JSON: {}", e)))?;

        self.game
            .apply_action(action)
            .map(|events| events_json(&events))
            .map_err(|e| JsValue::from_str(&format!("Action failed: {}", e)))
    }

    /// Advance feedback timers by `elapsed_ms`
    pub fn tick(&mut self, elapsed_ms: u32) {
        self.game.advance(Duration::from_millis(u64::from(elapsed_ms)));
    }
}
