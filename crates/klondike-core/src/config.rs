//! Engine configuration.

use crate::game::GameError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time the invalid-move flag stays raised
const DEFAULT_INVALID_MOVE_FLASH_MS: u64 = 1_000;

/// Default time a status message stays visible
const DEFAULT_MESSAGE_TTL_MS: u64 = 5_000;

/// Settings for a [`Game`](crate::session::Game) session.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed RNG seed for reproducible deals; `None` seeds from entropy
    pub seed: Option<u64>,
    /// How long `last_move_valid` reports false after a bad move
    pub invalid_move_flash_ms: u64,
    /// How long a status message is shown
    pub message_ttl_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            invalid_move_flash_ms: DEFAULT_INVALID_MOVE_FLASH_MS,
            message_ttl_ms: DEFAULT_MESSAGE_TTL_MS,
        }
    }
}

impl EngineConfig {
    /// Default config with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| GameError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.invalid_move_flash_ms == 0 {
            return Err(GameError::InvalidConfig(
                "invalid_move_flash_ms must be positive".to_string(),
            ));
        }
        if self.message_ttl_ms == 0 {
            return Err(GameError::InvalidConfig(
                "message_ttl_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn invalid_move_flash(&self) -> Duration {
        Duration::from_millis(self.invalid_move_flash_ms)
    }

    pub fn message_ttl(&self) -> Duration {
        Duration::from_millis(self.message_ttl_ms)
    }
}
