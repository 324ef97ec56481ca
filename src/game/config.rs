//! Game configuration
//!
//! Every field has a default, so a JSON config file only needs the values it
//! changes:
//!
//! ```json
//! { "rules": { "theft_transfers": true }, "pacing": { "between_moves_ms": 0 } }
//! ```

use crate::core::card::catalog_size;
use crate::core::CharacterId;
use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Rule constants. Carried inside `GameState` so the reducer stays a pure
/// function of (state, action).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub starting_hand: u8,
    pub draw_per_turn: u8,
    pub max_slashes_per_turn: u8,
    pub attack_damage: u8,
    pub peach_heal: u8,
    /// Consecutive unusable oracle answers before the opponent's turn is ended
    pub max_invalid_decisions: u8,
    /// Barbarians and Archery open an interaction instead of being inert
    pub volley_scrolls: bool,
    /// Theft moves the card into the thief's hand instead of discarding it
    pub theft_transfers: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            starting_hand: 4,
            draw_per_turn: 2,
            max_slashes_per_turn: 1,
            attack_damage: 1,
            peach_heal: 1,
            max_invalid_decisions: 3,
            volley_scrolls: false,
            theft_transfers: false,
        }
    }
}

/// Delays inserted so a watching human can follow the opponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    pub opponent_thinking_ms: u64,
    pub response_ms: u64,
    pub between_moves_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing {
            opponent_thinking_ms: 1000,
            response_ms: 1000,
            between_moves_ms: 2000,
        }
    }
}

impl Pacing {
    /// No delays at all (tests, simulation, benchmarks)
    pub fn instant() -> Self {
        Pacing {
            opponent_thinking_ms: 0,
            response_ms: 0,
            between_moves_ms: 0,
        }
    }

    pub fn opponent_thinking(&self) -> Duration {
        Duration::from_millis(self.opponent_thinking_ms)
    }

    pub fn response(&self) -> Duration {
        Duration::from_millis(self.response_ms)
    }

    pub fn between_moves(&self) -> Duration {
        Duration::from_millis(self.between_moves_ms)
    }
}

/// Sleep for `delay`, skipping the timer entirely when it is zero
pub async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rules: RulesConfig,
    pub pacing: Pacing,
    pub oracle_timeout_ms: u64,
    /// Fixed seed for a reproducible game; random when absent
    pub seed: Option<u64>,
    pub hero: CharacterId,
    pub foe: CharacterId,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rules: RulesConfig::default(),
            pacing: Pacing::default(),
            oracle_timeout_ms: 10_000,
            seed: None,
            hero: CharacterId::LiuBei,
            foe: CharacterId::CaoCao,
        }
    }
}

impl GameConfig {
    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: GameConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with no pacing delays
    pub fn instant() -> Self {
        GameConfig::default().with_pacing(Pacing::instant())
    }

    pub fn with_rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_characters(mut self, hero: CharacterId, foe: CharacterId) -> Self {
        self.hero = hero;
        self.foe = foe;
        self
    }

    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }

    /// The seed to use for the next game
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    pub fn validate(&self) -> Result<()> {
        let rules = &self.rules;
        if rules.max_slashes_per_turn == 0 {
            return Err(DuelError::InvalidConfig(
                "max_slashes_per_turn must be at least 1".to_string(),
            ));
        }
        if rules.attack_damage == 0 {
            return Err(DuelError::InvalidConfig(
                "attack_damage must be at least 1".to_string(),
            ));
        }
        if rules.starting_hand as usize * 2 > catalog_size() {
            return Err(DuelError::InvalidConfig(format!(
                "starting_hand {} needs more than the {} cards in the deck",
                rules.starting_hand,
                catalog_size()
            )));
        }
        if self.oracle_timeout_ms == 0 {
            return Err(DuelError::InvalidConfig(
                "oracle_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
