//! Scenario files
//!
//! A scenario describes a mid-game position (hands, hp, deck order, phase)
//! so a game can start from it. Used by `duel play --start-state` and by
//! the integration tests.

pub mod card_notation;
pub mod format;
pub mod loader;

pub use card_notation::{parse_card_list, parse_card_notation, CardSpec};
pub use format::{Scenario, ScenarioMetadata, SeatDefinition, StateDefinition};
pub use loader::{load_scenario, load_scenario_with_rules};

use crate::Result;

impl Scenario {
    /// Load a scenario file from disk
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a scenario from a string
    pub fn parse(contents: &str) -> Result<Self> {
        format::parse_scenario(contents)
    }
}
