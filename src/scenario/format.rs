//! Scenario file format
//!
//! INI-style files with a `[metadata]` section (`Key:Value` lines) and a
//! `[state]` section (`key=value` lines). Keys are case-insensitive.
//!
//! ```text
//! [metadata]
//! Name:Last Stand
//! Description:One Dodge between you and defeat
//!
//! [state]
//! phase=PLAYER_PLAY
//! turn=3
//! humancharacter=Liu Bei
//! humanhp=1
//! humanhand=Dodge;Slash|Id:40
//! opponenthp=2
//! opponenthand=Slash;Slash
//! deck=Peach;Dodge
//! ```

use crate::core::CharacterId;
use crate::game::Phase;
use crate::scenario::card_notation::{parse_card_list, parse_card_notation, CardSpec};
use crate::{DuelError, Result};
use rustc_hash::FxHashMap;

/// Descriptive header of a scenario
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioMetadata {
    pub name: String,
    pub description: String,
}

impl ScenarioMetadata {
    pub fn parse(lines: &[String]) -> Result<Self> {
        let mut metadata = ScenarioMetadata::default();
        for line in lines {
            let (key, value) = line.split_once(':').ok_or_else(|| {
                DuelError::ParseError(format!("Invalid metadata line: {}", line.trim()))
            })?;
            match key.trim().to_lowercase().as_str() {
                "name" => metadata.name = value.trim().to_string(),
                "description" => metadata.description = value.trim().to_string(),
                // Free-form keys (author, url...) are allowed
                _ => {}
            }
        }
        Ok(metadata)
    }
}

/// One seat as described by the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatDefinition {
    pub character: Option<CharacterId>,
    /// Defaults to the character's maximum
    pub hp: Option<u8>,
    pub hand: Vec<CardSpec>,
    /// Slashes already played this turn
    pub slashes: u8,
}

/// The `[state]` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDefinition {
    pub phase: Phase,
    pub turn: u32,
    pub seed: Option<u64>,
    pub human: SeatDefinition,
    pub opponent: SeatDefinition,
    /// `None` means the rest of the standard deck, shuffled
    pub deck: Option<Vec<CardSpec>>,
    pub discard: Vec<CardSpec>,
    /// An attack waiting for the human's answer
    pub pending: Option<CardSpec>,
}

impl Default for StateDefinition {
    fn default() -> Self {
        StateDefinition {
            phase: Phase::PlayerPlay,
            turn: 1,
            seed: None,
            human: SeatDefinition::default(),
            opponent: SeatDefinition::default(),
            deck: None,
            discard: Vec::new(),
            pending: None,
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| DuelError::ParseError(format!("Invalid value for {key}: {value}")))
}

impl StateDefinition {
    pub fn parse(lines: &[String]) -> Result<Self> {
        let mut state = StateDefinition::default();

        for line in lines {
            let (key, value) = line.split_once('=').ok_or_else(|| {
                DuelError::ParseError(format!("Invalid state line: {}", line.trim()))
            })?;
            let key = key.trim().to_lowercase();
            let value = value.trim();

            let (seat, field) = if let Some(field) = key.strip_prefix("human") {
                (Some(&mut state.human), field)
            } else if let Some(field) = key
                .strip_prefix("opponent")
                .or_else(|| key.strip_prefix("ai"))
            {
                (Some(&mut state.opponent), field)
            } else {
                (None, key.as_str())
            };

            match (seat, field) {
                (Some(seat), "character") => seat.character = Some(value.parse()?),
                (Some(seat), "hp") => seat.hp = Some(parse_number(&key, value)?),
                (Some(seat), "hand") => seat.hand = parse_card_list(value)?,
                (Some(seat), "slashes") => seat.slashes = parse_number(&key, value)?,
                (None, "phase") => state.phase = value.parse()?,
                (None, "turn") => state.turn = parse_number(&key, value)?,
                (None, "seed") => state.seed = Some(parse_number(&key, value)?),
                (None, "deck") => state.deck = Some(parse_card_list(value)?),
                (None, "discard") => state.discard = parse_card_list(value)?,
                (None, "pending") => state.pending = Some(parse_card_notation(value)?),
                _ => {
                    return Err(DuelError::ParseError(format!(
                        "Unknown state key: {key}"
                    )))
                }
            }
        }

        Ok(state)
    }
}

/// A complete scenario file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub metadata: ScenarioMetadata,
    pub state: StateDefinition,
}

/// Parse a complete scenario from string contents
pub fn parse_scenario(contents: &str) -> Result<Scenario> {
    let sections = parse_sections(contents);

    let metadata = match sections.get("metadata") {
        Some(lines) => ScenarioMetadata::parse(lines)?,
        None => ScenarioMetadata::default(),
    };
    let state = match sections.get("state") {
        Some(lines) => StateDefinition::parse(lines)?,
        None => {
            return Err(DuelError::ParseError(
                "Missing [state] section in scenario file".to_string(),
            ))
        }
    };

    Ok(Scenario { metadata, state })
}

/// Split INI-style contents into section name -> lines
fn parse_sections(contents: &str) -> FxHashMap<String, Vec<String>> {
    let mut sections: FxHashMap<String, Vec<String>> = FxHashMap::default();
    let mut current: Option<String> = None;

    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            let name = trimmed[1..trimmed.len() - 1].trim().to_lowercase();
            sections.entry(name.clone()).or_default();
            current = Some(name);
        } else if let Some(name) = &current {
            sections.entry(name.clone()).or_default().push(trimmed.to_string());
        }
        // Lines before the first section are ignored
    }

    sections
}
