//! Card notation parsing
//!
//! Parses card strings like "Slash" or "Peach|Suit:heart|Rank:K|Id:7"

use crate::core::{CardName, Rank, Suit};
use crate::{DuelError, Result};

/// One card as written in a scenario file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardSpec {
    pub name: CardName,
    /// Catalog face when absent
    pub suit: Option<Suit>,
    pub rank: Option<Rank>,
    /// Fixed id, so tests can refer to the card
    pub id: Option<u32>,
}

impl CardSpec {
    pub fn named(name: CardName) -> Self {
        CardSpec {
            name,
            suit: None,
            rank: None,
            id: None,
        }
    }
}

/// Parse a single card from notation like "Name|Key:Value|..."
pub fn parse_card_notation(notation: &str) -> Result<CardSpec> {
    let mut parts = notation.split('|');
    let name = parts
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| DuelError::ParseError("Empty card notation".to_string()))?;
    let mut card = CardSpec::named(name.parse()?);

    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (key, value) = part.split_once(':').ok_or_else(|| {
            DuelError::ParseError(format!("Card modifier '{part}' is not Key:Value"))
        })?;

        match key.trim().to_lowercase().as_str() {
            "suit" => card.suit = Some(value.parse()?),
            "rank" => card.rank = Some(value.parse()?),
            "id" => {
                let id = value
                    .trim()
                    .parse()
                    .map_err(|_| DuelError::ParseError(format!("Invalid Id value: {value}")))?;
                card.id = Some(id);
            }
            other => {
                return Err(DuelError::ParseError(format!(
                    "Unknown card modifier '{other}' in '{notation}'"
                )))
            }
        }
    }

    Ok(card)
}

/// Parse a `;`-separated card list; an empty value is an empty list
pub fn parse_card_list(value: &str) -> Result<Vec<CardSpec>> {
    value
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_card_notation)
        .collect()
}
