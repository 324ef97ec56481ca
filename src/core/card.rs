//! Card types, the fixed card catalog and deck construction

use crate::core::CardId;
use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Card categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Basic,
    /// One-shot tactics
    Scroll,
    Equipment,
}

/// Every card in the game is one of these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardName {
    Slash,
    Dodge,
    Peach,
    Duel,
    Sabotage,
    Theft,
    Barbarians,
    Archery,
}

impl CardName {
    pub const ALL: [CardName; 8] = [
        CardName::Slash,
        CardName::Dodge,
        CardName::Peach,
        CardName::Duel,
        CardName::Sabotage,
        CardName::Theft,
        CardName::Barbarians,
        CardName::Archery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardName::Slash => "Slash",
            CardName::Dodge => "Dodge",
            CardName::Peach => "Peach",
            CardName::Duel => "Duel",
            CardName::Sabotage => "Sabotage",
            CardName::Theft => "Theft",
            CardName::Barbarians => "Barbarians",
            CardName::Archery => "Archery",
        }
    }

    pub fn card_type(&self) -> CardType {
        match self {
            CardName::Slash | CardName::Dodge | CardName::Peach => CardType::Basic,
            CardName::Duel
            | CardName::Sabotage
            | CardName::Theft
            | CardName::Barbarians
            | CardName::Archery => CardType::Scroll,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CardName::Slash => "Deal 1 damage to target.",
            CardName::Dodge => "Evade a Slash attack.",
            CardName::Peach => "Recover 1 HP.",
            CardName::Duel => "Both players discard Slash repeatedly. First to fail takes damage.",
            CardName::Sabotage => "Discard 1 card from opponent (hand or equip).",
            CardName::Theft => "Steal 1 card from opponent.",
            CardName::Barbarians => "All other players must play Slash or take damage.",
            CardName::Archery => "All other players must play Dodge or take damage.",
        }
    }

    /// The card a defender must produce to counter this one, if it attacks at all
    pub fn required_response(&self) -> Option<CardName> {
        match self {
            CardName::Slash | CardName::Archery => Some(CardName::Dodge),
            CardName::Duel | CardName::Barbarians => Some(CardName::Slash),
            CardName::Dodge | CardName::Peach | CardName::Sabotage | CardName::Theft => None,
        }
    }

    /// Offensive scrolls are preferred over Slash by the heuristic opponent
    pub fn is_offensive(&self) -> bool {
        self.required_response().is_some()
    }
}

impl fmt::Display for CardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardName {
    type Err = DuelError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        CardName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DuelError::ParseError(format!("unknown card name '{wanted}'")))
    }
}

/// Card suit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spade,
    Heart,
    Club,
    Diamond,
}

impl Suit {
    pub fn symbol(&self) -> char {
        match self {
            Suit::Spade => '♠',
            Suit::Heart => '♥',
            Suit::Club => '♣',
            Suit::Diamond => '♦',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Suit {
    type Err = DuelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "spade" | "spades" | "♠" => Ok(Suit::Spade),
            "heart" | "hearts" | "♥" => Ok(Suit::Heart),
            "club" | "clubs" | "♣" => Ok(Suit::Club),
            "diamond" | "diamonds" | "♦" => Ok(Suit::Diamond),
            other => Err(DuelError::ParseError(format!("unknown suit '{other}'"))),
        }
    }
}

/// Card rank, 1 (A) through 13 (K)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rank(u8);

impl Rank {
    pub const ACE: Rank = Rank(1);
    pub const JACK: Rank = Rank(11);
    pub const QUEEN: Rank = Rank(12);
    pub const KING: Rank = Rank(13);

    pub fn new(value: u8) -> Result<Self> {
        if (1..=13).contains(&value) {
            Ok(Rank(value))
        } else {
            Err(DuelError::ParseError(format!("rank {value} out of range 1-13")))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            1 => f.write_str("A"),
            11 => f.write_str("J"),
            12 => f.write_str("Q"),
            13 => f.write_str("K"),
            n => write!(f, "{n}"),
        }
    }
}

impl FromStr for Rank {
    type Err = DuelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Rank::ACE),
            "J" => Ok(Rank::JACK),
            "Q" => Ok(Rank::QUEEN),
            "K" => Ok(Rank::KING),
            other => other
                .parse::<u8>()
                .map_err(|_| DuelError::ParseError(format!("invalid rank '{other}'")))
                .and_then(Rank::new),
        }
    }
}

/// A card instance
///
/// Cards are value objects: once created only their location changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: CardName,
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub fn new(id: CardId, name: CardName, suit: Suit, rank: Rank) -> Self {
        Card {
            id,
            name,
            suit,
            rank,
        }
    }

    pub fn card_type(&self) -> CardType {
        self.name.card_type()
    }

    pub fn description(&self) -> &'static str {
        self.name.description()
    }

    pub fn is(&self, name: CardName) -> bool {
        self.name == name
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}{})", self.name, self.suit, self.rank)
    }
}

/// One line of the deck list: `count` copies of a card face
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub name: CardName,
    pub suit: Suit,
    pub rank: Rank,
    pub count: u8,
}

const fn entry(name: CardName, suit: Suit, rank: u8, count: u8) -> CatalogEntry {
    CatalogEntry {
        name,
        suit,
        rank: Rank(rank),
        count,
    }
}

/// The simplified 1v1 deck
pub const CATALOG: [CatalogEntry; 12] = [
    entry(CardName::Slash, Suit::Spade, 7, 5),
    entry(CardName::Slash, Suit::Heart, 10, 3),
    entry(CardName::Slash, Suit::Diamond, 13, 3),
    entry(CardName::Slash, Suit::Club, 8, 4),
    entry(CardName::Dodge, Suit::Diamond, 2, 4),
    entry(CardName::Dodge, Suit::Heart, 13, 3),
    entry(CardName::Peach, Suit::Heart, 12, 4),
    entry(CardName::Duel, Suit::Spade, 1, 2),
    entry(CardName::Sabotage, Suit::Spade, 3, 2),
    entry(CardName::Theft, Suit::Diamond, 4, 2),
    entry(CardName::Barbarians, Suit::Club, 7, 1),
    entry(CardName::Archery, Suit::Heart, 1, 1),
];

/// Total number of cards produced by `standard_deck`
pub fn catalog_size() -> usize {
    CATALOG.iter().map(|e| e.count as usize).sum()
}

/// First catalog face for a card name (used when a scenario omits suit/rank)
pub fn catalog_face(name: CardName) -> (Suit, Rank) {
    CATALOG
        .iter()
        .find(|e| e.name == name)
        .map(|e| (e.suit, e.rank))
        .unwrap_or((Suit::Spade, Rank::ACE))
}

/// Enumerate the catalog in order with ids 1, 2, 3, ... (unshuffled)
pub fn standard_deck() -> Vec<Card> {
    let mut next_id = 1;
    let mut cards = Vec::with_capacity(catalog_size());
    for e in CATALOG.iter() {
        for _ in 0..e.count {
            cards.push(Card::new(CardId::new(next_id), e.name, e.suit, e.rank));
            next_id += 1;
        }
    }
    cards
}
