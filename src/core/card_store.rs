//! Card identities and the per-game card store

use crate::core::card::Card;
use crate::{DuelError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer id of a physical card
///
/// Ids are assigned once when the deck is built and never reused. A card's
/// attributes never change; only the zone holding its id does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(u32);

impl CardId {
    pub fn new(id: u32) -> Self {
        CardId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every card of one game, by id
///
/// Zones hold ids only; this is where an id is turned back into a face.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardStore {
    cards: FxHashMap<CardId, Card>,
    next_id: u32,
}

impl CardStore {
    pub fn new() -> Self {
        CardStore {
            cards: FxHashMap::default(),
            next_id: 1,
        }
    }

    /// A fresh id, never handed out before (ids start at 1)
    pub fn next_id(&mut self) -> CardId {
        let id = CardId::new(self.next_id.max(1));
        self.next_id = id.as_u32() + 1;
        id
    }

    /// Store `card` under its own id
    pub fn insert(&mut self, card: Card) {
        let id = card.id;
        if id.as_u32() >= self.next_id {
            self.next_id = id.as_u32() + 1;
        }
        self.cards.insert(id, card);
    }

    pub fn get(&self, id: CardId) -> Result<&Card> {
        self.cards
            .get(&id)
            .ok_or(DuelError::CardNotFound(id.as_u32()))
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
