//! Card zones (draw deck, hands, discard pile, equipment)

use crate::core::{CardId, Side};
use serde::{Deserialize, Serialize};

/// Where a card currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Deck,
    Hand(Side),
    Discard,
    Equipment(Side),
}

/// An ordered run of card ids
///
/// For the deck the front (index 0) is the next card drawn. Hands keep
/// insertion order, the discard pile is append-only until a reshuffle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardZone {
    pub cards: Vec<CardId>,
}

impl CardZone {
    pub fn new() -> Self {
        CardZone { cards: Vec::new() }
    }

    pub fn from_cards(cards: Vec<CardId>) -> Self {
        CardZone { cards }
    }

    pub fn add(&mut self, card_id: CardId) {
        self.cards.push(card_id);
    }

    pub fn remove(&mut self, card_id: CardId) -> bool {
        if let Some(pos) = self.cards.iter().position(|&id| id == card_id) {
            // remove() keeps the remaining order intact; hand order drives
            // the deterministic forced discard.
            self.cards.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.cards.contains(&card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CardId> {
        self.cards.iter()
    }

    /// Draw from the front (for the deck)
    pub fn draw_front(&mut self) -> Option<CardId> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    /// Remove up to `count` cards from the front
    pub fn take_front(&mut self, count: usize) -> Vec<CardId> {
        let count = count.min(self.cards.len());
        self.cards.drain(..count).collect()
    }

    /// Take every card, leaving the zone empty
    pub fn take_all(&mut self) -> Vec<CardId> {
        std::mem::take(&mut self.cards)
    }

    /// Uniform shuffle (for the deck)
    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }
}
