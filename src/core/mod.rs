//! Core game types and entities

pub mod card;
pub mod card_store;
pub mod character;
pub mod player;

pub use card::{catalog_face, catalog_size, standard_deck, Card, CardName, CardType, Rank, Suit};
pub use card_store::{CardId, CardStore};
pub use character::{Character, CharacterId, Faction};
pub use player::{Equipment, Player, Side};
