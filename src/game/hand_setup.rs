//! Controlled hands
//!
//! Replaces dealt hands with chosen cards taken from the deck (or the discard
//! pile), for testing scenarios and the `--hand` / `--foe-hand` CLI options.

use crate::core::{CardName, Side};
use crate::game::GameState;
use crate::{DuelError, Result};

/// Configuration for a player's hand
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandSetup {
    /// Specific cards to place in hand, in order
    pub specific_cards: Vec<CardName>,
    /// Draw randomly after placing until the hand has this many cards
    pub fill_to: Option<usize>,
}

impl HandSetup {
    /// Parse hand setup from semicolon-separated card names
    ///
    /// An empty string is an empty hand.
    pub fn parse(input: &str) -> Result<Self> {
        let specific_cards = input
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<CardName>)
            .collect::<Result<Vec<_>>>()?;

        Ok(HandSetup {
            specific_cards,
            fill_to: None,
        })
    }

    pub fn filled_to(mut self, size: usize) -> Self {
        self.fill_to = Some(size);
        self
    }
}

/// Rebuild the hands of the sides that have a setup
///
/// Those hands go back to the bottom of the deck first; the named cards are
/// then pulled from the deck, falling back to the discard pile. A hand
/// without a setup is left alone, so its cards are not available.
pub fn setup_opening_hands(
    game: &mut GameState,
    human: Option<&HandSetup>,
    opponent: Option<&HandSetup>,
) -> Result<()> {
    let setups: Vec<(Side, &HandSetup)> = [(Side::Human, human), (Side::Opponent, opponent)]
        .into_iter()
        .filter_map(|(side, setup)| setup.map(|s| (side, s)))
        .collect();

    for (side, _) in &setups {
        let returned = game.player_mut(*side).hand.take_all();
        for card_id in returned {
            game.deck.add(card_id);
        }
    }

    for (side, setup) in &setups {
        for &name in &setup.specific_cards {
            let card_id = take_named(game, name).ok_or_else(|| {
                DuelError::InvalidAction(format!("no {name} left to put in the {side} hand"))
            })?;
            game.player_mut(*side).hand.add(card_id);
        }
    }

    for (side, setup) in &setups {
        if let Some(size) = setup.fill_to {
            let missing = size.saturating_sub(game.player(*side).hand.len());
            game.draw_cards(*side, missing);
        }
    }

    Ok(())
}

/// Replace one side's hand, keeping the other
pub fn setup_hand(game: &mut GameState, side: Side, setup: &HandSetup) -> Result<()> {
    match side {
        Side::Human => setup_opening_hands(game, Some(setup), None),
        Side::Opponent => setup_opening_hands(game, None, Some(setup)),
    }
}

fn take_named(game: &mut GameState, name: CardName) -> Option<crate::core::CardId> {
    let in_deck = game
        .deck
        .iter()
        .copied()
        .find(|&id| game.card_name(id) == Some(name));
    if let Some(card_id) = in_deck {
        game.deck.remove(card_id);
        return Some(card_id);
    }

    let in_discard = game
        .discard
        .iter()
        .copied()
        .find(|&id| game.card_name(id) == Some(name))?;
    game.discard.remove(in_discard);
    Some(in_discard)
}
