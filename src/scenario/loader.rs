//! Build a game state from a scenario
//!
//! Cards with an explicit `Id` keep it; the rest are numbered after them.
//! When the file gives no deck, the deck is the standard catalog minus one
//! copy of every card the file already placed, shuffled with the seed.

use crate::core::{catalog_face, standard_deck, Card, CardId, CardName, CharacterId, Side};
use crate::game::{GameState, LogKind, PendingInteraction, Phase, RulesConfig};
use crate::scenario::card_notation::CardSpec;
use crate::scenario::format::{Scenario, SeatDefinition};
use crate::zones::CardZone;
use crate::{DuelError, Result};
use rustc_hash::FxHashMap;

/// Seed used when the scenario does not name one, so loading is repeatable
const DEFAULT_SCENARIO_SEED: u64 = 0;

/// Build a validated game state with the default rules
pub fn load_scenario(scenario: &Scenario) -> Result<GameState> {
    load_scenario_with_rules(scenario, RulesConfig::default())
}

/// Build a validated game state under `rules`
pub fn load_scenario_with_rules(scenario: &Scenario, rules: RulesConfig) -> Result<GameState> {
    let def = &scenario.state;
    let hero = def.human.character.unwrap_or(CharacterId::LiuBei);
    let foe = def.opponent.character.unwrap_or(CharacterId::CaoCao);
    let seed = def.seed.unwrap_or(DEFAULT_SCENARIO_SEED);
    let mut game = GameState::from_cards(Vec::new(), hero, foe, seed, rules);

    // Reserve explicit ids first so numbered cards never collide with them
    let placed = def
        .human
        .hand
        .iter()
        .chain(&def.opponent.hand)
        .chain(def.deck.iter().flatten())
        .chain(&def.discard);
    for spec in placed {
        if let Some(id) = spec.id {
            let id = CardId::new(id);
            if id.as_u32() == 0 || game.cards.contains(id) {
                return Err(DuelError::ParseError(format!(
                    "Card id {id} is zero or used twice"
                )));
            }
            game.cards.insert(make_card(id, spec));
        }
    }

    game.human.hand = place(&mut game, &def.human.hand);
    game.opponent.hand = place(&mut game, &def.opponent.hand);
    game.discard = place(&mut game, &def.discard);
    game.deck = match &def.deck {
        Some(deck) => place(&mut game, deck),
        None => {
            let placed_specs: Vec<CardSpec> = def
                .human
                .hand
                .iter()
                .chain(&def.opponent.hand)
                .chain(&def.discard)
                .copied()
                .collect();
            let mut deck = rest_of_catalog(&mut game, &placed_specs);
            deck.shuffle(&mut game.rng);
            deck
        }
    };

    apply_seat(&mut game, Side::Human, &def.human)?;
    apply_seat(&mut game, Side::Opponent, &def.opponent)?;

    game.phase = def.phase;
    game.turn = def.turn;
    game.pending = def.pending.map(|spec| {
        PendingInteraction::new(Side::Opponent, spec.name).with_damage(rules.attack_damage)
    });

    match (game.phase, game.pending) {
        (Phase::ResolvingInteraction, None) => {
            return Err(DuelError::InvalidConfig(
                "RESOLVING_INTERACTION needs a pending attack".to_string(),
            ))
        }
        (Phase::ResolvingInteraction, Some(pending)) if !pending.card.is_offensive() => {
            return Err(DuelError::InvalidConfig(format!(
                "{} cannot be a pending attack",
                pending.card
            )))
        }
        (Phase::ResolvingInteraction, Some(_)) => {}
        (_, Some(_)) => {
            return Err(DuelError::InvalidConfig(
                "A pending attack is only allowed in RESOLVING_INTERACTION".to_string(),
            ))
        }
        (_, None) => {}
    }

    let title = if scenario.metadata.name.is_empty() {
        "unnamed"
    } else {
        scenario.metadata.name.as_str()
    };
    game.narrate(LogKind::System, format!("Scenario loaded: {title}"));

    game.validate()?;
    Ok(game)
}

fn make_card(id: CardId, spec: &CardSpec) -> Card {
    let (suit, rank) = catalog_face(spec.name);
    Card::new(id, spec.name, spec.suit.unwrap_or(suit), spec.rank.unwrap_or(rank))
}

/// Put the cards of `specs` into a new zone, creating the unnumbered ones
fn place(game: &mut GameState, specs: &[CardSpec]) -> CardZone {
    let mut zone = CardZone::new();
    for spec in specs {
        let id = match spec.id {
            Some(id) => CardId::new(id),
            None => {
                let id = game.cards.next_id();
                game.cards.insert(make_card(id, spec));
                id
            }
        };
        zone.add(id);
    }
    zone
}

/// Standard catalog cards not already accounted for by `placed`
fn rest_of_catalog(game: &mut GameState, placed: &[CardSpec]) -> CardZone {
    let mut owed: FxHashMap<CardName, usize> = FxHashMap::default();
    for spec in placed {
        *owed.entry(spec.name).or_default() += 1;
    }

    let mut zone = CardZone::new();
    for card in standard_deck() {
        if let Some(count) = owed.get_mut(&card.name).filter(|count| **count > 0) {
            *count -= 1;
            continue;
        }
        let id = game.cards.next_id();
        game.cards.insert(Card::new(id, card.name, card.suit, card.rank));
        zone.add(id);
    }
    zone
}

fn apply_seat(game: &mut GameState, side: Side, seat: &SeatDefinition) -> Result<()> {
    let player = game.player_mut(side);
    if let Some(hp) = seat.hp {
        if hp == 0 || hp > player.max_hp() {
            return Err(DuelError::InvalidConfig(format!(
                "{side} hp {hp} is outside 1..={}",
                player.max_hp()
            )));
        }
        player.set_hp(hp as i32);
    }
    if seat.slashes > player.max_slashes_per_turn {
        return Err(DuelError::InvalidConfig(format!(
            "{side} cannot have played {} Slashes this turn",
            seat.slashes
        )));
    }
    player.slashes_played_this_turn = seat.slashes;
    Ok(())
}
