//! Main game state structure

use crate::core::{standard_deck, Card, CardId, CardName, CardStore, CharacterId, Player, Side};
use crate::game::config::RulesConfig;
use crate::game::logger::{EventLog, LogKind};
use crate::game::phase::Phase;
use crate::zones::{CardZone, Zone};
use crate::{DuelError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

/// An attack waiting for its response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInteraction {
    /// The attacking side
    pub source: Side,
    /// The card that opened the interaction
    pub card: CardName,
    /// Damage the responder takes on failure, fixed when the attack opens
    pub damage: Option<u8>,
}

impl PendingInteraction {
    pub fn new(source: Side, card: CardName) -> Self {
        PendingInteraction {
            source,
            card,
            damage: None,
        }
    }

    pub fn with_damage(mut self, amount: u8) -> Self {
        self.damage = Some(amount);
        self
    }

    /// Damage on failure, `default` when the attack carries none
    pub fn damage_or(&self, default: u8) -> u8 {
        self.damage.unwrap_or(default)
    }

    pub fn responder(&self) -> Side {
        self.source.other()
    }

    /// The card the responder must play to counter
    pub fn required(&self) -> CardName {
        self.card.required_response().unwrap_or(CardName::Dodge)
    }
}

/// How the last interaction ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionOutcome {
    /// The responder produced the required card
    Countered,
    /// The responder took the hit
    Failed,
}

/// Complete game state
///
/// The single aggregate every component reads. It is only ever replaced
/// whole by `reduce`, never edited in place by callers. Cloning is cheap
/// enough to do once per action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Every card of this game, keyed by id
    pub cards: CardStore,

    pub human: Player,
    pub opponent: Player,

    /// Front is the next card drawn
    pub deck: CardZone,

    /// Append-only until a reshuffle
    pub discard: CardZone,

    pub phase: Phase,

    /// Incremented at the start of each human turn
    pub turn: u32,

    pub log: EventLog,

    /// At most one unresolved attack
    pub pending: Option<PendingInteraction>,

    pub last_outcome: Option<InteractionOutcome>,

    pub winner: Option<Side>,

    pub rules: RulesConfig,

    /// Game RNG (shuffles, random discard targets). Serialised with the state
    /// so a snapshot replays identically.
    pub rng: ChaCha12Rng,
}

impl GameState {
    /// A state holding `cards` in the deck in the given order, nothing dealt
    pub fn from_cards(
        cards: Vec<Card>,
        hero: CharacterId,
        foe: CharacterId,
        seed: u64,
        rules: RulesConfig,
    ) -> Self {
        let mut store = CardStore::new();
        let mut deck = CardZone::new();
        for card in cards {
            deck.add(card.id);
            store.insert(card);
        }

        let mut human = Player::new(Side::Human, hero);
        let mut opponent = Player::new(Side::Opponent, foe);
        human.max_slashes_per_turn = rules.max_slashes_per_turn;
        opponent.max_slashes_per_turn = rules.max_slashes_per_turn;

        GameState {
            cards: store,
            human,
            opponent,
            deck,
            discard: CardZone::new(),
            phase: Phase::Setup,
            turn: 0,
            log: EventLog::new(),
            pending: None,
            last_outcome: None,
            winner: None,
            rules,
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }

    /// Fresh game: build the catalog, shuffle, deal the starting hands
    ///
    /// The human is dealt first, then the opponent.
    pub fn new_game(hero: CharacterId, foe: CharacterId, seed: u64, rules: RulesConfig) -> Self {
        let mut state = GameState::from_cards(standard_deck(), hero, foe, seed, rules);
        state.deck.shuffle(&mut state.rng);

        let hand_size = rules.starting_hand as usize;
        for card_id in state.deck.take_front(hand_size) {
            state.human.hand.add(card_id);
        }
        for card_id in state.deck.take_front(hand_size) {
            state.opponent.hand.add(card_id);
        }

        state.phase = Phase::PlayerDraw;
        state.narrate(LogKind::System, "Game Start! You vs Opponent.");
        state
    }

    pub fn player(&self, side: Side) -> &Player {
        match side {
            Side::Human => &self.human,
            Side::Opponent => &self.opponent,
        }
    }

    pub fn player_mut(&mut self, side: Side) -> &mut Player {
        match side {
            Side::Human => &mut self.human,
            Side::Opponent => &mut self.opponent,
        }
    }

    pub fn card(&self, card_id: CardId) -> Result<&Card> {
        self.cards.get(card_id)
    }

    pub fn card_name(&self, card_id: CardId) -> Option<CardName> {
        self.cards.get(card_id).ok().map(|card| card.name)
    }

    /// The cards in a hand, in hand order
    pub fn hand_cards(&self, side: Side) -> Vec<&Card> {
        self.player(side)
            .hand
            .iter()
            .filter_map(|&id| self.cards.get(id).ok())
            .collect()
    }

    /// First card of the given name in a hand
    pub fn find_in_hand(&self, side: Side, name: CardName) -> Option<CardId> {
        self.player(side)
            .hand
            .iter()
            .copied()
            .find(|&id| self.card_name(id) == Some(name))
    }

    /// Whether `card_id` is in `side`'s hand and is a `name`
    pub fn hand_holds(&self, side: Side, card_id: CardId, name: CardName) -> bool {
        self.player(side).hand.contains(card_id) && self.card_name(card_id) == Some(name)
    }

    /// Cards `side` may play right now: the hand minus Slash once the
    /// per-turn limit is spent
    pub fn legal_card_ids(&self, side: Side) -> Vec<CardId> {
        let player = self.player(side);
        player
            .hand
            .iter()
            .copied()
            .filter(|&id| player.can_play_slash() || self.card_name(id) != Some(CardName::Slash))
            .collect()
    }

    pub fn location(&self, card_id: CardId) -> Option<Zone> {
        if self.deck.contains(card_id) {
            return Some(Zone::Deck);
        }
        if self.discard.contains(card_id) {
            return Some(Zone::Discard);
        }
        for side in [Side::Human, Side::Opponent] {
            let player = self.player(side);
            if player.hand.contains(card_id) {
                return Some(Zone::Hand(side));
            }
            if player.equipment.cards().any(|id| id == card_id) {
                return Some(Zone::Equipment(side));
            }
        }
        None
    }

    /// Cards in deck, discard, both hands and both equipment areas
    pub fn cards_in_play(&self) -> usize {
        self.deck.len()
            + self.discard.len()
            + [&self.human, &self.opponent]
                .iter()
                .map(|p| p.hand.len() + p.equipment.cards().count())
                .sum::<usize>()
    }

    /// Append a narrated entry stamped with the current turn
    pub fn narrate(&mut self, kind: LogKind, text: impl Into<String>) {
        let turn = self.turn;
        self.log.push(turn, kind, text);
    }

    /// Draw up to `count` cards into `side`'s hand
    ///
    /// An empty deck is refilled from the whole discard pile, shuffled. When
    /// both are empty the draw stops early. Returns the number drawn.
    pub fn draw_cards(&mut self, side: Side, count: usize) -> usize {
        let mut drawn = 0;
        while drawn < count {
            if self.deck.is_empty() {
                if self.discard.is_empty() {
                    break;
                }
                self.deck = CardZone::from_cards(self.discard.take_all());
                self.deck.shuffle(&mut self.rng);
                self.narrate(
                    LogKind::System,
                    "Deck empty. Shuffled the discard pile into the deck.",
                );
            }
            match self.deck.draw_front() {
                Some(card_id) => {
                    self.player_mut(side).hand.add(card_id);
                    drawn += 1;
                }
                None => break,
            }
        }
        drawn
    }

    /// Move a card from `side`'s hand to the discard pile
    ///
    /// Returns false (and changes nothing) if the card is not in that hand.
    pub fn discard_from_hand(&mut self, side: Side, card_id: CardId) -> bool {
        if self.player_mut(side).hand.remove(card_id) {
            self.discard.add(card_id);
            true
        } else {
            false
        }
    }

    /// Pick a uniformly random card from `side`'s hand
    pub fn random_hand_card(&mut self, side: Side) -> Option<CardId> {
        use rand::Rng;
        let len = self.player(side).hand.len();
        if len == 0 {
            return None;
        }
        let idx = self.rng.gen_range(0..len);
        self.player(side).hand.cards.get(idx).copied()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Check the structural invariants
    ///
    /// Every card id is in exactly one place, every placed id is a known
    /// card and hp is within bounds.
    pub fn validate(&self) -> Result<()> {
        let mut seen: Vec<CardId> = Vec::with_capacity(self.cards.len());
        seen.extend(self.deck.iter().copied());
        seen.extend(self.discard.iter().copied());
        for player in [&self.human, &self.opponent] {
            seen.extend(player.hand.iter().copied());
            seen.extend(player.equipment.cards());

            if player.hp > player.max_hp() {
                return Err(DuelError::Integrity(format!(
                    "{} has {} hp, above the maximum of {}",
                    player.side,
                    player.hp,
                    player.max_hp()
                )));
            }
            if player.alive != (player.hp > 0) {
                return Err(DuelError::Integrity(format!(
                    "{} alive flag disagrees with hp {}",
                    player.side, player.hp
                )));
            }
        }

        seen.sort();
        if let Some(pair) = seen.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(DuelError::Integrity(format!(
                "card {} is in more than one place",
                pair[0]
            )));
        }
        if let Some(unknown) = seen.iter().find(|id| !self.cards.contains(**id)) {
            return Err(DuelError::Integrity(format!("card {unknown} does not exist")));
        }
        if seen.len() != self.cards.len() {
            return Err(DuelError::Integrity(format!(
                "{} of {} cards are placed",
                seen.len(),
                self.cards.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::card::catalog_size;

    fn new_game(seed: u64) -> GameState {
        GameState::new_game(
            CharacterId::LiuBei,
            CharacterId::CaoCao,
            seed,
            RulesConfig::default(),
        )
    }

    #[test]
    fn test_game_creation() {
        let game = new_game(1);

        assert_eq!(game.human.hand.len(), 4);
        assert_eq!(game.opponent.hand.len(), 4);
        assert_eq!(game.deck.len(), catalog_size() - 8);
        assert!(game.discard.is_empty());
        assert_eq!(game.phase, Phase::PlayerDraw);
        assert_eq!(game.human.hp, 4);
        assert!(game.log.contains("Game Start!"));
        assert!(game.validate().is_ok());
    }

    #[test]
    fn test_same_seed_same_deal() {
        let a = new_game(42);
        let b = new_game(42);
        assert_eq!(a.human.hand, b.human.hand);
        assert_eq!(a.deck, b.deck);
    }

    #[test]
    fn test_draw_card() {
        let mut game = new_game(2);
        let top = game.deck.cards[0];

        assert_eq!(game.draw_cards(Side::Human, 2), 2);
        assert_eq!(game.human.hand.len(), 6);
        assert!(game.human.hand.contains(top));
        assert_eq!(game.location(top), Some(Zone::Hand(Side::Human)));
        assert_eq!(game.cards_in_play(), catalog_size());
    }

    #[test]
    fn test_draw_reshuffles_discard() {
        let mut game = new_game(3);
        let deck_cards = game.deck.take_all();
        let (last, rest) = deck_cards.split_last().unwrap();
        game.deck = CardZone::from_cards(vec![*last]);
        game.discard = CardZone::from_cards(rest.to_vec());

        assert_eq!(game.draw_cards(Side::Opponent, 3), 3);
        assert_eq!(game.opponent.hand.len(), 7);
        assert_eq!(game.deck.len(), rest.len() - 2);
        assert!(game.discard.is_empty());
        assert!(game.log.contains("Shuffled the discard pile"));
        assert!(game.validate().is_ok());
    }

    #[test]
    fn test_draw_stops_when_everything_is_empty() {
        let mut game = new_game(4);
        let deck_cards = game.deck.take_all();
        game.deck = CardZone::from_cards(deck_cards[..1].to_vec());
        for id in &deck_cards[1..] {
            game.human.hand.add(*id);
        }

        assert_eq!(game.draw_cards(Side::Opponent, 2), 1);
        assert!(game.deck.is_empty());
        assert!(game.validate().is_ok());
    }

    #[test]
    fn test_discard_from_hand() {
        let mut game = new_game(5);
        let card = game.human.hand.cards[0];

        assert!(!game.discard_from_hand(Side::Opponent, card));
        assert!(game.discard_from_hand(Side::Human, card));
        assert_eq!(game.location(card), Some(Zone::Discard));
        assert!(!game.discard_from_hand(Side::Human, card));
    }

    #[test]
    fn test_legal_ids_drop_slash_after_limit() {
        let mut game = new_game(6);
        let slash = game
            .deck
            .iter()
            .chain(game.discard.iter())
            .chain(game.human.hand.iter())
            .copied()
            .find(|&id| game.card_name(id) == Some(CardName::Slash))
            .unwrap();
        game.deck.remove(slash);
        game.discard.remove(slash);
        game.human.hand.remove(slash);
        game.opponent.hand.add(slash);

        assert!(game.legal_card_ids(Side::Opponent).contains(&slash));
        game.opponent.play_slash();
        assert!(!game.legal_card_ids(Side::Opponent).contains(&slash));
    }

    #[test]
    fn test_validate_detects_duplicates() {
        let mut game = new_game(7);
        let card = game.human.hand.cards[0];
        game.discard.add(card);
        assert!(matches!(game.validate(), Err(DuelError::Integrity(_))));
    }

    #[test]
    fn test_validate_detects_lost_cards() {
        let mut game = new_game(8);
        game.deck.draw_front();
        assert!(game.validate().is_err());
    }

    #[test]
    fn test_pending_interaction() {
        let duel = PendingInteraction::new(Side::Opponent, CardName::Duel);
        assert_eq!(duel.responder(), Side::Human);
        assert_eq!(duel.required(), CardName::Slash);
        assert_eq!(
            PendingInteraction::new(Side::Human, CardName::Slash).required(),
            CardName::Dodge
        );
    }

    #[test]
    fn test_state_serde_round_trip_keeps_rng() {
        use rand::Rng;
        let mut game = new_game(9);
        let json = serde_json::to_string(&game).unwrap();
        let mut back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(game.rng.gen::<u64>(), back.rng.gen::<u64>());
        assert_eq!(back.human, game.human);
    }
}
