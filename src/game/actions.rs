//! Game actions and the state transition function
//!
//! Every mutation of a game goes through `reduce`. It never edits the input
//! state: it clones it, applies one action and then settles the two rules
//! that must hold after *any* action:
//!
//! 1. a player at 0 hp ends the game immediately, whatever phase change was
//!    requested alongside;
//! 2. the human's discard phase ends the instant their hand fits their hp.

use crate::core::{CardId, CardName, CharacterId, Side};
use crate::game::config::RulesConfig;
use crate::game::logger::LogKind;
use crate::game::phase::Phase;
use crate::game::state::{GameState, InteractionOutcome, PendingInteraction};
use smallvec::SmallVec;

/// Types of game actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start a brand new game (full reset)
    InitGame {
        hero: CharacterId,
        foe: CharacterId,
        seed: u64,
        rules: RulesConfig,
    },

    /// Reset per-turn limits; a human turn also bumps the turn counter
    StartTurn { side: Side },

    /// Draw with reshuffle; may deliver fewer cards when everything is empty
    DrawCards { side: Side, count: u8 },

    /// Ignored once the game is over, unless the target is GAME_OVER
    NextPhase(Phase),

    /// Hand to discard pile. No-op if the card is not in that hand.
    PlayCard { side: Side, card_id: CardId },

    /// Hand to discard pile. No-op if the card is not in that hand.
    DiscardCard { side: Side, card_id: CardId },

    /// `actor` plays `card` to discard a random card from the other hand
    DiscardRandom { actor: Side, card: CardName },

    /// `actor` plays `card` to take a random card from the other hand
    StealRandom { actor: Side, card: CardName },

    TakeDamage { side: Side, amount: u8 },

    Heal { side: Side, amount: u8 },

    Log { kind: LogKind, message: String },

    /// Open an interaction. No-op while another one is pending.
    BeginInteraction { source: Side, card: CardName },

    /// Close the pending interaction. No-op if there is none.
    ResolveInteraction { outcome: InteractionOutcome },

    /// Count a Slash against `side`'s per-turn limit
    RecordSlash { side: Side },
}

impl Action {
    pub fn log(kind: LogKind, message: impl Into<String>) -> Self {
        Action::Log {
            kind,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Action::log(LogKind::Info, message)
    }

    /// Short name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Action::InitGame { .. } => "InitGame",
            Action::StartTurn { .. } => "StartTurn",
            Action::DrawCards { .. } => "DrawCards",
            Action::NextPhase(_) => "NextPhase",
            Action::PlayCard { .. } => "PlayCard",
            Action::DiscardCard { .. } => "DiscardCard",
            Action::DiscardRandom { .. } => "DiscardRandom",
            Action::StealRandom { .. } => "StealRandom",
            Action::TakeDamage { .. } => "TakeDamage",
            Action::Heal { .. } => "Heal",
            Action::Log { .. } => "Log",
            Action::BeginInteraction { .. } => "BeginInteraction",
            Action::ResolveInteraction { .. } => "ResolveInteraction",
            Action::RecordSlash { .. } => "RecordSlash",
        }
    }
}

/// Pure transition function: (state, action) -> new state
pub fn reduce(state: &GameState, action: Action) -> GameState {
    let mut next = state.clone();
    next.apply(action);
    next
}

/// Possessive used in narration ("your Dodge", "Opponent's Dodge")
fn possessive(side: Side) -> &'static str {
    match side {
        Side::Human => "your",
        Side::Opponent => "Opponent's",
    }
}

impl GameState {
    /// Apply one action in place, then settle
    ///
    /// Only `reduce` and the store call this; everything else sees whole
    /// replaced states.
    pub(crate) fn apply(&mut self, action: Action) {
        match action {
            Action::InitGame {
                hero,
                foe,
                seed,
                rules,
            } => {
                *self = GameState::new_game(hero, foe, seed, rules);
            }

            Action::StartTurn { side } => {
                if side == Side::Human {
                    self.turn += 1;
                }
                self.player_mut(side).reset_turn_limits();
            }

            Action::DrawCards { side, count } => {
                self.draw_cards(side, count as usize);
            }

            Action::NextPhase(target) => {
                if self.phase.accepts(target) {
                    self.phase = target;
                }
            }

            Action::PlayCard { side, card_id } | Action::DiscardCard { side, card_id } => {
                self.discard_from_hand(side, card_id);
            }

            Action::DiscardRandom { actor, card } => {
                let victim = actor.other();
                match self.random_hand_card(victim) {
                    Some(target) => {
                        self.discard_from_hand(victim, target);
                        let target_name =
                            self.card_name(target).map(|n| n.as_str()).unwrap_or("card");
                        self.narrate(
                            LogKind::Success,
                            format!(
                                "{} used {} on {} {}!",
                                actor.subject(),
                                card,
                                possessive(victim),
                                target_name
                            ),
                        );
                    }
                    None => self.narrate(
                        LogKind::Info,
                        format!("{card} finds nothing: the hand is empty."),
                    ),
                }
            }

            Action::StealRandom { actor, card } => {
                let victim = actor.other();
                match self.random_hand_card(victim) {
                    Some(target) => {
                        self.player_mut(victim).hand.remove(target);
                        self.player_mut(actor).hand.add(target);
                        let target_name =
                            self.card_name(target).map(|n| n.as_str()).unwrap_or("card");
                        self.narrate(
                            LogKind::Success,
                            format!(
                                "{} used {} and took {} {}!",
                                actor.subject(),
                                card,
                                possessive(victim),
                                target_name
                            ),
                        );
                    }
                    None => self.narrate(
                        LogKind::Info,
                        format!("{card} finds nothing: the hand is empty."),
                    ),
                }
            }

            Action::TakeDamage { side, amount } => {
                self.player_mut(side).take_damage(amount);
            }

            Action::Heal { side, amount } => {
                self.player_mut(side).heal(amount);
            }

            Action::Log { kind, message } => {
                self.narrate(kind, message);
            }

            Action::BeginInteraction { source, card } => {
                if self.pending.is_none() {
                    let damage = self.rules.attack_damage;
                    self.pending = Some(PendingInteraction::new(source, card).with_damage(damage));
                }
            }

            Action::ResolveInteraction { outcome } => {
                if self.pending.take().is_some() {
                    self.last_outcome = Some(outcome);
                }
            }

            Action::RecordSlash { side } => {
                self.player_mut(side).play_slash();
            }
        }

        self.settle();
    }

    /// Rules that are re-checked after every action
    fn settle(&mut self) {
        if !self.is_game_over() {
            let fallen: SmallVec<[Side; 2]> = [Side::Human, Side::Opponent]
                .into_iter()
                .filter(|&side| !self.player(side).alive)
                .collect();
            if !fallen.is_empty() {
                self.phase = Phase::GameOver;
                self.winner = match fallen.as_slice() {
                    [side] => Some(side.other()),
                    _ => None,
                };
                let verdict = match self.winner {
                    Some(Side::Human) => "Game Over! Opponent died.",
                    Some(Side::Opponent) => "Game Over! You died.",
                    None => "Game Over! Both sides fell.",
                };
                self.narrate(LogKind::Danger, verdict);
                return;
            }
        }

        if self.phase == Phase::PlayerDiscard && self.human.excess_cards() == 0 {
            self.narrate(LogKind::Info, "Turn End.");
            self.phase = Phase::OpponentThinking;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::card::catalog_size;
    use crate::game::hand_setup::{setup_opening_hands, HandSetup};

    fn new_game() -> GameState {
        let blank = GameState::new_game(
            CharacterId::LiuBei,
            CharacterId::CaoCao,
            0,
            RulesConfig::default(),
        );
        reduce(
            &blank,
            Action::InitGame {
                hero: CharacterId::LiuBei,
                foe: CharacterId::CaoCao,
                seed: 11,
                rules: RulesConfig::default(),
            },
        )
    }

    fn with_hands(human: &str, opponent: &str) -> GameState {
        let mut game = new_game();
        let human = HandSetup::parse(human).unwrap();
        let opponent = HandSetup::parse(opponent).unwrap();
        setup_opening_hands(&mut game, Some(&human), Some(&opponent)).unwrap();
        game
    }

    #[test]
    fn test_reduce_does_not_touch_input() {
        let game = new_game();
        let before_deck = game.deck.clone();
        let next = reduce(&game, Action::DrawCards { side: Side::Human, count: 2 });

        assert_eq!(game.deck, before_deck);
        assert_eq!(game.human.hand.len(), 4);
        assert_eq!(next.human.hand.len(), 6);
    }

    #[test]
    fn test_draw_conserves_cards() {
        let game = new_game();
        let next = reduce(&game, Action::DrawCards { side: Side::Opponent, count: 2 });

        assert_eq!(next.opponent.hand.len(), game.opponent.hand.len() + 2);
        assert_eq!(next.deck.len() + next.discard.len(), game.deck.len() + game.discard.len() - 2);
        assert_eq!(next.cards_in_play(), catalog_size());
    }

    #[test]
    fn test_play_card_moves_to_discard() {
        let game = new_game();
        let card = game.human.hand.cards[1];
        let next = reduce(&game, Action::PlayCard { side: Side::Human, card_id: card });

        assert!(!next.human.hand.contains(card));
        assert_eq!(next.discard.cards, vec![card]);
        assert!(next.validate().is_ok());
    }

    #[test]
    fn test_play_card_not_in_hand_is_noop() {
        let game = new_game();
        let theirs = game.opponent.hand.cards[0];
        let next = reduce(&game, Action::PlayCard { side: Side::Human, card_id: theirs });

        assert_eq!(next.human.hand, game.human.hand);
        assert_eq!(next.opponent.hand, game.opponent.hand);
        assert!(next.discard.is_empty());
    }

    #[test]
    fn test_hp_clamped_on_heal() {
        let game = new_game();
        let next = reduce(&game, Action::Heal { side: Side::Human, amount: 3 });
        assert_eq!(next.human.hp, next.human.max_hp());
    }

    #[test]
    fn test_lethal_damage_forces_game_over() {
        let mut game = new_game();
        game.phase = Phase::OpponentPlay;

        let next = reduce(&game, Action::TakeDamage { side: Side::Human, amount: 9 });
        assert_eq!(next.human.hp, 0);
        assert_eq!(next.phase, Phase::GameOver);
        assert_eq!(next.winner, Some(Side::Opponent));
        assert!(next.log.contains("Game Over!"));

        // Nothing moves the game out of GAME_OVER
        let after = reduce(&next, Action::NextPhase(Phase::OpponentDiscard));
        assert_eq!(after.phase, Phase::GameOver);
        let after = reduce(&after, Action::NextPhase(Phase::PlayerDraw));
        assert_eq!(after.phase, Phase::GameOver);
        let after = reduce(&after, Action::NextPhase(Phase::GameOver));
        assert_eq!(after.phase, Phase::GameOver);
    }

    #[test]
    fn test_game_over_logged_once() {
        let mut game = new_game();
        game.phase = Phase::PlayerPlay;
        let next = reduce(&game, Action::TakeDamage { side: Side::Opponent, amount: 4 });
        let next = reduce(&next, Action::TakeDamage { side: Side::Opponent, amount: 1 });

        let verdicts = next
            .log
            .entries()
            .iter()
            .filter(|e| e.text.starts_with("Game Over"))
            .count();
        assert_eq!(verdicts, 1);
        assert_eq!(next.winner, Some(Side::Human));
    }

    #[test]
    fn test_single_pending_interaction() {
        let game = new_game();
        let slash = Action::BeginInteraction {
            source: Side::Human,
            card: CardName::Slash,
        };
        let duel = Action::BeginInteraction {
            source: Side::Opponent,
            card: CardName::Duel,
        };
        let next = reduce(&reduce(&game, slash), duel);

        let pending = next.pending.unwrap();
        assert_eq!(pending.source, Side::Human);
        assert_eq!(pending.card, CardName::Slash);
        assert_eq!(pending.damage, Some(1));

        let failed = Action::ResolveInteraction {
            outcome: InteractionOutcome::Failed,
        };
        let next = reduce(&next, failed);
        assert!(next.pending.is_none());
        assert_eq!(next.last_outcome, Some(InteractionOutcome::Failed));

        // A second resolve has nothing to clear
        let countered = Action::ResolveInteraction {
            outcome: InteractionOutcome::Countered,
        };
        let again = reduce(&next, countered);
        assert_eq!(again.last_outcome, Some(InteractionOutcome::Failed));
    }

    #[test]
    fn test_pending_damage_follows_rules() {
        let mut game = new_game();
        game.rules.attack_damage = 2;
        let next = reduce(
            &game,
            Action::BeginInteraction {
                source: Side::Opponent,
                card: CardName::Duel,
            },
        );
        assert_eq!(next.pending.map(|p| p.damage_or(1)), Some(2));
    }

    #[test]
    fn test_discard_phase_auto_advances() {
        let mut game = with_hands("Slash;Slash;Dodge;Peach;Duel;Theft", "Dodge");
        game.human.set_hp(3);
        let game = reduce(&game, Action::NextPhase(Phase::PlayerDiscard));
        assert_eq!(game.phase, Phase::PlayerDiscard);

        let mut current = game;
        for discarded in 1..=3 {
            let card = current.human.hand.cards[0];
            current = reduce(&current, Action::DiscardCard { side: Side::Human, card_id: card });
            if discarded < 3 {
                assert_eq!(current.phase, Phase::PlayerDiscard);
            }
        }
        assert_eq!(current.human.hand.len(), 3);
        assert_eq!(current.phase, Phase::OpponentThinking);
        assert!(current.log.contains("Turn End."));
    }

    #[test]
    fn test_entering_discard_with_small_hand_skips_it() {
        let game = with_hands("Peach", "Dodge");
        let next = reduce(&game, Action::NextPhase(Phase::PlayerDiscard));
        assert_eq!(next.phase, Phase::OpponentThinking);
    }

    #[test]
    fn test_discard_random_narrates_target() {
        let game = with_hands("Sabotage", "Dodge");
        let sabotage = Action::DiscardRandom {
            actor: Side::Human,
            card: CardName::Sabotage,
        };
        let next = reduce(&game, sabotage);

        assert!(next.opponent.hand.is_empty());
        assert_eq!(next.discard.len(), 1);
        assert_eq!(next.log.last().unwrap().text, "You used Sabotage on Opponent's Dodge!");
    }

    #[test]
    fn test_steal_random_transfers() {
        let game = with_hands("Theft", "Peach");
        let peach = game.opponent.hand.cards[0];
        let next = reduce(&game, Action::StealRandom { actor: Side::Human, card: CardName::Theft });

        assert!(next.human.hand.contains(peach));
        assert!(next.opponent.hand.is_empty());
        assert!(next.validate().is_ok());
    }

    #[test]
    fn test_random_effects_on_empty_hand() {
        let game = with_hands("Theft", "");
        let theft = Action::DiscardRandom {
            actor: Side::Human,
            card: CardName::Theft,
        };
        let next = reduce(&game, theft);
        assert_eq!(next.human.hand, game.human.hand);
        assert!(next.log.contains("finds nothing"));
    }

    #[test]
    fn test_start_turn_resets_slash_limit() {
        let game = new_game();
        let next = reduce(&game, Action::RecordSlash { side: Side::Human });
        assert!(!next.human.can_play_slash());

        let next = reduce(&next, Action::StartTurn { side: Side::Human });
        assert!(next.human.can_play_slash());
        assert_eq!(next.turn, game.turn + 1);

        let next = reduce(&next, Action::StartTurn { side: Side::Opponent });
        assert_eq!(next.turn, game.turn + 1);
    }

    #[test]
    fn test_init_game_replaces_everything() {
        let mut game = new_game();
        game.phase = Phase::GameOver;
        game.winner = Some(Side::Opponent);

        let next = reduce(
            &game,
            Action::InitGame {
                hero: CharacterId::LuBu,
                foe: CharacterId::SunQuan,
                seed: 5,
                rules: RulesConfig::default(),
            },
        );
        assert_eq!(next.phase, Phase::PlayerDraw);
        assert_eq!(next.winner, None);
        assert_eq!(next.human.hp, 5);
        assert_eq!(next.log.len(), 1);
    }
}
