//! Game loop implementation
//!
//! Drives the automatic phases (draws, the opponent's turn, forced discards)
//! and exposes the human entry points. The effects of cards live in
//! `resolution`, attacks in `interaction` and the opponent's turn in
//! `driver`; all of them are `impl GameLoop` blocks working through the same
//! store.

use crate::core::{CardId, CardName, Side};
use crate::game::actions::Action;
use crate::game::config::{pause, GameConfig};
use crate::game::controller::{Decision, DecisionOracle, DecisionRequest};
use crate::game::driver::consult;
use crate::game::logger::{GameLogger, LogKind};
use crate::game::phase::Phase;
use crate::game::state::{GameState, InteractionOutcome};
use crate::game::store::Store;
use crate::Result;
use smallvec::SmallVec;
use std::sync::Arc;

/// What one automatic step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A phase ran; call `step` again
    Advanced,
    /// The game is blocked on human input
    AwaitingHuman,
    Finished,
}

/// Result of a human entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Legal moment, illegal card (wrong response, Slash limit)
    Rejected,
    /// Wrong phase or a card that is not in hand; nothing changed
    Ignored,
}

/// Result of running a game to completion
#[derive(Debug, Clone)]
pub struct GameResult {
    /// Winner of the game (None if the turn limit stopped it)
    pub winner: Option<Side>,
    /// Total number of turns played
    pub turns_played: u32,
    /// Reason the game ended
    pub end_reason: GameEndReason,
}

/// Reason the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEndReason {
    /// This side was reduced to 0 hp
    PlayerDeath(Side),
    /// Game reached maximum turn limit
    TurnLimit,
    /// Both sides fell together (only reachable from a crafted scenario)
    Draw,
    /// The autopilot had no action to take
    Aborted,
}

/// Game loop manager
pub struct GameLoop {
    pub(crate) store: Arc<Store>,
    pub(crate) config: GameConfig,
    pub(crate) oracle: Box<dyn DecisionOracle>,
    pub(crate) logger: Arc<GameLogger>,
    /// Maximum turns before `run_to_completion` gives up
    max_turns: u32,
}

impl GameLoop {
    /// Start a fresh game described by `config`
    pub fn new(
        config: GameConfig,
        oracle: Box<dyn DecisionOracle>,
        logger: Arc<GameLogger>,
    ) -> Result<Self> {
        config.validate()?;
        let state = GameState::new_game(
            config.hero,
            config.foe,
            config.resolve_seed(),
            config.rules,
        );
        Ok(GameLoop::from_state(state, config, oracle, logger))
    }

    /// Continue from an existing state (scenario files, tests)
    pub fn from_state(
        state: GameState,
        config: GameConfig,
        oracle: Box<dyn DecisionOracle>,
        logger: Arc<GameLogger>,
    ) -> Self {
        let store = Arc::new(Store::new(state, logger));
        GameLoop::with_store(store, config, oracle)
    }

    /// Run on a store someone else also holds
    pub fn with_store(
        store: Arc<Store>,
        config: GameConfig,
        oracle: Box<dyn DecisionOracle>,
    ) -> Self {
        let logger = Arc::clone(store.logger());
        GameLoop {
            store,
            config,
            oracle,
            logger,
            max_turns: 200,
        }
    }

    /// Set maximum turns before forcing the game to stop
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<GameState> {
        self.store.snapshot()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn logger(&self) -> &Arc<GameLogger> {
        &self.logger
    }

    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    pub(crate) fn say(&self, kind: LogKind, message: impl Into<String>) {
        self.store.dispatch(Action::log(kind, message));
    }

    /// Perform one automatic phase
    pub async fn step(&mut self) -> StepOutcome {
        let state = self.store.snapshot();
        log_if_verbose!(self, "step in {}", state.phase);
        let rules = state.rules;

        match state.phase {
            Phase::Setup => {
                self.store.dispatch(Action::NextPhase(Phase::PlayerDraw));
                StepOutcome::Advanced
            }
            Phase::PlayerDraw => {
                self.say(LogKind::System, "--- Your Turn ---");
                self.store.dispatch_all([
                    Action::StartTurn { side: Side::Human },
                    Action::DrawCards {
                        side: Side::Human,
                        count: rules.draw_per_turn,
                    },
                    Action::NextPhase(Phase::PlayerPlay),
                ]);
                StepOutcome::Advanced
            }
            Phase::PlayerPlay | Phase::PlayerDiscard | Phase::ResolvingInteraction => {
                StepOutcome::AwaitingHuman
            }
            Phase::OpponentThinking => {
                self.say(LogKind::System, "--- Opponent Turn ---");
                pause(self.config.pacing.opponent_thinking()).await;
                self.store.dispatch_all([
                    Action::StartTurn {
                        side: Side::Opponent,
                    },
                    Action::DrawCards {
                        side: Side::Opponent,
                        count: rules.draw_per_turn,
                    },
                    Action::NextPhase(Phase::OpponentPlay),
                ]);
                StepOutcome::Advanced
            }
            Phase::OpponentPlay => {
                let exit = self.run_opponent_turn().await;
                log_if_verbose!(self, "opponent driver exited: {:?}", exit);
                StepOutcome::Advanced
            }
            Phase::OpponentDiscard => {
                self.opponent_discard();
                StepOutcome::Advanced
            }
            Phase::GameOver => StepOutcome::Finished,
        }
    }

    /// Step until the human has to act or the game is over
    pub async fn run_until_human(&mut self) -> StepOutcome {
        loop {
            match self.step().await {
                StepOutcome::Advanced => continue,
                other => return other,
            }
        }
    }

    /// Discard down to hp, first cards first
    fn opponent_discard(&mut self) {
        let state = self.store.snapshot();
        let excess = state.opponent.excess_cards();
        let doomed: SmallVec<[CardId; 4]> =
            state.opponent.hand.iter().take(excess).copied().collect();

        for card_id in doomed {
            let name = state.card_name(card_id).map(|n| n.as_str()).unwrap_or("a card");
            self.store.dispatch(Action::DiscardCard {
                side: Side::Opponent,
                card_id,
            });
            self.say(LogKind::Info, format!("Opponent discarded {name}."));
        }
        self.store.dispatch(Action::NextPhase(Phase::PlayerDraw));
    }

    /// The human plays a card from hand
    ///
    /// In PLAYER_PLAY this is a normal play; in RESOLVING_INTERACTION it
    /// must be the card that answers the pending attack.
    pub async fn play_card(&mut self, card_id: CardId) -> Outcome {
        let state = self.store.snapshot();
        let name = match self.human_card(&state, card_id) {
            Some(name) => name,
            None => return Outcome::Ignored,
        };

        match state.phase {
            Phase::PlayerPlay => {
                if name == CardName::Slash && !state.human.can_play_slash() {
                    let limit = state.human.max_slashes_per_turn;
                    let message = if limit == 1 {
                        "You can only play one Slash per turn.".to_string()
                    } else {
                        format!("You can only play {limit} Slashes per turn.")
                    };
                    self.say(LogKind::Danger, message);
                    return Outcome::Rejected;
                }

                self.store.dispatch(Action::PlayCard {
                    side: Side::Human,
                    card_id,
                });
                self.say(LogKind::Info, format!("You played {name}"));
                if let Some(attack) = self.resolve_effect(Side::Human, name).await {
                    log_if_verbose!(self, "{name} attack ended: {attack:?}");
                }
                Outcome::Applied
            }
            Phase::ResolvingInteraction => {
                let pending = match state.pending {
                    Some(pending) if pending.responder() == Side::Human => pending,
                    _ => {
                        self.say(LogKind::Info, "There is no attack to answer.");
                        return Outcome::Ignored;
                    }
                };
                let required = pending.required();
                if name != required {
                    self.say(
                        LogKind::Danger,
                        format!("Invalid card! You need to play {required}."),
                    );
                    return Outcome::Rejected;
                }

                self.store.dispatch(Action::PlayCard {
                    side: Side::Human,
                    card_id,
                });
                self.say(LogKind::Success, format!("You played {name}!"));
                self.store.dispatch_all([
                    Action::ResolveInteraction {
                        outcome: InteractionOutcome::Countered,
                    },
                    Action::NextPhase(Phase::OpponentPlay),
                ]);
                Outcome::Applied
            }
            Phase::PlayerDiscard => {
                self.say(LogKind::Info, "Discard phase: discard down to your hand limit.");
                Outcome::Ignored
            }
            other => {
                self.say(LogKind::Info, format!("You can't play cards during {other}."));
                Outcome::Ignored
            }
        }
    }

    /// The human discards a card during their discard phase
    pub fn discard_card(&mut self, card_id: CardId) -> Outcome {
        let state = self.store.snapshot();
        if state.phase != Phase::PlayerDiscard {
            self.say(LogKind::Info, format!("You can't discard during {}.", state.phase));
            return Outcome::Ignored;
        }
        let name = match self.human_card(&state, card_id) {
            Some(name) => name,
            None => return Outcome::Ignored,
        };

        self.say(LogKind::Info, format!("Discarded {name}"));
        self.store.dispatch(Action::DiscardCard {
            side: Side::Human,
            card_id,
        });
        Outcome::Applied
    }

    /// The human declines to answer an attack and takes the damage
    pub fn take_damage_instead(&mut self) -> Outcome {
        let state = self.store.snapshot();
        let pending = match state.pending {
            Some(pending)
                if state.phase == Phase::ResolvingInteraction
                    && pending.responder() == Side::Human =>
            {
                pending
            }
            _ => {
                self.say(LogKind::Info, "There is no attack to take.");
                return Outcome::Ignored;
            }
        };

        self.say(LogKind::Danger, "You took damage!");
        // A lethal hit wins over the NextPhase below
        self.store.dispatch_all([
            Action::TakeDamage {
                side: Side::Human,
                amount: pending.damage_or(state.rules.attack_damage),
            },
            Action::ResolveInteraction {
                outcome: InteractionOutcome::Failed,
            },
            Action::NextPhase(Phase::OpponentPlay),
        ]);
        Outcome::Applied
    }

    /// The human is done playing cards
    pub fn end_play_phase(&mut self) -> Outcome {
        let state = self.store.snapshot();
        if state.phase != Phase::PlayerPlay {
            self.say(
                LogKind::Info,
                format!("There is no play phase to end during {}.", state.phase),
            );
            return Outcome::Ignored;
        }

        let excess = state.human.excess_cards();
        if excess > 0 {
            self.say(
                LogKind::Info,
                format!("Hand limit is {}: discard {excess} card(s).", state.human.hp),
            );
        }
        self.store.dispatch(Action::NextPhase(Phase::PlayerDiscard));
        Outcome::Applied
    }

    /// Throw the current game away and deal a new one
    pub fn restart(&mut self) -> Outcome {
        self.store.dispatch(Action::InitGame {
            hero: self.config.hero,
            foe: self.config.foe,
            seed: self.config.resolve_seed(),
            rules: self.config.rules,
        });
        Outcome::Applied
    }

    /// Name of a card in the human's hand, narrating why not otherwise
    fn human_card(&self, state: &GameState, card_id: CardId) -> Option<CardName> {
        let name = state
            .human
            .hand
            .contains(card_id)
            .then(|| state.card_name(card_id))
            .flatten();
        if name.is_none() {
            self.say(LogKind::Info, format!("Card {card_id} is not in your hand."));
        }
        name
    }

    /// Take one human action chosen by `pilot`
    ///
    /// Used by simulations: the human seat is driven by any oracle, with the
    /// same validation as a person at the console.
    pub async fn autoplay_human(&mut self, pilot: &mut dyn DecisionOracle) -> Outcome {
        let state = self.store.snapshot();
        let timeout = self.config.oracle_timeout();

        match state.phase {
            Phase::PlayerPlay => {
                let request = DecisionRequest::for_turn(&state, Side::Human);
                if request.legal_card_ids.is_empty() {
                    return self.end_play_phase();
                }
                match consult(pilot, &request, timeout, &self.logger).await {
                    Decision::Play { card_id, .. } => match self.play_card(card_id).await {
                        Outcome::Applied => Outcome::Applied,
                        _ => self.end_play_phase(),
                    },
                    _ => self.end_play_phase(),
                }
            }
            Phase::PlayerDiscard => match state.human.hand.iter().next() {
                Some(&card_id) => self.discard_card(card_id),
                None => Outcome::Ignored,
            },
            Phase::ResolvingInteraction => {
                let Some(pending) = state.pending else {
                    return Outcome::Ignored;
                };
                let request = DecisionRequest::for_response(&state, Side::Human, pending.card);
                let chosen = match consult(pilot, &request, timeout, &self.logger).await {
                    Decision::Respond {
                        card_id: Some(card_id),
                        ..
                    } if request.is_legal(card_id) => Some(card_id),
                    _ => request.legal_card_ids.first().copied(),
                };
                match chosen {
                    Some(card_id) => self.play_card(card_id).await,
                    None => self.take_damage_instead(),
                }
            }
            _ => Outcome::Ignored,
        }
    }

    /// Play the whole game with `pilot` in the human seat
    pub async fn run_to_completion(&mut self, pilot: &mut dyn DecisionOracle) -> GameResult {
        loop {
            if self.store.snapshot().turn > self.max_turns {
                break;
            }
            match self.step().await {
                StepOutcome::Advanced => {}
                StepOutcome::AwaitingHuman => {
                    if self.autoplay_human(pilot).await == Outcome::Ignored {
                        self.logger.warn("autopilot could not act; stopping the game");
                        break;
                    }
                }
                StepOutcome::Finished => break,
            }
        }
        self.result()
    }

    /// Summarise the current state as a game result
    pub fn result(&self) -> GameResult {
        let state = self.store.snapshot();
        let end_reason = match (state.is_game_over(), state.winner) {
            (true, Some(winner)) => GameEndReason::PlayerDeath(winner.other()),
            (true, None) => GameEndReason::Draw,
            (false, _) if state.turn > self.max_turns => GameEndReason::TurnLimit,
            (false, _) => GameEndReason::Aborted,
        };
        GameResult {
            winner: state.winner,
            turns_played: state.turn,
            end_reason,
        }
    }
}
