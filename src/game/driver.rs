//! Opponent turn driver
//!
//! Runs while the phase is OPPONENT_PLAY. Every iteration starts from a new
//! snapshot, because the previous iteration awaited the oracle, a response
//! delay or the pacing delay and the state may have moved on. The driver is
//! the only code that moves the game from OPPONENT_PLAY to OPPONENT_DISCARD,
//! and it only does so if nothing else moved it first.

use crate::core::Side;
use crate::game::actions::Action;
use crate::game::config::pause;
use crate::game::controller::{fallback, Decision, DecisionOracle, DecisionRequest};
use crate::game::game_loop::GameLoop;
use crate::game::interaction::AttackOutcome;
use crate::game::logger::{GameLogger, LogKind};
use crate::game::phase::Phase;
use crate::DuelError;
use std::time::Duration;

/// Why the driver stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    /// The oracle (or the fallback) ended the turn
    Ended,
    NoLegalCards,
    /// Something else moved the phase (an attack on the human, game over)
    PhaseChanged,
    /// Too many consecutive unusable decisions
    TooManyInvalid,
}

/// Ask `oracle`, falling back on failure or timeout
pub(crate) async fn consult(
    oracle: &mut dyn DecisionOracle,
    request: &DecisionRequest,
    timeout: Duration,
    logger: &GameLogger,
) -> Decision {
    let name = oracle.name().to_string();
    logger.oracle(
        &name,
        &format!(
            "request: {}",
            serde_json::to_string(request).unwrap_or_else(|e| e.to_string())
        ),
    );

    let answer = match tokio::time::timeout(timeout, oracle.decide(request)).await {
        Ok(answer) => answer,
        Err(_) => Err(DuelError::OracleTimeout(timeout)),
    };

    match answer {
        Ok(decision) => {
            logger.oracle(&name, &format!("decision: {decision:?}"));
            decision
        }
        Err(e) => {
            let decision = fallback(request);
            logger.warn(&format!("{name}: {e}; using fallback {decision:?}"));
            decision
        }
    }
}

impl GameLoop {
    /// Play the opponent's turn until it ends or the phase moves
    pub async fn run_opponent_turn(&mut self) -> DriverExit {
        let max_invalid = self.store.snapshot().rules.max_invalid_decisions.max(1);
        let mut invalid = 0u8;

        let exit = loop {
            let state = self.store.snapshot();
            if state.phase != Phase::OpponentPlay {
                return DriverExit::PhaseChanged;
            }

            let request = DecisionRequest::for_turn(&state, Side::Opponent);
            if request.legal_card_ids.is_empty() {
                break DriverExit::NoLegalCards;
            }

            self.say(LogKind::System, "Opponent is thinking...");
            let timeout = self.config.oracle_timeout();
            let decision = consult(self.oracle.as_mut(), &request, timeout, &self.logger).await;

            let (card_id, reasoning) = match decision {
                Decision::End { .. } => break DriverExit::Ended,
                Decision::Respond { .. } => {
                    self.logger
                        .warn("oracle answered RESPOND on a free turn; ending the turn");
                    break DriverExit::Ended;
                }
                Decision::Play { card_id, reasoning } => (card_id, reasoning),
            };

            // The oracle call was a suspension point
            let state = self.store.snapshot();
            if state.phase != Phase::OpponentPlay {
                return DriverExit::PhaseChanged;
            }

            if !state.legal_card_ids(Side::Opponent).contains(&card_id) {
                if state.opponent.hand.contains(card_id) {
                    self.logger.warn(&format!(
                        "oracle chose card {card_id}, which is not playable now"
                    ));
                } else {
                    self.logger.warn(&format!(
                        "oracle chose card {card_id}, which is no longer in the opponent's hand"
                    ));
                }
                invalid += 1;
                if invalid >= max_invalid {
                    self.logger.warn(&format!(
                        "{invalid} unusable decisions in a row; ending the opponent's turn"
                    ));
                    break DriverExit::TooManyInvalid;
                }
                continue;
            }
            invalid = 0;

            let Some(name) = state.card_name(card_id) else {
                continue;
            };
            self.say(
                LogKind::Info,
                format!("Opponent plays {name}. Reasoning: {reasoning}"),
            );
            self.store.dispatch(Action::PlayCard {
                side: Side::Opponent,
                card_id,
            });
            let attack = self.resolve_effect(Side::Opponent, name).await;
            if attack == Some(AttackOutcome::AwaitingHuman) {
                // The turn resumes once the human has answered
                return DriverExit::PhaseChanged;
            }

            if self.store.snapshot().phase == Phase::OpponentPlay {
                pause(self.config.pacing.between_moves()).await;
            }
        };

        if self.store.snapshot().phase == Phase::OpponentPlay {
            self.store.dispatch(Action::NextPhase(Phase::OpponentDiscard));
        }
        exit
    }
}
