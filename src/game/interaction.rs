//! Attack and response
//!
//! An attacking card opens a `PendingInteraction`. When the opponent is
//! attacked the exchange is settled right here: if it holds the required
//! card it plays it, otherwise it takes the damage. When the human is
//! attacked the game moves to RESOLVING_INTERACTION and waits for
//! `play_card` or `take_damage_instead`.

use crate::core::{CardId, CardName, Side};
use crate::game::actions::Action;
use crate::game::config::pause;
use crate::game::controller::{Decision, DecisionRequest};
use crate::game::driver::consult;
use crate::game::game_loop::GameLoop;
use crate::game::logger::LogKind;
use crate::game::phase::Phase;
use crate::game::state::InteractionOutcome;

/// How an attack ended (as far as this call is concerned)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    Countered,
    Hit,
    /// The human has to answer
    AwaitingHuman,
    /// Another interaction was pending or the game is over
    Ignored,
}

impl GameLoop {
    pub(crate) async fn handle_attack(&mut self, attacker: Side, card: CardName) -> AttackOutcome {
        let state = self.store.snapshot();
        if state.is_game_over() {
            return AttackOutcome::Ignored;
        }
        if let Some(pending) = state.pending {
            self.logger.warn(&format!(
                "{card} ignored: {} from the {} is still unanswered",
                pending.card, pending.source
            ));
            return AttackOutcome::Ignored;
        }

        self.store.dispatch(Action::BeginInteraction {
            source: attacker,
            card,
        });

        match attacker.other() {
            Side::Opponent => self.opponent_responds(card).await,
            Side::Human => {
                let warning = match card {
                    CardName::Duel => "DUEL! Play a Slash to fight back!",
                    CardName::Barbarians => "BARBARIANS! Play a Slash to hold them off!",
                    CardName::Archery => "ARCHERY! Play Dodge to evade the volley!",
                    _ => "ATTACK! Play Dodge to evade!",
                };
                self.say(LogKind::Danger, format!("WARNING: {warning}"));
                self.store.dispatch(Action::NextPhase(Phase::ResolvingInteraction));
                AttackOutcome::AwaitingHuman
            }
        }
    }

    async fn opponent_responds(&mut self, card: CardName) -> AttackOutcome {
        let required = card.required_response().unwrap_or(CardName::Dodge);
        let waiting = if card == CardName::Duel {
            "Waiting for Opponent to Duel back...".to_string()
        } else {
            format!("Waiting for Opponent to {required}...")
        };
        self.say(LogKind::Info, waiting);
        pause(self.config.pacing.response()).await;

        // Read the hand after the delay, not before it
        let counter = self.pick_counter(card).await;
        let state = self.store.snapshot();
        let damage = match state.pending {
            Some(pending) => pending.damage_or(state.rules.attack_damage),
            None => state.rules.attack_damage,
        };

        match counter {
            Some(card_id) => {
                self.store.dispatch(Action::PlayCard {
                    side: Side::Opponent,
                    card_id,
                });
                self.say(LogKind::Success, format!("Opponent played {required}!"));
                self.store.dispatch(Action::ResolveInteraction {
                    outcome: InteractionOutcome::Countered,
                });
                AttackOutcome::Countered
            }
            None => {
                self.say(LogKind::Success, "Opponent took damage!");
                self.store.dispatch_all([
                    Action::TakeDamage {
                        side: Side::Opponent,
                        amount: damage,
                    },
                    Action::ResolveInteraction {
                        outcome: InteractionOutcome::Failed,
                    },
                ]);
                AttackOutcome::Hit
            }
        }
    }

    /// Which copy of the required card the opponent answers with
    ///
    /// The oracle may pick among the copies it holds; any other answer falls
    /// back to the first copy. Holding a counter always counters.
    async fn pick_counter(&mut self, card: CardName) -> Option<CardId> {
        let state = self.store.snapshot();
        let request = DecisionRequest::for_response(&state, Side::Opponent, card);
        let first = request.legal_card_ids.first().copied()?;
        if request.legal_card_ids.len() == 1 {
            return Some(first);
        }

        let timeout = self.config.oracle_timeout();
        let decision = consult(self.oracle.as_mut(), &request, timeout, &self.logger).await;
        let chosen = match decision {
            Decision::Respond {
                card_id: Some(card_id),
                ..
            } if request.is_legal(card_id) => card_id,
            other => {
                self.logger.verbose(&format!(
                    "response {other:?} not usable, answering with card {first}"
                ));
                first
            }
        };

        // The hand may have changed while the oracle was thinking
        let fresh = self.store.snapshot();
        let required = card.required_response().unwrap_or(CardName::Dodge);
        if fresh.hand_holds(Side::Opponent, chosen, required) {
            Some(chosen)
        } else {
            fresh.find_in_hand(Side::Opponent, required)
        }
    }
}
