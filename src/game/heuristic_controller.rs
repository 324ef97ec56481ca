//! Heuristic oracle
//!
//! Plays the way a sensible player reads the hand, without lookahead:
//! 1. heal when wounded,
//! 2. spend offensive scrolls before Slash,
//! 3. Slash while the per-turn limit allows,
//! 4. otherwise end the turn.
//!
//! Attacks are answered with the required card whenever it is held.

use crate::core::{CardId, CardName};
use crate::game::controller::{Decision, DecisionOracle, DecisionRequest, OracleFuture};

/// Scroll preference, best first
const SCROLL_ORDER: [CardName; 5] = [
    CardName::Duel,
    CardName::Theft,
    CardName::Sabotage,
    CardName::Archery,
    CardName::Barbarians,
];

#[derive(Debug, Clone, Default)]
pub struct HeuristicOracle {
    /// Whether Barbarians and Archery do anything (see `RulesConfig`)
    volley_scrolls: bool,
}

impl HeuristicOracle {
    pub fn new() -> Self {
        HeuristicOracle::default()
    }

    pub fn with_volley_scrolls(mut self, enabled: bool) -> Self {
        self.volley_scrolls = enabled;
        self
    }

    /// Pure decision function, shared with the async entry point
    pub fn choose(&self, request: &DecisionRequest) -> Decision {
        if let Some(required) = request.required_card() {
            return match self.first_legal(request, required) {
                Some(card_id) => {
                    Decision::respond(Some(card_id), format!("Countering with {required}."))
                }
                None => Decision::respond(None, format!("No {required} to answer with.")),
            };
        }

        if request.me.hp < request.me.max_hp {
            if let Some(peach) = self.first_legal(request, CardName::Peach) {
                return Decision::play(peach, "Wounded, eating a Peach.");
            }
        }

        for scroll in SCROLL_ORDER {
            if !self.worth_playing(request, scroll) {
                continue;
            }
            if let Some(card_id) = self.first_legal(request, scroll) {
                return Decision::play(card_id, format!("{scroll} before attacking."));
            }
        }

        if request.me.can_play_slash {
            if let Some(slash) = self.first_legal(request, CardName::Slash) {
                return Decision::play(slash, "Attacking with Slash.");
            }
        }

        Decision::end("Nothing useful left to play.")
    }

    fn worth_playing(&self, request: &DecisionRequest, scroll: CardName) -> bool {
        match scroll {
            CardName::Theft | CardName::Sabotage => request.rival.hand_count > 0,
            CardName::Barbarians | CardName::Archery => self.volley_scrolls,
            _ => true,
        }
    }

    fn first_legal(&self, request: &DecisionRequest, name: CardName) -> Option<CardId> {
        request
            .legal_card_ids
            .iter()
            .copied()
            .find(|&id| request.card_name(id) == Some(name))
    }
}

impl DecisionOracle for HeuristicOracle {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn decide<'a>(&'a mut self, request: &'a DecisionRequest) -> OracleFuture<'a> {
        let decision = self.choose(request);
        Box::pin(async move { Ok(decision) })
    }
}
