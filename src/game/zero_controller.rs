//! Zero oracle for testing and automation
//!
//! Always chooses the first legal card, and ends the turn when there is none.
//! Useful for running games without interaction and for benchmarking.

use crate::game::controller::{Decision, DecisionOracle, DecisionRequest, OracleFuture};

#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroOracle;

impl ZeroOracle {
    pub fn new() -> Self {
        ZeroOracle
    }

    pub fn choose(&self, request: &DecisionRequest) -> Decision {
        let first = request.legal_card_ids.first().copied();
        match (request.responding_to, first) {
            (Some(_), card_id) => Decision::respond(card_id, "first legal card"),
            (None, Some(card_id)) => Decision::play(card_id, "first legal card"),
            (None, None) => Decision::end("no legal cards"),
        }
    }
}

impl DecisionOracle for ZeroOracle {
    fn name(&self) -> &str {
        "zero"
    }

    fn decide<'a>(&'a mut self, request: &'a DecisionRequest) -> OracleFuture<'a> {
        let decision = self.choose(request);
        Box::pin(async move { Ok(decision) })
    }
}
