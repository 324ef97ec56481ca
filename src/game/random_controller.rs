//! Random oracle for testing and baseline gameplay
//!
//! Picks uniformly among the legal cards and ending the turn. Serves as a
//! baseline for the heuristic oracle and as a fuzzer for the driver.

use crate::game::controller::{Decision, DecisionOracle, DecisionRequest, OracleFuture};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// An oracle that makes random choices
pub struct RandomOracle {
    rng: StdRng,
}

impl RandomOracle {
    /// Create a new random oracle seeded from the OS
    pub fn new() -> Self {
        RandomOracle {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a random oracle with a seeded RNG (for deterministic testing)
    pub fn with_seed(seed: u64) -> Self {
        RandomOracle {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn choose(&mut self, request: &DecisionRequest) -> Decision {
        // One extra slot stands for "end" / "take the hit"
        let index = self.rng.gen_range(0..=request.legal_card_ids.len());
        let card_id = request.legal_card_ids.get(index).copied();

        match (request.responding_to, card_id) {
            (Some(_), card_id) => Decision::respond(card_id, "random"),
            (None, Some(card_id)) => Decision::play(card_id, "random"),
            (None, None) => Decision::end("random"),
        }
    }
}

impl Default for RandomOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionOracle for RandomOracle {
    fn name(&self) -> &str {
        "random"
    }

    fn decide<'a>(&'a mut self, request: &'a DecisionRequest) -> OracleFuture<'a> {
        let decision = self.choose(request);
        Box::pin(async move { Ok(decision) })
    }
}
