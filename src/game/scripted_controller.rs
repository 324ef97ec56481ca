//! Scripted oracle for testing
//!
//! Replays a predetermined queue of answers (including failures) and records
//! every request it was shown, so tests can check what the driver asked.

use crate::game::controller::{fallback, Decision, DecisionOracle, DecisionRequest, OracleFuture};
use crate::{DuelError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// An oracle that follows a predetermined sequence of answers
pub struct ScriptedOracle {
    script: VecDeque<Result<Decision>>,
    seen: Arc<Mutex<Vec<DecisionRequest>>>,
}

impl ScriptedOracle {
    pub fn new(decisions: Vec<Decision>) -> Self {
        ScriptedOracle::from_results(decisions.into_iter().map(Ok).collect())
    }

    /// A script that may also contain oracle failures
    pub fn from_results(script: Vec<Result<Decision>>) -> Self {
        ScriptedOracle {
            script: script.into(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle on the requests received so far
    pub fn requests(&self) -> Arc<Mutex<Vec<DecisionRequest>>> {
        Arc::clone(&self.seen)
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn next_answer(&mut self, request: &DecisionRequest) -> Result<Decision> {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        // Once the script runs out, behave like an oracle that ends / defers
        self.script
            .pop_front()
            .unwrap_or_else(|| Ok(fallback(request)))
    }
}

impl DecisionOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    fn decide<'a>(&'a mut self, request: &'a DecisionRequest) -> OracleFuture<'a> {
        let answer = self.next_answer(request);
        Box::pin(async move { answer })
    }
}

/// A scripted failure, for building scripts
pub fn unavailable() -> Result<Decision> {
    Err(DuelError::OracleUnavailable("scripted outage".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardId, CharacterId, Side};
    use crate::game::config::RulesConfig;
    use crate::game::GameState;

    #[tokio::test]
    async fn test_scripted_oracle() {
        let game = GameState::new_game(
            CharacterId::LiuBei,
            CharacterId::CaoCao,
            1,
            RulesConfig::default(),
        );
        let request = DecisionRequest::for_turn(&game, Side::Opponent);

        let mut oracle = ScriptedOracle::from_results(vec![
            Ok(Decision::play(CardId::new(10), "first")),
            unavailable(),
            Ok(Decision::end("done")),
        ]);
        let requests = oracle.requests();

        assert_eq!(
            oracle.decide(&request).await.unwrap(),
            Decision::play(CardId::new(10), "first")
        );
        assert!(oracle.decide(&request).await.is_err());
        assert_eq!(oracle.decide(&request).await.unwrap(), Decision::end("done"));
        assert_eq!(oracle.remaining(), 0);

        // Exhausted scripts fall back
        assert!(matches!(
            oracle.decide(&request).await.unwrap(),
            Decision::End { .. }
        ));
        assert_eq!(requests.lock().unwrap().len(), 4);
    }
}
