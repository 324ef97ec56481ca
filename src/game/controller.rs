//! Decision oracle trait and the views it is given
//!
//! The engine asks an oracle what the opponent should do. An oracle only
//! proposes: the driver re-validates every answer against the latest state,
//! and any failure (unavailable, malformed, timed out) is replaced by the
//! deterministic `fallback` decision.

use crate::core::{CardId, CardName, CardType, Side};
use crate::game::GameState;
use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// An oracle's answer
///
/// Serialised the way external oracles speak:
/// `{"action": "PLAY", "cardId": 7, "reasoning": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "UPPERCASE")]
pub enum Decision {
    Play {
        #[serde(rename = "cardId")]
        card_id: CardId,
        #[serde(default)]
        reasoning: String,
    },
    End {
        #[serde(default)]
        reasoning: String,
    },
    /// Answer to an attack; `None` takes the hit
    Respond {
        #[serde(rename = "cardId", default)]
        card_id: Option<CardId>,
        #[serde(default)]
        reasoning: String,
    },
}

impl Decision {
    pub fn play(card_id: CardId, reasoning: impl Into<String>) -> Self {
        Decision::Play {
            card_id,
            reasoning: reasoning.into(),
        }
    }

    pub fn end(reasoning: impl Into<String>) -> Self {
        Decision::End {
            reasoning: reasoning.into(),
        }
    }

    pub fn respond(card_id: Option<CardId>, reasoning: impl Into<String>) -> Self {
        Decision::Respond {
            card_id,
            reasoning: reasoning.into(),
        }
    }

    pub fn reasoning(&self) -> &str {
        match self {
            Decision::Play { reasoning, .. }
            | Decision::End { reasoning }
            | Decision::Respond { reasoning, .. } => reasoning,
        }
    }

    /// Parse the first JSON object found in `text`
    ///
    /// Leading chatter and trailing text are ignored, which is how language
    /// model style oracles tend to answer.
    pub fn parse(text: &str) -> Result<Self> {
        let start = text
            .find('{')
            .ok_or_else(|| DuelError::OracleMalformed(format!("no JSON object in {text:?}")))?;
        serde_json::Deserializer::from_str(&text[start..])
            .into_iter::<Decision>()
            .next()
            .ok_or_else(|| DuelError::OracleMalformed("empty response".to_string()))?
            .map_err(|e| DuelError::OracleMalformed(e.to_string()))
    }
}

/// A card as shown to its holder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: CardId,
    pub name: CardName,
    pub card_type: CardType,
    pub description: String,
}

/// What a side knows about itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub character: String,
    pub hp: u8,
    pub max_hp: u8,
    pub hand: Vec<CardView>,
    pub can_play_slash: bool,
}

/// What a side knows about the other one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RivalView {
    pub character: String,
    pub hp: u8,
    pub max_hp: u8,
    pub hand_count: usize,
}

/// Everything an oracle gets for one decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub side: Side,
    pub me: PlayerView,
    pub rival: RivalView,
    pub legal_card_ids: Vec<CardId>,
    /// Set when the decision is an answer to this attacking card
    pub responding_to: Option<CardName>,
}

impl DecisionRequest {
    /// A free-play decision for `side`, built from the given snapshot
    pub fn for_turn(state: &GameState, side: Side) -> Self {
        DecisionRequest::build(state, side, state.legal_card_ids(side), None)
    }

    /// An answer to `incoming`; the legal ids are the copies of the
    /// required card in hand
    pub fn for_response(state: &GameState, side: Side, incoming: CardName) -> Self {
        let required = incoming.required_response().unwrap_or(CardName::Dodge);
        let legal = state
            .player(side)
            .hand
            .iter()
            .copied()
            .filter(|&id| state.card_name(id) == Some(required))
            .collect();
        DecisionRequest::build(state, side, legal, Some(incoming))
    }

    fn build(
        state: &GameState,
        side: Side,
        legal_card_ids: Vec<CardId>,
        responding_to: Option<CardName>,
    ) -> Self {
        let me = state.player(side);
        let rival = state.player(side.other());
        DecisionRequest {
            side,
            me: PlayerView {
                character: me.name().to_string(),
                hp: me.hp,
                max_hp: me.max_hp(),
                hand: state
                    .hand_cards(side)
                    .into_iter()
                    .map(|card| CardView {
                        id: card.id,
                        name: card.name,
                        card_type: card.card_type(),
                        description: card.description().to_string(),
                    })
                    .collect(),
                can_play_slash: me.can_play_slash(),
            },
            rival: RivalView {
                character: rival.name().to_string(),
                hp: rival.hp,
                max_hp: rival.max_hp(),
                hand_count: rival.hand.len(),
            },
            legal_card_ids,
            responding_to,
        }
    }

    /// The card that counters the attack being answered
    pub fn required_card(&self) -> Option<CardName> {
        self.responding_to.and_then(|card| card.required_response())
    }

    /// First card in my hand with this name
    pub fn find_in_hand(&self, name: CardName) -> Option<CardId> {
        self.me.hand.iter().find(|c| c.name == name).map(|c| c.id)
    }

    pub fn card_name(&self, card_id: CardId) -> Option<CardName> {
        self.me.hand.iter().find(|c| c.id == card_id).map(|c| c.name)
    }

    pub fn is_legal(&self, card_id: CardId) -> bool {
        self.legal_card_ids.contains(&card_id)
    }
}

/// Decision used whenever the oracle cannot be used
///
/// Responding: play the first held copy of the required card, otherwise take
/// the hit. Free turn: end it.
pub fn fallback(request: &DecisionRequest) -> Decision {
    match request.required_card() {
        Some(required) => match request.find_in_hand(required) {
            Some(card_id) => {
                Decision::respond(Some(card_id), format!("Fallback: {required} held."))
            }
            None => Decision::respond(None, "Fallback: nothing to respond with."),
        },
        None => Decision::end("Fallback: oracle unavailable, ending turn."),
    }
}

/// Boxed future returned by oracles, so the trait stays object safe
pub type OracleFuture<'a> = Pin<Box<dyn Future<Output = Result<Decision>> + Send + 'a>>;

/// Decision oracle trait
///
/// Implement this to plug in any move source: a heuristic, a random
/// baseline, a script for tests or an external process.
pub trait DecisionOracle: Send {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Propose a decision for `request`
    fn decide<'a>(&'a mut self, request: &'a DecisionRequest) -> OracleFuture<'a>;
}

impl<T: DecisionOracle + ?Sized> DecisionOracle for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn decide<'a>(&'a mut self, request: &'a DecisionRequest) -> OracleFuture<'a> {
        (**self).decide(request)
    }
}

/// An oracle that is never reachable; every turn runs on the fallback
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineOracle;

impl DecisionOracle for OfflineOracle {
    fn name(&self) -> &str {
        "offline"
    }

    fn decide<'a>(&'a mut self, _request: &'a DecisionRequest) -> OracleFuture<'a> {
        Box::pin(async { Err(DuelError::OracleUnavailable("offline".to_string())) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CharacterId;
    use crate::game::config::RulesConfig;
    use crate::game::hand_setup::{setup_opening_hands, HandSetup};

    fn game(human: &str, opponent: &str) -> GameState {
        let mut game = GameState::new_game(
            CharacterId::LiuBei,
            CharacterId::CaoCao,
            4,
            RulesConfig::default(),
        );
        let human = HandSetup::parse(human).unwrap();
        let opponent = HandSetup::parse(opponent).unwrap();
        setup_opening_hands(&mut game, Some(&human), Some(&opponent)).unwrap();
        game
    }

    #[test]
    fn test_decision_wire_format() {
        let decision = Decision::play(CardId::new(7), "attack");
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "PLAY", "cardId": 7, "reasoning": "attack"})
        );

        let end: Decision = serde_json::from_str(r#"{"action":"END"}"#).unwrap();
        assert_eq!(end, Decision::end(""));
    }

    #[test]
    fn test_parse_ignores_surrounding_text() {
        let text = concat!(
            "Sure! {\"action\": \"RESPOND\", \"cardId\": 3, ",
            "\"reasoning\": \"dodge\"} hope that helps"
        );
        assert_eq!(
            Decision::parse(text).unwrap(),
            Decision::respond(Some(CardId::new(3)), "dodge")
        );
    }

    #[test]
    fn test_parse_errors_are_malformed() {
        assert!(matches!(
            Decision::parse("I end my turn"),
            Err(DuelError::OracleMalformed(_))
        ));
        assert!(matches!(
            Decision::parse("{\"action\": \"DANCE\"}"),
            Err(DuelError::OracleMalformed(_))
        ));
    }

    #[test]
    fn test_requests_see_only_public_rival_info() {
        let game = game("Slash;Dodge", "Peach;Duel;Slash");
        let request = DecisionRequest::for_turn(&game, Side::Opponent);

        assert_eq!(request.me.hand.len(), 3);
        assert_eq!(request.rival.hand_count, 2);
        assert_eq!(request.legal_card_ids.len(), 3);
        assert!(request.responding_to.is_none());

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("legalCardIds").is_some());
        assert!(json["rival"].get("hand").is_none());
    }

    #[test]
    fn test_response_request_lists_counters() {
        let game = game("Slash", "Dodge;Peach;Dodge");
        let request = DecisionRequest::for_response(&game, Side::Opponent, CardName::Slash);
        assert_eq!(request.legal_card_ids.len(), 2);
        assert_eq!(request.required_card(), Some(CardName::Dodge));
    }

    #[test]
    fn test_fallback_policy() {
        let game = game("Slash", "Dodge;Peach");
        let free = DecisionRequest::for_turn(&game, Side::Opponent);
        assert!(matches!(fallback(&free), Decision::End { .. }));

        let dodge = game.find_in_hand(Side::Opponent, CardName::Dodge);
        let attacked = DecisionRequest::for_response(&game, Side::Opponent, CardName::Slash);
        assert!(matches!(
            fallback(&attacked),
            Decision::Respond { card_id, .. } if card_id == dodge
        ));

        let dueled = DecisionRequest::for_response(&game, Side::Opponent, CardName::Duel);
        assert!(matches!(fallback(&dueled), Decision::Respond { card_id: None, .. }));
    }

    #[tokio::test]
    async fn test_offline_oracle_is_unavailable() {
        let game = game("Slash", "Dodge");
        let request = DecisionRequest::for_turn(&game, Side::Opponent);
        let mut oracle = OfflineOracle;
        let err = oracle.decide(&request).await.unwrap_err();
        assert!(err.is_oracle_failure());
    }
}
