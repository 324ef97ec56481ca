//! Turn phases and the transition graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every state the game can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Setup,
    PlayerDraw,
    PlayerPlay,
    PlayerDiscard,
    /// The human must answer an attack before anything else happens
    ResolvingInteraction,
    OpponentThinking,
    OpponentPlay,
    OpponentDiscard,
    /// Terminal and absorbing
    GameOver,
}

impl Phase {
    pub const ALL: [Phase; 9] = [
        Phase::Setup,
        Phase::PlayerDraw,
        Phase::PlayerPlay,
        Phase::PlayerDiscard,
        Phase::ResolvingInteraction,
        Phase::OpponentThinking,
        Phase::OpponentPlay,
        Phase::OpponentDiscard,
        Phase::GameOver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "SETUP",
            Phase::PlayerDraw => "PLAYER_DRAW",
            Phase::PlayerPlay => "PLAYER_PLAY",
            Phase::PlayerDiscard => "PLAYER_DISCARD",
            Phase::ResolvingInteraction => "RESOLVING_INTERACTION",
            Phase::OpponentThinking => "OPPONENT_THINKING",
            Phase::OpponentPlay => "OPPONENT_PLAY",
            Phase::OpponentDiscard => "OPPONENT_DISCARD",
            Phase::GameOver => "GAME_OVER",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::GameOver)
    }

    /// Whether a transition from `self` to `target` is accepted
    ///
    /// Once the game is over only GAME_OVER itself is accepted. Everything
    /// else is allowed; the callers own the nominal ordering.
    pub fn accepts(&self, target: Phase) -> bool {
        !self.is_terminal() || target.is_terminal()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = crate::DuelError;

    fn from_str(s: &str) -> crate::Result<Self> {
        let wanted = s.trim().to_uppercase().replace([' ', '-'], "_");
        Phase::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| crate::DuelError::ParseError(format!("unknown phase '{s}'")))
    }
}
