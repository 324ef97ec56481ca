//! Character profiles

use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Shu,
    Wei,
    Wu,
    Qun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CharacterId {
    #[default]
    LiuBei,
    CaoCao,
    SunQuan,
    LuBu,
}

/// A character's fixed attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub max_hp: u8,
    pub faction: Faction,
}

impl CharacterId {
    pub const ALL: [CharacterId; 4] = [
        CharacterId::LiuBei,
        CharacterId::CaoCao,
        CharacterId::SunQuan,
        CharacterId::LuBu,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            CharacterId::LiuBei => "Liu Bei",
            CharacterId::CaoCao => "Cao Cao",
            CharacterId::SunQuan => "Sun Quan",
            CharacterId::LuBu => "Lu Bu",
        }
    }

    pub fn profile(&self) -> Character {
        let (max_hp, faction) = match self {
            CharacterId::LiuBei => (4, Faction::Shu),
            CharacterId::CaoCao => (4, Faction::Wei),
            CharacterId::SunQuan => (4, Faction::Wu),
            CharacterId::LuBu => (5, Faction::Qun),
        };
        Character {
            id: *self,
            name: self.display_name().to_string(),
            max_hp,
            faction,
        }
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for CharacterId {
    type Err = DuelError;

    /// Accepts "Liu Bei", "liu-bei", "liu_bei" and "liubei"
    fn from_str(s: &str) -> Result<Self> {
        let squashed: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        CharacterId::ALL
            .iter()
            .copied()
            .find(|id| {
                id.display_name()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .map(|c| c.to_ascii_lowercase())
                    .eq(squashed.chars())
            })
            .ok_or_else(|| DuelError::ParseError(format!("unknown character '{s}'")))
    }
}
