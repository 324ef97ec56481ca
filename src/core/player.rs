//! Player representation

use crate::core::{CardId, Character, CharacterId};
use crate::zones::CardZone;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which seat a player occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Human,
    Opponent,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::Human => Side::Opponent,
            Side::Opponent => Side::Human,
        }
    }

    /// Subject used in narrated log lines
    pub fn subject(&self) -> &'static str {
        match self {
            Side::Human => "You",
            Side::Opponent => "Opponent",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Human => f.write_str("human"),
            Side::Opponent => f.write_str("opponent"),
        }
    }
}

/// Equipment slots. Only the weapon is consulted by current effects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<CardId>,
    pub armor: Option<CardId>,
    pub offense_mount: Option<CardId>,
    pub defense_mount: Option<CardId>,
}

impl Equipment {
    pub fn cards(&self) -> impl Iterator<Item = CardId> + '_ {
        [self.weapon, self.armor, self.offense_mount, self.defense_mount]
            .into_iter()
            .flatten()
    }
}

/// Represents a player in the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub side: Side,

    pub character: Character,

    /// Always within `0..=character.max_hp`
    pub hp: u8,

    /// Cards in hand, in the order they arrived
    pub hand: CardZone,

    pub equipment: Equipment,

    /// Stored rather than derived from hp
    pub alive: bool,

    /// Slashes played since this player's last draw phase
    pub slashes_played_this_turn: u8,

    /// Maximum Slashes per turn (usually 1)
    pub max_slashes_per_turn: u8,
}

impl Player {
    pub fn new(side: Side, character: CharacterId) -> Self {
        let character = character.profile();
        Player {
            side,
            hp: character.max_hp,
            character,
            hand: CardZone::new(),
            equipment: Equipment::default(),
            alive: true,
            slashes_played_this_turn: 0,
            max_slashes_per_turn: 1,
        }
    }

    pub fn max_hp(&self) -> u8 {
        self.character.max_hp
    }

    pub fn name(&self) -> &str {
        &self.character.name
    }

    /// Set hp, clamped to `[0, max_hp]`, keeping the alive flag in sync
    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.max_hp() as i32) as u8;
        self.alive = self.hp > 0;
    }

    /// Lose hp; returns true if this blow was lethal
    pub fn take_damage(&mut self, amount: u8) -> bool {
        let was_alive = self.alive;
        self.set_hp(self.hp as i32 - amount as i32);
        was_alive && !self.alive
    }

    /// Recover hp; returns how much was actually recovered
    pub fn heal(&mut self, amount: u8) -> u8 {
        let before = self.hp;
        self.set_hp(self.hp as i32 + amount as i32);
        self.hp - before
    }

    pub fn is_wounded(&self) -> bool {
        self.hp < self.max_hp()
    }

    pub fn can_play_slash(&self) -> bool {
        self.slashes_played_this_turn < self.max_slashes_per_turn
    }

    pub fn play_slash(&mut self) {
        self.slashes_played_this_turn = self.slashes_played_this_turn.saturating_add(1);
    }

    pub fn reset_turn_limits(&mut self) {
        self.slashes_played_this_turn = 0;
    }

    /// Cards over the hand limit (the hand limit equals current hp)
    pub fn excess_cards(&self) -> usize {
        self.hand.len().saturating_sub(self.hp as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let player = Player::new(Side::Human, CharacterId::LuBu);

        assert_eq!(player.side, Side::Human);
        assert_eq!(player.name(), "Lu Bu");
        assert_eq!(player.hp, 5);
        assert!(player.alive);
        assert!(player.hand.is_empty());
    }

    #[test]
    fn test_hp_is_clamped() {
        let mut player = Player::new(Side::Opponent, CharacterId::CaoCao);

        assert_eq!(player.heal(3), 0);
        assert_eq!(player.hp, 4);

        assert!(!player.take_damage(3));
        assert_eq!(player.hp, 1);
        assert_eq!(player.heal(1), 1);

        assert!(player.take_damage(9));
        assert_eq!(player.hp, 0);
        assert!(!player.alive);

        // A second blow to a dead player is not lethal again
        assert!(!player.take_damage(1));
        assert_eq!(player.hp, 0);
    }

    #[test]
    fn test_slash_limit() {
        let mut player = Player::new(Side::Human, CharacterId::LiuBei);

        assert!(player.can_play_slash());
        player.play_slash();
        assert!(!player.can_play_slash());

        player.reset_turn_limits();
        assert!(player.can_play_slash());
    }

    #[test]
    fn test_excess_cards() {
        let mut player = Player::new(Side::Human, CharacterId::LiuBei);
        for id in 1..=6 {
            player.hand.add(CardId::new(id));
        }
        player.set_hp(3);
        assert_eq!(player.excess_cards(), 3);
    }

    #[test]
    fn test_sides() {
        assert_eq!(Side::Human.other(), Side::Opponent);
        assert_eq!(Side::Opponent.other(), Side::Human);
    }
}
