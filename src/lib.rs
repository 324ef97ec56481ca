//! Kingdoms Duel - a two-player Three Kingdoms card duel
//!
//! One human seat, one opponent seat driven by a decision oracle. The rules
//! live in a pure reducer (`game::reduce`); the `GameLoop` runs the turn
//! phases on top of it, including the asynchronous opponent turn.

pub mod core;
pub mod error;
pub mod game;
pub mod scenario;
pub mod zones;

pub use error::{DuelError, Result};
