//! Game state, turn structure and the two seats
//!
//! State changes go through `actions::reduce`, held by a `Store`. The
//! `GameLoop` drives the automatic phases and owns the opponent's oracle.

/// Verbose log line that compiles away without the `verbose-logging` feature
macro_rules! log_if_verbose {
    ($self:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $self.logger.verbose(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$self;
            if false {
                let _ = format!($($arg)*);
            }
        }
    };
}

pub mod actions;
pub mod command_controller;
pub mod config;
pub mod controller;
pub mod driver;
pub mod game_loop;
pub mod hand_setup;
pub mod heuristic_controller;
pub mod interaction;
pub mod interactive_controller;
pub mod logger;
pub mod phase;
pub mod random_controller;
pub mod resolution;
pub mod scripted_controller;
pub mod state;
pub mod store;
pub mod zero_controller;

pub use actions::{reduce, Action};
pub use command_controller::CommandOracle;
pub use config::{GameConfig, Pacing, RulesConfig};
pub use controller::{fallback, Decision, DecisionOracle, DecisionRequest, OfflineOracle};
pub use driver::DriverExit;
pub use game_loop::{GameEndReason, GameLoop, GameResult, Outcome, StepOutcome};
pub use hand_setup::{setup_hand, setup_opening_hands, HandSetup};
pub use heuristic_controller::HeuristicOracle;
pub use interactive_controller::{parse_command, render_table, run_console, Command};
pub use logger::{EventLog, GameLogger, LogEntry, LogKind, OutputMode, VerbosityLevel};
pub use phase::Phase;
pub use random_controller::RandomOracle;
pub use scripted_controller::ScriptedOracle;
pub use state::{GameState, InteractionOutcome, PendingInteraction};
pub use store::Store;
pub use zero_controller::ZeroOracle;
