//! Kingdoms Duel - Main Binary
//!
//! Console play against an oracle-driven opponent, and batch simulations

use clap::{Parser, Subcommand, ValueEnum};
use kingdoms_duel::{
    core::{CharacterId, Side},
    game::{
        run_console, setup_opening_hands, CommandOracle, DecisionOracle, GameConfig,
        GameEndReason, GameLogger, GameLoop, GameState, HandSetup, HeuristicOracle,
        OfflineOracle, Pacing, RandomOracle, VerbosityLevel, ZeroOracle,
    },
    scenario::{load_scenario_with_rules, Scenario},
    DuelError, Result,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Decision source for the opponent
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OracleType {
    /// Always ends the turn (what an unreachable oracle amounts to)
    Offline,
    /// Rule-of-thumb play
    Heuristic,
    /// Random legal cards
    Random,
    /// First legal card (for testing)
    Zero,
    /// External program given by --oracle-cmd
    Command,
}

/// Verbosity level for game output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Kingdoms Duel - a two-player Three Kingdoms card duel", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the opponent at the console
    Play {
        /// Your character (Liu Bei, Cao Cao, Sun Quan, Lu Bu)
        #[arg(long)]
        hero: Option<CharacterId>,

        /// The opponent's character
        #[arg(long)]
        foe: Option<CharacterId>,

        /// Opponent decision source
        #[arg(long, value_enum, default_value = "heuristic")]
        oracle: OracleType,

        /// Program to run for --oracle command
        #[arg(long, value_name = "CMD", required_if_eq("oracle", "command"))]
        oracle_cmd: Option<String>,

        /// Set random seed for a reproducible game
        #[arg(long)]
        seed: Option<u64>,

        /// JSON game config (rules, pacing, oracle timeout)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Start from a scenario file instead of a fresh deal
        #[arg(long, value_name = "SCENARIO_FILE")]
        start_state: Option<PathBuf>,

        /// Your opening hand, e.g. "Slash;Dodge;Peach"
        #[arg(long, value_name = "CARDS")]
        hand: Option<String>,

        /// The opponent's opening hand
        #[arg(long, value_name = "CARDS")]
        foe_hand: Option<String>,

        /// No pacing delays
        #[arg(long)]
        fast: bool,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,
    },

    /// Play games with the heuristic autopilot in your seat
    Simulate {
        /// Number of games to run
        #[arg(long, short = 'g', default_value_t = 100)]
        games: u32,

        /// Seed of the first game; game i uses seed + i
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Opponent decision source
        #[arg(long, value_enum, default_value = "heuristic")]
        oracle: OracleType,

        /// Program to run for --oracle command
        #[arg(long, value_name = "CMD", required_if_eq("oracle", "command"))]
        oracle_cmd: Option<String>,

        /// JSON game config (rules, oracle timeout); pacing is always instant
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "minimal", short = 'v')]
        verbosity: VerbosityArg,
    },
}

fn build_oracle(
    kind: OracleType,
    command: Option<&str>,
    seed: u64,
    config: &GameConfig,
) -> Result<Box<dyn DecisionOracle>> {
    Ok(match kind {
        OracleType::Offline => Box::new(OfflineOracle),
        OracleType::Heuristic => {
            Box::new(HeuristicOracle::new().with_volley_scrolls(config.rules.volley_scrolls))
        }
        OracleType::Random => Box::new(RandomOracle::with_seed(seed)),
        OracleType::Zero => Box::new(ZeroOracle::new()),
        OracleType::Command => {
            let command = command.ok_or_else(|| {
                DuelError::InvalidConfig("--oracle command needs --oracle-cmd".to_string())
            })?;
            Box::new(CommandOracle::new(command)?)
        }
    })
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path),
        None => Ok(GameConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            hero,
            foe,
            oracle,
            oracle_cmd,
            seed,
            config,
            start_state,
            hand,
            foe_hand,
            fast,
            verbosity,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(hero) = hero {
                config.hero = hero;
            }
            if let Some(foe) = foe {
                config.foe = foe;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if fast {
                config.pacing = Pacing::instant();
            }
            config.validate()?;

            let game_seed = config.resolve_seed();
            let mut state = match &start_state {
                Some(path) => load_scenario_with_rules(&Scenario::load(path)?, config.rules)?,
                None => GameState::new_game(config.hero, config.foe, game_seed, config.rules),
            };
            let human = hand.as_deref().map(HandSetup::parse).transpose()?;
            let opponent = foe_hand.as_deref().map(HandSetup::parse).transpose()?;
            if human.is_some() || opponent.is_some() {
                setup_opening_hands(&mut state, human.as_ref(), opponent.as_ref())?;
            }

            let oracle = build_oracle(oracle, oracle_cmd.as_deref(), game_seed, &config)?;
            let logger = Arc::new(GameLogger::with_verbosity(verbosity.into()));
            println!(
                "=== Kingdoms Duel: {} vs {} (opponent oracle: {}, seed {game_seed}) ===",
                state.human.name(),
                state.opponent.name(),
                oracle.name()
            );

            let mut game = GameLoop::from_state(state, config, oracle, logger);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            run_console(&mut game, stdin, &mut std::io::stdout()).await?;
        }

        Commands::Simulate {
            games,
            seed,
            oracle,
            oracle_cmd,
            config,
            verbosity,
        } => {
            let config = load_config(config.as_ref())?.with_pacing(Pacing::instant());
            let verbosity: VerbosityLevel = verbosity.into();
            run_simulation(games, seed, oracle, oracle_cmd.as_deref(), config, verbosity).await?;
        }
    }

    Ok(())
}

/// Play `games` games and print the tally
async fn run_simulation(
    games: u32,
    seed: u64,
    oracle: OracleType,
    oracle_cmd: Option<&str>,
    config: GameConfig,
    verbosity: VerbosityLevel,
) -> Result<()> {
    println!("=== Kingdoms Duel - Simulation ===");
    println!(
        "{} vs {}, {games} games from seed {seed}\n",
        config.hero, config.foe
    );

    let (mut human_wins, mut opponent_wins, mut unfinished) = (0u32, 0u32, 0u32);
    let mut total_turns = 0u64;
    let start = std::time::Instant::now();

    for i in 0..games {
        let game_seed = seed.wrapping_add(i as u64);
        let game_config = config.clone().with_seed(game_seed);
        let opponent = build_oracle(oracle, oracle_cmd, game_seed, &game_config)?;
        let logger = Arc::new(GameLogger::with_verbosity(verbosity));

        let mut game = GameLoop::new(game_config, opponent, logger)?;
        let mut pilot = HeuristicOracle::new().with_volley_scrolls(config.rules.volley_scrolls);
        let result = game.run_to_completion(&mut pilot).await;

        total_turns += result.turns_played as u64;
        match result.end_reason {
            GameEndReason::PlayerDeath(_) if result.winner == Some(Side::Human) => human_wins += 1,
            GameEndReason::PlayerDeath(_) => opponent_wins += 1,
            _ => unfinished += 1,
        }
        if verbosity >= VerbosityLevel::Minimal {
            let winner = result.winner.map(|s| s.subject()).unwrap_or("nobody");
            println!(
                "Game {:>4} (seed {game_seed}): winner {winner}, {} turns, {:?}",
                i + 1,
                result.turns_played,
                result.end_reason
            );
        }
    }

    let elapsed = start.elapsed();
    println!("\n=== Results ===");
    println!("You (autopilot): {human_wins}");
    println!("Opponent:        {opponent_wins}");
    println!("Unfinished:      {unfinished}");
    if games > 0 {
        println!("Average turns:   {:.1}", total_turns as f64 / games as f64);
        println!(
            "Time:            {:.2}ms per game",
            elapsed.as_secs_f64() * 1000.0 / games as f64
        );
    }
    Ok(())
}
