//! Narrated event log and diagnostic logger
//!
//! Two layers:
//! - `EventLog` is part of `GameState`: the append-only, player-facing story
//!   of the game ("You played Slash", "Opponent took damage!"). Only the
//!   reducer writes to it.
//! - `GameLogger` is the engine's diagnostic output. It echoes narrated
//!   entries to stdout according to verbosity, reports warnings (stale oracle
//!   moves, oracle failures) and can capture everything in memory for tests.

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard};

/// Verbosity level for game output
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum VerbosityLevel {
    /// Silent - no output during game
    Silent = 0,
    /// Minimal - only game outcome and warnings
    Minimal = 1,
    /// Normal - narrated events (default)
    #[default]
    Normal = 2,
    /// Verbose - also oracle traffic and phase changes
    Verbose = 3,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    /// Output only to stdout/stderr (default)
    #[default]
    Stdout,
    /// Capture only to in-memory buffer
    Memory,
    /// Both
    Both,
}

/// Category of a narrated event, used by renderers for colouring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    #[default]
    Info,
    Danger,
    Success,
    System,
}

/// One narrated event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub turn: u32,
    /// Milliseconds since the game started, stamped when the entry is committed
    pub elapsed_ms: u64,
    pub kind: LogKind,
    pub text: String,
}

/// Append-only narration of one game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<LogEntry>,
    next_id: u64,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog::default()
    }

    pub fn push(&mut self, turn: u32, kind: LogKind, text: impl Into<String>) {
        self.next_id += 1;
        self.entries.push(LogEntry {
            id: self.next_id,
            turn,
            elapsed_ms: 0,
            kind,
            text: text.into(),
        });
    }

    /// Stamp every entry from `start` onwards with the commit time
    pub fn stamp_from(&mut self, start: usize, elapsed_ms: u64) {
        for entry in self.entries.iter_mut().skip(start) {
            entry.elapsed_ms = elapsed_ms;
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// Whether any entry's text contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.text.contains(needle))
    }
}

/// A captured diagnostic line
#[derive(Debug, Clone)]
pub struct LogLine {
    pub level: VerbosityLevel,
    pub message: String,
    /// e.g. "narration", "warning", "oracle"
    pub category: Option<String>,
}

/// Guard type that provides read-only access to captured lines
pub struct LogGuard<'a> {
    guard: MutexGuard<'a, Vec<LogLine>>,
}

impl<'a> Deref for LogGuard<'a> {
    type Target = [LogLine];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Diagnostic logger shared by the store, the game loop and the driver
pub struct GameLogger {
    verbosity: VerbosityLevel,
    output_mode: OutputMode,
    log_buffer: Mutex<Vec<LogLine>>,
}

impl GameLogger {
    pub fn new() -> Self {
        GameLogger::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            output_mode: OutputMode::default(),
            log_buffer: Mutex::new(Vec::new()),
        }
    }

    /// Capture-only logger, for tests and simulations
    pub fn captured() -> Self {
        let mut logger = GameLogger::new();
        logger.enable_capture();
        logger
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    /// Sets output_mode to Memory (suppresses stdout output)
    pub fn enable_capture(&mut self) {
        self.output_mode = OutputMode::Memory;
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.output_mode, OutputMode::Memory | OutputMode::Both)
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    /// Access captured lines
    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.buffer(),
        }
    }

    /// Captured lines in a given category
    pub fn lines_in(&self, category: &str) -> Vec<String> {
        self.buffer()
            .iter()
            .filter(|line| line.category.as_deref() == Some(category))
            .map(|line| line.message.clone())
            .collect()
    }

    pub fn clear_logs(&self) {
        self.buffer().clear();
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<LogLine>> {
        // A panic while holding the lock only loses log lines
        self.log_buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, level: VerbosityLevel, category: Option<&str>, message: &str, to_stderr: bool) {
        let should_capture = self.is_capturing();
        let should_output = matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both);

        // Early exit if message won't be used
        if level > self.verbosity && !should_capture {
            return;
        }

        if should_capture {
            self.buffer().push(LogLine {
                level,
                message: message.to_string(),
                category: category.map(str::to_string),
            });
        }

        if should_output && level <= self.verbosity {
            if to_stderr {
                eprintln!("{message}");
            } else if level == VerbosityLevel::Minimal {
                println!("{message}");
            } else {
                println!("  {message}");
            }
        }
    }

    pub fn minimal(&self, message: &str) {
        self.emit(VerbosityLevel::Minimal, None, message, false);
    }

    pub fn normal(&self, message: &str) {
        self.emit(VerbosityLevel::Normal, None, message, false);
    }

    pub fn verbose(&self, message: &str) {
        self.emit(VerbosityLevel::Verbose, None, message, false);
    }

    /// Recoverable problem (stale oracle move, oracle outage); goes to stderr
    pub fn warn(&self, message: &str) {
        self.emit(
            VerbosityLevel::Minimal,
            Some("warning"),
            &format!("warning: {message}"),
            true,
        );
    }

    /// Oracle request/response traffic
    pub fn oracle(&self, oracle_name: &str, message: &str) {
        self.emit(
            VerbosityLevel::Verbose,
            Some("oracle"),
            &format!("[{oracle_name}] {message}"),
            false,
        );
    }

    /// Echo one narrated entry
    pub fn narrate(&self, entry: &LogEntry) {
        let marker = match entry.kind {
            LogKind::Info => "  ",
            LogKind::Success => "+ ",
            LogKind::Danger => "! ",
            LogKind::System => "= ",
        };
        self.emit(
            VerbosityLevel::Normal,
            Some("narration"),
            &format!("{marker}{}", entry.text),
            false,
        );
    }
}

impl Default for GameLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLogger")
            .field("verbosity", &self.verbosity)
            .field("output_mode", &self.output_mode)
            .field("log_count", &self.buffer().len())
            .finish()
    }
}
