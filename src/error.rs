//! Error types for the duel engine
//!
//! Rule violations (playing out of phase, stale card ids) are not errors: the
//! engine narrates them and reports an `Outcome`. These variants cover the
//! infrastructure around the rules: files, parsing and the decision oracle.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DuelError {
    #[error("Invalid game action: {0}")]
    InvalidAction(String),

    #[error("Card not found: {0}")]
    CardNotFound(u32),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("State integrity violated: {0}")]
    Integrity(String),

    #[error("Decision oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Decision oracle returned malformed output: {0}")]
    OracleMalformed(String),

    #[error("Decision oracle timed out after {0:?}")]
    OracleTimeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl DuelError {
    /// Oracle failures are recovered through the fallback policy
    pub fn is_oracle_failure(&self) -> bool {
        matches!(
            self,
            DuelError::OracleUnavailable(_)
                | DuelError::OracleMalformed(_)
                | DuelError::OracleTimeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DuelError>;
