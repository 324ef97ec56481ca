//! External-process oracle
//!
//! Runs a program once per decision. The request is written to its stdin as
//! one JSON line; the first JSON object on its stdout is the decision. A
//! program that cannot start, exits with an error or prints no decision makes
//! the oracle unavailable or malformed for that request, and the driver
//! falls back.

use crate::game::controller::{Decision, DecisionOracle, DecisionRequest, OracleFuture};
use crate::{DuelError, Result};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub struct CommandOracle {
    program: String,
    args: Vec<String>,
    label: String,
}

impl CommandOracle {
    /// Build from a whitespace-separated command line, e.g. `python3 bot.py`
    pub fn new(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| DuelError::InvalidConfig("empty oracle command".to_string()))?;
        Ok(CommandOracle {
            label: format!("command:{program}"),
            program,
            args: parts.collect(),
        })
    }

    async fn run(&self, request: &DecisionRequest) -> Result<Decision> {
        let mut payload = serde_json::to_vec(request)?;
        payload.push(b'\n');

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            // A timed-out decision drops this future; take the child with it
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DuelError::OracleUnavailable(format!("{}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // The program may exit without reading; that is its answer's problem
            let _ = stdin.write_all(&payload).await;
            let _ = stdin.shutdown().await;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| DuelError::OracleUnavailable(format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(DuelError::OracleUnavailable(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        Decision::parse(&String::from_utf8_lossy(&output.stdout))
    }
}

impl DecisionOracle for CommandOracle {
    fn name(&self) -> &str {
        &self.label
    }

    fn decide<'a>(&'a mut self, request: &'a DecisionRequest) -> OracleFuture<'a> {
        Box::pin(self.run(request))
    }
}
