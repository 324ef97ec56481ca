//! The authoritative owner of the game state
//!
//! The latest state lives in a `watch` channel as an `Arc<GameState>`.
//! Readers take a snapshot (a cheap `Arc` clone) and must take a new one
//! after every suspension point; writers replace the whole state through
//! `reduce`, so a snapshot held across an `.await` is never torn.

use crate::game::actions::{reduce, Action};
use crate::game::logger::GameLogger;
use crate::game::state::GameState;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

pub struct Store {
    tx: watch::Sender<Arc<GameState>>,
    started: Instant,
    logger: Arc<GameLogger>,
}

impl Store {
    pub fn new(initial: GameState, logger: Arc<GameLogger>) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        let store = Store {
            tx,
            started: Instant::now(),
            logger,
        };
        store.echo_from(0);
        store
    }

    /// The current state
    pub fn snapshot(&self) -> Arc<GameState> {
        self.tx.borrow().clone()
    }

    /// Apply one action and commit the resulting state
    pub fn dispatch(&self, action: Action) {
        self.logger.verbose(&format!("dispatch {}", action.kind()));

        let mut first_new = 0;
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        self.tx.send_modify(|current| {
            let before = current.log.len();
            let mut next = reduce(current, action);
            // A shorter log means InitGame started a new one
            first_new = if next.log.len() >= before { before } else { 0 };
            next.log.stamp_from(first_new, elapsed_ms);
            *current = Arc::new(next);
        });
        self.echo_from(first_new);
    }

    pub fn dispatch_all(&self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.dispatch(action);
        }
    }

    /// Replace the state wholesale (restart, scenario load)
    pub fn replace(&self, state: GameState) {
        self.tx.send_replace(Arc::new(state));
        self.echo_from(0);
    }

    /// Change notifications for renderers
    pub fn subscribe(&self) -> watch::Receiver<Arc<GameState>> {
        self.tx.subscribe()
    }

    pub fn logger(&self) -> &Arc<GameLogger> {
        &self.logger
    }

    fn echo_from(&self, start: usize) {
        let state = self.snapshot();
        for entry in state.log.entries().iter().skip(start) {
            self.logger.narrate(entry);
        }
    }
}
