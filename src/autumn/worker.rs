//! This module runs a computation on a thread of its own.  The thread sends its outcome back
//! through a channel, so the caller can wait for it with a time limit and cancel the search if the
//! limit passes.  The cancellation flag inside `Progress` is the only state the caller shares with
//! the search.

use super::{hybridization_networks, Options, Outcome, Progress};
use crate::error::{Error, Result};
use crate::tree::Tree;
use std::panic;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// A computation running in the background
pub struct Worker {
    /// The worker's thread
    thread: thread::JoinHandle<()>,

    /// The queue the outcome arrives on
    outcome: Receiver<Result<Outcome>>,

    /// Shared with the search
    progress: Progress,

    /// The outcome, once `wait` has seen it
    finished: Option<Result<Outcome>>,
}

impl Worker {
    /// Start computing the minimal networks of two trees
    pub fn spawn(tree1: Tree<String>, tree2: Tree<String>, options: Options) -> Self {
        let (sender, outcome) = channel();
        let progress = Progress::new();
        let shared = progress.clone();
        let thread = thread::spawn(move || {
            let result = hybridization_networks(&tree1, &tree2, &options, &shared);
            // The receiver is gone only if the handle was dropped, and then nobody wants the result
            let _ = sender.send(result);
        });
        Worker {
            thread,
            outcome,
            progress,
            finished: None,
        }
    }

    /// The progress of the computation
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Ask the computation to stop.  It still delivers an outcome, flagged as inexact.
    pub fn cancel(&self) {
        debug!("cancelling search after {} steps", self.progress.steps());
        self.progress.cancel();
    }

    /// Wait for the computation to finish for at most `timeout`.  Returns whether it has
    /// finished.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        if self.finished.is_none() {
            match self.outcome.recv_timeout(timeout) {
                Ok(result) => self.finished = Some(result),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => return true,
            }
        }
        true
    }

    /// Wait for the computation to finish and return its outcome.  A panic of the worker thread is
    /// passed on to the caller.
    pub fn join(self) -> Result<Outcome> {
        let result = match self.finished {
            Some(result) => Some(result),
            None => self.outcome.recv().ok(),
        };
        if let Err(panic) = self.thread.join() {
            panic::resume_unwind(panic);
        }
        result.unwrap_or(Err(Error::Cancelled))
    }
}
