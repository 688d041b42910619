//! The state a search carries through its recursion: the generator of placeholder taxa, the memo
//! table and the checkpoint at which progress is reported and cancellation is noticed.
//!
//! Checkpoints are cheap to call often.  They look at the clock only, and do real work only when
//! the current checking interval has passed.  The interval starts short and doubles after every
//! check up to a limit, so short searches react to cancellation quickly and long searches do not
//! pay for checking too often.

use super::cache::Cache;
use crate::error::{Error, Result};
use crate::taxa::{Placeholders, Taxon};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

/// The first checking interval
const FIRST_INTERVAL: Duration = Duration::from_millis(10);

/// The longest checking interval
const MAX_INTERVAL: Duration = Duration::from_secs(1);

/// A handle shared between a search and whoever watches it.  It carries the cancellation flag, a
/// coarse progress counter that is bumped at every checkpoint and the bound of the current round.
#[derive(Clone, Debug, Default)]
pub struct Progress {
    cancelled: Arc<AtomicBool>,
    steps: Arc<AtomicUsize>,
    bound: Arc<AtomicUsize>,
}

impl Progress {
    /// Create a handle for a search that has not started yet
    pub fn new() -> Self {
        Progress::default()
    }

    /// Ask the search to stop at its next checkpoint
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Has cancellation been requested?
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// The number of checkpoints the search has passed
    pub fn steps(&self) -> usize {
        self.steps.load(Ordering::Relaxed)
    }

    /// The number of reticulations the current round of the search allows.  All smaller numbers
    /// have been refuted.
    pub fn bound(&self) -> usize {
        self.bound.load(Ordering::SeqCst)
    }

    pub(crate) fn tick(&self) {
        self.steps.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set_bound(&self, bound: usize) {
        self.bound.store(bound, Ordering::SeqCst);
    }
}

/// The mutable state of one top-level search
pub struct SearchContext<'a> {
    /// Hands out taxa for placeholder leaves
    placeholders: Placeholders,

    /// The memo table
    pub cache: Cache,

    /// Shared with the caller
    progress: &'a Progress,

    /// When the next checkpoint does real work
    next_check: Instant,

    /// The current checking interval
    interval: Duration,
}

impl<'a> SearchContext<'a> {
    /// Create the context of a search whose placeholder taxa start at `first_placeholder`
    pub fn new(first_placeholder: Taxon, cache: Cache, progress: &'a Progress) -> Self {
        SearchContext {
            placeholders: Placeholders::new(first_placeholder),
            cache,
            progress,
            next_check: Instant::now(),
            interval: FIRST_INTERVAL,
        }
    }

    /// The generator of placeholder taxa
    pub fn placeholders(&mut self) -> &mut Placeholders {
        &mut self.placeholders
    }

    /// Report progress and check for cancellation if the checking interval has passed
    pub fn checkpoint(&mut self) -> Result<()> {
        let now = Instant::now();
        if now < self.next_check {
            return Ok(());
        }
        self.progress.tick();
        if self.progress.is_cancelled() {
            trace!("search cancelled after {} steps", self.progress.steps());
            return Err(Error::Cancelled);
        }
        self.next_check = now + self.interval;
        self.interval = (self.interval * 2).min(MAX_INTERVAL);
        Ok(())
    }
}
