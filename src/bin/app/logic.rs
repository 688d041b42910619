//! This module implements the application logic of `autumn`: it runs the search on a worker thread
//! and cancels it once the time limit passes.

use crate::app;
use autumn::tree::Tree;
use autumn::{Outcome, Worker};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How often the main thread reports progress while it waits
const REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Compute the hybridization number and the minimal networks of two trees
pub fn hybridization_networks(
    cfg: &app::Config,
    tree1: Tree<String>,
    tree2: Tree<String>,
) -> app::Result<Outcome> {
    info!(
        "trees with {} and {} leaves",
        tree1.leaf_labels().len(),
        tree2.leaf_labels().len()
    );
    let mut worker = Worker::spawn(tree1, tree2, cfg.options.clone());
    let start = Instant::now();
    loop {
        let timeout = match cfg.time_limit {
            Some(limit) => match limit.checked_sub(start.elapsed()) {
                Some(left) => left.min(REPORT_INTERVAL),
                None => {
                    warn!("time limit of {}s reached", limit.as_secs());
                    worker.cancel();
                    break;
                }
            },
            None => REPORT_INTERVAL,
        };
        if worker.wait(timeout) {
            break;
        }
        info!(
            "searching for {}s with {} reticulations, {} steps so far",
            start.elapsed().as_secs(),
            worker.progress().bound(),
            worker.progress().steps()
        );
    }
    Ok(worker.join()?)
}
