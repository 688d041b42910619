//! This module drives the computation of the hybridization number of two trees and of all
//! networks that realize it.
//!
//! The search is run with bounds 0, 1, 2, ... until it finds a network.  All states it refuted
//! under smaller bounds stay in the memo table, so each round starts where the last one stopped.
//! If the search is cancelled during the round with bound `k`, every smaller bound has been
//! refuted, so `k` is reported as a lower bound on the hybridization number.

pub mod cache;
pub mod context;
pub mod search;
pub mod worker;

pub use self::context::Progress;
pub use self::worker::Worker;

use self::cache::Cache;
use self::context::SearchContext;
use self::search::solve;
use crate::error::{Error, Result};
use crate::instance::{prepare, LabelledNetwork};
use crate::maaf::remove_duplicates;
use crate::tree::Tree;
use tracing::info;

/// The tunable parts of the search
#[derive(Clone, Debug)]
pub struct Options {
    /// Remember solved and refuted states
    pub use_cache: bool,

    /// The maximum number of states to remember
    pub cache_capacity: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            use_cache: true,
            cache_capacity: 100_000,
        }
    }
}

/// The result of a computation
#[derive(Clone, Debug)]
pub struct Outcome {
    /// The hybridization number, or a lower bound on it if the computation was cancelled
    pub hybridization_number: usize,

    /// Is `hybridization_number` exact?
    pub exact: bool,

    /// The minimal networks, without duplicates.  Empty if the computation was cancelled.
    pub networks: Vec<LabelledNetwork>,
}

/// Compute the hybridization number of two trees and all networks with this many reticulations
/// that display both trees.  Leaves found in only one tree are left out of the search and put
/// back into the networks afterwards.
pub fn hybridization_networks(
    tree1: &Tree<String>,
    tree2: &Tree<String>,
    options: &Options,
    progress: &Progress,
) -> Result<Outcome> {
    let instance = prepare(tree1, tree2)?;
    let cache = Cache::new(options.cache_capacity, options.use_cache);
    let mut ctx = SearchContext::new(instance.table.len(), cache, progress);

    let max_bound = instance.common.len();
    for bound in 0..=max_bound {
        progress.set_bound(bound);
        info!("looking for networks with {} reticulations", bound);
        let result = if progress.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            solve(
                &mut ctx,
                instance.tree1.clone(),
                instance.tree2.clone(),
                &instance.common,
                bound,
                false,
            )
        };
        let solution = match result {
            Ok(solution) => solution,
            Err(Error::Cancelled) => {
                info!("cancelled, hybridization number is at least {}", bound);
                ctx.cache.clear();
                return Ok(Outcome {
                    hybridization_number: bound,
                    exact: false,
                    networks: vec![],
                });
            }
            Err(e) => return Err(e),
        };

        if solution.is_reachable() {
            ctx.cache.clear();
            let count = solution.networks.len();
            let networks = remove_duplicates(solution.networks);
            info!(
                "hybridization number {}, {} networks, {} after removing duplicates",
                solution.cost,
                count,
                networks.len()
            );
            return Ok(Outcome {
                hybridization_number: solution.cost,
                exact: true,
                networks: instance.finish(networks),
            });
        }
    }
    ctx.cache.clear();
    Err(Error::Exhausted(max_bound))
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::newick;
    use crate::tree::TreeBuilder;

    fn run(newick: &str, options: &Options) -> Outcome {
        let mut builder = TreeBuilder::new();
        newick::parse_forest(&mut builder, newick).unwrap();
        let trees = builder.trees();
        hybridization_networks(&trees[0], &trees[1], options, &Progress::new()).unwrap()
    }

    /// Identical trees give back the tree
    #[test]
    fn identical_trees() {
        let outcome = run("((a,b),(c,d));\n((a,b),(c,d));\n", &Options::default());
        assert_eq!(outcome.hybridization_number, 0);
        assert!(outcome.exact);
        assert_eq!(outcome.networks.len(), 1);
        assert_eq!(outcome.networks[0].to_string(), "((a,b),(c,d));");
    }

    /// One misplaced taxon needs one reticulation
    #[test]
    fn one_reticulation() {
        let outcome = run("(((a,b),c),d);\n(((a,c),b),d);\n", &Options::default());
        assert_eq!(outcome.hybridization_number, 1);
        for network in &outcome.networks {
            assert_eq!(network.reticulation_count(), 1);
        }
    }

    /// The cache does not change the result
    #[test]
    fn without_cache() {
        let newick = "((a,(b,c)),(d,e));\n((a,d),((b,e),c));\n";
        let cached = run(newick, &Options::default());
        let uncached = run(
            newick,
            &Options {
                use_cache: false,
                ..Options::default()
            },
        );
        assert_eq!(cached.hybridization_number, uncached.hybridization_number);
        assert_eq!(cached.networks.len(), uncached.networks.len());
    }

    /// A search cancelled before it starts reports a lower bound of zero
    #[test]
    fn cancelled() {
        let mut builder = TreeBuilder::new();
        newick::parse_forest(&mut builder, "((a,b),c);\n((a,c),b);\n").unwrap();
        let trees = builder.trees();
        let progress = Progress::new();
        progress.cancel();
        let outcome =
            hybridization_networks(&trees[0], &trees[1], &Options::default(), &progress).unwrap();
        assert!(!outcome.exact);
        assert_eq!(outcome.hybridization_number, 0);
        assert!(outcome.networks.is_empty());
    }

    /// Trees without a common taxon are rejected
    #[test]
    fn disjoint() {
        let mut builder = TreeBuilder::new();
        newick::parse_forest(&mut builder, "(a,b);\n(c,d);\n").unwrap();
        let trees = builder.trees();
        assert!(matches!(
            hybridization_networks(&trees[0], &trees[1], &Options::default(), &Progress::new()),
            Err(Error::DisjointTaxa)
        ));
    }
}
