//! The recursive branch-and-bound search for all minimal hybridization networks of two trees.
//!
//! A state of the search consists of the two trees, the taxa that may still become reticulations
//! and an upper bound on the number of reticulations the caller is interested in.  A state is
//! solved by reducing it first: isomorphic trees are merged into a tree, a common subtree is
//! replaced by a placeholder leaf, and a common cluster splits the state into two independent
//! states.  Only an irreducible state is branched on, by removing each candidate taxon from both
//! trees in turn.  The networks of the cheapest branches receive a reticulation for the removed
//! taxon.
//!
//! Every state either yields its exact minimum together with all networks achieving it, or
//! reports that its minimum exceeds the bound.  Both outcomes are remembered in the memo table.

use super::cache::{Entry, Key};
use super::context::SearchContext;
use crate::clusters;
use crate::error::Result;
use crate::hybrid::insert_hybrids;
use crate::merge::{cross_merge, isomorphism_merge};
use crate::network::{Network, Origin};
use crate::reduction::is_isomorphic;
use crate::refine::refine;
use crate::removal::remove;
use crate::subtrees::{self, SubtreeReduction};
use crate::taxa::TaxonSet;
use tracing::debug;

/// The cost of a state whose minimum exceeds the bound it was searched with
pub const UNREACHABLE: usize = usize::MAX / 2;

/// The result of searching a state
#[derive(Clone, Debug)]
pub struct Solution {

    /// The minimum number of reticulations, or `UNREACHABLE`
    pub cost: usize,

    /// All networks with `cost` reticulations.  Empty if the state is unreachable.
    pub networks: Vec<Network>,
}

impl Solution {

    /// A state whose minimum exceeds the bound
    fn unreachable() -> Self {
        Solution {
            cost: UNREACHABLE,
            networks: vec![],
        }
    }

    /// Was a network found?
    pub fn is_reachable(&self) -> bool {
        self.cost != UNREACHABLE
    }
}

/// Find all networks with the minimum number of reticulations that display the two trees,
/// provided this minimum is at most `bound`.  Only taxa in `candidates` may become reticulations.
/// If `reduced` is set, the trees are known to have no common subtree.
pub fn solve(
    ctx: &mut SearchContext,
    tree1: Network,
    tree2: Network,
    candidates: &TaxonSet,
    bound: usize,
    reduced: bool,
) -> Result<Solution> {
    ctx.checkpoint()?;

    let key = Key::new(&tree1, &tree2, candidates);
    match ctx.cache.get(&key) {
        Some(Entry::Exact { cost, networks }) => {
            return Ok(if *cost <= bound {
                Solution {
                    cost: *cost,
                    networks: networks.clone(),
                }
            } else {
                Solution::unreachable()
            });
        }
        Some(Entry::LowerBound(lower)) if *lower > bound => return Ok(Solution::unreachable()),
        _                                                => (),
    }

    let solution = solve_uncached(ctx, tree1, tree2, candidates, bound, reduced)?;
    let entry = if solution.is_reachable() {
        Entry::Exact {
            cost: solution.cost,
            networks: solution.networks.clone(),
        }
    } else {
        Entry::LowerBound(bound + 1)
    };
    ctx.cache.store(key, entry);
    Ok(solution)
}

/// Reduce the state if possible and branch otherwise
fn solve_uncached(
    ctx: &mut SearchContext,
    mut tree1: Network,
    mut tree2: Network,
    candidates: &TaxonSet,
    bound: usize,
    reduced: bool,
) -> Result<Solution> {
    if reduced {
        if is_isomorphic(&tree1, tree1.root(), &tree2, tree2.root()) {
            return merged(&tree1, &tree2);
        }
    } else {
        match subtrees::reduce(&mut tree1, &mut tree2, ctx.placeholders())? {
            SubtreeReduction::Isomorphic => return merged(&tree1, &tree2),
            SubtreeReduction::Reduced(detached) => {
                let mut extended = candidates.clone();
                extended.insert(detached.placeholder);
                let solution = solve(ctx, tree1, tree2, &extended, bound, false)?;
                if !solution.is_reachable() {
                    return Ok(solution);
                }
                let subtree  = isomorphism_merge(&detached.first, &detached.second)?;
                let networks = cross_merge(&solution.networks, &[subtree], detached.placeholder)?;
                return Ok(Solution {
                    cost: solution.cost,
                    networks,
                });
            }
            SubtreeReduction::Irreducible => (),
        }
    }

    if let Some(detached) = clusters::reduce(&mut tree1, &mut tree2, ctx.placeholders())? {
        let bottom = solve(
            ctx,
            detached.first,
            detached.second,
            candidates,
            bound,
            true,
        )?;
        if !bottom.is_reachable() {
            return Ok(bottom);
        }

        let mut extended = candidates.clone();
        extended.insert(detached.placeholder);
        let top = solve(ctx, tree1, tree2, &extended, bound - bottom.cost, false)?;
        if !top.is_reachable() {
            return Ok(top);
        }

        debug!(
            "cluster {} costs {}, the rest costs {}",
            detached.placeholder, bottom.cost, top.cost
        );
        let networks = cross_merge(&top.networks, &bottom.networks, detached.placeholder)?;
        return Ok(Solution {
            cost: bottom.cost + top.cost,
            networks,
        });
    }

    branch(ctx, &tree1, &tree2, candidates, bound)
}

/// The single network of two isomorphic trees
fn merged(tree1: &Network, tree2: &Network) -> Result<Solution> {
    Ok(Solution {
        cost: 0,
        networks: vec![isomorphism_merge(tree1, tree2)?],
    })
}

/// Try every candidate taxon as the next reticulation and keep the networks of the cheapest
/// choices.  The bound tightens as soon as a cheaper choice is found.
fn branch(
    ctx: &mut SearchContext,
    tree1: &Network,
    tree2: &Network,
    candidates: &TaxonSet,
    bound: usize,
) -> Result<Solution> {
    if bound == 0 {
        return Ok(Solution::unreachable());
    }

    let mut taxa = tree1
        .leaves()
        .into_iter()
        .filter_map(|leaf| tree1[leaf].taxa().first())
        .filter(|&taxon| candidates.contains(taxon))
        .collect::<Vec<_>>();
    taxa.sort_unstable();

    let mut best  = Solution::unreachable();
    let mut bound = bound;
    for taxon in taxa {
        let mut copy1      = tree1.clone();
        let mut copy2      = tree2.clone();
        let (root1, root2) = (copy1.root(), copy2.root());
        remove(&mut copy1, root1, Origin::First, taxon);
        remove(&mut copy2, root2, Origin::Second, taxon);
        refine(&mut copy1, &mut copy2);

        let mut remaining = candidates.clone();
        remaining.remove(taxon);
        let solution = solve(ctx, copy1, copy2, &remaining, bound - 1, false)?;
        if !solution.is_reachable() {
            continue;
        }

        let cost = solution.cost + 1;
        debug!("removing taxon {} costs {}", taxon, cost);
        let networks = insert_hybrids(solution.networks, taxon)?;
        if cost < best.cost {
            best = Solution { cost, networks };
            bound = cost;
        } else if cost == best.cost {
            best.networks.extend(networks);
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {

    use super::super::cache::Cache;
    use super::super::context::Progress;
    use super::*;
    use crate::network::tests::{build, l, n};

    fn all(count: usize) -> TaxonSet {
        let mut taxa = TaxonSet::new();
        for taxon in 0..count {
            taxa.insert(taxon);
        }
        taxa
    }

    /// Solve with increasing bounds until a solution is found
    fn minimum(tree1: Network, tree2: Network, taxa: usize, use_cache: bool) -> Solution {
        let progress = Progress::new();
        let mut ctx  = SearchContext::new(taxa, Cache::new(1000, use_cache), &progress);
        for bound in 0..=taxa {
            let solution = solve(
                &mut ctx,
                tree1.clone(),
                tree2.clone(),
                &all(taxa),
                bound,
                false,
            )
            .unwrap();
            if solution.is_reachable() {
                return solution;
            }
        }
        panic!("no solution found");
    }

    /// Identical trees need no reticulation
    #[test]
    fn identical() {
        let tree     = build(&n(vec![n(vec![l(0), l(1)]), n(vec![l(2), l(3)])]));
        let solution = minimum(tree.clone(), tree.clone(), 4, true);
        assert_eq!(solution.cost, 0);
        assert_eq!(solution.networks.len(), 1);
        assert_eq!(solution.networks[0].to_string(), tree.to_string());
    }

    /// A bound below the minimum finds nothing
    #[test]
    fn bound_too_small() {
        let tree1    = build(&n(vec![n(vec![l(0), l(1)]), l(2)]));
        let tree2    = build(&n(vec![n(vec![l(0), l(2)]), l(1)]));
        let progress = Progress::new();
        let mut ctx  = SearchContext::new(3, Cache::new(1000, true), &progress);
        let solution = solve(&mut ctx, tree1, tree2, &all(3), 0, false).unwrap();
        assert!(!solution.is_reachable());
        assert!(solution.networks.is_empty());
    }

    /// Each of the three taxa of a rooted triple conflict can be the reticulation
    #[test]
    fn triple() {
        let tree1    = build(&n(vec![n(vec![l(0), l(1)]), l(2)]));
        let tree2    = build(&n(vec![n(vec![l(0), l(2)]), l(1)]));
        let solution = minimum(tree1, tree2, 3, true);
        assert_eq!(solution.cost, 1);
        assert!(!solution.networks.is_empty());
        for network in &solution.networks {
            let reticulations = network.reticulations();
            assert_eq!(reticulations.len(), 1);
            assert_eq!(network[reticulations[0]].taxa().len(), 1);
        }
    }

    /// Two independent conflicts need two reticulations
    #[test]
    fn two_clusters() {
        let tree1 = build(&n(vec![
            n(vec![n(vec![l(0), l(1)]), l(2)]),
            n(vec![n(vec![l(3), l(4)]), l(5)]),
        ]));
        let tree2 = build(&n(vec![
            n(vec![n(vec![l(0), l(2)]), l(1)]),
            n(vec![n(vec![l(3), l(5)]), l(4)]),
        ]));
        let cached   = minimum(tree1.clone(), tree2.clone(), 6, true);
        let uncached = minimum(tree1, tree2, 6, false);
        assert_eq!(cached.cost, 2);
        assert_eq!(uncached.cost, 2);
        assert_eq!(cached.networks.len(), uncached.networks.len());
        for network in &cached.networks {
            assert_eq!(network.reticulations().len(), 2);
        }
    }

    /// A cancelled search stops with an error
    #[test]
    fn cancelled() {
        let tree1    = build(&n(vec![n(vec![l(0), l(1)]), l(2)]));
        let tree2    = build(&n(vec![n(vec![l(0), l(2)]), l(1)]));
        let progress = Progress::new();
        progress.cancel();
        let mut ctx = SearchContext::new(3, Cache::new(1000, true), &progress);
        assert!(solve(&mut ctx, tree1, tree2, &all(3), 3, false).is_err());
    }
}
