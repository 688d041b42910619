//! Combining partial results.
//!
//! `isomorphism_merge` turns two trees whose alive parts are isomorphic into a single network.
//! The dead branches of both trees are kept, each hanging off the node it hung off in its own
//! tree and tagged with the tree it came from, so that the reticulations for the removed taxa can
//! be inserted later.
//!
//! `network_merge` substitutes the solution of a sub-problem for the placeholder leaf that stood
//! in for it.

use crate::error::{Error, Result};
use crate::network::{Network, NodeId, Origin};
use crate::taxa::{Taxon, TaxonSet};

/// Merge two trees with isomorphic alive parts into one network
pub fn isomorphism_merge(tree1: &Network, tree2: &Network) -> Result<Network> {
    let mut merged = Network::empty();
    let root = Merger {
        tree1,
        tree2,
        merged: &mut merged,
    }
    .merge(tree1.root(), tree2.root())?;
    merged.set_root(root);
    merged.recompute_taxa();
    Ok(merged)
}

/// The state of an isomorphism merge
struct Merger<'a> {
    tree1: &'a Network,
    tree2: &'a Network,
    merged: &'a mut Network,
}

impl<'a> Merger<'a> {
    /// Merge the subtrees below `node1` and `node2`.  Returns the top of the merged subtree.
    fn merge(&mut self, node1: NodeId, node2: NodeId) -> Result<NodeId> {
        let (tree1, tree2) = (self.tree1, self.tree2);
        let taxa = tree1[node1].taxa();
        if taxa != tree2[node2].taxa() {
            return Err(Error::NotIsomorphic(taxa.clone()));
        }

        // Chain nodes that carry dead branches become nodes of their own
        let mut chain = vec![];
        let node1 = self.walk_chain(Origin::First, node1, &mut chain);
        let node2 = self.walk_chain(Origin::Second, node2, &mut chain);

        let bottom = self.merge_branching(node1, node2)?;
        for pair in chain.windows(2) {
            self.merged.link(pair[0], pair[1], None);
        }
        Ok(match (chain.first(), chain.last()) {
            (Some(&top), Some(&last)) => {
                self.merged.link(last, bottom, None);
                top
            }
            _ => bottom,
        })
    }

    /// Follow the chain of nodes with a single alive child down from `node`, creating a node in
    /// the merged network for every chain node with dead branches.  Returns the node the chain
    /// ends at.
    fn walk_chain(&mut self, origin: Origin, node: NodeId, chain: &mut Vec<NodeId>) -> NodeId {
        let tree = self.tree(origin);
        let mut node = node;
        loop {
            let alive = tree.alive_children(node);
            if alive.len() != 1 {
                return node;
            }
            if !tree.dead_edges(node).is_empty() {
                let copy = self.merged.new_node(TaxonSet::new(), TaxonSet::new());
                self.copy_dead_branches(origin, node, copy);
                chain.push(copy);
            }
            node = alive[0];
        }
    }

    /// Merge two branching nodes or alive leaves
    fn merge_branching(&mut self, node1: NodeId, node2: NodeId) -> Result<NodeId> {
        let (tree1, tree2) = (self.tree1, self.tree2);
        let children1 = tree1.alive_children(node1);
        let children2 = tree2.alive_children(node2);
        if children1.len() != children2.len() {
            return Err(Error::NotIsomorphic(tree1[node1].taxa().clone()));
        }

        if children1.is_empty() {
            return Ok(self
                .merged
                .new_node(tree1[node1].taxa().clone(), TaxonSet::new()));
        }

        let node = self.merged.new_node(TaxonSet::new(), TaxonSet::new());
        for child1 in children1 {
            let taxa = tree1[child1].taxa();
            let child2 = children2
                .iter()
                .copied()
                .find(|&child2| tree2[child2].taxa() == taxa)
                .ok_or_else(|| Error::NotIsomorphic(taxa.clone()))?;
            let child = self.merge(child1, child2)?;
            self.merged.link(node, child, None);
        }
        self.copy_dead_branches(Origin::First, node1, node);
        self.copy_dead_branches(Origin::Second, node2, node);
        Ok(node)
    }

    /// Copy the dead branches below `node` into the merged network, below `copy`
    fn copy_dead_branches(&mut self, origin: Origin, node: NodeId, copy: NodeId) {
        let tree = self.tree(origin);
        for edge in tree.dead_edges(node) {
            let branch = self.merged.graft_subtree(tree, edge.target);
            self.merged.link(copy, branch, Some(origin));
        }
    }

    /// The tree with the given origin
    fn tree(&self, origin: Origin) -> &'a Network {
        match origin {
            Origin::First => self.tree1,
            Origin::Second => self.tree2,
        }
    }
}

/// Substitute `solution` for the leaf carrying `placeholder` in `target`.  If the placeholder is a
/// reticulation, the solution hangs below it; otherwise the solution takes the leaf's place.
pub fn network_merge(target: &Network, solution: &Network, placeholder: Taxon) -> Result<Network> {
    let mut network = target.clone();
    let leaf = network
        .leaf_of(placeholder)
        .ok_or(Error::MissingPlaceholder(placeholder))?;
    let root = network.graft(solution);
    let parents = network[leaf].parents().to_vec();
    match parents.as_slice() {
        [] => {
            network.remove_node(leaf);
            network.set_root(root);
        }
        [parent] => {
            network.redirect(*parent, leaf, root);
            network.remove_node(leaf);
        }
        _ => network.link(leaf, root, None),
    }
    network.recompute_taxa();
    Ok(network)
}

/// Substitute every solution into every target network
pub fn cross_merge(
    targets: &[Network],
    solutions: &[Network],
    placeholder: Taxon,
) -> Result<Vec<Network>> {
    let mut merged = Vec::with_capacity(targets.len() * solutions.len());
    for target in targets {
        for solution in solutions {
            merged.push(network_merge(target, solution, placeholder)?);
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::network::tests::{build, l, n};
    use crate::removal::remove;

    /// Merging two identical trees gives back the tree
    #[test]
    fn merge_identical() {
        let tree = build(&n(vec![n(vec![l(0), l(1)]), l(2), l(3)]));
        let merged = isomorphism_merge(&tree, &tree.clone()).unwrap();
        assert_eq!(merged.to_string(), "((0,1),2,3);");
        assert_eq!(merged.structural_hash(), tree.structural_hash());
    }

    /// Dead branches of both trees are kept and tagged with their origin
    #[test]
    fn merge_keeps_dead_branches() {
        let mut tree1 = build(&n(vec![n(vec![l(0), l(1)]), l(2)]));
        let mut tree2 = build(&n(vec![n(vec![l(0), l(2)]), l(1)]));
        let (root1, root2) = (tree1.root(), tree2.root());
        remove(&mut tree1, root1, Origin::First, 0);
        remove(&mut tree2, root2, Origin::Second, 0);
        let merged = isomorphism_merge(&tree1, &tree2).unwrap();
        assert_eq!(merged.to_string(), "((~0,1),(~0,2));");

        let tags = merged
            .leaves()
            .into_iter()
            .filter(|&leaf| merged[leaf].is_dead_leaf())
            .map(|leaf| merged.in_edges(leaf)[0].1)
            .collect::<Vec<_>>();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&Some(Origin::First)));
        assert!(tags.contains(&Some(Origin::Second)));
    }

    /// Trees that are not isomorphic cannot be merged
    #[test]
    fn merge_fails_on_different_trees() {
        let tree1 = build(&n(vec![n(vec![l(0), l(1)]), l(2)]));
        let tree2 = build(&n(vec![n(vec![l(0), l(2)]), l(1)]));
        assert!(matches!(
            isomorphism_merge(&tree1, &tree2),
            Err(Error::NotIsomorphic(_))
        ));
    }

    /// A solution takes the place of its placeholder leaf
    #[test]
    fn substitute_placeholder() {
        let target = build(&n(vec![l(2), l(5)]));
        let solution = build(&n(vec![l(0), l(1)]));
        let merged = network_merge(&target, &solution, 5).unwrap();
        assert_eq!(merged.to_string(), "((0,1),2);");
        assert!(matches!(
            network_merge(&target, &solution, 4),
            Err(Error::MissingPlaceholder(4))
        ));
    }

    /// A placeholder that is a reticulation keeps its two parents
    #[test]
    fn substitute_reticulate_placeholder() {
        let mut target = build(&n(vec![n(vec![l(1)]), l(2)]));
        let root = target.root();
        let inner = target.alive_children(root)[0];
        let leaf = target.new_leaf(5);
        target.link(inner, leaf, None);
        target.link(root, leaf, None);
        target.recompute_taxa();
        let solution = build(&n(vec![l(0), l(3)]));
        let merged = network_merge(&target, &solution, 5).unwrap();
        assert_eq!(merged.reticulations().len(), 1);
        let reticulation = merged.reticulations()[0];
        assert_eq!(
            merged[reticulation].taxa().iter().collect::<Vec<_>>(),
            vec![0, 3]
        );
    }

    /// Every target is combined with every solution
    #[test]
    fn cross_product() {
        let targets = vec![build(&n(vec![l(2), l(5)])), build(&n(vec![l(5), l(3)]))];
        let solutions = vec![build(&n(vec![l(0), l(1)])), build(&n(vec![l(0), l(4)]))];
        let merged = cross_merge(&targets, &solutions, 5).unwrap();
        assert_eq!(merged.len(), 4);
        assert_eq!(merged[3].to_string(), "((0,4),3);");
    }
}
