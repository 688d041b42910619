//! Building blocks shared by subtree and cluster reduction: walking down chains of nodes with a
//! single alive child, testing two subtrees for isomorphism, and detaching matched subtrees from
//! both trees in exchange for a placeholder leaf.

use crate::error::{Error, Result};
use crate::network::{Network, NodeId};
use crate::taxa::{Taxon, TaxonSet};

/// A pair of subtrees cut out of the two trees by a reduction.  Both trees now carry a leaf for
/// `placeholder` where the subtrees used to be.
#[derive(Clone, Debug)]
pub struct Detached {
    /// The subtree cut out of the first tree
    pub first: Network,

    /// The subtree cut out of the second tree
    pub second: Network,

    /// The taxon of the leaf that replaced the subtrees
    pub placeholder: Taxon,
}

/// The first node at or below `node` that does not have exactly one alive child.  This is either
/// a branching node or an alive leaf.
pub fn branching(tree: &Network, node: NodeId) -> NodeId {
    let mut node = node;
    loop {
        let alive = tree.alive_children(node);
        if alive.len() != 1 {
            return node;
        }
        node = alive[0];
    }
}

/// Fail unless both trees carry the same alive taxa
pub fn check_taxa(tree1: &Network, tree2: &Network) -> Result<()> {
    let (first, second) = (tree1[tree1.root()].taxa(), tree2[tree2.root()].taxa());
    if first == second {
        Ok(())
    } else {
        Err(Error::TaxonMismatch {
            first: first.clone(),
            second: second.clone(),
        })
    }
}

/// Are the alive parts of the subtrees below `node1` and `node2` isomorphic?  Chains and dead
/// branches are ignored.
pub fn is_isomorphic(tree1: &Network, node1: NodeId, tree2: &Network, node2: NodeId) -> bool {
    if tree1[node1].taxa() != tree2[node2].taxa() {
        return false;
    }
    let (node1, node2) = (branching(tree1, node1), branching(tree2, node2));
    let children1 = tree1.alive_children(node1);
    let children2 = tree2.alive_children(node2);
    if children1.len() != children2.len() {
        return false;
    }
    children1.into_iter().all(|child1| {
        let taxa = tree1[child1].taxa();
        children2
            .iter()
            .find(|&&child2| tree2[child2].taxa() == taxa)
            .map_or(false, |&child2| is_isomorphic(tree1, child1, tree2, child2))
    })
}

/// Cut the given alive children of `parent` out of the tree and hang a leaf for `placeholder`
/// below `parent` instead.  A single node is replaced in place, below the chain leading to it.
/// Several nodes are grouped under a new root in the returned subtree.
pub fn detach(tree: &mut Network, parent: NodeId, nodes: &[NodeId], placeholder: Taxon) -> Network {
    let subtree = if let [node] = nodes {
        let node = *node;
        let subtree = Network::from_subnetwork(tree, node);
        let leaf = tree.new_leaf(placeholder);
        match tree[node].parents().first().copied() {
            Some(above) => {
                tree.redirect(above, node, leaf);
            }
            None => tree.set_root(leaf),
        }
        tree.remove_subtree(node);
        subtree
    } else {
        let mut subtree = Network::empty();
        let root = subtree.new_node(TaxonSet::new(), TaxonSet::new());
        subtree.set_root(root);
        for &node in nodes {
            let copy = subtree.graft_subtree(tree, node);
            subtree.link(root, copy, None);
            tree.remove_subtree(node);
        }
        subtree.recompute_taxa();
        let leaf = tree.new_leaf(placeholder);
        tree.link(parent, leaf, None);
        subtree
    };
    tree.recompute_taxa();
    subtree
}
