//! Maximum agreement forests of networks, used to recognize networks that differ only in
//! redundant structure.
//!
//! The forest of a network is obtained by cutting every edge into a reticulation, splicing out
//! nodes with one parent and one child, and then repeatedly dropping roots with a single child and
//! leaves without a taxon.  What remains is a set of disjoint rooted trees, kept in canonical form
//! so that forests can be compared directly.  The extended variant keeps dead leaves.

use crate::network::{Network, NodeId};
use crate::taxa::TaxonSet;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// A tree of the forest in canonical form: children are sorted and leaves are identified by their
/// taxa
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Shape {
    /// The alive taxa below this node
    pub taxa: TaxonSet,

    /// The removed taxa below this node
    pub removed: TaxonSet,

    /// The children of this node, in sorted order
    pub children: Vec<Shape>,
}

/// A maximum agreement forest: its trees in sorted order
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Maaf(pub Vec<Shape>);

impl Maaf {
    /// Build a network holding the trees of the forest below a root without taxa
    pub fn to_network(&self) -> Network {
        let mut network = Network::empty();
        let root = network.new_node(TaxonSet::new(), TaxonSet::new());
        network.set_root(root);
        for shape in &self.0 {
            let node = add_shape(&mut network, shape);
            network.link(root, node, None);
        }
        network
    }
}

/// Add the nodes of a shape to the network.  Returns the top node.
fn add_shape(network: &mut Network, shape: &Shape) -> NodeId {
    let node = network.new_node(shape.taxa.clone(), shape.removed.clone());
    for child in &shape.children {
        let child = add_shape(network, child);
        network.link(node, child, None);
    }
    node
}

/// Compute the maximum agreement forest of a network
pub fn compute_maaf(network: &Network) -> Maaf {
    forest(network, false)
}

/// Compute the extended maximum agreement forest of a network, which keeps dead leaves
pub fn compute_extended_maaf(network: &Network) -> Maaf {
    forest(network, true)
}

fn forest(network: &Network, extended: bool) -> Maaf {
    let mut network = network.clone();
    let leaves = network
        .node_ids()
        .into_iter()
        .filter(|&node| network[node].is_leaf())
        .collect::<HashSet<_>>();

    // Roots built by `Maaf::to_network` only hold the forest together
    for node in network.node_ids() {
        let data = &network[node];
        if data.parents().is_empty()
            && !data.is_leaf()
            && data.taxa().is_empty()
            && data.removed().is_empty()
        {
            network.remove_node(node);
        }
    }

    for node in network.node_ids() {
        if network[node].parents().len() > 1 {
            for parent in network[node].parents().to_vec() {
                network.unlink(parent, node);
            }
        }
    }
    splice(&mut network);

    loop {
        let mut changed = false;
        for node in network.node_ids() {
            let data = &network[node];
            let redundant_root = data.parents().is_empty() && data.children().len() == 1;
            let labelled = leaves.contains(&node) && (extended || data.taxa().len() == 1);
            if redundant_root || (data.is_leaf() && !labelled) {
                network.remove_node(node);
                changed = true;
            }
        }
        if !changed && splice(&mut network) == 0 {
            break;
        }
    }

    let mut trees = network
        .node_ids()
        .into_iter()
        .filter(|&node| network[node].parents().is_empty())
        .map(|node| shape(&network, node))
        .collect::<Vec<_>>();
    trees.sort();
    Maaf(trees)
}

/// Splice out every node with one parent and one child, wherever it is
fn splice(network: &mut Network) -> usize {
    let mut count = 0;
    for node in network.node_ids() {
        if network.splice(node) {
            count += 1;
        }
    }
    count
}

/// The canonical shape of the tree below `node`
fn shape(network: &Network, node: NodeId) -> Shape {
    let data = &network[node];
    if data.is_leaf() {
        return Shape {
            taxa: data.taxa().clone(),
            removed: data.removed().clone(),
            children: vec![],
        };
    }
    let mut children = data
        .children()
        .iter()
        .map(|edge| shape(network, edge.target))
        .collect::<Vec<_>>();
    children.sort();
    let mut taxa = TaxonSet::new();
    let mut removed = TaxonSet::new();
    for child in &children {
        taxa.union_with(&child.taxa);
        removed.union_with(&child.removed);
    }
    removed.difference_with(&taxa);
    Shape {
        taxa,
        removed,
        children,
    }
}

/// Drop every network whose maximum agreement forest equals that of an earlier network.  A warning
/// is logged if two networks share a forest but not an extended forest.
pub fn remove_duplicates(networks: Vec<Network>) -> Vec<Network> {
    let mut seen: HashMap<Maaf, (usize, Maaf)> = HashMap::new();
    let mut unique = vec![];
    for network in networks {
        let maaf = compute_maaf(&network);
        let extended = compute_extended_maaf(&network);
        match seen.get(&maaf) {
            Some((index, first)) => {
                if *first != extended {
                    warn!(
                        "{} and {} share an agreement forest but not an extended one",
                        unique[*index], network
                    );
                }
            }
            None => {
                seen.insert(maaf, (unique.len(), extended));
                unique.push(network);
            }
        }
    }
    unique
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::hybrid::insert_hybrid;
    use crate::merge::isomorphism_merge;
    use crate::network::tests::{build, l, n};
    use crate::network::Origin;
    use crate::removal::remove;

    /// The network with a reticulation for `taxon` displaying ((0,1),2) and ((0,2),1)
    fn network_with_hybrid(taxon: usize) -> Network {
        let mut tree1 = build(&n(vec![n(vec![l(0), l(1)]), l(2)]));
        let mut tree2 = build(&n(vec![n(vec![l(0), l(2)]), l(1)]));
        let (root1, root2) = (tree1.root(), tree2.root());
        remove(&mut tree1, root1, Origin::First, taxon);
        remove(&mut tree2, root2, Origin::Second, taxon);
        let mut network = isomorphism_merge(&tree1, &tree2).unwrap();
        insert_hybrid(&mut network, taxon).unwrap();
        network
    }

    /// The forest of a tree is the tree itself
    #[test]
    fn forest_of_tree() {
        let tree = build(&n(vec![n(vec![l(0), l(1)]), l(2)]));
        let maaf = compute_maaf(&tree);
        assert_eq!(maaf.0.len(), 1);
        assert_eq!(maaf.to_network().to_string(), "(((0,1),2));");
    }

    /// Cutting the reticulation leaves the hybrid taxon as a tree of its own
    #[test]
    fn forest_of_network() {
        let network = network_with_hybrid(0);
        let maaf = compute_maaf(&network);
        assert_eq!(maaf.0.len(), 2);
        assert_eq!(maaf.to_network().to_string(), "(0,(1,2));");
    }

    /// Computing the forest of a forest changes nothing
    #[test]
    fn idempotent() {
        for network in vec![network_with_hybrid(0), network_with_hybrid(1)] {
            let maaf = compute_maaf(&network);
            assert_eq!(compute_maaf(&maaf.to_network()), maaf);
        }
    }

    /// Dead leaves are dropped by the forest but kept by the extended forest
    #[test]
    fn extended_keeps_dead_leaves() {
        let mut tree = build(&n(vec![n(vec![l(0), l(1)]), l(2)]));
        let root = tree.root();
        remove(&mut tree, root, Origin::First, 0);
        assert_eq!(compute_maaf(&tree).to_network().to_string(), "((1,2));");
        assert_eq!(
            compute_extended_maaf(&tree).to_network().to_string(),
            "(((~0,1),2));"
        );
    }

    /// Networks with the same forest are duplicates
    #[test]
    fn duplicates() {
        let networks = vec![
            network_with_hybrid(0),
            network_with_hybrid(1),
            network_with_hybrid(0),
        ];
        let unique = remove_duplicates(networks);
        assert_eq!(unique.len(), 2);
    }

    /// The tree ((0,1),2) with a dead leaf for taxon 5 hanging from the cherry or from the root
    fn tree_with_dead_leaf(below_cherry: bool) -> Network {
        let mut network = build(&n(vec![n(vec![l(0), l(1)]), l(2)]));
        let root = network.root();
        let parent = if below_cherry {
            network
                .alive_children(root)
                .into_iter()
                .find(|&child| network[child].taxa().len() == 2)
                .unwrap()
        } else {
            root
        };
        let dead = network.new_node(TaxonSet::new(), TaxonSet::singleton(5));
        network.link(parent, dead, Some(Origin::First));
        network.recompute_taxa();
        network
    }

    /// Networks that share a forest but not an extended forest are still duplicates: the first one
    /// is kept and later networks are processed as usual
    #[test]
    fn duplicates_with_different_extended_forests() {
        let first = tree_with_dead_leaf(true);
        let second = tree_with_dead_leaf(false);
        assert_eq!(compute_maaf(&first), compute_maaf(&second));
        assert_ne!(compute_extended_maaf(&first), compute_extended_maaf(&second));

        let third = network_with_hybrid(0);
        let unique = remove_duplicates(vec![first.clone(), second, third.clone()]);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].structural_hash(), first.structural_hash());
        assert_eq!(unique[1].structural_hash(), third.structural_hash());
    }
}
