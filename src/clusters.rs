//! Cluster reduction.  If both trees contain a common cluster, that is, a proper subset of the taxa
//! that forms a clade of both trees, the hybridization number of the two trees is the sum of the
//! hybridization numbers of the two trees restricted to the cluster (the "bottom" problem) and of
//! the two trees with the cluster collapsed into a single leaf (the "top" problem).
//!
//! Common clusters are found in two ways.  First, the alive children of the two topmost branching
//! nodes form a bipartite intersection graph, with an edge between two children whose taxa
//! intersect.  Every connected component of this graph covers the same taxa in both trees; a
//! component that does not cover all taxa is a common cluster even if it is not a node in either
//! tree, because the two branching nodes are multifurcations that can be resolved to group it.
//! If the graph is connected, the trees are searched for a common cluster further down.

use crate::error::{Error, Result};
use crate::network::{Network, NodeId};
use crate::reduction::{branching, check_taxa, detach, Detached};
use crate::taxa::{Placeholders, Taxon, TaxonSet};
use std::collections::HashMap;
use tracing::debug;

/// Look for a common cluster of the two trees.  If there is one, cut it out of both trees, replace
/// it by a placeholder leaf and return the cut-out subtrees.
pub fn reduce(
    tree1: &mut Network,
    tree2: &mut Network,
    placeholders: &mut Placeholders,
) -> Result<Option<Detached>> {
    check_taxa(tree1, tree2)?;
    let (nodes1, nodes2) = match component_cluster(tree1, tree2)? {
        Some(nodes) => nodes,
        None => match node_cluster(tree1, tree2) {
            Some((node1, node2)) => (vec![node1], vec![node2]),
            None => return Ok(None),
        },
    };

    let placeholder = placeholders.fresh();
    let first = cut(tree1, &nodes1, placeholder);
    let second = cut(tree2, &nodes2, placeholder);
    debug!(
        "cluster reduction: {:?} becomes placeholder {}",
        first[first.root()].taxa(),
        placeholder
    );
    check_taxa(tree1, tree2)?;
    check_taxa(&first, &second)?;
    Ok(Some(Detached {
        first,
        second,
        placeholder,
    }))
}

/// Cut the given siblings out of the tree.  A single node is cut below the chain leading to it.
fn cut(tree: &mut Network, nodes: &[NodeId], placeholder: Taxon) -> Network {
    let parent = branching(tree, tree.root());
    match nodes {
        [node] => {
            let node = branching(tree, *node);
            detach(tree, parent, &[node], placeholder)
        }
        _ => detach(tree, parent, nodes, placeholder),
    }
}

/// Find a component of the intersection graph of the children of the topmost branching nodes that
/// covers more than one taxon but not all of them.  Returns the children in the component.
fn component_cluster(
    tree1: &Network,
    tree2: &Network,
) -> Result<Option<(Vec<NodeId>, Vec<NodeId>)>> {
    let children1 = tree1.alive_children(branching(tree1, tree1.root()));
    let children2 = tree2.alive_children(branching(tree2, tree2.root()));
    let all = tree1[tree1.root()].taxa();

    let mut components = Components::new(children1.len() + children2.len());
    for (i, &child1) in children1.iter().enumerate() {
        for (j, &child2) in children2.iter().enumerate() {
            if tree1[child1].taxa().intersects(tree2[child2].taxa()) {
                components.union(i, children1.len() + j);
            }
        }
    }

    let mut seen = vec![];
    for i in 0..children1.len() {
        let id = components.find(i);
        if seen.contains(&id) {
            continue;
        }
        seen.push(id);

        let members1 = (0..children1.len())
            .filter(|&k| components.find(k) == id)
            .map(|k| children1[k])
            .collect::<Vec<_>>();
        let members2 = (0..children2.len())
            .filter(|&k| components.find(children1.len() + k) == id)
            .map(|k| children2[k])
            .collect::<Vec<_>>();
        let taxa1 = union_of(tree1, &members1);
        let taxa2 = union_of(tree2, &members2);
        if taxa1 != taxa2 {
            return Err(Error::TaxonMismatch {
                first: taxa1,
                second: taxa2,
            });
        }
        if taxa1.len() > 1 && &taxa1 != all {
            return Ok(Some((members1, members2)));
        }
    }
    Ok(None)
}

/// Find the topmost branching node of the first tree whose cluster is a proper cluster of the
/// second tree as well
fn node_cluster(tree1: &Network, tree2: &Network) -> Option<(NodeId, NodeId)> {
    let all = tree1[tree1.root()].taxa();

    let mut order2 = tree2.postorder();
    order2.reverse();
    let mut index: HashMap<&TaxonSet, NodeId> = HashMap::new();
    for node in order2 {
        let taxa = tree2[node].taxa();
        if taxa.len() > 1 && taxa != all {
            index.entry(taxa).or_insert(node);
        }
    }

    let mut order1 = tree1.postorder();
    order1.reverse();
    order1
        .into_iter()
        .filter(|&node| tree1.alive_children(node).len() > 1)
        .find_map(|node| {
            index
                .get(tree1[node].taxa())
                .map(|&node2| (node, node2))
        })
}

/// The union of the alive taxa of the given nodes
fn union_of(tree: &Network, nodes: &[NodeId]) -> TaxonSet {
    let mut taxa = TaxonSet::new();
    for &node in nodes {
        taxa.union_with(tree[node].taxa());
    }
    taxa
}

/// A union-find structure over the children of the two branching nodes
struct Components {
    parent: Vec<usize>,
}

impl Components {
    /// Create `n` singleton components
    fn new(n: usize) -> Self {
        Components {
            parent: (0..n).collect(),
        }
    }

    /// The representative of the component containing `i`
    fn find(&self, i: usize) -> usize {
        let mut i = i;
        while self.parent[i] != i {
            i = self.parent[i];
        }
        i
    }

    /// Join the components containing `i` and `j`
    fn union(&mut self, i: usize, j: usize) {
        let (i, j) = (self.find(i), self.find(j));
        if i != j {
            self.parent[j] = i;
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::network::tests::{build, l, n};

    /// Children of the roots that share taxa only among themselves form a cluster
    #[test]
    fn root_component() {
        let mut tree1 = build(&n(vec![n(vec![n(vec![l(0), l(1)]), l(2)]), l(3)]));
        let mut tree2 = build(&n(vec![n(vec![n(vec![l(0), l(2)]), l(1)]), l(3)]));
        let mut placeholders = Placeholders::new(4);
        let detached = reduce(&mut tree1, &mut tree2, &mut placeholders)
            .unwrap()
            .unwrap();
        assert_eq!(detached.placeholder, 4);
        assert_eq!(detached.first.to_string(), "((0,1),2);");
        assert_eq!(detached.second.to_string(), "((0,2),1);");
        assert_eq!(tree1.to_string(), "(3,4);");
        assert_eq!(tree2.to_string(), "(3,4);");
    }

    /// A component may group several children of a multifurcation
    #[test]
    fn component_of_several_children() {
        let mut tree1 = build(&n(vec![n(vec![l(0), l(1)]), l(2), l(3)]));
        let mut tree2 = build(&n(vec![l(0), l(1), n(vec![l(2), l(3)])]));
        let mut placeholders = Placeholders::new(4);
        let detached = reduce(&mut tree1, &mut tree2, &mut placeholders)
            .unwrap()
            .unwrap();
        assert_eq!(detached.first.to_string(), "(0,1);");
        assert_eq!(detached.second.to_string(), "(0,1);");
        assert_eq!(tree1.to_string(), "(2,3,4);");
        assert_eq!(tree2.to_string(), "((2,3),4);");
    }

    /// A common cluster below a connected intersection graph is found as well
    #[test]
    fn nested_cluster() {
        let mut tree1 = build(&n(vec![
            n(vec![l(0), n(vec![n(vec![l(1), l(2)]), l(3)])]),
            l(5),
        ]));
        let mut tree2 = build(&n(vec![
            l(0),
            n(vec![n(vec![n(vec![l(1), l(3)]), l(2)]), l(5)]),
        ]));
        let mut placeholders = Placeholders::new(6);
        let detached = reduce(&mut tree1, &mut tree2, &mut placeholders)
            .unwrap()
            .unwrap();
        assert_eq!(detached.first.to_string(), "((1,2),3);");
        assert_eq!(detached.second.to_string(), "((1,3),2);");
        assert_eq!(tree1.to_string(), "((0,6),5);");
        assert_eq!(tree2.to_string(), "(0,(5,6));");
    }

    /// Without a common proper cluster nothing changes
    #[test]
    fn no_cluster() {
        let mut tree1 = build(&n(vec![n(vec![l(0), l(1)]), l(2)]));
        let mut tree2 = build(&n(vec![n(vec![l(0), l(2)]), l(1)]));
        let mut placeholders = Placeholders::new(3);
        assert!(reduce(&mut tree1, &mut tree2, &mut placeholders)
            .unwrap()
            .is_none());
        assert_eq!(tree1.to_string(), "((0,1),2);");
    }
}
