//! Resolution of multifurcations.  Each tree is refined by those clusters of the other tree that
//! it is compatible with but does not contain yet, so a multifurcation is resolved only where the
//! other tree forces it.  The search runs this after every taxon removal: removing a taxon can make
//! a cluster of one tree compatible with the other.

use crate::network::{Network, NodeId};
use crate::taxa::TaxonSet;
use tracing::trace;

/// Refine both trees in place.  Returns the number of nodes added.
pub fn refine(tree1: &mut Network, tree2: &mut Network) -> usize {
    let clusters1 = clusters(tree1);
    let clusters2 = clusters(tree2);
    refine_by(tree1, &clusters2) + refine_by(tree2, &clusters1)
}

/// The clusters of all alive nodes with at least two taxa, smallest first
fn clusters(tree: &Network) -> Vec<TaxonSet> {
    let mut clusters = tree
        .postorder()
        .into_iter()
        .map(|node| tree[node].taxa().clone())
        .filter(|taxa| taxa.len() >= 2)
        .collect::<Vec<_>>();
    clusters.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    clusters.dedup();
    clusters
}

/// Insert a node for every given cluster the tree is compatible with but lacks
fn refine_by(tree: &mut Network, clusters: &[TaxonSet]) -> usize {
    let mut added = 0;
    for cluster in clusters {
        let node = lowest_cover(tree, cluster);
        if tree[node].taxa() == cluster {
            continue;
        }

        let alive = tree.alive_children(node);
        let mut inside = vec![];
        let mut compatible = true;
        for &child in &alive {
            let taxa = tree[child].taxa();
            if taxa.is_subset(cluster) {
                inside.push(child);
            } else if taxa.intersects(cluster) {
                compatible = false;
                break;
            }
        }
        if !compatible || inside.len() < 2 || inside.len() == alive.len() {
            continue;
        }

        let group = tree.new_node(cluster.clone(), TaxonSet::new());
        for child in inside {
            let origin = tree.unlink(node, child).flatten();
            tree.link(group, child, origin);
        }
        tree.link(node, group, None);
        trace!("refined node {} by cluster {:?}", node.id(), cluster);
        added += 1;
    }
    if added > 0 {
        tree.recompute_taxa();
    }
    added
}

/// The lowest node whose alive taxa include all of `cluster`
fn lowest_cover(tree: &Network, cluster: &TaxonSet) -> NodeId {
    let mut node = tree.root();
    while let Some(child) = tree
        .alive_children(node)
        .into_iter()
        .find(|&child| cluster.is_subset(tree[child].taxa()))
    {
        node = child;
    }
    node
}
