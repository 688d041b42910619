//! Removing a taxon from a tree and putting it back.
//!
//! Removal does not delete any nodes.  The taxon moves from the alive taxa to the removed taxa of
//! every node on its path, and its leaf stays behind as a dead leaf whose incoming edge is tagged
//! with the tree it belongs to.  The dead leaf marks the position the taxon is later reattached at,
//! either as a hybrid node or by `reinsert`.

use crate::network::{Network, NodeId, Origin};
use crate::taxa::Taxon;

/// Remove `taxon` from the subtree below `node`.  Leaves that lose their last alive taxon get
/// their incoming edge tagged with `origin`.  Returns `false`, changing nothing, if the taxon is
/// not alive below `node`.
pub fn remove(network: &mut Network, node: NodeId, origin: Origin, taxon: Taxon) -> bool {
    if !network[node].taxa().contains(taxon) {
        return false;
    }

    let data = network.node_mut(node);
    data.taxa.remove(taxon);
    data.removed.insert(taxon);

    let children = network[node]
        .children()
        .iter()
        .map(|edge| edge.target)
        .collect::<Vec<_>>();
    for child in children {
        remove(network, child, origin, taxon);
    }
    network.sort_children(node);

    if network[node].is_dead_leaf() {
        network.tag_in_edges(node, Some(origin));
    }
    true
}

/// Undo the removal of `taxon` below `node`.  Follows the branches that carry the taxon, alive or
/// removed, down to its dead leaf and revives it.  If no branch below `node` carries the taxon, a
/// new leaf for it is attached directly below `node`.
pub fn reinsert(network: &mut Network, node: NodeId, taxon: Taxon) {
    let data = &network[node];
    if data.taxa().contains(taxon) && !data.removed().contains(taxon) {
        return;
    }

    if data.is_leaf() && data.removed().contains(taxon) {
        let data = network.node_mut(node);
        data.removed.remove(taxon);
        data.taxa.insert(taxon);
        network.tag_in_edges(node, None);
        return;
    }

    let carriers = data
        .children()
        .iter()
        .map(|edge| edge.target)
        .filter(|&child| {
            network[child].taxa().contains(taxon) || network[child].removed().contains(taxon)
        })
        .collect::<Vec<_>>();

    if carriers.is_empty() {
        if network[node].is_leaf() {
            // An alive leaf turns into a cherry of its old taxa and the new one
            let old = network.new_node(network[node].taxa().clone(), network[node].removed().clone());
            network.link(node, old, None);
        }
        let leaf = network.new_leaf(taxon);
        network.link(node, leaf, None);
    } else {
        for child in carriers {
            reinsert(network, child, taxon);
        }
    }

    let data = network.node_mut(node);
    data.removed.remove(taxon);
    data.taxa.insert(taxon);
    network.sort_children(node);
}
