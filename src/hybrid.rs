//! Hybrid node insertion.  After the search has removed a taxon from both trees and solved the
//! remaining problem, every resulting network has two dead leaves for the taxon, one left behind
//! by each tree.  Both are replaced by a single reticulation carrying the taxon.

use crate::error::{Error, Result};
use crate::network::{Network, NodeId, Origin};
use crate::taxa::Taxon;
use tracing::trace;

/// Replace the dead leaves of `taxon` in `network` by one reticulation.  Fails if the new node does
/// not end up with exactly two incoming edges, one from each tree.
pub fn insert_hybrid(network: &mut Network, taxon: Taxon) -> Result<NodeId> {
    let dead = network
        .leaves()
        .into_iter()
        .filter(|&leaf| network[leaf].is_dead_leaf() && network[leaf].removed().contains(taxon))
        .collect::<Vec<_>>();

    let hybrid = network.new_leaf(taxon);
    for leaf in dead {
        for parent in network[leaf].parents().to_vec() {
            network.redirect(parent, leaf, hybrid);
        }
        network.remove_node(leaf);
    }
    network.splice_all();

    let tags = network
        .in_edges(hybrid)
        .into_iter()
        .map(|(_, origin)| origin)
        .collect::<Vec<_>>();
    let valid = tags.len() == 2
        && tags.contains(&Some(Origin::First))
        && tags.contains(&Some(Origin::Second));
    if !valid {
        return Err(Error::HybridPostcondition {
            taxon,
            in_degree: tags.len(),
            tags: format!("{:?}", tags),
        });
    }

    network.recompute_taxa();
    trace!("inserted hybrid node for taxon {}", taxon);
    Ok(hybrid)
}

/// Insert a reticulation for `taxon` into every network
pub fn insert_hybrids(networks: Vec<Network>, taxon: Taxon) -> Result<Vec<Network>> {
    networks
        .into_iter()
        .map(|mut network| {
            insert_hybrid(&mut network, taxon)?;
            Ok(network)
        })
        .collect()
}
