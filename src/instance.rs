//! Translation between labelled input trees and the networks the search works on.
//!
//! Preparing an instance assigns one shared taxon id to every leaf label, builds a network for
//! each tree and strips the taxa that occur in only one of the trees, leaving dead leaves in their
//! place.  After the search, `finish` puts these taxa back into every result network and attaches
//! the label table so the networks can be written out.

use crate::error::{Error, Result};
use crate::network::{Network, NodeId, Origin};
use crate::newick;
use crate::refine::refine;
use crate::removal::{reinsert, remove};
use crate::taxa::{Taxon, TaxonSet, TaxonTable};
use crate::tree::{Node, NodeData, Tree};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Two trees ready to be searched
#[derive(Clone, Debug)]
pub struct Instance {
    /// The labels of the taxa
    pub table: TaxonTable,

    /// The first tree
    pub tree1: Network,

    /// The second tree
    pub tree2: Network,

    /// The taxa both trees share
    pub common: TaxonSet,

    /// The taxa that occur in only one of the trees
    pub exclusive: TaxonSet,
}

/// Build the networks for two labelled trees.  Fails if the trees share no taxon or a label occurs
/// twice in the same tree.
pub fn prepare(tree1: &Tree<String>, tree2: &Tree<String>) -> Result<Instance> {
    let mut table = TaxonTable::new();
    let mut network1 = to_network(tree1, &mut table)?;
    let mut network2 = to_network(tree2, &mut table)?;

    let taxa1 = network1[network1.root()].taxa().clone();
    let taxa2 = network2[network2.root()].taxa().clone();
    let common = taxa1.intersection(&taxa2);
    if common.is_empty() {
        return Err(Error::DisjointTaxa);
    }

    let only1 = taxa1.difference(&common);
    let only2 = taxa2.difference(&common);
    let root1 = network1.root();
    for taxon in only1.iter() {
        remove(&mut network1, root1, Origin::First, taxon);
    }
    let root2 = network2.root();
    for taxon in only2.iter() {
        remove(&mut network2, root2, Origin::Second, taxon);
    }
    let exclusive = only1.union(&only2);
    if !exclusive.is_empty() {
        debug!("{} taxa occur in only one tree", exclusive.len());
    }

    refine(&mut network1, &mut network2);
    Ok(Instance {
        table,
        tree1: network1,
        tree2: network2,
        common,
        exclusive,
    })
}

/// Build the network of a labelled tree, allocating taxa for new labels in `table`
fn to_network(tree: &Tree<String>, table: &mut TaxonTable) -> Result<Network> {
    let mut network = Network::new(TaxonSet::new());
    if let Some(root) = tree.root() {
        let mut seen = TaxonSet::new();
        let top = add_subtree(tree, root, table, &mut network, &mut seen)?;
        let placeholder = network.root();
        network.set_root(top);
        network.remove_node(placeholder);
    }
    network.recompute_taxa();
    Ok(network)
}

/// Add the subtree of `tree` below `node` to `network`.  Returns the copy of `node`.
fn add_subtree(
    tree: &Tree<String>,
    node: Node,
    table: &mut TaxonTable,
    network: &mut Network,
    seen: &mut TaxonSet,
) -> Result<NodeId> {
    match &tree[node] {
        NodeData::Leaf(label) => {
            let taxon = table.id_or_insert(label);
            if seen.contains(taxon) {
                return Err(Error::DuplicateTaxon(label.clone()));
            }
            seen.insert(taxon);
            Ok(network.new_leaf(taxon))
        }
        NodeData::Internal(children) => {
            let copy = network.new_node(TaxonSet::new(), TaxonSet::new());
            for &child in children {
                let child = add_subtree(tree, child, table, network, seen)?;
                network.link(copy, child, None);
            }
            Ok(copy)
        }
    }
}

impl Instance {
    /// Put the taxa that occur in only one tree back into the networks and label them
    pub fn finish(&self, networks: Vec<Network>) -> Vec<LabelledNetwork> {
        let table = Arc::new(self.table.clone());
        networks
            .into_iter()
            .map(|mut network| {
                let root = network.root();
                for taxon in self.exclusive.iter() {
                    reinsert(&mut network, root, taxon);
                }
                network.recompute_taxa();
                LabelledNetwork {
                    network,
                    table: table.clone(),
                }
            })
            .collect()
    }
}

/// A result network together with the labels of its taxa
#[derive(Clone, Debug)]
pub struct LabelledNetwork {
    network: Network,
    table: Arc<TaxonTable>,
}

impl LabelledNetwork {
    /// The network over taxon ids
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// The label of a taxon
    pub fn label(&self, taxon: Taxon) -> Option<&str> {
        self.table.label(taxon)
    }

    /// The number of reticulations
    pub fn reticulation_count(&self) -> usize {
        self.network.reticulations().len()
    }

    /// For every reticulation, the sorted labels of the taxa below it
    pub fn reticulation_taxa(&self) -> Vec<Vec<String>> {
        self.network
            .reticulations()
            .into_iter()
            .map(|node| {
                let mut labels = self.network[node]
                    .taxa()
                    .iter()
                    .map(|taxon| match self.table.label(taxon) {
                        Some(label) => label.to_string(),
                        None => taxon.to_string(),
                    })
                    .collect::<Vec<_>>();
                labels.sort();
                labels
            })
            .collect()
    }
}

/// Labelled networks are written in extended Newick format
impl fmt::Display for LabelledNetwork {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", newick::format_network(&self.network, &self.table))
    }
}
