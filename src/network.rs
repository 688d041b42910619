//! This module implements the rooted directed acyclic graphs the search works on.  The two input
//! trees are represented using the same structure as the networks built from them: a tree is
//! simply a network without reticulations.
//!
//! Nodes live in a slab owned by the network and are referred to by `NodeId` handles.  A node
//! records the taxa that are still alive below it and the taxa that were removed from its subtree
//! during the search.  Edges created for branches whose taxa were all removed carry an `Origin`
//! tag recording which of the two input trees they came from.

use crate::taxa::{Taxon, TaxonSet};
use slab::Slab;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;

/// The type used to refer to the nodes of a network
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(usize);

impl NodeId {

    /// Access the ID of this node
    pub fn id(&self) -> usize {
        self.0
    }
}

/// The input tree an edge was contributed by
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Origin {
    First,
    Second,
}

/// An outgoing edge of a node
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Edge {

    /// The head of the edge
    pub target: NodeId,

    /// The input tree this edge was contributed by, if it matters
    pub origin: Option<Origin>,
}

/// The data associated with a node
#[derive(Clone, Debug, Default)]
pub struct NodeData {

    /// The taxa alive in the subtree below this node
    pub(crate) taxa: TaxonSet,

    /// The taxa removed from the subtree below this node
    pub(crate) removed: TaxonSet,

    /// Outgoing edges, kept in canonical order
    pub(crate) children: Vec<Edge>,

    /// Tails of the incoming edges.  A parent appears twice if it has two edges into this node.
    pub(crate) parents: Vec<NodeId>,
}

impl NodeData {

    /// The taxa alive below this node
    pub fn taxa(&self) -> &TaxonSet {
        &self.taxa
    }

    /// The taxa removed from below this node
    pub fn removed(&self) -> &TaxonSet {
        &self.removed
    }

    /// The outgoing edges of this node
    pub fn children(&self) -> &[Edge] {
        &self.children
    }

    /// The parents of this node
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// Is this node a leaf?
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Does this node still carry alive taxa?
    pub fn is_alive(&self) -> bool {
        !self.taxa.is_empty()
    }

    /// Is this a leaf that has lost all its taxa?
    pub fn is_dead_leaf(&self) -> bool {
        self.children.is_empty() && self.taxa.is_empty()
    }
}

/// A rooted network
#[derive(Clone)]
pub struct Network {

    /// The nodes of the network
    nodes: Slab<NodeData>,

    /// The root of the network
    root: NodeId,
}

/// Indexing into a network using a `NodeId` returns the corresponding node data
impl Index<NodeId> for Network {

    type Output = NodeData;
    fn index(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0]
    }
}

impl Network {

    //----------------------------------------------------------------------------------------------
    // Construction
    //----------------------------------------------------------------------------------------------

    /// Create a network consisting of a root carrying the given taxa
    pub fn new(taxa: TaxonSet) -> Self {
        let mut nodes = Slab::new();
        let root = NodeId(nodes.insert(NodeData {
            taxa,
            ..NodeData::default()
        }));
        Network { nodes, root }
    }

    /// Create a network without nodes.  The caller must add nodes and set the root before using
    /// it.
    pub(crate) fn empty() -> Self {
        Network {
            nodes: Slab::new(),
            root: NodeId(0),
        }
    }

    /// Create a network whose root is a copy of `node` in `source`, holding copies of everything
    /// reachable from it
    pub fn from_subnetwork(source: &Network, node: NodeId) -> Self {
        let mut network = Network::empty();
        network.root = network.import(source, node, &mut HashMap::new());
        network
    }

    /// Create a new node without edges
    pub fn new_node(&mut self, taxa: TaxonSet, removed: TaxonSet) -> NodeId {
        NodeId(self.nodes.insert(NodeData {
            taxa,
            removed,
            ..NodeData::default()
        }))
    }

    /// Create a new leaf for the given taxon, without edges
    pub fn new_leaf(&mut self, taxon: Taxon) -> NodeId {
        self.new_node(TaxonSet::singleton(taxon), TaxonSet::new())
    }

    /// Make the given node the root of the network
    pub fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    /// Copy everything reachable from the root of `source` into this network.  Returns the copy of
    /// the root of `source`, which has no parent yet.
    pub fn graft(&mut self, source: &Network) -> NodeId {
        self.import(source, source.root(), &mut HashMap::new())
    }

    /// Copy everything reachable from `node` in `source` into this network.  Returns the copy of
    /// `node`, which has no parent yet.
    pub fn graft_subtree(&mut self, source: &Network, node: NodeId) -> NodeId {
        self.import(source, node, &mut HashMap::new())
    }

    /// Copy everything reachable from `node` in `source` into this network
    fn import(
        &mut self,
        source: &Network,
        node: NodeId,
        copies: &mut HashMap<NodeId, NodeId>,
    ) -> NodeId {
        if let Some(&copy) = copies.get(&node) {
            return copy;
        }
        let data = &source[node];
        let copy = self.new_node(data.taxa.clone(), data.removed.clone());
        copies.insert(node, copy);
        for edge in &data.children {
            let child = self.import(source, edge.target, copies);
            self.link(copy, child, edge.origin);
        }
        copy
    }

    //----------------------------------------------------------------------------------------------
    // Access
    //----------------------------------------------------------------------------------------------

    /// The root of the network
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Mutable access to the data of a node
    pub(crate) fn node_mut(&mut self, node: NodeId) -> &mut NodeData {
        &mut self.nodes[node.0]
    }

    /// The number of nodes in the network
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes of the network, including those not reachable from the root
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|(id, _)| NodeId(id)).collect()
    }

    /// Does the network still contain this node?
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(node.0)
    }

    /// The children of a node that still carry alive taxa
    pub fn alive_children(&self, node: NodeId) -> Vec<NodeId> {
        self[node]
            .children
            .iter()
            .filter(|edge| self[edge.target].is_alive())
            .map(|edge| edge.target)
            .collect()
    }

    /// The outgoing edges of a node into subtrees without alive taxa
    pub fn dead_edges(&self, node: NodeId) -> Vec<Edge> {
        self[node]
            .children
            .iter()
            .filter(|edge| !self[edge.target].is_alive())
            .copied()
            .collect()
    }

    /// The incoming edges of a node as pairs of tail and origin tag
    pub fn in_edges(&self, node: NodeId) -> Vec<(NodeId, Option<Origin>)> {
        let mut parents = self[node].parents.clone();
        parents.sort();
        parents.dedup();
        let mut edges = vec![];
        for parent in parents {
            for edge in &self[parent].children {
                if edge.target == node {
                    edges.push((parent, edge.origin));
                }
            }
        }
        edges
    }

    /// All nodes reachable from the root, every node listed after all its descendants
    pub fn postorder(&self) -> Vec<NodeId> {
        let mut order   = vec![];
        let mut visited = HashSet::new();
        let mut stack   = vec![(self.root, false)];
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
                continue;
            }
            if !visited.insert(node) {
                continue;
            }
            stack.push((node, true));
            for edge in self[node].children.iter().rev() {
                if !visited.contains(&edge.target) {
                    stack.push((edge.target, false));
                }
            }
        }
        order
    }

    /// The leaves reachable from the root
    pub fn leaves(&self) -> Vec<NodeId> {
        self.postorder()
            .into_iter()
            .filter(|&node| self[node].is_leaf())
            .collect()
    }

    /// The nodes with more than one incoming edge
    pub fn reticulations(&self) -> Vec<NodeId> {
        self.postorder()
            .into_iter()
            .filter(|&node| self[node].parents.len() > 1)
            .collect()
    }

    /// The alive leaf carrying exactly the given taxon
    pub fn leaf_of(&self, taxon: Taxon) -> Option<NodeId> {
        self.postorder().into_iter().find(|&node| {
            let data = &self[node];
            data.is_leaf() && data.taxa.len() == 1 && data.taxa.contains(taxon)
        })
    }

    //----------------------------------------------------------------------------------------------
    // Structural edits
    //----------------------------------------------------------------------------------------------

    /// Add an edge from `parent` to `child`
    pub fn link(&mut self, parent: NodeId, child: NodeId, origin: Option<Origin>) {
        self.nodes[parent.0].children.push(Edge {
            target: child,
            origin,
        });
        self.nodes[child.0].parents.push(parent);
    }

    /// Remove one edge from `parent` to `child`, returning its origin tag
    pub fn unlink(&mut self, parent: NodeId, child: NodeId) -> Option<Option<Origin>> {
        let index = self[parent]
            .children
            .iter()
            .position(|edge| edge.target == child)?;
        let edge    = self.nodes[parent.0].children.remove(index);
        let parents = &mut self.nodes[child.0].parents;
        if let Some(pos) = parents.iter().position(|&p| p == parent) {
            parents.remove(pos);
        }
        Some(edge.origin)
    }

    /// Redirect one edge from `parent` into `old` so it points into `new` instead, keeping its
    /// position and origin tag
    pub fn redirect(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> bool {
        let index = match self[parent]
            .children
            .iter()
            .position(|edge| edge.target == old)
        {
            Some(index) => index,
            None        => return false,
        };
        self.nodes[parent.0].children[index].target = new;
        let parents = &mut self.nodes[old.0].parents;
        if let Some(pos) = parents.iter().position(|&p| p == parent) {
            parents.remove(pos);
        }
        self.nodes[new.0].parents.push(parent);
        true
    }

    /// Set the origin tag of every edge into the given node
    pub fn tag_in_edges(&mut self, node: NodeId, origin: Option<Origin>) {
        let mut parents = self[node].parents.clone();
        parents.dedup();
        for parent in parents {
            for edge in &mut self.nodes[parent.0].children {
                if edge.target == node {
                    edge.origin = origin;
                }
            }
        }
    }

    /// Delete a node together with all its edges
    pub fn remove_node(&mut self, node: NodeId) -> NodeData {
        let parents = self[node].parents.clone();
        for parent in parents {
            self.unlink(parent, node);
        }
        let children = self[node].children.clone();
        for edge in children {
            self.unlink(node, edge.target);
        }
        self.nodes.remove(node.0)
    }

    /// Delete a node and every descendant that is not reachable from elsewhere
    pub fn remove_subtree(&mut self, node: NodeId) {
        let parents = self[node].parents.clone();
        for parent in parents {
            self.unlink(parent, node);
        }
        let mut stack = vec![node];
        while let Some(node) = stack.pop() {
            let children = self[node].children.clone();
            for edge in children {
                self.unlink(node, edge.target);
                if self[edge.target].parents.is_empty() {
                    stack.push(edge.target);
                }
            }
            self.nodes.remove(node.0);
        }
    }

    /// Splice out a node with exactly one parent and one child.  The new edge keeps the origin tag
    /// of the outgoing edge or, if that has none, the tag of the incoming edge.  Returns whether
    /// the node was spliced out.
    pub fn splice(&mut self, node: NodeId) -> bool {
        if self[node].parents.len() != 1 || self[node].children.len() != 1 {
            return false;
        }
        let parent = self[node].parents[0];
        let out    = self[node].children[0];
        let index = match self[parent]
            .children
            .iter()
            .position(|edge| edge.target == node)
        {
            Some(index) => index,
            None        => return false,
        };
        let origin = out.origin.or(self[parent].children[index].origin);
        self.nodes[parent.0].children[index] = Edge {
            target: out.target,
            origin,
        };
        let parents = &mut self.nodes[out.target.0].parents;
        if let Some(pos) = parents.iter().position(|&p| p == node) {
            parents[pos] = parent;
        }
        self.nodes.remove(node.0);
        true
    }

    /// Splice out every node with exactly one parent and one child.  Returns the number of nodes
    /// spliced out.
    pub fn splice_all(&mut self) -> usize {
        let mut count = 0;
        for node in self.postorder() {
            if node != self.root && self.splice(node) {
                count += 1;
            }
        }
        count
    }

    /// Put the children of a node into canonical order: by alive taxa, then by removed taxa
    pub fn sort_children(&mut self, node: NodeId) {
        let mut children = std::mem::take(&mut self.nodes[node.0].children);
        children.sort_by(|a, b| {
            let (x, y) = (&self.nodes[a.target.0], &self.nodes[b.target.0]);
            x.taxa
                .cmp(&y.taxa)
                .then_with(|| x.removed.cmp(&y.removed))
                .then_with(|| a.origin.cmp(&b.origin))
        });
        self.nodes[node.0].children = children;
    }

    /// Recompute the alive and removed taxa of every internal node from its children, bottom-up,
    /// and restore canonical child order everywhere.  Leaves keep their taxa.
    pub fn recompute_taxa(&mut self) {
        for node in self.postorder() {
            if self[node].is_leaf() {
                continue;
            }
            let mut taxa    = TaxonSet::new();
            let mut removed = TaxonSet::new();
            for edge in &self[node].children {
                taxa.union_with(&self[edge.target].taxa);
                removed.union_with(&self[edge.target].removed);
            }
            removed.difference_with(&taxa);
            let data = &mut self.nodes[node.0];
            data.taxa = taxa;
            data.removed = removed;
            self.sort_children(node);
        }
    }

    //----------------------------------------------------------------------------------------------
    // Canonical identity
    //----------------------------------------------------------------------------------------------

    /// A hash of the structure of the network that does not depend on node handles or child
    /// order: every node hashes its taxa, its removed taxa and the sorted hashes and tags of its
    /// children.
    pub fn structural_hash(&self) -> u64 {
        let mut hashes: HashMap<NodeId, u64> = HashMap::new();
        for node in self.postorder() {
            let data = &self[node];
            let mut children = data
                .children
                .iter()
                .map(|edge| (hashes[&edge.target], edge.origin))
                .collect::<Vec<_>>();
            children.sort();
            let mut hasher = DefaultHasher::new();
            data.taxa.hash(&mut hasher);
            data.removed.hash(&mut hasher);
            children.hash(&mut hasher);
            hashes.insert(node, hasher.finish());
        }
        hashes[&self.root]
    }

    /// Write the subnetwork below `node` using taxon ids.  Dead leaves print as `~` followed by
    /// their removed taxa; reticulations are marked with `#`.
    fn fmt_node(&self, node: NodeId, f: &mut fmt::Formatter) -> fmt::Result {
        let data = &self[node];
        if data.is_leaf() {
            if data.taxa.is_empty() {
                write!(f, "~")?;
                write_ids(&data.removed, f)?;
            } else {
                write_ids(&data.taxa, f)?;
            }
        } else {
            write!(f, "(")?;
            for (i, edge) in data.children.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                self.fmt_node(edge.target, f)?;
            }
            write!(f, ")")?;
        }
        if data.parents.len() > 1 {
            write!(f, "#")?;
        }
        Ok(())
    }
}

/// Write a set of taxon ids joined by `+`
fn write_ids(taxa: &TaxonSet, f: &mut fmt::Formatter) -> fmt::Result {
    for (i, taxon) in taxa.iter().enumerate() {
        if i > 0 {
            write!(f, "+")?;
        }
        write!(f, "{}", taxon)?;
    }
    Ok(())
}

impl fmt::Display for Network {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_node(self.root, f)?;
        write!(f, ";")
    }
}

impl fmt::Debug for Network {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
