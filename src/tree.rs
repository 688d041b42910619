//! Labelled phylogenetic trees as they come in from the outside world, and the builder used by the
//! Newick parser to construct them.  The search itself never works on these trees; they are
//! translated into `network::Network`s over shared taxon ids by the `instance` module.

use slab::Slab;
use std::ops::Index;

/// The type used to represent tree nodes
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Node(usize);

impl Node {

    /// Access the ID of this node
    pub fn id(&self) -> usize {
        self.0
    }
}

/// The info associated with a node
#[derive(Clone, Debug)]
pub enum NodeData<T> {
    /// A leaf and its label
    Leaf(T),

    /// An internal node and its children
    Internal(Vec<Node>),
}

/// A phylogenetic tree whose leaves have labels of type `T`
#[derive(Clone, Debug)]
pub struct Tree<T> {

    /// The set of nodes in the tree
    nodes: Slab<NodeData<T>>,

    /// The root of the tree
    root: Option<Node>,
}

impl<T> Tree<T> {

    /// Create an empty tree
    pub fn new() -> Self {
        Tree {
            nodes: Slab::new(),
            root: None,
        }
    }

    /// The root node of this tree
    pub fn root(&self) -> Option<Node> {
        self.root
    }

    /// The number of nodes in this tree
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Is the given node a leaf?
    pub fn is_leaf(&self, node: Node) -> bool {
        matches!(self[node], NodeData::Leaf(_))
    }

    /// The label of a leaf
    pub fn label(&self, node: Node) -> Option<&T> {
        match &self[node] {
            NodeData::Leaf(label) => Some(label),
            NodeData::Internal(_) => None,
        }
    }

    /// The children of a node
    pub fn children(&self, node: Node) -> &[Node] {
        match &self[node] {
            NodeData::Leaf(_)            => &[],
            NodeData::Internal(children) => children,
        }
    }

    /// The labels of all leaves, left to right
    pub fn leaf_labels(&self) -> Vec<&T> {
        let mut labels = vec![];
        if let Some(root) = self.root {
            let mut stack = vec![root];
            while let Some(node) = stack.pop() {
                match &self[node] {
                    NodeData::Leaf(label)        => labels.push(label),
                    NodeData::Internal(children) => stack.extend(children.iter().rev()),
                }
            }
        }
        labels
    }
}

impl<T> Default for Tree<T> {

    fn default() -> Self {
        Self::new()
    }
}

/// Indexing into a tree using a Node returns the corresponding node info
impl<T> Index<Node> for Tree<T> {

    type Output = NodeData<T>;
    fn index(&self, node: Node) -> &NodeData<T> {
        &self.nodes[node.0]
    }
}

/// Builder to construct a sequence of trees
pub struct TreeBuilder<T> {

    /// The tree currently under construction
    current_tree: Option<Tree<T>>,

    /// The trees built so far
    trees: Vec<Tree<T>>,
}

impl<T> TreeBuilder<T> {

    /// Create a new builder
    pub fn new() -> Self {
        TreeBuilder {
            current_tree: None,
            trees: vec![],
        }
    }

    /// Start a new tree
    pub fn new_tree(&mut self) {
        self.current_tree = Some(Tree::new());
    }

    /// Create a new leaf with the given label
    pub fn new_leaf(&mut self, label: T) -> Node {
        let tree = self.current_tree.get_or_insert_with(Tree::new);
        Node(tree.nodes.insert(NodeData::Leaf(label)))
    }

    /// Create a new internal node with the given list of children
    pub fn new_node(&mut self, children: Vec<Node>) -> Node {
        let tree = self.current_tree.get_or_insert_with(Tree::new);
        Node(tree.nodes.insert(NodeData::Internal(children)))
    }

    /// Make the given node the root of the current tree and store the tree
    pub fn finish_tree(&mut self, root: Node) {
        if let Some(mut tree) = self.current_tree.take() {
            tree.root = Some(root);
            self.trees.push(tree);
        }
    }

    /// Retrieve the trees built so far
    pub fn trees(self) -> Vec<Tree<T>> {
        self.trees
    }
}

impl<T> Default for TreeBuilder<T> {

    fn default() -> Self {
        Self::new()
    }
}
