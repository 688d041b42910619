//! A module to parse Newick strings into trees and to convert trees and hybridization networks
//! back to (extended) Newick strings.
//!
//! # Parsing
//!
//! The two main parsing functions are `parse_tree()` and `parse_forest()`.  For `parse_tree()`,
//! the input has to consist of a single line that is a valid Newick string representing a single
//! tree.  For `parse_forest()`, the input has to be a multi-line text.  Each non-blank line
//! encodes one of the trees in the forest.
//!
//! These functions take a mutable reference to a `tree::TreeBuilder` as their first argument.
//! A `tree::TreeBuilder` implements the construction of the tree or forest based on the methods
//! the Newick parser calls.
//!
//! The grammar for a a Newick string used by the parser is the following:
//!
//! ```ignore
//! Newick     -> Tree ;
//! Tree       -> Subtree Label : EdgeLength
//! Label      -> string | Nothing
//! EdgeLength -> number | Nothing
//! Subtree    -> ( Trees ) | Nothing
//! Trees      -> Tree MoreTrees
//! MoreTrees  -> , Trees | Nothing
//! Nothing    ->
//! ```
//!
//! **Important note:** The parser accepts any string that adheres to this grammar, but it simply
//! ignores labels of internal nodes (nodes whose `Subtree` part is not empty) and it completely
//! ignores edge lengths.  Neither plays a role in computing hybridization networks.
//!
//! # Formatting
//!
//! `format_tree()` and `format_forest()` turn trees back into Newick strings.  `format_network()`
//! writes a hybridization network in extended Newick format: the first visit of a reticulation
//! writes its subnetwork followed by `#H<n>`, every later visit writes only `#H<n>`.

use crate::network::{Network, NodeId};
use crate::taxa::TaxonTable;
use crate::tree::{Node, Tree, TreeBuilder};
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Write};
use std::iter;
use std::result;
use std::str;
use thiserror::Error;

/// The parser's result type
type Result<T> = result::Result<T, Error>;

/// The error raised when a parse error is encountered
#[derive(Debug, Error)]
#[error("{message} at position {pos}")]
pub struct Error {

    /// The error message
    message: String,

    /// The position in the input text where the error occurred
    pos: Pos,
}

/// Representation of an input position as line and column
#[derive(Clone, Copy, Debug)]
struct Pos(usize, usize);

impl fmt::Display for Pos {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}

/// Parse a given one-line Newick string using the given tree builder
///
/// # Example
///
/// ```
/// # use autumn::tree;
/// # use autumn::newick::*;
/// let newick      = "((a,(b,(c,d))),e);";
/// let mut builder = tree::TreeBuilder::new();
/// parse_tree(&mut builder, newick).unwrap();
/// let tree = &builder.trees()[0];
/// assert_eq!(newick, format_tree(tree).unwrap());
/// ```
pub fn parse_tree(builder: &mut TreeBuilder<String>, newick: &str) -> Result<()> {
    Parser::new(builder, newick).parse_tree()
}

/// Parse a given multi-line Newick string using the given tree builder
///
/// # Example
///
/// ```
/// # use autumn::tree;
/// # use autumn::newick::*;
/// let newick      = "((a,(b,(c,d))),e);\n(a,(((b,c),d),e));\n";
/// let mut builder = tree::TreeBuilder::new();
/// parse_forest(&mut builder, newick).unwrap();
/// let forest = builder.trees();
/// assert_eq!(newick, format_forest(&forest).unwrap());
/// ```
pub fn parse_forest(builder: &mut TreeBuilder<String>, newick: &str) -> Result<()> {
    Parser::new(builder, newick).parse_forest()
}

/// Struct representing the state of the Newick parser
struct Parser<'b, 'i> {

    /// The builder used to build the tree
    builder: &'b mut TreeBuilder<String>,

    /// The current input position
    pos: Pos,

    /// The iterator currently used
    chars: iter::Peekable<str::Chars<'i>>,
}

impl<'b, 'i> Parser<'b, 'i> {

    /// Create a new parser that parses the given Newick string and uses the given builder to
    /// construct the corresponding tree.
    fn new(builder: &'b mut TreeBuilder<String>, newick: &'i str) -> Parser<'b, 'i> {
        Parser {
            builder,
            pos: Pos(1, 1),
            chars: newick.chars().peekable(),
        }
    }

    /// Parse a tree from a one-line Newick string
    fn parse_tree(mut self) -> Result<()> {
        self.parse_one_tree()?;
        match self.chars.peek() {
            None => Ok(()),
            _    => Self::error("expected a one-line input", self.pos),
        }
    }

    /// Parse a forest from a multi-line Newick string
    fn parse_forest(mut self) -> Result<()> {
        loop {
            self.skip_blank_lines();
            if self.chars.peek().is_none() {
                return Ok(());
            }
            self.parse_one_tree()?;
        }
    }

    /// Parse a tree from a one-line Newick string.  Does not enforce that the input has just one
    /// line; the callers take care of that.
    fn parse_one_tree(&mut self) -> Result<()> {
        self.builder.new_tree();
        let root = self.parse_subtree()?;
        self.parse_symbol(';')?;
        self.skip_spaces();
        self.parse_eol()?;
        self.builder.finish_tree(root);
        Ok(())
    }

    /// Consume the next character, keeping track of the input position
    fn next(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.pos = Pos(self.pos.0 + 1, 1);
        } else {
            self.pos.1 += 1;
        }
        Some(c)
    }

    /// Check that we're at the end of the line
    fn parse_eol(&mut self) -> Result<()> {
        let pos = self.pos;
        match self.next() {
            None       => Ok(()),
            Some('\n') => Ok(()),
            _          => Self::error("expected end of line", pos),
        }
    }

    /// Parse the given symbol
    fn parse_symbol(&mut self, sym: char) -> Result<()> {
        let pos = self.pos;
        match self.next() {
            Some(c) if c == sym => Ok(()),
            _                   => Self::error(&format!("expected `{}'", sym), pos),
        }
    }

    /// Skip over spaces, stopping at the end of the line
    fn skip_spaces(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' || !c.is_whitespace() {
                return;
            }
            self.next();
        }
    }

    /// Skip over whitespace including line breaks
    fn skip_blank_lines(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if !c.is_whitespace() {
                return;
            }
            self.next();
        }
    }

    /// Parse one subtree
    fn parse_subtree(&mut self) -> Result<Node> {
        self.skip_spaces();
        match self.chars.peek() {
            Some('(') => {
                self.next();
                let children = self.parse_subtrees()?;
                self.parse_symbol(')')?;
                self.parse_label();
                self.skip_edge_length();
                Ok(self.builder.new_node(children))
            }

            _ => {
                let pos   = self.pos;
                let label = self.parse_label();
                if label.is_empty() {
                    return Self::error("expected a leaf label", pos);
                }
                self.skip_edge_length();
                Ok(self.builder.new_leaf(label))
            }
        }
    }

    /// Parse a list of subtrees
    fn parse_subtrees(&mut self) -> Result<Vec<Node>> {
        let mut nodes = vec![self.parse_subtree()?];
        loop {
            self.skip_spaces();
            match self.chars.peek() {
                Some(',') => {
                    self.next();
                    nodes.push(self.parse_subtree()?);
                }
                _ => break,
            };
        }
        Ok(nodes)
    }

    /// Skip edge lengths
    fn skip_edge_length(&mut self) {
        self.skip_spaces();
        if self.chars.peek() != Some(&':') {
            return;
        }
        self.next();
        while let Some(&c) = self.chars.peek() {
            match c {
                ',' | ';' | ':' | '(' | ')' | '\n' => break,
                _                                  => self.next(),
            };
        }
    }

    /// Parse a node label
    fn parse_label(&mut self) -> String {
        let mut label = String::new();
        while let Some(&c) = self.chars.peek() {
            match c {
                ',' | ';' | ':' | '(' | ')' | '\n' => break,
                _ => {
                    label.push(c);
                    self.next();
                }
            }
        }
        label.trim().to_string()
    }

    /// Report an error at the given position
    fn error<T>(message: &str, pos: Pos) -> Result<T> {
        Err(Error {
            message: message.to_string(),
            pos,
        })
    }
}

/// Format a tree into a Newick string
///
/// # Example
///
/// ```
/// # use autumn::tree;
/// # use autumn::newick::*;
/// let newick      = "((a,(b,(c,d))),e);";
/// let mut builder = tree::TreeBuilder::new();
/// parse_tree(&mut builder, newick).unwrap();
/// let tree = &builder.trees()[0];
/// assert_eq!(newick, format_tree(tree).unwrap());
/// ```
pub fn format_tree<T: Display>(tree: &Tree<T>) -> Option<String> {
    let mut newick = String::new();
    format_tree_node(tree, tree.root()?, &mut newick)?;
    newick.push(';');
    Some(newick)
}

/// Format a forest into a Newick string, one line per tree.
pub fn format_forest<T: Display>(forest: &[Tree<T>]) -> Option<String> {
    let mut newick = String::new();
    for tree in forest {
        newick.push_str(&format_tree(tree)?);
        newick.push('\n');
    }
    Some(newick)
}

/// Append the subtree below `node` to `newick`
fn format_tree_node<T: Display>(tree: &Tree<T>, node: Node, newick: &mut String) -> Option<()> {
    if let Some(label) = tree.label(node) {
        write!(newick, "{}", label).ok()?;
    } else {
        newick.push('(');
        for (i, &child) in tree.children(node).iter().enumerate() {
            if i > 0 {
                newick.push(',');
            }
            format_tree_node(tree, child, newick)?;
        }
        newick.push(')');
    }
    Some(())
}

/// Format a hybridization network into an extended Newick string, using the labels in `table`.
/// Taxa without a label are written as their numeric id.
pub fn format_network(network: &Network, table: &TaxonTable) -> String {
    let mut formatter = NetworkFormatter {
        network,
        table,
        newick: String::new(),
        reticulations: HashMap::new(),
    };
    formatter.visit_node(network.root());
    formatter.newick.push(';');
    formatter.newick
}

/// The state of formatting a network
struct NetworkFormatter<'a> {

    /// The network being formatted
    network: &'a Network,

    /// The taxon labels
    table: &'a TaxonTable,

    /// The output built so far
    newick: String,

    /// Reticulations visited so far and their numbers
    reticulations: HashMap<NodeId, usize>,
}

impl<'a> NetworkFormatter<'a> {

    /// Visit the given node
    fn visit_node(&mut self, node: NodeId) {
        let network         = self.network;
        let data            = &network[node];
        let is_reticulation = data.parents().len() > 1;

        if is_reticulation {
            if let Some(number) = self.reticulations.get(&node) {
                let _ = write!(self.newick, "#H{}", number);
                return;
            }
            let number = self.reticulations.len();
            self.reticulations.insert(node, number);
        }

        if data.is_leaf() {
            for (i, taxon) in data.taxa().iter().enumerate() {
                if i > 0 {
                    self.newick.push('+');
                }
                match self.table.label(taxon) {
                    Some(label) => self.newick.push_str(label),
                    None => {
                        let _ = write!(self.newick, "{}", taxon);
                    }
                }
            }
        } else {
            self.newick.push('(');
            for (i, edge) in data.children().iter().enumerate() {
                if i > 0 {
                    self.newick.push(',');
                }
                self.visit_node(edge.target);
            }
            self.newick.push(')');
        }

        if is_reticulation {
            let _ = write!(self.newick, "#H{}", self.reticulations[&node]);
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::taxa::TaxonSet;

    /// Test that a well-formed one-line Newick string is parsed and formatted correctly.
    #[test]
    fn parse_tree_success() {
        let mut builder = TreeBuilder::new();
        assert!(
            parse_tree(&mut builder, "(a,foo_bar$:432,((c,  d   )e:12  ,(  f,g,h)i,j));").is_ok()
        );
        let trees = builder.trees();
        assert_eq!(trees.len(), 1);
        let newick = format_tree(&trees[0]).unwrap();
        assert_eq!(newick, "(a,foo_bar$,((c,d),(f,g,h),j));");
    }

    /// Test that a well-formed multi-line Newick string is parsed and formatted correctly.
    #[test]
    fn parse_forest_success() {
        let mut builder = TreeBuilder::new();
        assert!(parse_forest(&mut builder, "(((a,b),c),(d,e))   ;\nf;\n\n(g,((h,i),j));\n").is_ok());
        let trees = builder.trees();
        assert_eq!(trees.len(), 3);
        let newick = format_forest(&trees).unwrap();
        assert_eq!(newick, "(((a,b),c),(d,e));\nf;\n(g,((h,i),j));\n");
    }

    /// Test that parse_tree rejects a multi-line string.
    #[test]
    fn parse_tree_multiline_failure() {
        let mut builder = TreeBuilder::new();
        assert!(parse_tree(&mut builder, "(((a,b),c),(d,e))   ;\nf;\n(g,((h,i),j));").is_err());
    }

    /// Test that parse_tree rejects a string with multiple pairs of top-level parentheses.
    #[test]
    fn parse_tree_missing_root_failure() {
        let mut builder = TreeBuilder::new();
        assert!(parse_tree(&mut builder, "((a,b),c)(d,(e,f));").is_err());
    }

    /// Test that parse_tree rejects a string with two semicolons.
    #[test]
    fn parse_tree_two_semicolons_failure() {
        let mut builder = TreeBuilder::new();
        assert!(parse_tree(&mut builder, "((a,b),c);(d,(e,f));").is_err());
    }

    /// Test that parse_tree rejects a string with too many closing parentheses.
    #[test]
    fn parse_tree_excess_close_failure() {
        let mut builder = TreeBuilder::new();
        assert!(parse_tree(&mut builder, "((a,b),c));").is_err());
    }

    /// Test that parse_tree rejects a leaf without a label.
    #[test]
    fn parse_tree_empty_leaf_failure() {
        let mut builder = TreeBuilder::new();
        assert!(parse_tree(&mut builder, "((a,),c);").is_err());
    }

    /// Test that parse errors report the line and column
    #[test]
    fn error_position() {
        let mut builder = TreeBuilder::new();
        let error       = parse_forest(&mut builder, "(a,b);\n(a,b)x(c);\n").unwrap_err();
        assert_eq!(error.to_string(), "expected `;' at position 2:7");
    }

    /// A reticulation is written in full on its first visit and by reference afterwards
    #[test]
    fn format_network_with_reticulation() {
        let mut table = TaxonTable::new();
        for label in &["a", "b", "c"] {
            table.id_or_insert(label);
        }
        let mut network = Network::new(TaxonSet::new());
        let root        = network.root();
        let left        = network.new_node(TaxonSet::new(), TaxonSet::new());
        let right       = network.new_node(TaxonSet::new(), TaxonSet::new());
        let a           = network.new_leaf(0);
        let b           = network.new_leaf(1);
        let c           = network.new_leaf(2);
        network.link(root, left, None);
        network.link(root, right, None);
        network.link(left, a, None);
        network.link(left, b, None);
        network.link(right, b, None);
        network.link(right, c, None);
        network.recompute_taxa();
        assert_eq!(format_network(&network, &table), "((a,b#H0),(#H0,c));");
    }
}
