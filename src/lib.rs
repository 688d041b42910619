//! This crate computes the hybridization number of two rooted phylogenetic trees, which may have
//! multifurcations, together with all networks with this number of reticulations that display both
//! trees.
//!
//! The search removes taxa from both trees until they agree, shrinking the problem wherever the
//! trees share a subtree or a cluster, and builds the networks bottom-up from the agreeing trees
//! by turning every removed taxon into a reticulation.  Networks that differ only in redundant
//! structure are reported once.

pub mod autumn;
pub mod clusters;
pub mod error;
pub mod hybrid;
pub mod instance;
pub mod maaf;
pub mod merge;
pub mod network;
pub mod newick;
pub mod reduction;
pub mod refine;
pub mod removal;
pub mod subtrees;
pub mod taxa;
pub mod tree;

pub use crate::autumn::{hybridization_networks, Options, Outcome, Progress, Worker};
pub use crate::error::{Error, Result};
pub use crate::instance::LabelledNetwork;
