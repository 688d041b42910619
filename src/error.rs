//! The error type of the hybridization network computation.

use crate::taxa::{Taxon, TaxonSet};
use std::result;
use thiserror::Error;

/// A result type whose error type is `Error`
pub type Result<T> = result::Result<T, Error>;

/// Everything that can stop a computation.  `DisjointTaxa` and `DuplicateTaxon` reject the input,
/// `Cancelled` reports a cancelled search, and all other variants indicate a broken invariant.
#[derive(Debug, Error)]
pub enum Error {
    /// The input trees have no taxon in common, so there is nothing to reconcile
    #[error("the two trees share no taxa")]
    DisjointTaxa,

    /// A leaf label occurs more than once in the same tree
    #[error("taxon {0} occurs more than once in the same tree")]
    DuplicateTaxon(String),

    /// The taxon sets of the two trees differ where they must be identical
    #[error("taxon sets differ: {first:?} vs {second:?}")]
    TaxonMismatch { first: TaxonSet, second: TaxonSet },

    /// Two trees declared isomorphic could not be merged
    #[error("trees on {0:?} are not isomorphic")]
    NotIsomorphic(TaxonSet),

    /// A new reticulation does not have two incoming edges from different trees
    #[error("hybrid node for taxon {taxon} has {in_degree} incoming edge(s) with tags {tags}")]
    HybridPostcondition {
        taxon: Taxon,
        in_degree: usize,
        tags: String,
    },

    /// A network does not contain the leaf a sub-solution should be substituted for
    #[error("no leaf carries placeholder taxon {0}")]
    MissingPlaceholder(Taxon),

    /// The search ran past the largest hybridization number two trees on these taxa can have
    #[error("no network found with up to {0} reticulations")]
    Exhausted(usize),

    /// The search was cancelled
    #[error("search cancelled")]
    Cancelled,
}
