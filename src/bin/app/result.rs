//! This module provides result and error types for the main binary `autumn`.

use autumn::newick;
use std::io;
use std::result;
use thiserror::Error;

/// A result type for functions in the autumn app
pub type Result<T> = result::Result<T, Error>;

/// Everything that can go wrong between reading the input and writing the output
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the Newick parser
    #[error("Parse error: {0}")]
    ParseError(#[from] newick::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IOError(#[from] io::Error),

    /// The input does not hold exactly two trees
    #[error("Input error: expected two trees, found {0}")]
    TreeCount(usize),

    /// The computation failed
    #[error("Search error: {0}")]
    SearchError(#[from] autumn::Error),
}
