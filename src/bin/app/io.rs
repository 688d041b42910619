//! This module contains all the code for reading the input of `autumn` and writing the result of
//! the computation back to screen or to a file.

use crate::app;
use autumn::newick;
use autumn::tree::{Tree, TreeBuilder};
use autumn::Outcome;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::io::{Read, Write};

/// Read the two input trees from a file
pub fn read_input(file_name: &str) -> app::Result<(Tree<String>, Tree<String>)> {
    let mut newick = String::from("");
    fs::File::open(file_name)?.read_to_string(&mut newick)?;
    let mut builder: TreeBuilder<String> = TreeBuilder::new();
    newick::parse_forest(&mut builder, &newick)?;
    let mut trees = builder.trees();
    if trees.len() != 2 {
        return Err(app::Error::TreeCount(trees.len()));
    }
    let second = trees.pop().ok_or(app::Error::TreeCount(0))?;
    let first = trees.pop().ok_or(app::Error::TreeCount(1))?;
    Ok((first, second))
}

/// Write the result to a file or stdout
pub fn write_output(file_name: Option<&str>, outcome: &Outcome) -> app::Result<()> {
    let mut file: Box<dyn io::Write> = match file_name {
        Some(file_name) => Box::new(fs::File::create(file_name)?),
        None => Box::new(io::stdout()),
    };
    let output = format_output(outcome);
    write!(file, "{}", output)?;
    Ok(())
}

/// Format the hybridization number and the networks, one per line
fn format_output(outcome: &Outcome) -> String {
    let mut output = String::new();
    let relation = if outcome.exact { "=" } else { ">=" };
    let _ = writeln!(
        &mut output,
        "hybridization number {} {}",
        relation, outcome.hybridization_number
    );
    for network in &outcome.networks {
        let _ = writeln!(&mut output, "{}", network);
    }
    output
}
