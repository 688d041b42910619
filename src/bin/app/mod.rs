//! This module encapsulates all the wrapper code to bundle the hybridization network code into a
//! complete binary.

mod config;
mod io;
mod logic;
mod result;

pub use self::config::Config;
pub use self::io::{read_input, write_output};
pub use self::logic::hybridization_networks;
pub use self::result::{Error, Result};
