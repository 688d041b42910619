//! This module contains all the command line parsing code and provides a `Config` struct that
//! encapsulates all the parsed configuration options.

use autumn::Options;
use clap::{crate_name, crate_version, App, Arg};
use std::time::Duration;

/// A structure to hold all the configuration parameters
pub struct Config {
    /// The name of the input file
    pub input: String,

    /// The name of the output file
    pub output: Option<String>,

    /// The options passed to the search
    pub options: Options,

    /// Cancel the search after this long
    pub time_limit: Option<Duration>,

    /// Log what the search does
    pub verbose: bool,
}

impl Config {
    /// Create a new config object from the command line arguments
    pub fn new() -> Self {
        // Define the acceptable arguments
        let args = [
            Arg::with_name("input")
                .required(true)
                .takes_value(true)
                .value_name("input")
                .help("input file")
                .long_help(
"input file; contains two trees in Newick format, one tree per line"),
            Arg::with_name("output")
                .required(false)
                .takes_value(true)
                .value_name("output")
                .short("o")
                .long("output")
                .help("output file")
                .long_help(
"output file; receives the hybridization number and the minimal networks in extended Newick \
format"),
            Arg::with_name("dont_use_cache")
                .required(false)
                .takes_value(false)
                .short("c")
                .long("no-cache")
                .help("disable the cache")
                .long_help(
"do not remember solved and refuted subproblems; this changes only the running time"),
            Arg::with_name("cache_capacity")
                .required(false)
                .takes_value(true)
                .value_name("n")
                .long("cache-capacity")
                .validator(validate_positive)
                .help("the number of subproblems to remember")
                .long_help(
"the maximum number of subproblems the cache remembers; the least recently used one is \
forgotten first"),
            Arg::with_name("time_limit")
                .required(false)
                .takes_value(true)
                .value_name("secs")
                .short("t")
                .long("time-limit")
                .validator(validate_positive)
                .help("stop the search after this many seconds")
                .long_help(
"stop the search after this many seconds; the output then reports a lower bound on the \
hybridization number and no networks"),
            Arg::with_name("verbose")
                .required(false)
                .takes_value(false)
                .short("v")
                .long("verbose")
                .help("log the progress of the search")
                .long_help(
"log the progress of the search to stderr; the AUTUMN_LOG environment variable takes precedence"),
        ];

        // Parse the arguments
        let args = App::new(crate_name!())
            .version(crate_version!())
            .about("Compute all minimum hybridization networks of two rooted phylogenetic trees")
            .long_about(
"Compute the hybridization number of two rooted, possibly multifurcating, phylogenetic trees and \
all networks with this number of reticulations that display both trees")
            .args(&args)
            .get_matches();

        let input = args.value_of("input").unwrap_or_default().to_string();
        let output = args.value_of("output").map(|s| s.to_string());
        let defaults = Options::default();
        let options = Options {
            use_cache: !args.is_present("dont_use_cache"),
            cache_capacity: parse_positive(args.value_of("cache_capacity"))
                .unwrap_or(defaults.cache_capacity),
        };
        let time_limit = parse_positive(args.value_of("time_limit"))
            .map(|secs| Duration::from_secs(secs as u64));
        let verbose = args.is_present("verbose");

        Self {
            input,
            output,
            options,
            time_limit,
            verbose,
        }
    }
}

/// Check that the argument is a positive integer
fn validate_positive(arg: String) -> Result<(), String> {
    match arg.parse::<usize>() {
        Ok(x) if x > 0 => Ok(()),
        _ => Err(String::from("Argument must be a positive integer")),
    }
}

/// Parse an argument already checked by `validate_positive`
fn parse_positive(arg: Option<&str>) -> Option<usize> {
    arg.and_then(|arg| arg.parse::<usize>().ok())
}
