mod app;

use std::process;
use tracing_subscriber::EnvFilter;

/// Main function
fn main() {
    let cfg = app::Config::new();

    // AUTUMN_LOG overrides the level chosen on the command line
    let level = if cfg.verbose { "debug" } else { "warn" };
    let log_level = std::env::var("AUTUMN_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new(&log_level))
        .init();

    if let Err(e) = run(&cfg) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

/// Read the trees, compute the networks and write them out
fn run(cfg: &app::Config) -> app::Result<()> {
    let (tree1, tree2) = app::read_input(&cfg.input)?;
    let outcome = app::hybridization_networks(cfg, tree1, tree2)?;
    app::write_output(cfg.output.as_deref(), &outcome)
}
