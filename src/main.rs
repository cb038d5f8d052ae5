use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nvs::cli::{self, Cli};
use nvs::config::Config;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(cli, &config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
