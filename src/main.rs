//! Modstrap - module framework bootstrapper
//!
//! Checks whether a host project already has the framework's required
//! modules. If not, clones each module from git into a local mirror,
//! registers the mirrors in the project's dependency manifest, waits for the
//! host to resolve them and hands control to the framework's installer.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod detector;
mod error;
mod fetcher;
mod git;
mod handoff;
mod host;
mod manifest;
mod pipeline;
mod progress;
mod resolution;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};

/// Log filter when RUST_LOG is not set
fn default_filter(verbose: bool) -> &'static str {
    if verbose { "modstrap=debug" } else { "modstrap=info" }
}

/// Logs go to stderr so stdout only carries command output
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Run(args) => commands::run::run(cli.project.clone(), config, args),
        Commands::Install => commands::install::run(cli.project.clone(), config),
        Commands::Status => commands::status::run(cli.project.clone(), config),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
