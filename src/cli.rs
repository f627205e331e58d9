//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Modstrap - module framework bootstrapper
///
/// Provision the framework's modules from git into a host project and hand off to its installer.
#[derive(Parser, Debug)]
#[command(
    name = "modstrap",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Bootstraps a modular plugin framework into a host project",
    long_about = "Modstrap checks whether the framework's required modules are loaded by the host \
                  project. If not, it clones each module into a local mirror, registers the mirrors \
                  in the project's dependency manifest, waits for the host to resolve them and \
                  hands control to the framework's installer.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  modstrap run\n    \
                  modstrap run --yes\n    \
                  modstrap install --project ./game\n    \
                  modstrap status"
)]
pub struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(long, short = 'p', global = true, env = "MODSTRAP_PROJECT")]
    pub project: Option<PathBuf>,

    /// Configuration file (defaults to modstrap.yaml in the project)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Startup flow: hand off, or provision after confirmation
    Run(RunArgs),

    /// Provision without asking, or re-enter the handoff when already installed
    Install,

    /// Show detection, mirror and manifest state
    Status,

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Ask before provisioning missing modules:\n    modstrap run\n\n\
                  Provision without a prompt (CI):\n    modstrap run --yes")]
pub struct RunArgs {
    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(long, value_enum)]
    pub shell: clap_complete::Shell,
}
