//! Run command implementation
//!
//! The startup flow. When the required modules are already loaded this goes
//! straight to the installer handoff. Otherwise the user is asked before any
//! module is fetched, unless `--yes` was given.

use std::path::{Path, PathBuf};

use inquire::Confirm;
use tracing::warn;

use crate::cli::RunArgs;
use crate::commands::helpers::{execute, load_setup};
use crate::config::ModuleDescriptor;
use crate::error::Result;
use crate::pipeline::ConfirmFn;

/// Ask the user whether to provision the listed modules
///
/// A prompt that cannot be shown (no terminal) counts as declined.
fn confirm_provisioning(modules: &[ModuleDescriptor]) -> bool {
    println!("\nThe following module(s) will be fetched and registered:");
    for module in modules {
        println!("  - {} ({})", module.name, module.source);
    }
    println!();

    match Confirm::new("Install the module framework now?")
        .with_default(true)
        .with_help_message("Press Enter to confirm, or 'n' to cancel")
        .prompt()
    {
        Ok(answer) => answer,
        Err(e) => {
            warn!(error = %e, "confirmation prompt unavailable, not provisioning; rerun with --yes");
            false
        }
    }
}

pub fn run(project: Option<PathBuf>, config: Option<&Path>, args: &RunArgs) -> Result<()> {
    let setup = load_setup(project, config)?;
    let confirm = if args.yes {
        None
    } else {
        Some(Box::new(confirm_provisioning) as ConfirmFn<'_>)
    };
    execute(&setup, confirm)
}
