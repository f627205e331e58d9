//! Install command implementation
//!
//! Manual trigger for the bootstrap. Never prompts. Safe to re-run: once the
//! required modules are loaded it re-enters the installer handoff instead of
//! provisioning again.

use std::path::{Path, PathBuf};

use crate::commands::helpers::{execute, load_setup};
use crate::error::Result;

pub fn run(project: Option<PathBuf>, config: Option<&Path>) -> Result<()> {
    let setup = load_setup(project, config)?;
    execute(&setup, None)
}
