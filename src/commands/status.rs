//! Status command implementation
//!
//! Read-only: reports what the detector sees, the state of every module's
//! mirror and whether the manifest references it.

use std::path::{Path, PathBuf};

use console::Style;

use crate::commands::helpers::load_setup;
use crate::detector::required_modules_present;
use crate::error::Result;
use crate::fetcher::MirrorState;
use crate::git;
use crate::host::ProjectHost;
use crate::manifest::references_module;

pub fn run(project: Option<PathBuf>, config: Option<&Path>) -> Result<()> {
    let setup = load_setup(project, config)?;
    let host = ProjectHost::open(&setup.ctx.project_root, &setup.config)?;
    let vcs = git::backend(setup.config.vcs);

    let bold = Style::new().bold();
    let dim = Style::new().dim();

    let present = required_modules_present(&host, &setup.ctx.required);
    println!(
        "{} {}",
        bold.apply_to("Installed:"),
        if present { "yes" } else { "no" }
    );
    println!(
        "{} {}",
        bold.apply_to("Manifest:"),
        setup.ctx.manifest_path.display()
    );
    println!(
        "{} {}",
        bold.apply_to("Mirrors:"),
        setup.ctx.mirror_root.display()
    );

    if setup.ctx.modules.is_empty() {
        println!("{}", dim.apply_to("No modules configured."));
        return Ok(());
    }

    println!("{}", bold.apply_to("Modules:"));
    for module in &setup.ctx.modules {
        let mirror = MirrorState::inspect(&setup.ctx.mirror_path(module), vcs.as_ref());
        let manifest = match references_module(&setup.ctx.manifest_path, &module.name) {
            Some(true) => "registered",
            Some(false) => "not registered",
            None => "manifest unreadable",
        };
        println!(
            "  {} {} {}",
            Style::new().yellow().apply_to(&module.name),
            mirror.label(),
            dim.apply_to(format!("({manifest})"))
        );
    }

    Ok(())
}
