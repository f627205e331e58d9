//! Command helper utilities

use std::path::{Path, PathBuf};

use console::Style;

use crate::config::BootstrapConfig;
use crate::error::{Result, fs, handoff};
use crate::git;
use crate::host::ProjectHost;
use crate::pipeline::{
    Bootstrap, BootstrapContext, ConfirmFn, ResolutionOutcome, RunPath, RunReport,
};
use crate::progress::ProgressDisplay;

/// Resolve project path from optional argument
///
/// If a project path is provided, use it. Otherwise,
/// resolve to the current directory.
pub fn resolve_project_path(project: Option<PathBuf>) -> Result<PathBuf> {
    match project {
        Some(path) => Ok(path),
        None => std::env::current_dir()
            .map_err(|e| fs::io_error(format!("Failed to get current directory: {e}"))),
    }
}

/// Configuration plus the run context derived from it
pub struct Setup {
    pub config: BootstrapConfig,
    pub ctx: BootstrapContext,
}

pub fn load_setup(project: Option<PathBuf>, config_path: Option<&Path>) -> Result<Setup> {
    let project = resolve_project_path(project)?;
    if !project.is_dir() {
        return Err(fs::project_not_found(project.display().to_string()));
    }
    let config = BootstrapConfig::load(&project, config_path)?;
    let ctx = BootstrapContext::new(&project, &config)?;
    Ok(Setup { config, ctx })
}

/// Run the bootstrap against the project host and report the result
pub fn execute(setup: &Setup, confirm: Option<ConfirmFn<'_>>) -> Result<()> {
    let mut host = ProjectHost::open(&setup.ctx.project_root, &setup.config)?;
    let vcs = git::backend(setup.config.vcs);
    let mut bootstrap = Bootstrap::new(&setup.ctx, &mut host, vcs.as_ref())
        .with_progress(ProgressDisplay::for_stderr(setup.ctx.modules.len() as u64));
    if let Some(confirm) = confirm {
        bootstrap = bootstrap.with_confirmation(confirm);
    }

    let report = bootstrap.run();
    print_report(&report);
    report_result(&report, setup.config.resolve_timeout_secs)
}

/// Print the end-of-run summary to stdout
pub fn print_report(report: &RunReport) {
    let bold = Style::new().bold();
    let green = Style::new().green();
    let red = Style::new().red();
    let dim = Style::new().dim();

    match report.path {
        RunPath::AlreadyPresent => {
            println!("{}", dim.apply_to("Required modules already installed."));
        }
        RunPath::Declined => {
            println!("{}", dim.apply_to("Provisioning cancelled."));
            return;
        }
        RunPath::Provisioned => {}
    }

    if !report.modules.is_empty() {
        println!("{}", bold.apply_to("Modules:"));
        for module in &report.modules {
            let marker = if module.is_installed() {
                green.apply_to("✓")
            } else {
                red.apply_to("✗")
            };
            let patch = module
                .patch
                .map_or_else(|| "not registered".to_string(), |p| p.to_string());
            println!("  {marker} {} ({}, {patch})", module.name, module.fetch);
            if let Some(error) = &module.error {
                println!("      {}", red.apply_to(error));
            }
        }
        if report.all_failed() {
            println!("{}", red.apply_to("No module could be installed."));
        }
        println!(
            "{} {}/{} installed",
            bold.apply_to("Result:"),
            report.installed_count(),
            report.modules.len()
        );
    }

    if report.resolution != ResolutionOutcome::NotRequested {
        println!("{} {}", bold.apply_to("Resolution:"), report.resolution);
    }

    let handoff = if report.handoff.is_invoked() {
        green.apply_to(report.handoff.to_string())
    } else {
        red.apply_to(report.handoff.to_string())
    };
    println!("{} {handoff}", bold.apply_to("Installer:"));
}

/// Exit status for a finished run
///
/// A declined run is not a failure. Otherwise the installer must have been
/// started.
pub fn report_result(report: &RunReport, timeout_secs: u64) -> Result<()> {
    if report.path == RunPath::Declined || report.is_success() {
        return Ok(());
    }
    if report.resolution == ResolutionOutcome::TimedOut {
        return Err(handoff::resolution_timed_out(timeout_secs));
    }
    Err(handoff::failed(report.handoff.to_string()))
}
