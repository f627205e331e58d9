//! Error types and handling for modstrap
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Sub-modules carry convenience constructors grouped by error domain:
//! - [`config`]: Configuration errors
//! - [`fs`]: File system errors
//! - [`git`]: Git operation errors
//! - [`handoff`]: Entry point discovery and invocation errors
//! - [`manifest`]: Dependency manifest errors

pub mod config;
pub mod fs;
pub mod git;
pub mod handoff;
pub mod macros;
pub mod manifest;

#[cfg(test)]
mod tests;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for modstrap operations
#[derive(Error, Diagnostic, Debug)]
pub enum ModstrapError {
    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(modstrap::config::not_found),
        help("Create modstrap.yaml in the project root or omit --config to use built-in defaults")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to read configuration file: {path}: {reason}")]
    #[diagnostic(code(modstrap::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(modstrap::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(modstrap::config::invalid))]
    ConfigInvalid { message: String },

    // Project errors
    #[error("Project directory not found: {path}")]
    #[diagnostic(
        code(modstrap::project::not_found),
        help("Pass an existing project directory with --project")
    )]
    ProjectNotFound { path: String },

    // Git errors
    #[error("Git operation failed: {message}")]
    #[diagnostic(code(modstrap::git::operation_failed))]
    GitOperationFailed { message: String },

    #[error("Failed to clone repository: {url}: {reason}")]
    #[diagnostic(
        code(modstrap::git::clone_failed),
        help("Check that URL is correct and you have access to the repository")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Failed to pull into '{path}': {reason}")]
    #[diagnostic(code(modstrap::git::pull_failed))]
    GitPullFailed { path: String, reason: String },

    #[error("Failed to open repository at '{path}': {reason}")]
    #[diagnostic(code(modstrap::git::open_failed))]
    GitOpenFailed { path: String, reason: String },

    #[error("git {command} failed: {reason}")]
    #[diagnostic(
        code(modstrap::git::command_failed),
        help("Make sure git is installed and available on PATH")
    )]
    GitCommandFailed { command: String, reason: String },

    // Manifest errors
    #[error("Failed to parse dependency manifest: {path}: {reason}")]
    #[diagnostic(code(modstrap::manifest::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    // Handoff errors
    #[error("Installer handoff did not complete: {outcome}")]
    #[diagnostic(
        code(modstrap::handoff::failed),
        help("Fix the installer module and run 'modstrap install' again")
    )]
    HandoffFailed { outcome: String },

    #[error("Entry point '{entry_point}' failed: {reason}")]
    #[diagnostic(code(modstrap::handoff::entry_point_failed))]
    EntryPointFailed { entry_point: String, reason: String },

    #[error("Invalid exports for module '{module}': {reason}")]
    #[diagnostic(code(modstrap::handoff::invalid_exports))]
    ModuleExportsInvalid { module: String, reason: String },

    // Resolution errors
    #[error("Host did not finish dependency resolution within {seconds}s")]
    #[diagnostic(
        code(modstrap::resolution::timed_out),
        help("Raise resolve_timeout_secs in modstrap.yaml or run 'modstrap install' again")
    )]
    ResolutionTimedOut { seconds: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(modstrap::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(modstrap::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("Failed to clean mirror directory: {path}: {reason}")]
    #[diagnostic(code(modstrap::fs::cleanup_failed))]
    MirrorCleanupFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(modstrap::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for ModstrapError {
    fn from(err: std::io::Error) -> Self {
        ModstrapError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ModstrapError {
    fn from(err: serde_yaml::Error) -> Self {
        ModstrapError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ModstrapError {
    fn from(err: serde_json::Error) -> Self {
        ModstrapError::ManifestParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for ModstrapError {
    fn from(err: git2::Error) -> Self {
        ModstrapError::GitOperationFailed {
            message: err.message().to_string(),
        }
    }
}

impl From<inquire::InquireError> for ModstrapError {
    fn from(err: inquire::InquireError) -> Self {
        ModstrapError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, ModstrapError>;
