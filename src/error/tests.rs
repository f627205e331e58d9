//! Error type tests
//!
//! Tests for ModstrapError and its conversions.

#![allow(clippy::unwrap_used)]

use miette::Diagnostic;

use super::ModstrapError;
use super::{config, fs, git, handoff, manifest};

macro_rules! test_error_contains {
    ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
        #[test]
        fn $test_name() {
            let err = $err;
            let error_string = err.to_string();
            $(
                assert!(error_string.contains($contains),
                    "Error message should contain '{}', got: {}",
                    $contains,
                    error_string
                );
            )+
        }
    };
}

#[test]
fn test_error_display() {
    let err = git::clone_failed("https://example.com/a.git", "Repository not found");
    assert_eq!(
        err.to_string(),
        "Failed to clone repository: https://example.com/a.git: Repository not found"
    );
}

#[test]
fn test_error_code() {
    let err = config::invalid("duplicate module name");
    assert_eq!(
        err.code().map(|c| c.to_string()),
        Some("modstrap::config::invalid".to_string())
    );
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: ModstrapError = io_err.into();
    assert!(matches!(err, ModstrapError::IoError { .. }));
}

#[test]
fn test_yaml_error_conversion() {
    let parse_result: std::result::Result<serde_yaml::Value, _> =
        serde_yaml::from_str("invalid: yaml: content: [unclosed");
    let err: ModstrapError = parse_result.unwrap_err().into();
    assert!(matches!(err, ModstrapError::ConfigParseFailed { .. }));
}

#[test]
fn test_json_error_conversion() {
    let parse_result: std::result::Result<serde_json::Value, _> =
        serde_json::from_str("{ not json");
    let err: ModstrapError = parse_result.unwrap_err().into();
    assert!(matches!(err, ModstrapError::ManifestParseFailed { .. }));
}

#[test]
fn test_git_error_conversion() {
    let err: ModstrapError = git2::Error::from_str("git error").into();
    assert!(matches!(err, ModstrapError::GitOperationFailed { .. }));
}

test_error_contains!(
    test_pull_failed,
    git::pull_failed("/mirrors/core", "not a fast-forward"),
    "Failed to pull",
    "not a fast-forward"
);

test_error_contains!(
    test_command_failed,
    git::command_failed("clone", "exit status 128"),
    "git clone failed",
    "128"
);

test_error_contains!(
    test_cleanup_failed,
    fs::cleanup_failed("/mirrors/core", "access denied"),
    "Failed to clean mirror directory"
);

test_error_contains!(
    test_manifest_parse_failed,
    manifest::parse_failed("Packages/manifest.json", "expected value"),
    "Failed to parse dependency manifest",
    "Packages/manifest.json"
);

test_error_contains!(
    test_handoff_failed,
    handoff::failed("type not found"),
    "Installer handoff did not complete: type not found"
);

test_error_contains!(
    test_resolution_timed_out,
    handoff::resolution_timed_out(30),
    "within 30s"
);

#[test]
fn test_project_not_found_has_help() {
    let err = fs::project_not_found("/nowhere");
    assert!(err.help().is_some());
    assert!(matches!(err, ModstrapError::ProjectNotFound { .. }));
}
