//! Turning libgit2 errors into short, user-facing reasons

use git2::{Error, ErrorClass, ErrorCode};

/// Message fragments checked in order; the first match wins
const MESSAGE_PATTERNS: &[(&[&str], &str)] = &[
    (
        &["not found", "404", "too many redirects", "authentication replays"],
        "Repository not found",
    ),
    (&["authentication", "credentials"], "Authentication failed"),
    (&["permission denied", "access denied"], "Permission denied"),
    (
        &["connection", "network", "timeout", "timed out", "could not resolve host"],
        "Network error",
    ),
];

/// Interpret a git2 error and provide a more user-friendly message
pub fn interpret_git_error(err: &Error) -> String {
    if err.code() == ErrorCode::NotFastForward {
        return "Local branch has diverged from the remote".to_string();
    }

    let message = err.message().to_lowercase();
    for (needles, reason) in MESSAGE_PATTERNS {
        if needles.iter().any(|needle| message.contains(needle)) {
            return (*reason).to_string();
        }
    }

    match err.class() {
        ErrorClass::Http if message.contains("certificate") => "Certificate error".to_string(),
        ErrorClass::Http if message.contains("ssl") => "SSL error".to_string(),
        ErrorClass::Http => format!("HTTP error: {}", err.message()),
        ErrorClass::Ssh => format!("SSH error: {}", err.message()),
        _ => err.message().to_string(),
    }
}
