//! File system errors

use super::ModstrapError;
use super::macros::error_constructors;

error_constructors! {
    read_failed => FileReadFailed { path, reason },
    write_failed => FileWriteFailed { path, reason },
    cleanup_failed => MirrorCleanupFailed { path, reason },
    project_not_found => ProjectNotFound { path },
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> ModstrapError {
    ModstrapError::IoError {
        message: message.into(),
    }
}
