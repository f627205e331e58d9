//! Handoff and resolution errors

use super::ModstrapError;
use super::macros::error_constructors;

error_constructors! {
    failed => HandoffFailed { outcome },
    entry_point_failed => EntryPointFailed { entry_point, reason },
    invalid_exports => ModuleExportsInvalid { module, reason },
}

/// The host never reported resolution within the configured bound
pub fn resolution_timed_out(seconds: u64) -> ModstrapError {
    ModstrapError::ResolutionTimedOut {
        seconds: seconds.to_string(),
    }
}
