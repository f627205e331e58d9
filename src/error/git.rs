//! Git operation errors

use super::macros::error_constructors;

error_constructors! {
    clone_failed => GitCloneFailed { url, reason },
    pull_failed => GitPullFailed { path, reason },
    open_failed => GitOpenFailed { path, reason },
    command_failed => GitCommandFailed { command, reason },
}
