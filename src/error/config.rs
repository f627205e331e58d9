//! Configuration errors

use super::macros::error_constructors;

error_constructors! {
    not_found => ConfigNotFound { path },
    read_failed => ConfigReadFailed { path, reason },
    parse_failed => ConfigParseFailed { path, reason },
    invalid => ConfigInvalid { message },
}
