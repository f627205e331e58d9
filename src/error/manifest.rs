//! Dependency manifest errors

use super::macros::error_constructors;

error_constructors! {
    parse_failed => ManifestParseFailed { path, reason },
}
