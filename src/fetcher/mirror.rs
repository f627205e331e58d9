//! Mirror directory inspection and cleanup

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, fs as fs_error};
use crate::git::Vcs;

/// On-disk state of one module's mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorState {
    Absent,
    /// Directory with version-control metadata
    Checkout,
    /// Directory (or file) that is not a recognized checkout
    Invalid,
}

impl MirrorState {
    pub fn inspect(path: &Path, vcs: &dyn Vcs) -> Self {
        if !path.exists() {
            MirrorState::Absent
        } else if path.is_dir() && vcs.is_checkout(path) {
            MirrorState::Checkout
        } else {
            MirrorState::Invalid
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MirrorState::Absent => "absent",
            MirrorState::Checkout => "checkout",
            MirrorState::Invalid => "invalid",
        }
    }
}

/// Default directory removal used by the fetcher
pub fn remove_dir(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn make_writable(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    if permissions.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}

/// Delete everything inside `dir` entry by entry, keeping `dir` itself
///
/// Read-only attributes are stripped before each deletion. Every entry is
/// attempted; the first failure is reported after the walk.
pub fn clear_dir_contents(dir: &Path) -> Result<()> {
    // Children of a read-only directory cannot be unlinked on Unix
    for entry in WalkDir::new(dir).into_iter().filter_map(std::result::Result::ok) {
        if entry.file_type().is_dir() {
            let _ = make_writable(entry.path());
        }
    }

    let mut failures = 0usize;
    let mut first_error = None;

    for entry in WalkDir::new(dir).min_depth(1).contents_first(true) {
        let outcome = entry.map_err(io::Error::from).and_then(|entry| {
            let path = entry.path();
            if entry.file_type().is_dir() {
                fs::remove_dir(path)
            } else {
                let _ = make_writable(path);
                fs::remove_file(path)
            }
        });

        if let Err(e) = outcome {
            failures += 1;
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        None => {
            debug!(dir = %dir.display(), "cleared mirror contents");
            Ok(())
        }
        Some(e) => Err(fs_error::cleanup_failed(
            dir.display().to_string(),
            format!("{failures} entries could not be removed: {e}"),
        )),
    }
}
