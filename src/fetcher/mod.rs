//! Repository fetcher: materialize one module's mirror
//!
//! The fetch algorithm:
//! 1. No mirror yet: clone.
//! 2. Valid checkout: pull in place. Success ends here.
//! 3. Pull failed, or the directory is not a checkout: remove the directory.
//!    An access-denied removal is retried once; if removal still fails the
//!    directory's contents are cleared entry by entry instead.
//! 4. Clone into the (now absent or empty) mirror.
//!
//! [`Fetcher::fetch`] never returns an error. Failures are logged and come
//! back as [`FetchOutcome::Failed`] so the pipeline can move on.

pub mod mirror;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub use mirror::MirrorState;

use crate::config::ModuleDescriptor;
use crate::error::Result;
use crate::git::Vcs;

/// Branch used when neither config nor the mirror names one
const FALLBACK_BRANCH: &str = "main";

/// Directory removal strategy, swappable so tests can simulate locked files
pub type RemoveDirFn = Box<dyn Fn(&Path) -> io::Result<()>>;

/// Result of fetching one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Cloned,
    Updated,
    Failed(String),
}

impl FetchOutcome {
    /// Whether the mirror holds a usable checkout afterwards
    pub fn is_materialized(&self) -> bool {
        matches!(self, FetchOutcome::Cloned | FetchOutcome::Updated)
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Cloned => write!(f, "cloned"),
            FetchOutcome::Updated => write!(f, "updated"),
            FetchOutcome::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// Mirror path for a module under the mirror root
pub fn mirror_path(mirror_root: &Path, module_name: &str) -> PathBuf {
    mirror_root.join(module_name)
}

/// Fetches module sources into mirror directories
pub struct Fetcher<'a> {
    vcs: &'a dyn Vcs,
    remote: String,
    branch: Option<String>,
    remove_dir: RemoveDirFn,
}

impl<'a> Fetcher<'a> {
    pub fn new(vcs: &'a dyn Vcs, remote: impl Into<String>, branch: Option<String>) -> Self {
        Self {
            vcs,
            remote: remote.into(),
            branch,
            remove_dir: Box::new(mirror::remove_dir),
        }
    }

    /// Replace the directory removal strategy
    #[cfg(test)]
    #[must_use]
    pub fn with_remove_dir(mut self, remove_dir: RemoveDirFn) -> Self {
        self.remove_dir = remove_dir;
        self
    }

    /// Fetch or update `module` under `mirror_root`
    pub fn fetch(&self, module: &ModuleDescriptor, mirror_root: &Path) -> FetchOutcome {
        match self.try_fetch(module, mirror_root) {
            Ok(outcome) => {
                info!(module = %module.name, %outcome, "module fetched");
                outcome
            }
            Err(e) => {
                warn!(module = %module.name, source = %module.source, error = %e, "module fetch failed, skipping");
                FetchOutcome::Failed(e.to_string())
            }
        }
    }

    fn try_fetch(&self, module: &ModuleDescriptor, mirror_root: &Path) -> Result<FetchOutcome> {
        fs::create_dir_all(mirror_root)?;
        let path = mirror_path(mirror_root, &module.name);

        match MirrorState::inspect(&path, self.vcs) {
            MirrorState::Absent => {}
            MirrorState::Checkout => {
                let branch = self.update_branch(&path);
                match self.vcs.pull(&path, &self.remote, &branch) {
                    Ok(()) => return Ok(FetchOutcome::Updated),
                    Err(e) => {
                        warn!(module = %module.name, error = %e, "update failed, re-cloning");
                    }
                }
                self.reset_mirror(&path)?;
            }
            MirrorState::Invalid => {
                warn!(module = %module.name, path = %path.display(), "mirror is not a checkout, re-cloning");
                self.reset_mirror(&path)?;
            }
        }

        self.vcs.clone_repo(&module.source, &path)?;
        Ok(FetchOutcome::Cloned)
    }

    fn update_branch(&self, path: &Path) -> String {
        self.branch
            .clone()
            .or_else(|| self.vcs.current_branch(path))
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string())
    }

    /// Remove the mirror, falling back to emptying it in place
    fn reset_mirror(&self, path: &Path) -> Result<()> {
        let first = match (self.remove_dir)(path) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        if first.kind() == io::ErrorKind::PermissionDenied {
            warn!(path = %path.display(), error = %first, "mirror removal denied, retrying once");
            match (self.remove_dir)(path) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "retry failed, clearing contents instead");
                }
            }
        } else {
            warn!(path = %path.display(), error = %first, "mirror removal failed, clearing contents instead");
        }

        mirror::clear_dir_contents(path)
    }
}
