//! Git operations for module mirrors
//!
//! This module handles:
//! - Cloning a module source into its mirror directory
//! - Updating an existing mirror in place (pull of one branch)
//! - Telling a real checkout apart from a stray directory
//!
//! Two backends implement [`Vcs`]: libgit2 in-process (default) and the
//! external `git` executable. Authentication is delegated to git's native
//! system either way (SSH agent, keys in ~/.ssh/, credential helpers).

pub mod auth;
pub mod command;
pub mod error;
pub mod libgit2;
pub mod url;

use std::path::Path;

pub use command::CommandVcs;
pub use libgit2::Libgit2Vcs;

use crate::config::VcsKind;
use crate::error::Result;

/// Version-control operations the fetcher needs
pub trait Vcs {
    /// Clone `url` into `target` (absent or empty directory)
    fn clone_repo(&self, url: &str, target: &Path) -> Result<()>;

    /// Update the checkout at `repo` from `remote`/`branch`
    fn pull(&self, repo: &Path, remote: &str, branch: &str) -> Result<()>;

    /// Whether `path` holds version-control metadata
    fn is_checkout(&self, path: &Path) -> bool;

    /// Branch checked out at `path`, None when detached or unreadable
    fn current_branch(&self, path: &Path) -> Option<String>;
}

/// Build the backend selected in configuration
pub fn backend(kind: VcsKind) -> Box<dyn Vcs> {
    match kind {
        VcsKind::Libgit2 => Box::new(Libgit2Vcs),
        VcsKind::Command => Box::new(CommandVcs::default()),
    }
}
