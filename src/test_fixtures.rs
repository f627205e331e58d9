//! Test fixtures shared by unit tests
//!
//! - Temp directories that never land under the current working directory
//! - Real local git repositories to clone from over `file://`
//! - [`RecordingVcs`], a scripted backend that logs every call
//! - [`FakeHost`], an in-memory host with a scripted resolver
//!
//! ```ignore
//! use crate::test_fixtures::{create_source_repo, create_temp_dir, file_url};
//!
//! let (_source_temp, source) = create_source_repo();
//! let temp = create_temp_dir();
//! Libgit2Vcs.clone_repo(&file_url(&source), &temp.path().join("core"))?;
//! ```

use std::cell::RefCell;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use git2::{Oid, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

use crate::error::{Result, git};
use crate::git::Vcs;
use crate::handoff::{EntryPointRegistry, ModuleExports};
use crate::host::{ChangeChannel, Host, LoadedModule, ModulesChanged};

fn temp_base() -> PathBuf {
    let dir = env::temp_dir();
    if dir.is_absolute() {
        dir
    } else {
        PathBuf::from("/tmp")
    }
}

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(temp_base()).expect("Failed to create temp directory")
}

/// Create a repository on branch `main` with one commit (README.md).
///
/// Returns the `TempDir` (which cleans up on drop) and the repository path.
///
/// # Panics
///
/// Panics if the repository cannot be created.
#[must_use]
pub fn create_source_repo() -> (TempDir, PathBuf) {
    let temp = create_temp_dir();
    let path = temp.path().join("source");
    let mut options = RepositoryInitOptions::new();
    options.initial_head("main");
    Repository::init_opts(&path, &options).expect("Failed to init git repository");
    commit_file(&path, "README.md", "# module\n");
    (temp, path)
}

/// Write `content` to `relative` inside the repository and commit it.
///
/// # Panics
///
/// Panics if any git operation fails.
pub fn commit_file(repo_path: &Path, relative: &str, content: &str) -> Oid {
    let repo = Repository::open(repo_path).expect("Failed to open repository");
    let file = repo_path.join(relative);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&file, content).expect("Failed to write file");

    let mut index = repo.index().expect("Failed to open index");
    index
        .add_path(Path::new(relative))
        .expect("Failed to stage file");
    index.write().expect("Failed to write index");
    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");

    let signature = Signature::now("modstrap", "modstrap@example.com")
        .expect("Failed to create signature");
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        &format!("Add {relative}"),
        &tree,
        &parents,
    )
    .expect("Failed to commit")
}

/// `file://` URL for a local repository path
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// A call recorded by [`RecordingVcs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Clone { url: String, target: PathBuf },
    Pull { repo: PathBuf, branch: String },
}

/// Scripted backend: clones create a fake checkout, listed URLs fail
#[derive(Debug, Default)]
pub struct RecordingVcs {
    calls: RefCell<Vec<VcsCall>>,
    failing_urls: HashSet<String>,
    pull_fails: bool,
}

impl RecordingVcs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing_url(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    #[must_use]
    pub fn failing_pulls(mut self) -> Self {
        self.pull_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.borrow().clone()
    }

    /// URLs passed to clone, in call order
    pub fn cloned_urls(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                VcsCall::Clone { url, .. } => Some(url.clone()),
                VcsCall::Pull { .. } => None,
            })
            .collect()
    }
}

impl Vcs for RecordingVcs {
    fn clone_repo(&self, url: &str, target: &Path) -> Result<()> {
        self.calls.borrow_mut().push(VcsCall::Clone {
            url: url.to_string(),
            target: target.to_path_buf(),
        });
        if self.failing_urls.contains(url) {
            return Err(git::clone_failed(url, "Repository not found"));
        }
        fs::create_dir_all(target.join(".git"))?;
        fs::write(target.join("README.md"), url)?;
        Ok(())
    }

    fn pull(&self, repo: &Path, _remote: &str, branch: &str) -> Result<()> {
        self.calls.borrow_mut().push(VcsCall::Pull {
            repo: repo.to_path_buf(),
            branch: branch.to_string(),
        });
        if self.pull_fails {
            return Err(git::pull_failed(
                repo.display().to_string(),
                "Network error",
            ));
        }
        Ok(())
    }

    fn is_checkout(&self, path: &Path) -> bool {
        path.join(".git").is_dir()
    }

    fn current_branch(&self, path: &Path) -> Option<String> {
        self.is_checkout(path).then(|| "main".to_string())
    }
}

/// In-memory host
///
/// Resolution loads every module scheduled with [`FakeHost::on_resolve`]
/// and publishes one change, unless the host was made silent.
#[derive(Debug, Default)]
pub struct FakeHost {
    loaded: Vec<String>,
    registry: EntryPointRegistry,
    changes: ChangeChannel,
    on_resolve: Vec<(String, ModuleExports)>,
    silent: bool,
    pub resolve_calls: usize,
    pub refresh_calls: usize,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loaded(names: &[&str]) -> Self {
        Self {
            loaded: names.iter().map(|name| (*name).to_string()).collect(),
            ..Self::default()
        }
    }

    /// Load `module` with `exports` when dependencies are next resolved
    #[must_use]
    pub fn on_resolve(mut self, module: &str, exports: ModuleExports) -> Self {
        self.on_resolve.push((module.to_string(), exports));
        self
    }

    /// Never publish a change notification
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn registry_mut(&mut self) -> &mut EntryPointRegistry {
        &mut self.registry
    }
}

impl Host for FakeHost {
    fn is_module_loaded(&self, name: &str) -> bool {
        self.loaded
            .iter()
            .any(|loaded| loaded.eq_ignore_ascii_case(name))
    }

    fn loaded_modules(&self) -> Vec<LoadedModule> {
        self.loaded.iter().map(LoadedModule::new).collect()
    }

    fn module_exports(&self, module: &LoadedModule) -> Result<ModuleExports> {
        self.registry.exports(&module.name)
    }

    fn resolve_dependencies(&mut self) {
        self.resolve_calls += 1;
        if self.silent {
            return;
        }

        let mut change = ModulesChanged::default();
        for (module, exports) in self.on_resolve.drain(..) {
            self.registry.register(&module, exports);
            if !self.loaded.contains(&module) {
                self.loaded.push(module.clone());
                change.added.push(module);
            }
        }
        self.changes.publish(change);
    }

    fn refresh_assets(&mut self) {
        self.refresh_calls += 1;
    }

    fn changes(&mut self) -> &mut ChangeChannel {
        &mut self.changes
    }
}
