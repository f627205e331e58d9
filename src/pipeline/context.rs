//! Per-run bootstrap state that stays fixed for the whole run

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::config::{BootstrapConfig, HandoffTarget, ModuleDescriptor};
use crate::error::{Result, fs as fs_error};

/// Resolve `.` and `..` without touching the filesystem
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Everything the pipeline needs, with absolute paths
#[derive(Debug, Clone)]
pub struct BootstrapContext {
    pub project_root: PathBuf,
    pub manifest_path: PathBuf,
    pub mirror_root: PathBuf,
    /// Install order
    pub modules: Vec<ModuleDescriptor>,
    pub required: Vec<String>,
    pub handoff: HandoffTarget,
    pub remote: String,
    pub branch: Option<String>,
    pub resolve_timeout: Duration,
    pub poll_interval: Duration,
}

impl BootstrapContext {
    pub fn new(project_root: &Path, config: &BootstrapConfig) -> Result<Self> {
        let root = dunce::canonicalize(project_root)
            .map_err(|_| fs_error::project_not_found(project_root.display().to_string()))?;

        Ok(Self {
            manifest_path: normalize_lexically(&root.join(&config.manifest)),
            mirror_root: normalize_lexically(&root.join(&config.mirror_root)),
            project_root: root,
            modules: config.modules.clone(),
            required: config.required.clone(),
            handoff: config.handoff.clone(),
            remote: config.remote.clone(),
            branch: config.branch.clone(),
            resolve_timeout: config.resolve_timeout(),
            poll_interval: config.poll_interval(),
        })
    }

    /// Mirror directory of one module
    pub fn mirror_path(&self, module: &ModuleDescriptor) -> PathBuf {
        crate::fetcher::mirror_path(&self.mirror_root, &module.name)
    }
}
