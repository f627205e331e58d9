//! File-backed host for a project directory
//!
//! The project's lockfile is the loaded-module registry. Resolving reads the
//! manifest's `dependencies`, rewrites the lockfile and announces the
//! difference on the change channel.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{ChangeChannel, Host, LoadedModule, ModulesChanged};
use crate::config::BootstrapConfig;
use crate::error::{Result, fs as fs_error, manifest as manifest_error};
use crate::handoff::exports::load_exports;
use crate::handoff::{EntryPointRegistry, ModuleExports};

/// Prefix of manifest entries pointing at a local directory
pub const FILE_SCHEME: &str = "file:";

/// One resolved module as recorded in the lockfile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedModule {
    /// Manifest value the module was resolved from
    pub version: String,
    #[serde(default)]
    pub source: LockedSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockedSource {
    Local,
    #[default]
    Registry,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Lockfile {
    #[serde(default)]
    dependencies: BTreeMap<String, LockedModule>,
}

#[derive(Debug, Deserialize)]
struct ManifestDependencies {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
}

/// Directory a `file:` manifest value points at, relative to the manifest
pub fn local_module_dir(manifest_dir: &Path, value: &str) -> Option<PathBuf> {
    let relative = value.strip_prefix(FILE_SCHEME)?;
    Some(manifest_dir.join(relative))
}

pub struct ProjectHost {
    manifest_path: PathBuf,
    lockfile_path: PathBuf,
    locked: BTreeMap<String, LockedModule>,
    registry: EntryPointRegistry,
    changes: ChangeChannel,
    asset_refreshes: usize,
}

impl ProjectHost {
    /// Open the host for `project_root`, loading modules from its lockfile
    pub fn open(project_root: &Path, config: &BootstrapConfig) -> Result<Self> {
        if !project_root.is_dir() {
            return Err(fs_error::project_not_found(
                project_root.display().to_string(),
            ));
        }

        let mut host = Self {
            manifest_path: project_root.join(&config.manifest),
            lockfile_path: project_root.join(&config.lockfile),
            locked: BTreeMap::new(),
            registry: EntryPointRegistry::default(),
            changes: ChangeChannel::default(),
            asset_refreshes: 0,
        };
        host.locked = host.read_lockfile()?;
        host.load_exports();
        debug!(count = host.locked.len(), "host loaded modules from lockfile");
        Ok(host)
    }

    fn manifest_dir(&self) -> &Path {
        self.manifest_path.parent().unwrap_or(Path::new("."))
    }

    fn module_root(&self, locked: &LockedModule) -> Option<PathBuf> {
        match locked.source {
            LockedSource::Local => local_module_dir(self.manifest_dir(), &locked.version)
                .map(|dir| dunce::canonicalize(&dir).unwrap_or(dir)),
            LockedSource::Registry => None,
        }
    }

    fn read_lockfile(&self) -> Result<BTreeMap<String, LockedModule>> {
        if !self.lockfile_path.exists() {
            return Ok(BTreeMap::new());
        }
        let path = self.lockfile_path.display().to_string();
        let content =
            fs::read_to_string(&self.lockfile_path).map_err(|e| fs_error::read_failed(&path, e.to_string()))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let lockfile: Lockfile = serde_json::from_str(&content)
            .map_err(|e| manifest_error::parse_failed(&path, e.to_string()))?;
        Ok(lockfile.dependencies)
    }

    /// Write the lockfile through a temp file and rename
    fn write_lockfile(&self, locked: &BTreeMap<String, LockedModule>) -> Result<()> {
        let lockfile = Lockfile {
            dependencies: locked.clone(),
        };
        let mut content = serde_json::to_string_pretty(&lockfile)?;
        content.push('\n');

        if let Some(parent) = self.lockfile_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut tmp_name = self.lockfile_path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, &content)
            .map_err(|e| fs_error::write_failed(tmp_path.display().to_string(), e.to_string()))?;
        fs::rename(&tmp_path, &self.lockfile_path).map_err(|e| {
            fs_error::write_failed(self.lockfile_path.display().to_string(), e.to_string())
        })
    }

    /// Rebuild the export registry from the loaded module directories
    fn load_exports(&mut self) {
        let mut registry = EntryPointRegistry::default();
        for (name, locked) in &self.locked {
            let Some(root) = self.module_root(locked) else {
                continue;
            };
            match load_exports(name, &root) {
                Ok(exports) => registry.register(name, exports),
                Err(e) => {
                    warn!(module = %name, error = %e, "module exports could not be loaded");
                    registry.register_failure(name, e.to_string());
                }
            }
        }
        self.registry = registry;
    }

    /// Resolve the manifest into a new set of locked modules
    fn resolve_manifest(&self) -> Result<BTreeMap<String, LockedModule>> {
        let path = self.manifest_path.display().to_string();
        let content = fs::read_to_string(&self.manifest_path)
            .map_err(|e| fs_error::read_failed(&path, e.to_string()))?;
        let manifest: ManifestDependencies = serde_json::from_str(&content)
            .map_err(|e| manifest_error::parse_failed(&path, e.to_string()))?;

        let mut resolved = BTreeMap::new();
        for (name, value) in manifest.dependencies {
            let Some(version) = value.as_str() else {
                warn!(module = %name, "manifest entry is not a string, skipping");
                continue;
            };

            let source = match local_module_dir(self.manifest_dir(), version) {
                Some(dir) if dir.is_dir() => LockedSource::Local,
                Some(dir) => {
                    warn!(module = %name, path = %dir.display(), "local module directory missing, skipping");
                    continue;
                }
                None => LockedSource::Registry,
            };

            resolved.insert(
                name,
                LockedModule {
                    version: version.to_string(),
                    source,
                },
            );
        }
        Ok(resolved)
    }
}

fn diff(
    before: &BTreeMap<String, LockedModule>,
    after: &BTreeMap<String, LockedModule>,
) -> ModulesChanged {
    let before_names: BTreeSet<&String> = before.keys().collect();
    let after_names: BTreeSet<&String> = after.keys().collect();
    ModulesChanged {
        added: after_names
            .difference(&before_names)
            .map(|name| (*name).clone())
            .collect(),
        removed: before_names
            .difference(&after_names)
            .map(|name| (*name).clone())
            .collect(),
    }
}

impl Host for ProjectHost {
    fn is_module_loaded(&self, name: &str) -> bool {
        self.locked.keys().any(|loaded| loaded.eq_ignore_ascii_case(name))
    }

    fn loaded_modules(&self) -> Vec<LoadedModule> {
        self.locked
            .iter()
            .map(|(name, locked)| LoadedModule {
                name: name.clone(),
                root: self.module_root(locked),
            })
            .collect()
    }

    fn module_exports(&self, module: &LoadedModule) -> Result<ModuleExports> {
        self.registry.exports(&module.name)
    }

    fn resolve_dependencies(&mut self) {
        let resolved = match self.resolve_manifest() {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(error = %e, "dependency resolution failed, no change published");
                return;
            }
        };

        if let Err(e) = self.write_lockfile(&resolved) {
            warn!(error = %e, "could not record resolved modules, no change published");
            return;
        }

        let change = diff(&self.locked, &resolved);
        if change.is_empty() {
            debug!(total = resolved.len(), "host resolved dependencies, nothing changed");
        } else {
            info!(%change, total = resolved.len(), "host resolved dependencies");
        }
        self.locked = resolved;
        self.load_exports();
        self.changes.publish(change);
    }

    fn refresh_assets(&mut self) {
        self.asset_refreshes += 1;
        debug!(count = self.asset_refreshes, "asset refresh requested");
    }

    fn changes(&mut self) -> &mut ChangeChannel {
        &mut self.changes
    }
}
