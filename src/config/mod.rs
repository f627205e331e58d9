//! Configuration file handling for modstrap
//!
//! `modstrap.yaml` at the project root overrides the built-in defaults.
//! Every field is optional, so a project without the file still gets the
//! statically known module set below.

pub mod module;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use module::ModuleDescriptor;

use crate::error::{Result, config};

/// Config filename looked up in the project root
pub const CONFIG_FILE: &str = "modstrap.yaml";

/// Longest accepted resolution wait: one day
pub const MAX_RESOLVE_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Which backend performs clone and pull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    /// In-process libgit2
    #[default]
    Libgit2,
    /// External `git` executable
    Command,
}

/// The downstream installer entry point the bootstrap hands control to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandoffTarget {
    /// Only loaded modules whose name starts with one of these are searched
    pub module_prefixes: Vec<String>,

    /// Fully qualified name of the exported type
    pub type_name: String,

    /// Parameterless entry point on that type
    pub entry_point: String,
}

impl Default for HandoffTarget {
    fn default() -> Self {
        Self {
            module_prefixes: vec!["com.modkit".to_string()],
            type_name: "ModKit.Installer.Bootstrap".to_string(),
            entry_point: "Run".to_string(),
        }
    }
}

/// Bootstrap configuration from modstrap.yaml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Directory holding one mirror per module, relative to the project root
    pub mirror_root: PathBuf,

    /// Dependency manifest, relative to the project root
    pub manifest: PathBuf,

    /// Resolved-module record written by the host, relative to the project root
    pub lockfile: PathBuf,

    /// Branch pulled when updating an existing mirror
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Remote pulled from
    pub remote: String,

    pub vcs: VcsKind,

    /// Modules whose presence means the framework is already installed
    pub required: Vec<String>,

    /// Ordered module set; order is install order
    pub modules: Vec<ModuleDescriptor>,

    pub handoff: HandoffTarget,

    /// Upper bound on the wait for the host's resolution notification
    pub resolve_timeout_secs: u64,

    /// Sleep between idle ticks while waiting on the host
    pub poll_interval_ms: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            mirror_root: PathBuf::from("ModuleMirrors"),
            manifest: PathBuf::from("Packages/manifest.json"),
            lockfile: PathBuf::from("Packages/packages-lock.json"),
            branch: None,
            remote: "origin".to_string(),
            vcs: VcsKind::default(),
            required: vec![
                "com.modkit.core".to_string(),
                "com.modkit.installer".to_string(),
            ],
            modules: vec![
                ModuleDescriptor::new(
                    "com.modkit.core",
                    "https://github.com/modkit/modkit-core.git",
                ),
                ModuleDescriptor::new(
                    "com.modkit.installer",
                    "https://github.com/modkit/modkit-installer.git",
                ),
            ],
            handoff: HandoffTarget::default(),
            resolve_timeout_secs: 300,
            poll_interval_ms: 50,
        }
    }
}

impl BootstrapConfig {
    /// Load configuration for a project
    ///
    /// An explicit `config_path` must exist. Without one, `modstrap.yaml` in the
    /// project root is used when present and the defaults otherwise.
    pub fn load(project_root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let (path, required) = match config_path {
            Some(path) => (path.to_path_buf(), true),
            None => (project_root.join(CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                return Err(config::not_found(path.display().to_string()));
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| config::read_failed(path.display().to_string(), e.to_string()))?;

        Self::from_yaml(&content).map_err(|e| match e {
            crate::error::ModstrapError::ConfigParseFailed { reason, .. } => {
                config::parse_failed(path.display().to_string(), reason)
            }
            other => other,
        })
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file deserializes to unit, not to a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for module in &self.modules {
            module.validate()?;
            if !seen.insert(module.name.to_lowercase()) {
                return Err(config::invalid(format!(
                    "Module '{}' is listed more than once",
                    module.name
                )));
            }
        }

        if self.handoff.type_name.trim().is_empty() || self.handoff.entry_point.trim().is_empty()
        {
            return Err(config::invalid(
                "handoff.type_name and handoff.entry_point must be set",
            ));
        }

        if self.resolve_timeout_secs == 0 {
            return Err(config::invalid("resolve_timeout_secs must be positive"));
        }
        if self.resolve_timeout_secs > MAX_RESOLVE_TIMEOUT_SECS {
            return Err(config::invalid(format!(
                "resolve_timeout_secs must be at most {MAX_RESOLVE_TIMEOUT_SECS}"
            )));
        }

        Ok(())
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
