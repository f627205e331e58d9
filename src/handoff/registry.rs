//! Entry points exported by loaded modules
//!
//! A module registers the types it exports when the host loads it. Each type
//! carries named, parameterless entry points. The dispatcher looks them up
//! by fully qualified type name and entry point name, so the bootstrap never
//! needs a compile-time dependency on the installer it hands off to.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, handoff};

/// A parameterless entry point
pub trait EntryPoint {
    fn invoke(&self) -> Result<()>;
}

impl<F> EntryPoint for F
where
    F: Fn() -> Result<()>,
{
    fn invoke(&self) -> Result<()> {
        self()
    }
}

/// Entry point backed by an external program run inside the module directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntryPoint {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl EntryPoint for CommandEntryPoint {
    fn invoke(&self) -> Result<()> {
        debug!(entry_point = %self.name, program = %self.program, cwd = %self.cwd.display(), "running entry point");
        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| handoff::entry_point_failed(&self.name, e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(handoff::entry_point_failed(
                &self.name,
                format!("{} exited with {status}", self.program),
            ))
        }
    }
}

/// One exported type and its entry points
#[derive(Clone, Default)]
pub struct ExportedType {
    entry_points: BTreeMap<String, Arc<dyn EntryPoint>>,
}

impl ExportedType {
    #[must_use]
    pub fn with_entry_point(mut self, name: impl Into<String>, entry: Arc<dyn EntryPoint>) -> Self {
        self.entry_points.insert(name.into(), entry);
        self
    }

    pub fn entry_point(&self, name: &str) -> Option<Arc<dyn EntryPoint>> {
        self.entry_points.get(name).cloned()
    }
}

impl fmt::Debug for ExportedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entry_points.keys()).finish()
    }
}

/// Everything one module exports, keyed by fully qualified type name
#[derive(Debug, Clone, Default)]
pub struct ModuleExports {
    types: BTreeMap<String, ExportedType>,
}

impl ModuleExports {
    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>, exported: ExportedType) -> Self {
        self.types.insert(type_name.into(), exported);
        self
    }

    pub fn find_type(&self, type_name: &str) -> Option<&ExportedType> {
        self.types.get(type_name)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// What a module left in the registry when it was loaded
#[derive(Debug, Clone)]
enum Registration {
    Loaded(ModuleExports),
    Broken(String),
}

/// Per-module export registrations, keyed case-insensitively by module name
#[derive(Debug, Clone, Default)]
pub struct EntryPointRegistry {
    modules: HashMap<String, Registration>,
}

impl EntryPointRegistry {
    pub fn register(&mut self, module: &str, exports: ModuleExports) {
        self.modules
            .insert(module.to_lowercase(), Registration::Loaded(exports));
    }

    /// Record that a module's exports could not be read
    pub fn register_failure(&mut self, module: &str, reason: impl Into<String>) {
        self.modules
            .insert(module.to_lowercase(), Registration::Broken(reason.into()));
    }

    /// Exports of `module`; a module that registered nothing exports nothing
    pub fn exports(&self, module: &str) -> Result<ModuleExports> {
        match self.modules.get(&module.to_lowercase()) {
            Some(Registration::Loaded(exports)) => Ok(exports.clone()),
            Some(Registration::Broken(reason)) => Err(handoff::invalid_exports(module, reason)),
            None => Ok(ModuleExports::default()),
        }
    }
}
