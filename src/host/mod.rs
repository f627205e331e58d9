//! The host application the bootstrap runs inside
//!
//! The host owns the loaded-module registry, the asynchronous dependency
//! resolver and its "modules changed" channel. The pipeline only talks to
//! it through [`Host`].

pub mod events;
pub mod project;
pub mod scheduler;

use std::path::PathBuf;

pub use events::{ChangeChannel, ModulesChanged, SubscriptionId};
pub use project::ProjectHost;
pub use scheduler::DeferredQueue;

use crate::error::Result;
use crate::handoff::ModuleExports;

/// A module currently loaded by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    pub name: String,
    /// Local directory backing the module, when it has one
    pub root: Option<PathBuf>,
}

impl LoadedModule {
    #[cfg(test)]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: None,
        }
    }
}

pub trait Host {
    /// Whether a module with this name is loaded (case-insensitive)
    fn is_module_loaded(&self, name: &str) -> bool;

    fn loaded_modules(&self) -> Vec<LoadedModule>;

    /// Types and entry points exported by a loaded module
    fn module_exports(&self, module: &LoadedModule) -> Result<ModuleExports>;

    /// Fire-and-forget: reconcile the manifest against loaded modules
    ///
    /// Completion is announced through [`Host::changes`], never synchronously.
    fn resolve_dependencies(&mut self);

    /// Ask the host to rescan on-disk assets
    fn refresh_assets(&mut self);

    fn changes(&mut self) -> &mut ChangeChannel;
}
