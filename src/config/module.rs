//! ModuleDescriptor: one entry of the ordered module set in modstrap.yaml

use serde::{Deserialize, Serialize};

use crate::error::{Result, config};

/// A module to provision: its name and the git URL it is fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Module name, unique within the configured set
    pub name: String,

    /// Git repository URL
    pub source: String,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Validate descriptor
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(config::invalid("Module name cannot be empty"));
        }

        // The name becomes a directory under the mirror root
        if self.name.contains(['/', '\\']) || self.name == "." || self.name == ".." {
            return Err(config::invalid(format!(
                "Module name '{}' must not contain path separators",
                self.name
            )));
        }

        if self.source.trim().is_empty() {
            return Err(config::invalid(format!(
                "Module '{}' must have a 'source' URL",
                self.name
            )));
        }

        Ok(())
    }
}
