//! `module.yaml` export declarations
//!
//! A module directory may declare the types it exports and the commands
//! behind their entry points:
//!
//! ```yaml
//! exports:
//!   - type: ModKit.Installer.Bootstrap
//!     entry_points:
//!       Run: { command: ["sh", "install.sh"] }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use super::registry::{CommandEntryPoint, ExportedType, ModuleExports};
use crate::error::{Result, handoff};

/// Export declaration filename inside a module directory
pub const EXPORTS_FILE: &str = "module.yaml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExportsFile {
    #[serde(default)]
    exports: Vec<TypeDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeDecl {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    entry_points: BTreeMap<String, EntryPointDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryPointDecl {
    command: Vec<String>,
}

/// Read the exports of the module rooted at `module_dir`
///
/// A directory without `module.yaml` exports nothing.
pub fn load_exports(module_name: &str, module_dir: &Path) -> Result<ModuleExports> {
    let path = module_dir.join(EXPORTS_FILE);
    if !path.is_file() {
        return Ok(ModuleExports::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| handoff::invalid_exports(module_name, e.to_string()))?;
    parse_exports(module_name, module_dir, &content)
}

fn parse_exports(module_name: &str, module_dir: &Path, content: &str) -> Result<ModuleExports> {
    if content.trim().is_empty() {
        return Ok(ModuleExports::default());
    }

    let file: ExportsFile = serde_yaml::from_str(content)
        .map_err(|e| handoff::invalid_exports(module_name, e.to_string()))?;

    let mut exports = ModuleExports::default();
    for decl in file.exports {
        let mut exported = ExportedType::default();
        for (name, entry) in decl.entry_points {
            let Some((program, args)) = entry.command.split_first() else {
                return Err(handoff::invalid_exports(
                    module_name,
                    format!("entry point '{}.{name}' has an empty command", decl.type_name),
                ));
            };
            let command = CommandEntryPoint {
                name: format!("{}.{name}", decl.type_name),
                program: program.clone(),
                args: args.to_vec(),
                cwd: module_dir.to_path_buf(),
            };
            exported = exported.with_entry_point(name, Arc::new(command));
        }
        exports = exports.with_type(decl.type_name, exported);
    }

    Ok(exports)
}
