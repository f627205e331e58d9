//! Manifest patcher
//!
//! Registers a module's mirror in the host's dependency manifest by minimal
//! text surgery. The manifest is never re-serialized: unrelated entries keep
//! their order and formatting byte for byte.

pub mod block;
pub mod path;

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

pub use block::DependenciesBlock;
pub use path::file_reference;

use crate::error::{Result, fs as fs_error};

/// Result of [`ensure_dependency`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Inserted,
    AlreadyPresent,
    ManifestMissing,
    AnchorMissing,
}

impl PatchOutcome {
    /// Whether the manifest references the module afterwards
    pub fn is_registered(self) -> bool {
        matches!(self, PatchOutcome::Inserted | PatchOutcome::AlreadyPresent)
    }
}

impl fmt::Display for PatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PatchOutcome::Inserted => "inserted",
            PatchOutcome::AlreadyPresent => "already present",
            PatchOutcome::ManifestMissing => "manifest missing",
            PatchOutcome::AnchorMissing => "dependencies block not found",
        };
        f.write_str(label)
    }
}

/// Make sure the manifest's dependencies block has an entry for `module_name`
///
/// The entry points at `mirror` with a `file:` reference relative to the
/// manifest's directory. Errors only for I/O failures on an existing manifest.
pub fn ensure_dependency(manifest_path: &Path, module_name: &str, mirror: &Path) -> Result<PatchOutcome> {
    if !manifest_path.is_file() {
        warn!(manifest = %manifest_path.display(), module = module_name, "manifest not found, module not registered");
        return Ok(PatchOutcome::ManifestMissing);
    }

    let path = manifest_path.display().to_string();
    let text =
        fs::read_to_string(manifest_path).map_err(|e| fs_error::read_failed(&path, e.to_string()))?;

    let Some(block) = DependenciesBlock::locate(&text) else {
        warn!(manifest = %path, module = module_name, "no dependencies block in manifest, module not registered");
        return Ok(PatchOutcome::AnchorMissing);
    };

    if block.contains_key(&text, module_name) {
        debug!(module = module_name, "manifest already references module");
        return Ok(PatchOutcome::AlreadyPresent);
    }

    let manifest_dir = manifest_path.parent().unwrap_or(Path::new("."));
    let reference = file_reference(manifest_dir, mirror);
    let patched = block.insert_entry(&text, module_name, &reference);

    fs::write(manifest_path, patched).map_err(|e| fs_error::write_failed(&path, e.to_string()))?;
    info!(module = module_name, %reference, "registered module in manifest");
    Ok(PatchOutcome::Inserted)
}

/// Whether the manifest references `module_name`; None when it cannot tell
pub fn references_module(manifest_path: &Path, module_name: &str) -> Option<bool> {
    let text = fs::read_to_string(manifest_path).ok()?;
    let block = DependenciesBlock::locate(&text)?;
    Some(block.contains_key(&text, module_name))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::test_fixtures::create_temp_dir;

    const MANIFEST: &str = r#"{
  "dependencies": {
    "com.vendor.physics": "2.1.0",
    "com.vendor.ui": "1.0.4"
  },
  "testables": ["com.vendor.ui"]
}
"#;

    fn setup(content: &str) -> (tempfile::TempDir, PathBuf, PathBuf) {
        let temp = create_temp_dir();
        let manifest = temp.path().join("Packages/manifest.json");
        fs::create_dir_all(manifest.parent().unwrap()).unwrap();
        fs::write(&manifest, content).unwrap();
        let mirrors = temp.path().join("ModuleMirrors");
        (temp, manifest, mirrors)
    }

    #[test]
    fn test_insert_then_already_present_is_byte_identical() {
        let (_temp, manifest, mirrors) = setup(MANIFEST);
        let mirror = mirrors.join("com.modkit.core");

        let first = ensure_dependency(&manifest, "com.modkit.core", &mirror).unwrap();
        assert_eq!(first, PatchOutcome::Inserted);
        let after_first = fs::read(&manifest).unwrap();

        let second = ensure_dependency(&manifest, "com.modkit.core", &mirror).unwrap();
        assert_eq!(second, PatchOutcome::AlreadyPresent);
        assert_eq!(fs::read(&manifest).unwrap(), after_first);
    }

    #[test]
    fn test_unrelated_entries_preserved() {
        let (_temp, manifest, mirrors) = setup(MANIFEST);

        ensure_dependency(&manifest, "com.modkit.core", &mirrors.join("com.modkit.core")).unwrap();
        ensure_dependency(
            &manifest,
            "com.modkit.installer",
            &mirrors.join("com.modkit.installer"),
        )
        .unwrap();

        let text = fs::read_to_string(&manifest).unwrap();
        assert_eq!(
            text,
            r#"{
  "dependencies": {
    "com.modkit.installer": "file:./../ModuleMirrors/com.modkit.installer",
    "com.modkit.core": "file:./../ModuleMirrors/com.modkit.core",
    "com.vendor.physics": "2.1.0",
    "com.vendor.ui": "1.0.4"
  },
  "testables": ["com.vendor.ui"]
}
"#
        );
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["dependencies"].as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_empty_block_stays_valid_json() {
        let (_temp, manifest, mirrors) = setup("{\n  \"dependencies\": {\n  }\n}\n");

        ensure_dependency(&manifest, "com.modkit.core", &mirrors.join("com.modkit.core")).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&manifest).unwrap()).unwrap();
        assert_eq!(
            parsed["dependencies"]["com.modkit.core"],
            "file:./../ModuleMirrors/com.modkit.core"
        );
    }

    #[test]
    fn test_missing_manifest() {
        let temp = create_temp_dir();
        let outcome = ensure_dependency(
            &temp.path().join("Packages/manifest.json"),
            "com.modkit.core",
            &temp.path().join("ModuleMirrors/com.modkit.core"),
        )
        .unwrap();
        assert_eq!(outcome, PatchOutcome::ManifestMissing);
        assert!(!outcome.is_registered());
    }

    #[test]
    fn test_missing_anchor_leaves_file_untouched() {
        let (_temp, manifest, mirrors) = setup("{\n  \"scopedRegistries\": []\n}\n");

        let outcome =
            ensure_dependency(&manifest, "com.modkit.core", &mirrors.join("com.modkit.core")).unwrap();

        assert_eq!(outcome, PatchOutcome::AnchorMissing);
        assert_eq!(
            fs::read_to_string(&manifest).unwrap(),
            "{\n  \"scopedRegistries\": []\n}\n"
        );
    }

    #[test]
    fn test_existing_entry_with_other_source_is_kept() {
        let (_temp, manifest, mirrors) = setup(
            "{\n  \"dependencies\": {\n    \"com.modkit.core\": \"https://example.com/core.git\"\n  }\n}\n",
        );

        let outcome =
            ensure_dependency(&manifest, "com.modkit.core", &mirrors.join("com.modkit.core")).unwrap();

        assert_eq!(outcome, PatchOutcome::AlreadyPresent);
        assert!(
            fs::read_to_string(&manifest)
                .unwrap()
                .contains("https://example.com/core.git")
        );
    }

    #[test]
    fn test_references_module() {
        let (temp, manifest, _mirrors) = setup(MANIFEST);
        assert_eq!(references_module(&manifest, "com.vendor.ui"), Some(true));
        assert_eq!(references_module(&manifest, "com.modkit.core"), Some(false));
        assert_eq!(
            references_module(&temp.path().join("missing.json"), "com.vendor.ui"),
            None
        );
    }
}
