//! Common test utilities for modstrap integration tests

use std::fs;
use std::path::{Path, PathBuf};

use git2::{Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

/// Manifest a fresh project starts with
pub const BASE_MANIFEST: &str = r#"{
  "dependencies": {
    "com.unrelated.tool": "1.2.0"
  }
}
"#;

/// Installer exports whose entry point leaves a marker file in the mirror
pub const INSTALLER_EXPORTS: &str = r#"exports:
  - type: ModKit.Installer.Bootstrap
    entry_points:
      Run: { command: ["sh", "-c", "touch handoff-ran"] }
"#;

/// Marker written by [`INSTALLER_EXPORTS`], relative to the project root
pub const HANDOFF_MARKER: &str = "ModuleMirrors/com.modkit.installer/handoff-ran";

/// A host project plus the local git repositories its modules come from
pub struct TestProject {
    /// Temporary directory holding both the project and the sources
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Project root
    pub path: PathBuf,
    sources: PathBuf,
}

impl TestProject {
    /// Create a project with `Packages/manifest.json` and no modstrap.yaml
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("project");
        let sources = temp.path().join("sources");
        fs::create_dir_all(&path).expect("Failed to create project directory");
        fs::create_dir_all(&sources).expect("Failed to create sources directory");

        let project = Self {
            temp,
            path,
            sources,
        };
        project.write_file("Packages/manifest.json", BASE_MANIFEST);
        project
    }

    /// Create a project whose core and installer modules are local repositories
    #[allow(dead_code)]
    pub fn with_modules(installer_exports: &str) -> Self {
        let project = Self::new();
        let core = project.create_source("core", &[("README.md", "# core\n")]);
        let installer = project.create_source(
            "installer",
            &[("README.md", "# installer\n"), ("module.yaml", installer_exports)],
        );
        project.write_config(&[
            ("com.modkit.core", file_url(&core)),
            ("com.modkit.installer", file_url(&installer)),
        ]);
        project
    }

    /// Initialize a git repository under the sources directory and commit `files`
    pub fn create_source(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let path = self.sources.join(name);
        let mut options = RepositoryInitOptions::new();
        options.initial_head("main");
        let repo = Repository::init_opts(&path, &options).expect("Failed to init repository");

        let mut index = repo.index().expect("Failed to open index");
        for (relative, content) in files {
            let file = path.join(relative);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent).expect("Failed to create parent directory");
            }
            fs::write(&file, content).expect("Failed to write file");
            index
                .add_path(Path::new(relative))
                .expect("Failed to stage file");
        }
        index.write().expect("Failed to write index");

        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = repo.find_tree(tree_id).expect("Failed to find tree");
        let signature = Signature::now("Test", "test@example.com").expect("Failed to sign");
        repo.commit(Some("HEAD"), &signature, &signature, "Initial", &tree, &[])
            .expect("Failed to commit");
        path
    }

    /// Write modstrap.yaml listing `modules` in order
    pub fn write_config(&self, modules: &[(&str, String)]) {
        let mut yaml = String::from("poll_interval_ms: 10\nresolve_timeout_secs: 30\nmodules:\n");
        for (name, source) in modules {
            yaml.push_str(&format!("  - name: {name}\n    source: {source}\n"));
        }
        self.write_file("modstrap.yaml", &yaml);
    }

    /// Write a file in the project
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from the project
    #[allow(dead_code)]
    pub fn read_file(&self, path: &str) -> String {
        fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Check if a file exists in the project
    #[allow(dead_code)]
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Delete a file from the project
    #[allow(dead_code)]
    pub fn remove_file(&self, path: &str) {
        fs::remove_file(self.path.join(path)).expect("Failed to remove file");
    }
}

/// `file://` URL of a local repository
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}
