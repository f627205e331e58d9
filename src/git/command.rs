//! External `git` process backend
//!
//! Runs `git clone <url> <path>` from the mirror root and `git pull <remote>
//! <branch>` inside the mirror. Output is captured; exit status 0 is success,
//! anything else (or failing to start the process) is a failure.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use super::Vcs;
use crate::error::{Result, git};

/// Backend shelling out to the git executable
#[derive(Debug, Clone)]
pub struct CommandVcs {
    program: OsString,
}

impl Default for CommandVcs {
    fn default() -> Self {
        Self::new("git")
    }
}

impl CommandVcs {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run git with captured output; returns trimmed stdout on success
    fn run(&self, subcommand: &str, args: &[&OsStr], cwd: &Path) -> Result<String> {
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| git::command_failed(subcommand, format!("failed to start git: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!(subcommand, cwd = %cwd.display(), %stdout, %stderr, status = %output.status, "git finished");

        if output.status.success() {
            return Ok(stdout);
        }

        let detail = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("no output");
        Err(git::command_failed(
            subcommand,
            format!("{}: {detail}", output.status),
        ))
    }
}

impl Vcs for CommandVcs {
    fn clone_repo(&self, url: &str, target: &Path) -> Result<()> {
        let cwd = target.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(cwd)?;
        self.run(
            "clone",
            &[OsStr::new("clone"), OsStr::new(url), target.as_os_str()],
            cwd,
        )
        .map(|_| ())
        .map_err(|e| git::clone_failed(url, e.to_string()))
    }

    fn pull(&self, repo: &Path, remote: &str, branch: &str) -> Result<()> {
        self.run(
            "pull",
            &[OsStr::new("pull"), OsStr::new(remote), OsStr::new(branch)],
            repo,
        )
        .map(|_| ())
        .map_err(|e| git::pull_failed(repo.display().to_string(), e.to_string()))
    }

    fn is_checkout(&self, path: &Path) -> bool {
        path.join(".git").exists()
    }

    fn current_branch(&self, path: &Path) -> Option<String> {
        let branch = self
            .run(
                "rev-parse",
                &[
                    OsStr::new("rev-parse"),
                    OsStr::new("--abbrev-ref"),
                    OsStr::new("HEAD"),
                ],
                path,
            )
            .ok()?;
        // Detached HEAD reports the literal "HEAD"
        (!branch.is_empty() && branch != "HEAD").then_some(branch)
    }
}
