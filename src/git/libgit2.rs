//! In-process git backend built on libgit2
//!
//! Pull is fetch + fast-forward only. A diverged mirror is reported as a pull
//! failure so the fetcher falls back to a fresh clone.

use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{FetchOptions, RemoteCallbacks, Repository};
use tracing::debug;

use super::Vcs;
use super::auth::setup_auth_callbacks;
use super::error::interpret_git_error;
use super::url::normalize_source_url;
use crate::error::{Result, git};

/// Backend using the `git2` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct Libgit2Vcs;

fn fetch_options<'a>() -> FetchOptions<'a> {
    let mut callbacks = RemoteCallbacks::new();
    setup_auth_callbacks(&mut callbacks);
    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    options
}

impl Vcs for Libgit2Vcs {
    fn clone_repo(&self, url: &str, target: &Path) -> Result<()> {
        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options());

        let normalized = normalize_source_url(url);
        debug!(url = %normalized, target = %target.display(), "libgit2 clone");
        builder
            .clone(normalized.as_ref(), target)
            .map(|_| ())
            .map_err(|e| git::clone_failed(url, interpret_git_error(&e)))
    }

    fn pull(&self, repo_path: &Path, remote: &str, branch: &str) -> Result<()> {
        let path = repo_path.display().to_string();
        let pull_failed = |e: git2::Error| git::pull_failed(path.clone(), interpret_git_error(&e));

        let repo = Repository::open(repo_path)
            .map_err(|e| git::open_failed(path.clone(), e.message()))?;

        let mut origin = repo.find_remote(remote).map_err(pull_failed)?;
        origin
            .fetch(&[branch], Some(&mut fetch_options()), None)
            .map_err(pull_failed)?;

        let fetch_head = repo.find_reference("FETCH_HEAD").map_err(pull_failed)?;
        let incoming = repo
            .reference_to_annotated_commit(&fetch_head)
            .map_err(pull_failed)?;
        let (analysis, _) = repo.merge_analysis(&[&incoming]).map_err(pull_failed)?;

        if analysis.is_up_to_date() {
            debug!(repo = %path, "already up to date");
            return Ok(());
        }

        if !analysis.is_fast_forward() {
            return Err(git::pull_failed(
                path.clone(),
                "Local branch has diverged from the remote",
            ));
        }

        let refname = format!("refs/heads/{branch}");
        match repo.find_reference(&refname) {
            Ok(mut local) => {
                local
                    .set_target(incoming.id(), "modstrap: fast-forward")
                    .map_err(pull_failed)?;
            }
            Err(_) => {
                repo.reference(&refname, incoming.id(), true, "modstrap: create branch")
                    .map_err(pull_failed)?;
            }
        }
        repo.set_head(&refname).map_err(pull_failed)?;
        repo.checkout_head(Some(CheckoutBuilder::default().force()))
            .map_err(pull_failed)?;

        debug!(repo = %path, commit = %incoming.id(), "fast-forwarded");
        Ok(())
    }

    fn is_checkout(&self, path: &Path) -> bool {
        Repository::open(path).is_ok()
    }

    fn current_branch(&self, path: &Path) -> Option<String> {
        let repo = Repository::open(path).ok()?;
        let head = repo.head().ok()?;
        if head.is_branch() {
            head.shorthand().map(ToString::to_string)
        } else {
            None
        }
    }
}
