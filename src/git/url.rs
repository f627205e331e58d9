//! Source URL normalization before handing URLs to libgit2
//!
//! Module sources in modstrap.yaml are written the way users paste them:
//! SCP-style SSH (`git@host:org/repo.git`), `file://` URLs, or plain local
//! paths. libgit2 wants `ssh://` and absolute `file:///` forms.

use std::borrow::Cow;

/// Normalize a module source URL for libgit2
pub fn normalize_source_url(url: &str) -> Cow<'_, str> {
    if let Some(rest) = url.strip_prefix("git@") {
        return Cow::Owned(scp_to_ssh(rest));
    }

    if let Some(after) = url.strip_prefix("file://") {
        let after = after.replace('\\', "/");
        if after.starts_with('/') {
            return Cow::Owned(format!("file://{after}"));
        }
        return Cow::Owned(format!("file:///{after}"));
    }

    Cow::Borrowed(url)
}

/// `host:org/repo.git` -> `ssh://git@host/org/repo.git`
fn scp_to_ssh(rest: &str) -> String {
    match rest.split_once(':') {
        Some((host, path)) => {
            let path = path.trim_start_matches('/');
            format!("ssh://git@{host}/{path}")
        }
        None => format!("ssh://git@{rest}"),
    }
}
