//! `file:` references from the manifest to a mirror directory

use std::path::{Component, Path};

use crate::host::project::FILE_SCHEME;

fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Relative path from `from_dir` to `to`, `./`-prefixed, forward slashes
///
/// Both paths must be absolute. Returns None when they share no root (e.g.
/// different Windows drives).
pub fn relative_path(from_dir: &Path, to: &Path) -> Option<String> {
    let from: Vec<Component<'_>> = from_dir
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let target: Vec<Component<'_>> = to
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let common = from
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return None;
    }

    let mut parts: Vec<String> = vec![".".to_string()];
    parts.extend(from[common..].iter().map(|_| "..".to_string()));
    parts.extend(
        target[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    Some(parts.join("/"))
}

/// Manifest value referencing `mirror` from a manifest living in `manifest_dir`
pub fn file_reference(manifest_dir: &Path, mirror: &Path) -> String {
    match relative_path(manifest_dir, mirror) {
        Some(relative) => format!("{FILE_SCHEME}{relative}"),
        None => format!("{FILE_SCHEME}{}", to_forward_slashes(mirror)),
    }
}
