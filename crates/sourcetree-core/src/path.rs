//! Lexical path helpers.
//!
//! Nothing in here touches the filesystem. Paths are normalized lexically so
//! that `Sources/../Sources/App` and `Sources/App` share one identity.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Case-insensitive identity of a normalized path.
///
/// Lookups compare keys; elements keep the path casing for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathKey(String);

impl PathKey {
    /// Build the key for a path.
    pub fn new(path: &Path) -> Self {
        Self(normalize(path).to_string_lossy().to_lowercase())
    }

    /// The lowercased key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Path> for PathKey {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

/// Resolve `.` and `..` components without consulting the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        PathBuf::from(".")
    } else {
        out.iter().collect()
    }
}

/// Path of `path` relative to `base`, e.g. `../Shared/File.x`.
///
/// Returns `None` when one side is absolute and the other is not, or when
/// `base` climbs above a point `path` cannot reach.
pub fn relative_path(path: &Path, base: &Path) -> Option<PathBuf> {
    let path = normalize(path);
    let base = normalize(base);
    if path.is_absolute() != base.is_absolute() {
        return None;
    }

    let path_parts: Vec<Component<'_>> = path.components().filter(|c| *c != Component::CurDir).collect();
    let base_parts: Vec<Component<'_>> = base.components().filter(|c| *c != Component::CurDir).collect();

    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for part in &base_parts[common..] {
        match part {
            Component::Normal(_) => result.push(".."),
            _ => return None,
        }
    }
    for part in &path_parts[common..] {
        result.push(part.as_os_str());
    }

    if result.as_os_str().is_empty() {
        Some(PathBuf::from("."))
    } else {
        Some(result)
    }
}

/// Whether `ancestor` strictly contains `path`.
pub fn is_strict_ancestor(ancestor: &Path, path: &Path) -> bool {
    let ancestor = normalize(ancestor);
    let path = normalize(path);
    path != ancestor && path.starts_with(&ancestor)
}

/// Last path component as a string, or the whole path when there is none.
pub fn last_component(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Last path component without its final extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| last_component(path))
}

/// Final extension, if any.
pub fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().into_owned())
}
