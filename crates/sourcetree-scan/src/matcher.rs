//! Include/exclude pattern resolution.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use itertools::Itertools;
use jwalk::{Parallelism, WalkDir};
use rayon::prelude::*;

use sourcetree_core::path::normalize;
use sourcetree_core::{GenerateError, GenerateWarning};

/// File names that are never part of a source root.
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &[".DS_Store"];

/// Extensions that are never part of a source root.
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &["orig"];

/// Decides which paths below a source root are kept.
///
/// Patterns are expanded once against the filesystem when the matcher is
/// built; afterwards every decision is a set lookup or a binary search.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    excludes: HashSet<PathBuf>,
    /// Included paths as strings, sorted for the ordered-prefix rule.
    includes: Vec<String>,
    generate_empty_directories: bool,
    warnings: Vec<GenerateWarning>,
}

impl PathMatcher {
    /// Expand `includes` and `excludes` below `root`.
    pub fn new(
        root: &Path,
        includes: &[String],
        excludes: &[String],
        generate_empty_directories: bool,
    ) -> Self {
        let (include_set, mut warnings) = expand_patterns(root, includes);
        let (exclude_set, exclude_warnings) = expand_patterns(root, excludes);
        warnings.extend(exclude_warnings);

        let mut matcher = Self::from_paths(include_set, exclude_set, generate_empty_directories);
        matcher.warnings = warnings;
        matcher
    }

    /// Build a matcher from already expanded path sets.
    pub fn from_paths(
        includes: impl IntoIterator<Item = PathBuf>,
        excludes: impl IntoIterator<Item = PathBuf>,
        generate_empty_directories: bool,
    ) -> Self {
        let includes = includes
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .sorted()
            .dedup()
            .collect();
        Self {
            excludes: excludes.into_iter().collect(),
            includes,
            generate_empty_directories,
            warnings: Vec::new(),
        }
    }

    /// Warnings raised while expanding patterns.
    pub fn warnings(&self) -> &[GenerateWarning] {
        &self.warnings
    }

    /// Take the warnings, leaving none behind.
    pub fn take_warnings(&mut self) -> Vec<GenerateWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Whether `path` passes the default excludes, the exclude set and the
    /// include set.
    pub fn is_included(&self, path: &Path) -> bool {
        if is_default_excluded(path) || self.excludes.contains(path) {
            return false;
        }
        self.includes.is_empty() || self.is_included_sorted(path)
    }

    /// A path is included when the first include at or after it starts with
    /// it, which admits ancestors of included paths.
    fn is_included_sorted(&self, path: &Path) -> bool {
        let candidate = path.to_string_lossy();
        let candidate: &str = &candidate;
        let idx = self
            .includes
            .partition_point(|include| include.as_str() < candidate);
        self.includes
            .get(idx)
            .is_some_and(|found| found.starts_with(candidate))
    }

    /// Children of `dir` that survive filtering, sorted by path.
    ///
    /// Files must be included. A directory with children is kept when at
    /// least one of them is included, so a fully excluded directory never
    /// survives. A directory with no children at all is only kept when
    /// empty directories are generated.
    pub fn source_children(&self, dir: &Path) -> Result<Vec<PathBuf>, GenerateError> {
        let mut kept = Vec::new();
        for child in list_dir(dir)? {
            if child.is_dir() {
                let grandchildren = list_dir(&child)?;
                let admitted = if grandchildren.is_empty() {
                    self.generate_empty_directories
                } else {
                    grandchildren.iter().any(|grandchild| self.is_included(grandchild))
                };
                if admitted {
                    kept.push(child);
                }
            } else if child.is_file() && self.is_included(&child) {
                kept.push(child);
            }
        }
        Ok(kept)
    }
}

/// Children of a directory, sorted by path.
pub(crate) fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, GenerateError> {
    let entries = fs::read_dir(dir).map_err(|e| GenerateError::io(dir, e))?;
    let mut children = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| GenerateError::io(dir, e))?;
        children.push(entry.path());
    }
    children.sort();
    Ok(children)
}

fn is_default_excluded(path: &Path) -> bool {
    let by_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| DEFAULT_EXCLUDED_FILES.contains(&name));
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| DEFAULT_EXCLUDED_EXTENSIONS.contains(&ext));
    by_name || by_extension
}

/// Expand every non-empty pattern below `root` in parallel and union the
/// results. A failing pattern contributes nothing and yields a warning.
pub fn expand_patterns(root: &Path, patterns: &[String]) -> (HashSet<PathBuf>, Vec<GenerateWarning>) {
    patterns
        .par_iter()
        .filter(|pattern| !pattern.is_empty())
        .map(|pattern| match expand_pattern(root, pattern) {
            Ok(paths) => (paths, Vec::new()),
            Err(warning) => {
                tracing::warn!(target: "sourcetree::matcher", pattern = %pattern, "{}", warning.message);
                (HashSet::new(), vec![warning])
            }
        })
        .reduce(
            || (HashSet::new(), Vec::new()),
            |(mut paths, mut warnings), (more_paths, more_warnings)| {
                paths.extend(more_paths);
                warnings.extend(more_warnings);
                (paths, warnings)
            },
        )
}

/// Expand one pattern. Matched directories contribute all their descendants
/// rather than themselves.
fn expand_pattern(root: &Path, pattern: &str) -> Result<HashSet<PathBuf>, GenerateWarning> {
    if is_literal(pattern) {
        let path = normalize(&root.join(pattern));
        return if path.is_dir() {
            descendants(&path)
        } else if path.exists() {
            Ok(HashSet::from([path]))
        } else {
            Ok(HashSet::new())
        };
    }

    let matcher = compile(pattern).map_err(|e| GenerateWarning::invalid_pattern(root, pattern, e))?;
    let mut matches = HashSet::new();
    let mut matched_dirs: Vec<PathBuf> = Vec::new();

    for entry in walker(root) {
        let entry = entry.map_err(|e| GenerateWarning::read_error(root, e))?;
        let path = entry.path();
        if matched_dirs.iter().any(|dir| path.starts_with(dir)) {
            matches.insert(path);
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        if matcher.is_match(relative) {
            if entry.file_type().is_dir() {
                matched_dirs.push(path);
            } else {
                matches.insert(path);
            }
        }
    }

    tracing::trace!(target: "sourcetree::matcher", pattern, count = matches.len(), "expanded pattern");
    Ok(matches)
}

fn descendants(dir: &Path) -> Result<HashSet<PathBuf>, GenerateWarning> {
    walker(dir)
        .into_iter()
        .map(|entry| entry.map(|e| e.path()).map_err(|e| GenerateWarning::read_error(dir, e)))
        .collect()
}

fn walker(root: &Path) -> WalkDir {
    WalkDir::new(root)
        .parallelism(Parallelism::Serial)
        .skip_hidden(false)
        .follow_links(false)
        .sort(true)
        .min_depth(1)
}

fn compile(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

fn is_literal(pattern: &str) -> bool {
    !pattern.contains(['*', '?', '[', '{'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("readme.md"), "r").unwrap();
        fs::write(root.join("main.x"), "m").unwrap();
        fs::write(root.join("src/Foo.x"), "f").unwrap();
        fs::write(root.join("src/Bar.x"), "b").unwrap();
        fs::write(root.join("src/nested/Deep.x"), "d").unwrap();
        fs::write(root.join("docs/guide.md"), "g").unwrap();
        temp
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let temp = create_test_tree();
        let (paths, warnings) = expand_patterns(temp.path(), &["*.md".to_string()]);
        assert!(warnings.is_empty());
        assert_eq!(paths, HashSet::from([temp.path().join("readme.md")]));
    }

    #[test]
    fn test_double_star_and_union() {
        let temp = create_test_tree();
        let (paths, _) = expand_patterns(
            temp.path(),
            &["**/*.md".to_string(), "src/nested".to_string(), String::new()],
        );
        assert!(paths.contains(&temp.path().join("docs/guide.md")));
        assert!(paths.contains(&temp.path().join("src/nested/Deep.x")));
        assert!(!paths.contains(&temp.path().join("src/nested")));
    }

    #[test]
    fn test_matched_directory_expands_to_descendants() {
        let temp = create_test_tree();
        let (paths, _) = expand_patterns(temp.path(), &["sr?".to_string()]);
        assert_eq!(paths.len(), 4);
        assert!(paths.contains(&temp.path().join("src/nested")));
        assert!(paths.contains(&temp.path().join("src/nested/Deep.x")));
    }

    #[test]
    fn test_invalid_pattern_is_isolated() {
        let temp = create_test_tree();
        let (paths, warnings) =
            expand_patterns(temp.path(), &["src/[".to_string(), "*.x".to_string()]);
        assert_eq!(paths, HashSet::from([temp.path().join("main.x")]));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_ordered_prefix_admits_ancestors() {
        let matcher = PathMatcher::from_paths(
            [PathBuf::from("/r/src/Foo.x")],
            std::iter::empty(),
            false,
        );
        assert!(matcher.is_included(Path::new("/r/src")));
        assert!(matcher.is_included(Path::new("/r/src/Foo.x")));
        assert!(!matcher.is_included(Path::new("/r/src/Bar.x")));
        assert!(!matcher.is_included(Path::new("/r/zzz")));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let path = PathBuf::from("/r/src/Foo.x");
        let matcher = PathMatcher::from_paths([path.clone()], [path.clone()], false);
        assert!(!matcher.is_included(&path));
    }

    #[test]
    fn test_default_excludes() {
        let matcher = PathMatcher::default();
        assert!(!matcher.is_included(Path::new("/r/.DS_Store")));
        assert!(!matcher.is_included(Path::new("/r/main.x.orig")));
        assert!(matcher.is_included(Path::new("/r/main.x")));
    }

    #[test]
    fn test_source_children_skips_filtered_directories() {
        let temp = create_test_tree();
        fs::create_dir(temp.path().join("empty")).unwrap();
        let root = temp.path();
        let (excludes, _) = expand_patterns(root, &["docs/*.md".to_string()]);

        let matcher = PathMatcher::from_paths(std::iter::empty(), excludes.clone(), false);
        let children = matcher.source_children(root).unwrap();
        assert_eq!(
            children,
            vec![root.join("main.x"), root.join("readme.md"), root.join("src")]
        );

        let matcher = PathMatcher::from_paths(std::iter::empty(), excludes, true);
        let children = matcher.source_children(root).unwrap();
        assert!(!children.contains(&root.join("docs")));
        assert!(children.contains(&root.join("empty")));
    }

    #[test]
    fn test_excluded_directory_stays_out_with_empty_directories() {
        let temp = create_test_tree();
        let root = temp.path();
        let (excludes, _) = expand_patterns(root, &["src".to_string()]);

        let matcher = PathMatcher::from_paths(std::iter::empty(), excludes, true);
        let children = matcher.source_children(root).unwrap();
        assert!(!children.contains(&root.join("src")));
        assert!(children.contains(&root.join("docs")));
    }

    #[test]
    fn test_source_children_missing_directory() {
        let matcher = PathMatcher::default();
        let err = matcher
            .source_children(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
