//! Directory group identity.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use compact_str::CompactString;

use sourcetree_core::path::{is_strict_ancestor, last_component, normalize, relative_path};
use sourcetree_core::{ElementGraph, ElementKind, NodeId, PathKey, SourceTree};

/// How a group is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupPlacement {
    /// The group is the directory a walk started from.
    pub is_base_group: bool,
    /// The group will be placed under a declared logical parent.
    pub has_custom_parent: bool,
    /// Intermediate groups are being created for this source root.
    pub create_intermediate_groups: bool,
}

impl GroupPlacement {
    /// Placement for a directory nested inside a walk.
    pub fn nested() -> Self {
        Self::default()
    }

    /// Placement for the starting directory of a walk.
    pub fn base(create_intermediate_groups: bool) -> Self {
        Self {
            is_base_group: true,
            has_custom_parent: false,
            create_intermediate_groups,
        }
    }
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedGroup {
    pub id: NodeId,
    /// The group was created by this call.
    pub created: bool,
    /// The group was created as a top-level group.
    pub top_level: bool,
}

/// One group per directory, merged on every further request.
#[derive(Debug, Clone)]
pub struct GroupCache {
    base: PathBuf,
    project_root: PathBuf,
    groups: HashMap<PathKey, NodeId>,
}

impl GroupCache {
    /// Create a cache for a project rooted at `base`, with top-level paths
    /// relative to `project_root`.
    pub fn new(base: impl AsRef<Path>, project_root: impl AsRef<Path>) -> Self {
        Self {
            base: normalize(base.as_ref()),
            project_root: normalize(project_root.as_ref()),
            groups: HashMap::new(),
        }
    }

    /// Normalized project base.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Group already built for `path`.
    pub fn get(&self, path: &Path) -> Option<NodeId> {
        self.groups.get(&PathKey::new(path)).copied()
    }

    /// Check if a group exists for `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.groups.contains_key(&PathKey::new(path))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Return the group for `path`, merging `children` into it.
    ///
    /// An existing group only gains the children it does not already hold;
    /// its placement is left as it was first computed.
    pub fn get_or_create(
        &mut self,
        graph: &mut ElementGraph,
        path: &Path,
        children: &[NodeId],
        placement: GroupPlacement,
    ) -> CachedGroup {
        let path = normalize(path);
        let key = PathKey::new(&path);

        if let Some(&id) = self.groups.get(&key) {
            graph.merge_children(id, children);
            return CachedGroup {
                id,
                created: false,
                top_level: false,
            };
        }

        let top_level = self.is_top_level(&path, placement);
        let stored_path = self.stored_path(&path, top_level || placement.has_custom_parent);
        let name = last_component(&path);
        let name = (name != stored_path).then(|| CompactString::from(name));

        let id = graph.add(
            ElementKind::Group,
            name,
            Some(CompactString::from(stored_path)),
            SourceTree::Group,
        );
        graph.merge_children(id, children);
        self.groups.insert(key, id);

        tracing::trace!(target: "sourcetree::groups", path = %path.display(), top_level, "created group");
        CachedGroup {
            id,
            created: true,
            top_level,
        }
    }

    /// Top-level groups have no parent group inside the project: they sit
    /// directly under the base, are the base itself, contain the base, or
    /// start a walk that creates no intermediate groups.
    fn is_top_level(&self, path: &Path, placement: GroupPlacement) -> bool {
        if placement.has_custom_parent {
            return false;
        }
        let outside_base = !path.starts_with(&self.base);
        let parent_of_base = outside_base && is_strict_ancestor(path, &self.base);
        let parent_is_base = path.parent().is_some_and(|p| p == self.base);

        (placement.is_base_group && !placement.create_intermediate_groups)
            || parent_is_base
            || parent_of_base
            || path == self.base
    }

    fn stored_path(&self, path: &Path, relative_to_root: bool) -> String {
        if relative_to_root {
            if let Some(relative) = relative_path(path, &self.project_root) {
                return relative.to_string_lossy().into_owned();
            }
        }
        last_component(path)
    }
}
