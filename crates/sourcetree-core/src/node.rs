//! Element node types.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Unique identifier for a node within an element graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a new NodeId from a u64.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Type of element in the group graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Reference to a single file.
    File,
    /// Opaque reference to a whole directory.
    Folder,
    /// Group mirroring a directory, or a synthetic named group.
    Group,
    /// Group unifying per-locale copies of one resource.
    VariantGroup,
    /// Versioned model bundle; children are its model versions.
    VersionGroup,
}

impl ElementKind {
    /// Check if this kind can hold children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ElementKind::Group | ElementKind::VariantGroup | ElementKind::VersionGroup
        )
    }

    /// Check if this kind is a leaf reference.
    pub fn is_reference(&self) -> bool {
        matches!(self, ElementKind::File | ElementKind::Folder)
    }
}

/// What an element's stored path is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SourceTree {
    /// Relative to the parent group's location.
    #[default]
    Group,
    /// Relative to the project root.
    SourceRoot,
}

/// A file, folder, group or variant group in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier for this node.
    pub id: NodeId,

    /// Element type.
    pub kind: ElementKind,

    /// Display name; `None` when it would equal `path`.
    pub name: Option<CompactString>,

    /// Stored location, relative according to `source_tree`.
    /// Synthetic groups have no path.
    pub path: Option<CompactString>,

    /// Anchor for `path`.
    pub source_tree: SourceTree,

    /// Ordered children (group kinds only).
    pub children: Vec<NodeId>,

    /// Non-owning back-reference to the group this element was last attached to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,

    /// Selected child of a version group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<NodeId>,
}

impl Element {
    /// Create a new element without children.
    pub fn new(
        id: NodeId,
        kind: ElementKind,
        name: Option<CompactString>,
        path: Option<CompactString>,
        source_tree: SourceTree,
    ) -> Self {
        Self {
            id,
            kind,
            name,
            path,
            source_tree,
            children: Vec::new(),
            parent: None,
            current_version: None,
        }
    }

    /// Name shown to users: the explicit name, else the stored path.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or_default()
    }

    /// Check if this element is a directory group.
    pub fn is_group(&self) -> bool {
        self.kind == ElementKind::Group
    }

    /// Check if this element is a variant group.
    pub fn is_variant_group(&self) -> bool {
        self.kind == ElementKind::VariantGroup
    }

    /// Check if this element is a version group.
    pub fn is_version_group(&self) -> bool {
        self.kind == ElementKind::VersionGroup
    }

    /// Get the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Identity used when merging children into an existing group.
    pub fn merge_key(&self) -> (Option<&str>, Option<&str>, ElementKind) {
        (self.name.as_deref(), self.path.as_deref(), self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.0, 42);
        assert_eq!(id.index(), 42);
    }

    #[test]
    fn test_display_name_prefers_name() {
        let element = Element::new(
            NodeId::new(0),
            ElementKind::File,
            Some("en".into()),
            Some("en.lproj/Home.strings".into()),
            SourceTree::Group,
        );
        assert_eq!(element.display_name(), "en");

        let element = Element::new(
            NodeId::new(1),
            ElementKind::Group,
            None,
            Some("Sources".into()),
            SourceTree::Group,
        );
        assert_eq!(element.display_name(), "Sources");
        assert!(element.is_group());
    }

    #[test]
    fn test_kind_discrimination() {
        assert!(ElementKind::Group.is_container());
        assert!(ElementKind::VariantGroup.is_container());
        assert!(ElementKind::VersionGroup.is_container());
        assert!(ElementKind::Folder.is_reference());
        assert!(!ElementKind::File.is_container());
    }
}
