//! Arena holding every element of a generation run.

use std::ops::{Index, IndexMut};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::node::{Element, ElementKind, NodeId, SourceTree};

/// Arena of elements addressed by [`NodeId`].
///
/// Elements are never removed, so ids stay valid for the lifetime of the graph.
/// Ownership flows from groups to children; `Element::parent` is only a
/// back-reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementGraph {
    elements: Vec<Element>,
}

impl ElementGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element and return its id.
    pub fn add(
        &mut self,
        kind: ElementKind,
        name: Option<CompactString>,
        path: Option<CompactString>,
        source_tree: SourceTree,
    ) -> NodeId {
        let id = NodeId::new(self.elements.len() as u64);
        self.elements.push(Element::new(id, kind, name, path, source_tree));
        id
    }

    /// Look up an element.
    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.elements.get(id.index())
    }

    /// Look up an element mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.elements.get_mut(id.index())
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the graph has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over all elements in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Iterate over the direct children of `id`.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Element> {
        self[id].children.iter().map(move |child| &self[*child])
    }

    /// Find a direct child of `id` by display name.
    pub fn child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .find(|child| child.display_name() == name)
            .map(|child| child.id)
    }

    /// Iterate over the parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &Element> {
        std::iter::successors(self[id].parent.map(|p| &self[p]), move |e| {
            e.parent.map(|p| &self[p])
        })
    }

    /// Append `children` to `parent`, skipping any whose (name, path, kind)
    /// is already present. Appended children point back at `parent`.
    ///
    /// Returns the number of children actually appended.
    pub fn merge_children(&mut self, parent: NodeId, children: &[NodeId]) -> usize {
        let mut appended = 0;
        for &child in children {
            if child == parent {
                continue;
            }
            let present = {
                let key = self[child].merge_key();
                self[parent]
                    .children
                    .iter()
                    .any(|existing| self[*existing].merge_key() == key)
            };
            if !present {
                self[parent].children.push(child);
                self[child].parent = Some(parent);
                appended += 1;
            }
        }
        appended
    }

    /// Location of `id` resolved through its parent chain, the way a
    /// consumer of the graph resolves group-relative paths.
    pub fn resolved_path(&self, id: NodeId) -> String {
        let mut parts: Vec<&str> = self
            .ancestors(id)
            .filter_map(|e| e.path.as_deref())
            .collect();
        parts.reverse();
        if let Some(path) = self[id].path.as_deref() {
            parts.push(path);
        }
        parts.join("/")
    }
}

impl Index<NodeId> for ElementGraph {
    type Output = Element;

    fn index(&self, id: NodeId) -> &Element {
        &self.elements[id.index()]
    }
}

impl IndexMut<NodeId> for ElementGraph {
    fn index_mut(&mut self, id: NodeId) -> &mut Element {
        &mut self.elements[id.index()]
    }
}
