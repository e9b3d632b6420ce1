//! Generation output and statistics.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::GenerateWarning;
use crate::graph::ElementGraph;
use crate::node::{ElementKind, NodeId};
use crate::record::SourceFileRecord;

/// Summary statistics for a generated graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Total number of groups, synthetic ones included.
    pub total_groups: u64,
    /// Total number of variant groups.
    pub total_variant_groups: u64,
    /// Total number of version groups.
    pub total_version_groups: u64,
    /// Total number of file references.
    pub total_files: u64,
    /// Total number of folder references.
    pub total_folders: u64,
    /// Deepest nesting below a root element.
    pub max_depth: u32,
}

impl TreeStats {
    /// Compute stats for a graph and its roots.
    pub fn collect(graph: &ElementGraph, roots: &[NodeId]) -> Self {
        let mut stats = Self::default();
        for element in graph.iter() {
            match element.kind {
                ElementKind::Group => stats.total_groups += 1,
                ElementKind::VariantGroup => stats.total_variant_groups += 1,
                ElementKind::VersionGroup => stats.total_version_groups += 1,
                ElementKind::File => stats.total_files += 1,
                ElementKind::Folder => stats.total_folders += 1,
            }
        }

        let mut stack: Vec<(NodeId, u32)> = roots.iter().map(|r| (*r, 0)).collect();
        let mut seen = BTreeSet::new();
        while let Some((id, depth)) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            stats.max_depth = stats.max_depth.max(depth);
            stack.extend(graph[id].children.iter().map(|c| (*c, depth + 1)));
        }
        stats
    }
}

/// Complete group graph of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementTree {
    /// Every element created during the run.
    pub graph: ElementGraph,

    /// Top-level elements, in the order they were registered.
    pub roots: Vec<NodeId>,

    /// Locales of every locale directory encountered.
    pub known_regions: BTreeSet<String>,

    /// Summary statistics.
    pub stats: TreeStats,

    /// Warnings encountered during generation.
    pub warnings: Vec<GenerateWarning>,
}

impl ElementTree {
    /// Create a new tree, computing its statistics.
    pub fn new(
        graph: ElementGraph,
        roots: Vec<NodeId>,
        known_regions: BTreeSet<String>,
        warnings: Vec<GenerateWarning>,
    ) -> Self {
        let stats = TreeStats::collect(&graph, &roots);
        Self {
            graph,
            roots,
            known_regions,
            stats,
            warnings,
        }
    }

    /// Find a root element by display name.
    pub fn root_named(&self, name: &str) -> Option<NodeId> {
        self.roots
            .iter()
            .copied()
            .find(|id| self.graph[*id].display_name() == name)
    }

    /// Follow display names from a root down the graph.
    pub fn find(&self, names: &[&str]) -> Option<NodeId> {
        let (first, rest) = names.split_first()?;
        rest.iter()
            .try_fold(self.root_named(first)?, |id, name| self.graph.child_named(id, name))
    }

    /// Check if there were any warnings during generation.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Result of generating every target of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutput {
    pub tree: ElementTree,

    /// Source file records per target name, in target order.
    pub records: IndexMap<String, Vec<SourceFileRecord>>,
}

impl BuildOutput {
    /// Records of one target.
    pub fn records_for(&self, target: &str) -> &[SourceFileRecord] {
        self.records.get(target).map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SourceTree;

    #[test]
    fn test_tree_stats_default() {
        let stats = TreeStats::default();
        assert_eq!(stats.total_groups, 0);
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.max_depth, 0);
    }

    #[test]
    fn test_find_by_names() {
        let mut graph = ElementGraph::new();
        let top = graph.add(ElementKind::Group, None, Some("a".into()), SourceTree::Group);
        let mid = graph.add(ElementKind::Group, None, Some("b".into()), SourceTree::Group);
        let leaf = graph.add(ElementKind::File, None, Some("c.txt".into()), SourceTree::Group);
        graph.merge_children(top, &[mid]);
        graph.merge_children(mid, &[leaf]);

        let tree = ElementTree::new(graph, vec![top], BTreeSet::new(), Vec::new());
        assert_eq!(tree.find(&["a", "b", "c.txt"]), Some(leaf));
        assert_eq!(tree.find(&["a", "x"]), None);
        assert_eq!(tree.stats.total_groups, 2);
        assert_eq!(tree.stats.total_files, 1);
        assert_eq!(tree.stats.max_depth, 2);
        assert!(!tree.has_warnings());
    }
}
