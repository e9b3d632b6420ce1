//! Variant group identity for localized resources.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use compact_str::CompactString;

use sourcetree_core::path::last_component;
use sourcetree_core::{ElementGraph, ElementKind, NodeId, PathKey, SourceTree};

#[derive(Debug, Clone)]
struct VariantEntry {
    id: NodeId,
    /// File name the group is identified by; follows the reference locale.
    file_name: String,
    locales: BTreeSet<String>,
}

impl VariantEntry {
    fn stem(&self) -> &str {
        stem_of(&self.file_name)
    }
}

fn stem_of(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Variant groups of one build, keyed by file name within the directory
/// holding the locale directories.
///
/// The key is the pair (directory, file name), not the file name alone:
/// `Home.strings` localized under two different directories yields two
/// groups, each attached to its own directory group. A single group shared
/// between directories would need two parents.
#[derive(Debug, Clone, Default)]
pub struct VariantGroupCache {
    scopes: HashMap<PathKey, Vec<VariantEntry>>,
}

impl VariantGroupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variant groups across all scopes.
    pub fn len(&self) -> usize {
        self.scopes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the variant group a localized file belongs to.
    ///
    /// An exact file name match wins. Otherwise the first group, in creation
    /// order, with the same stem and no file from `locale` yet is used, so
    /// `Main.strings` joins `Main.storyboard`.
    pub fn resolve(&self, scope: &Path, file_name: &str, locale: &str) -> Option<NodeId> {
        let entries = self.scopes.get(&PathKey::new(scope))?;
        entries
            .iter()
            .find(|entry| entry.file_name == file_name)
            .or_else(|| {
                let stem = stem_of(file_name);
                entries
                    .iter()
                    .find(|entry| entry.stem() == stem && !entry.locales.contains(locale))
            })
            .map(|entry| entry.id)
    }

    /// Resolve a localized file, creating a group named after it when no
    /// existing group matches.
    pub fn get_or_create(
        &mut self,
        graph: &mut ElementGraph,
        scope: &Path,
        file_name: &str,
        locale: &str,
    ) -> NodeId {
        if let Some(id) = self.resolve(scope, file_name, locale) {
            return id;
        }

        let id = graph.add(
            ElementKind::VariantGroup,
            Some(CompactString::from(file_name)),
            None,
            SourceTree::Group,
        );
        self.scopes
            .entry(PathKey::new(scope))
            .or_default()
            .push(VariantEntry {
                id,
                file_name: file_name.to_string(),
                locales: BTreeSet::new(),
            });
        tracing::trace!(target: "sourcetree::variants", file_name, "created variant group");
        id
    }

    /// Attach one locale's file reference to a variant group.
    ///
    /// Files from a reference locale (Base or the development language)
    /// rename the group after themselves.
    pub fn add_variant(
        &mut self,
        graph: &mut ElementGraph,
        scope: &Path,
        group: NodeId,
        file_reference: NodeId,
        locale: &str,
        is_reference_locale: bool,
    ) {
        graph.merge_children(group, &[file_reference]);
        let file_name = graph[file_reference]
            .path
            .as_deref()
            .map(|p| last_component(Path::new(p)))
            .unwrap_or_default();

        let Some(entry) = self
            .scopes
            .get_mut(&PathKey::new(scope))
            .and_then(|entries| entries.iter_mut().find(|e| e.id == group))
        else {
            return;
        };
        entry.locales.insert(locale.to_string());

        if is_reference_locale {
            graph[group].name = Some(CompactString::from(file_name.as_str()));
            entry.file_name = file_name;
        }
    }
}
