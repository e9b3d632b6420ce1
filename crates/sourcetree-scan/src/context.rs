//! Mutable state threaded through one generation run.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use indexmap::IndexSet;

use sourcetree_core::path::{last_component, normalize, relative_path};
use sourcetree_core::{
    ElementGraph, ElementKind, ElementTree, GenerateWarning, NodeId, PathKey, ProjectConfig,
    SourceTree,
};

use crate::group_cache::{GroupCache, GroupPlacement};
use crate::matcher::list_dir;
use crate::variant_cache::VariantGroupCache;

/// Extension of versioned model bundles, referenced as version groups.
pub const MODEL_BUNDLE_EXTENSION: &str = "xcdatamodeld";

/// Extension of the model versions inside a bundle.
pub const MODEL_VERSION_EXTENSION: &str = "xcdatamodel";

const CURRENT_VERSION_FILE: &str = ".xccurrentversion";
const CURRENT_VERSION_KEY: &str = "_XCCurrentVersionName";

/// Caches, arena and discovered state of a build.
///
/// Source roots share one context so that groups, file references and
/// variant groups are reused across roots and targets.
#[derive(Debug, Clone)]
pub struct BuildContext {
    base: PathBuf,
    project_root: PathBuf,
    pub(crate) graph: ElementGraph,
    pub(crate) groups: GroupCache,
    pub(crate) variants: VariantGroupCache,
    file_references: HashMap<PathKey, NodeId>,
    roots: IndexSet<NodeId>,
    pub(crate) known_regions: BTreeSet<String>,
    pub(crate) warnings: Vec<GenerateWarning>,
    local_packages_group: Option<NodeId>,
}

impl BuildContext {
    /// Create an empty context for a project.
    pub fn new(config: &ProjectConfig) -> Self {
        let base = absolute(&config.base());
        let project_root = absolute(&config.project_root());
        Self {
            groups: GroupCache::new(&base, &project_root),
            base,
            project_root,
            graph: ElementGraph::new(),
            variants: VariantGroupCache::new(),
            file_references: HashMap::new(),
            roots: IndexSet::new(),
            known_regions: BTreeSet::new(),
            warnings: Vec::new(),
            local_packages_group: None,
        }
    }

    /// Absolute, normalized project base.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Absolute, normalized directory top-level paths are relative to.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Elements built so far.
    pub fn graph(&self) -> &ElementGraph {
        &self.graph
    }

    /// Root elements in registration order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots.iter().copied()
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.roots.contains(&id)
    }

    /// Register a root element. Registering twice keeps the first position.
    pub fn add_root(&mut self, id: NodeId) {
        self.roots.insert(id);
    }

    /// Locales seen so far.
    pub fn known_regions(&self) -> &BTreeSet<String> {
        &self.known_regions
    }

    pub fn warnings(&self) -> &[GenerateWarning] {
        &self.warnings
    }

    /// Group for a directory, registering it as a root when it is created
    /// top-level.
    pub fn group(&mut self, path: &Path, children: &[NodeId], placement: GroupPlacement) -> NodeId {
        let cached = self.groups.get_or_create(&mut self.graph, path, children, placement);
        if cached.top_level {
            self.add_root(cached.id);
        }
        cached.id
    }

    /// File reference for `path`, stored relative to the directory `in_path`.
    ///
    /// References are cached by path, so the first caller decides the name.
    pub fn file_reference(&mut self, path: &Path, in_path: &Path, name: Option<&str>) -> NodeId {
        self.reference(ElementKind::File, path, in_path, name, SourceTree::Group)
    }

    /// Opaque folder reference anchored at the project root.
    pub fn folder_reference(&mut self, path: &Path, name: &str) -> NodeId {
        let base = self.base.clone();
        self.reference(ElementKind::Folder, path, &base, Some(name), SourceTree::SourceRoot)
    }

    fn reference(
        &mut self,
        kind: ElementKind,
        path: &Path,
        in_path: &Path,
        name: Option<&str>,
        source_tree: SourceTree,
    ) -> NodeId {
        let path = normalize(path);
        let key = PathKey::new(&path);
        if let Some(&id) = self.file_references.get(&key) {
            return id;
        }

        let stored = relative_path(&path, in_path)
            .unwrap_or_else(|| path.clone())
            .to_string_lossy()
            .into_owned();
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| last_component(Path::new(&stored)));
        let name = (name != stored).then(|| CompactString::from(name));

        let id = if kind == ElementKind::File && is_model_bundle(&path) {
            self.version_group(&path, name, stored, source_tree)
        } else {
            self.graph
                .add(kind, name, Some(CompactString::from(stored)), source_tree)
        };
        self.file_references.insert(key, id);
        id
    }

    /// Version group for a model bundle, one child per model version.
    ///
    /// The current version comes from the bundle's version file, falling
    /// back to the last version by name.
    fn version_group(
        &mut self,
        bundle: &Path,
        name: Option<CompactString>,
        stored: String,
        source_tree: SourceTree,
    ) -> NodeId {
        let entries = list_dir(bundle).unwrap_or_else(|err| {
            self.warnings.push(GenerateWarning::read_error(bundle, &err));
            Vec::new()
        });
        let versions: Vec<String> = entries
            .iter()
            .filter(|entry| entry.extension().is_some_and(|e| e == MODEL_VERSION_EXTENSION))
            .map(|entry| last_component(entry))
            .collect();

        let group = self.graph.add(
            ElementKind::VersionGroup,
            name,
            Some(CompactString::from(stored)),
            source_tree,
        );
        let children: Vec<NodeId> = versions
            .iter()
            .map(|version| {
                self.graph.add(
                    ElementKind::File,
                    None,
                    Some(CompactString::from(version.as_str())),
                    SourceTree::Group,
                )
            })
            .collect();
        self.graph.merge_children(group, &children);

        let current = current_model_version(bundle)
            .and_then(|current| versions.iter().position(|v| *v == current))
            .or_else(|| versions.len().checked_sub(1));
        self.graph[group].current_version = current.map(|index| children[index]);

        tracing::trace!(
            target: "sourcetree::groups",
            path = %bundle.display(),
            versions = versions.len(),
            "created version group"
        );
        group
    }

    /// Synthetic group collecting local packages, created as a root on first use.
    pub fn local_packages_group(&mut self, name: &str) -> NodeId {
        if let Some(id) = self.local_packages_group {
            return id;
        }
        let id = self.graph.add(
            ElementKind::Group,
            Some(CompactString::from(name)),
            None,
            SourceTree::SourceRoot,
        );
        self.local_packages_group = Some(id);
        self.add_root(id);
        id
    }

    /// Consume the context into the finished tree.
    pub fn finish(self) -> ElementTree {
        ElementTree::new(
            self.graph,
            self.roots.into_iter().collect(),
            self.known_regions,
            self.warnings,
        )
    }
}

/// Whether `path` is a versioned model bundle.
pub fn is_model_bundle(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == MODEL_BUNDLE_EXTENSION)
}

/// Version named by the bundle's version file, if it can be read.
fn current_model_version(bundle: &Path) -> Option<String> {
    let value = plist::Value::from_file(bundle.join(CURRENT_VERSION_FILE)).ok()?;
    value
        .as_dictionary()?
        .get(CURRENT_VERSION_KEY)?
        .as_string()
        .map(str::to_string)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path)
        .map(|p| normalize(&p))
        .unwrap_or_else(|_| path.to_path_buf())
}
