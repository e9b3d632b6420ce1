//! Source root walking.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use itertools::Itertools;

use sourcetree_core::path::{file_stem, last_component, normalize, relative_path};
use sourcetree_core::{
    BASE_LOCALE, BuildOutput, BuildRole, ElementKind, GenerateError,
    GenerateWarning, NodeId, ProductKind, ProjectConfig, SourceFileRecord, SourceRootSpec,
    SourceTree, SourceType, TargetSources,
};

use crate::assembler::{create_intermediate_groups, create_parent_groups, make_path_relative};
use crate::context::{BuildContext, is_model_bundle};
use crate::group_cache::GroupPlacement;
use crate::matcher::{PathMatcher, list_dir};
use crate::roles::source_file_record;

/// Extension of locale directories.
pub const LOCALE_DIRECTORY_EXTENSION: &str = "lproj";

/// Element, groups and records produced by one source root.
#[derive(Debug, Clone)]
pub struct GroupSources {
    /// Element placed for the root: its group, its folder or file reference,
    /// or the group holding a file root.
    pub element: NodeId,
    /// Groups of the walked directories, the root's own group first, then
    /// its descendants depth first. Empty for file and folder roots.
    pub groups: Vec<NodeId>,
    pub source_files: Vec<SourceFileRecord>,
}

/// Children, records and descendant groups of one directory, before the
/// directory's own group exists.
#[derive(Debug, Default)]
struct DirectoryContents {
    children: Vec<NodeId>,
    subgroups: Vec<NodeId>,
    source_files: Vec<SourceFileRecord>,
}

/// Per-root walk parameters.
struct Walk<'s> {
    product: ProductKind,
    spec: &'s SourceRootSpec,
    matcher: PathMatcher,
    role_overrides: &'s HashMap<PathBuf, BuildRole>,
}

/// Builds the group graph and source file records of a project.
///
/// Source roots are processed in order against one [`BuildContext`], so a
/// directory reached from several roots ends up as a single group.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder<'a> {
    config: &'a ProjectConfig,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder for a project.
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self { config }
    }

    /// Fresh context for this project.
    pub fn context(&self) -> BuildContext {
        BuildContext::new(self.config)
    }

    /// Build every target and return the finished graph with the records of
    /// each target.
    pub fn build(&self, targets: &[TargetSources]) -> Result<BuildOutput, GenerateError> {
        let mut ctx = self.context();
        let mut records = IndexMap::new();

        for target in targets {
            tracing::debug!(target: "sourcetree::builder", name = %target.name, sources = target.sources.len(), "building target");
            let files = self.source_files_for_target(
                &mut ctx,
                target.product,
                &target.sources,
                &target.role_overrides,
            )?;
            records.insert(target.name.clone(), files);
        }

        let tree = ctx.finish();
        tracing::debug!(
            target: "sourcetree::builder",
            groups = tree.stats.total_groups,
            files = tree.stats.total_files,
            roots = tree.roots.len(),
            "build complete"
        );
        Ok(BuildOutput { tree, records })
    }

    /// Records of every source root of a target, in declaration order.
    pub fn source_files_for_target(
        &self,
        ctx: &mut BuildContext,
        product: ProductKind,
        sources: &[SourceRootSpec],
        role_overrides: &HashMap<PathBuf, BuildRole>,
    ) -> Result<Vec<SourceFileRecord>, GenerateError> {
        let mut records = Vec::new();
        for spec in sources {
            records.extend(self.source_files(ctx, product, spec, role_overrides)?);
        }
        Ok(records)
    }

    /// Build the groups for `path` without keeping any records.
    pub fn add_file_group(&self, ctx: &mut BuildContext, path: impl Into<PathBuf>) -> Result<(), GenerateError> {
        let spec = SourceRootSpec::new(path);
        self.source_files(ctx, ProductKind::None, &spec, &HashMap::new())?;
        Ok(())
    }

    /// File reference for a single path, attached to a group for its
    /// directory.
    pub fn contained_file_reference(&self, ctx: &mut BuildContext, path: &Path) -> NodeId {
        let path = normalize(&ctx.base().join(path));
        let parent = parent_dir(ctx, &path);
        let create_intermediate = self.config.create_intermediate_groups;

        let reference = ctx.file_reference(&path, &parent, None);
        let group = ctx.group(&parent, &[reference], GroupPlacement::base(create_intermediate));
        if create_intermediate {
            create_intermediate_groups(ctx, group, &parent);
        }
        reference
    }

    /// Add a local package as a folder element.
    ///
    /// Without `group` the package goes into the shared local packages
    /// group; otherwise into the group for that directory.
    pub fn add_local_package(
        &self,
        ctx: &mut BuildContext,
        path: &Path,
        group: Option<&Path>,
    ) -> Result<NodeId, GenerateError> {
        let container = match group {
            Some(location) => {
                let location = normalize(&ctx.base().join(location));
                let cached = ctx.groups.contains(&location);
                let id = ctx.group(&location, &[], GroupPlacement::base(true));
                if !cached {
                    create_intermediate_groups(ctx, id, &location);
                }
                id
            }
            None => ctx.local_packages_group(self.config.local_packages_group_name()),
        };

        let absolute = normalize(&ctx.base().join(path));
        let stored = relative_path(&absolute, ctx.project_root()).ok_or_else(|| {
            GenerateError::RelativePath {
                path: absolute.clone(),
                base: ctx.project_root().to_path_buf(),
            }
        })?;
        let stored = stored.to_string_lossy().into_owned();
        let name = last_component(&absolute);
        let name = (name != stored).then(|| name.into());

        let reference = ctx
            .graph
            .add(ElementKind::Folder, name, Some(stored.into()), SourceTree::SourceRoot);
        ctx.graph.merge_children(container, &[reference]);
        tracing::debug!(target: "sourcetree::builder", path = %absolute.display(), "added local package");
        Ok(reference)
    }

    /// Records of one source root, placing its elements in the graph.
    pub fn source_files(
        &self,
        ctx: &mut BuildContext,
        product: ProductKind,
        spec: &SourceRootSpec,
        role_overrides: &HashMap<PathBuf, BuildRole>,
    ) -> Result<Vec<SourceFileRecord>, GenerateError> {
        Ok(self
            .root_sources(ctx, product, spec, role_overrides)?
            .map(|sources| sources.source_files)
            .unwrap_or_default())
    }

    /// Place one source root in the graph and return what it produced.
    ///
    /// Returns `None` for a missing optional root.
    pub fn root_sources(
        &self,
        ctx: &mut BuildContext,
        product: ProductKind,
        spec: &SourceRootSpec,
        role_overrides: &HashMap<PathBuf, BuildRole>,
    ) -> Result<Option<GroupSources>, GenerateError> {
        let path = normalize(&ctx.base().join(&spec.path));
        if !path.exists() {
            if spec.optional {
                tracing::debug!(target: "sourcetree::builder", path = %path.display(), "skipping missing optional source");
                return Ok(None);
            }
            return Err(GenerateError::NotFound { path });
        }

        let source_type = spec.resolved_type(&path);
        let segments = spec.group_segments();
        let has_custom_parent = !segments.is_empty();
        let create_intermediate = spec
            .create_intermediate_groups
            .unwrap_or(self.config.create_intermediate_groups);
        tracing::debug!(
            target: "sourcetree::builder",
            path = %path.display(),
            mode = %source_type,
            "processing source root"
        );

        let mut records = Vec::new();
        let mut groups = Vec::new();
        let (source_reference, source_path) = match source_type {
            SourceType::Folder => {
                let name = spec.name.clone().unwrap_or_else(|| last_component(&path));
                let reference = ctx.folder_reference(&path, &name);
                if !(create_intermediate || has_custom_parent) || path.parent() == Some(ctx.base()) {
                    ctx.add_root(reference);
                }
                records.push(self.record(product, spec, &path, reference, role_overrides));
                (reference, path.clone())
            }
            SourceType::File => {
                let parent = parent_dir(ctx, &path);
                let reference = ctx.file_reference(&path, &parent, spec.name.as_deref());
                records.push(self.record(product, spec, &path, reference, role_overrides));

                if has_custom_parent {
                    (reference, path.clone())
                } else if parent == ctx.base() {
                    ctx.add_root(reference);
                    (reference, path.clone())
                } else {
                    let group = ctx.group(&parent, &[reference], GroupPlacement::base(create_intermediate));
                    (group, parent)
                }
            }
            SourceType::Group => {
                let mut matcher = PathMatcher::new(
                    &path,
                    &spec.includes,
                    &spec.excludes,
                    self.config.generate_empty_directories,
                );
                ctx.warnings.extend(matcher.take_warnings());
                let walk = Walk {
                    product,
                    spec,
                    matcher,
                    role_overrides,
                };

                let placement = GroupPlacement {
                    is_base_group: true,
                    has_custom_parent,
                    create_intermediate_groups: create_intermediate,
                };
                let sources = self.group_sources(ctx, &walk, &path, placement)?;
                if let Some(name) = &spec.name {
                    ctx.graph[sources.element].name = Some(name.as_str().into());
                }
                records.extend(sources.source_files);
                groups = sources.groups;
                (sources.element, path.clone())
            }
        };

        if has_custom_parent {
            create_parent_groups(ctx, &segments, source_reference);
            make_path_relative(ctx, source_reference, &path)?;
        } else if create_intermediate {
            create_intermediate_groups(ctx, source_reference, &source_path);
        }

        Ok(Some(GroupSources {
            element: source_reference,
            groups,
            source_files: records,
        }))
    }

    /// Walk `path` recursively and build its group.
    fn group_sources(
        &self,
        ctx: &mut BuildContext,
        walk: &Walk<'_>,
        path: &Path,
        placement: GroupPlacement,
    ) -> Result<GroupSources, GenerateError> {
        let contents = self.directory_contents(ctx, walk, path)?;
        let group = ctx.group(path, &contents.children, placement);
        let mut groups = vec![group];
        groups.extend(contents.subgroups);
        Ok(GroupSources {
            element: group,
            groups,
            source_files: contents.source_files,
        })
    }

    fn directory_contents(
        &self,
        ctx: &mut BuildContext,
        walk: &Walk<'_>,
        path: &Path,
    ) -> Result<DirectoryContents, GenerateError> {
        let entries = walk.matcher.source_children(path)?;
        let (locale_dirs, entries): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|entry| is_locale_directory(entry));
        let (directories, files): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|entry| self.is_container(entry));

        let mut contents = DirectoryContents::default();

        for file in &files {
            let reference = ctx.file_reference(file, path, None);
            contents.children.push(reference);
            contents
                .source_files
                .push(self.record(walk.product, walk.spec, file, reference, walk.role_overrides));
        }

        for directory in &directories {
            let nested = self.directory_contents(ctx, walk, directory)?;
            if nested.source_files.is_empty() && !self.config.generate_empty_directories {
                continue;
            }
            let group = ctx.group(directory, &nested.children, GroupPlacement::nested());
            contents.children.push(group);
            contents.subgroups.push(group);
            contents.subgroups.extend(nested.subgroups);
            contents.source_files.extend(nested.source_files);
        }

        self.localized_sources(ctx, walk, path, locale_dirs, &mut contents)?;
        Ok(contents)
    }

    /// Fold the locale directories of `path` into variant groups.
    ///
    /// Reference locales are visited first so that their files name the
    /// groups the other locales join.
    fn localized_sources(
        &self,
        ctx: &mut BuildContext,
        walk: &Walk<'_>,
        path: &Path,
        locale_dirs: Vec<PathBuf>,
        contents: &mut DirectoryContents,
    ) -> Result<(), GenerateError> {
        let locale_dirs = self.ordered_locale_dirs(locale_dirs);
        let has_reference_locale = locale_dirs
            .iter()
            .any(|(locale, _)| self.config.is_reference_locale(locale));

        for (locale, dir) in &locale_dirs {
            ctx.known_regions.insert(locale.clone());
            let is_reference = self.config.is_reference_locale(locale);

            for file in list_dir(dir)?.into_iter().filter(|f| walk.matcher.is_included(f)) {
                let file_name = last_component(&file);
                let group = match ctx.variants.resolve(path, &file_name, locale) {
                    Some(group) => group,
                    None if is_reference || !has_reference_locale => {
                        ctx.variants.get_or_create(&mut ctx.graph, path, &file_name, locale)
                    }
                    None => {
                        tracing::warn!(target: "sourcetree::builder", path = %file.display(), "localized file has no variant group");
                        ctx.warnings.push(GenerateWarning::unresolved_variant(&file));
                        let reference = ctx.file_reference(&file, path, None);
                        contents.children.push(reference);
                        contents
                            .source_files
                            .push(self.record(walk.product, walk.spec, &file, reference, walk.role_overrides));
                        continue;
                    }
                };

                if !contents.children.contains(&group) {
                    contents.children.push(group);
                }
                let reference = ctx.file_reference(&file, path, Some(locale.as_str()));
                ctx.variants
                    .add_variant(&mut ctx.graph, path, group, reference, locale, is_reference);
                contents
                    .source_files
                    .push(self.record(walk.product, walk.spec, &file, group, walk.role_overrides));
            }
        }
        Ok(())
    }

    /// Locale directories keyed by locale: `Base`, then the development
    /// language, then the rest by name.
    fn ordered_locale_dirs(&self, dirs: Vec<PathBuf>) -> Vec<(String, PathBuf)> {
        let development = self.config.development_language.as_deref();
        dirs.into_iter()
            .map(|dir| (file_stem(&dir), dir))
            .sorted_by_key(|(locale, _)| {
                let rank = if locale == BASE_LOCALE {
                    0
                } else if Some(locale.as_str()) == development {
                    1
                } else {
                    2
                };
                (rank, locale.clone())
            })
            .collect()
    }

    /// Whether `path` is walked as a group rather than referenced as a file.
    /// Model bundles are always referenced.
    fn is_container(&self, path: &Path) -> bool {
        if is_model_bundle(path) {
            return false;
        }
        self.config
            .file_types
            .for_path(path)
            .map(|file_type| !file_type.file)
            .unwrap_or_else(|| path.is_dir())
    }

    fn record(
        &self,
        product: ProductKind,
        spec: &SourceRootSpec,
        path: &Path,
        element: NodeId,
        role_overrides: &HashMap<PathBuf, BuildRole>,
    ) -> SourceFileRecord {
        source_file_record(&self.config.file_types, product, spec, path, element, role_overrides)
    }
}

fn is_locale_directory(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == LOCALE_DIRECTORY_EXTENSION) && path.is_dir()
}

fn parent_dir(ctx: &BuildContext, path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| ctx.base().to_path_buf())
}
