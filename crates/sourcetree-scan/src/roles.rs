//! Build role and settings resolution for source files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sourcetree_core::{
    BuildRole, FileSettings, FileTypeTable, HeaderVisibility, NodeId, ProductKind,
    SourceFileRecord, SourceRootSpec, SourceType,
};

use crate::context::MODEL_BUNDLE_EXTENSION;

/// Role a file takes when nothing more specific applies.
///
/// The classification table wins; model bundles are compiled as sources;
/// module maps are copied for static libraries only; any other file with an
/// extension is a resource.
pub fn default_role(file_types: &FileTypeTable, path: &Path, product: ProductKind) -> Option<BuildRole> {
    if let Some(role) = file_types.for_path(path).and_then(|t| t.build_role.clone()) {
        return Some(role);
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(MODEL_BUNDLE_EXTENSION) => Some(BuildRole::Sources),
        Some("modulemap") => {
            (product == ProductKind::StaticLibrary).then(BuildRole::static_library_include)
        }
        Some(_) => Some(BuildRole::Resources),
        None => None,
    }
}

/// Resolve the role of `path` within a source root.
///
/// Precedence: the root's forced role, `Resources` for folder roots, the
/// per-path override table, then [`default_role`].
pub fn resolve_role(
    file_types: &FileTypeTable,
    product: ProductKind,
    spec: &SourceRootSpec,
    path: &Path,
    role_overrides: &HashMap<PathBuf, BuildRole>,
) -> Option<BuildRole> {
    let role = if let Some(role) = &spec.build_role {
        Some(role.clone())
    } else if spec.resolved_type(path) == SourceType::Folder {
        Some(BuildRole::Resources)
    } else if let Some(role) = role_overrides.get(path) {
        Some(role.clone())
    } else {
        default_role(file_types, path, product)
    };

    match role {
        Some(BuildRole::None) => None,
        // Static libraries have no header role; public headers are copied.
        Some(BuildRole::Headers) if product == ProductKind::StaticLibrary => {
            let visibility = spec.header_visibility.unwrap_or_default();
            (visibility == HeaderVisibility::Public).then(BuildRole::static_library_include)
        }
        other => other,
    }
}

/// Build the record for one file of a source root.
pub fn source_file_record(
    file_types: &FileTypeTable,
    product: ProductKind,
    spec: &SourceRootSpec,
    path: &Path,
    element: NodeId,
    role_overrides: &HashMap<PathBuf, BuildRole>,
) -> SourceFileRecord {
    let file_type = file_types.for_path(path);
    let build_role = resolve_role(file_types, product, spec, path, role_overrides);

    let mut attributes = spec.attributes.clone();
    if let Some(file_type) = file_type {
        attributes.extend(file_type.attributes.iter().cloned());
    }
    if build_role == Some(BuildRole::Headers) {
        let visibility = spec.header_visibility.unwrap_or_default();
        if visibility != HeaderVisibility::Project {
            attributes.push(visibility.setting_name().to_string());
        }
    }

    let compiler_flags = file_type
        .map(|t| t.compiler_flags.as_slice())
        .unwrap_or_default()
        .iter()
        .chain(&spec.compiler_flags)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    let compiler_flags = (build_role == Some(BuildRole::Sources) && !compiler_flags.is_empty())
        .then_some(compiler_flags);

    let asset_tags = if build_role == Some(BuildRole::Resources) {
        spec.resource_tags
            .iter()
            .chain(file_type.map(|t| t.resource_tags.as_slice()).unwrap_or_default())
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    SourceFileRecord {
        path: path.to_path_buf(),
        element,
        build_role,
        settings: FileSettings {
            compiler_flags,
            attributes,
            asset_tags,
        },
    }
}
