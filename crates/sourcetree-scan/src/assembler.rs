//! Placement of source roots under ancestor and logical groups.

use std::path::{Path, PathBuf};

use compact_str::CompactString;

use sourcetree_core::path::{is_strict_ancestor, last_component, normalize, relative_path};
use sourcetree_core::{GenerateError, NodeId};

use crate::context::BuildContext;
use crate::group_cache::GroupPlacement;

/// Create groups for the directories between `path` and the project base,
/// attaching `node` to the nearest one.
///
/// Climbing stops at the base, at the first group that already exists, or
/// before a directory containing the base. In the last case `node` has no
/// parent inside the project and becomes a root.
pub fn create_intermediate_groups(ctx: &mut BuildContext, node: NodeId, path: &Path) {
    let mut node = node;
    let mut path = normalize(path);

    while let Some(parent) = path.parent().map(Path::to_path_buf) {
        if parent == ctx.base() {
            return;
        }
        if let Some(existing) = ctx.groups.get(&parent) {
            ctx.graph.merge_children(existing, &[node]);
            return;
        }
        if is_strict_ancestor(&parent, ctx.base()) {
            break;
        }

        let placement = GroupPlacement {
            create_intermediate_groups: true,
            ..GroupPlacement::nested()
        };
        node = ctx.group(&parent, &[node], placement);
        tracing::trace!(target: "sourcetree::groups", path = %parent.display(), "created intermediate group");
        path = parent;
    }

    ctx.add_root(node);
}

/// Place `node` under the logical group path `segments`, creating one group
/// per segment from the deepest upwards.
///
/// Segments that do not exist on disk become name-only groups.
pub fn create_parent_groups(ctx: &mut BuildContext, segments: &[String], node: NodeId) {
    let Some((name, rest)) = segments.split_last() else {
        return;
    };

    let parent_path = normalize(&ctx.base().join(segments.join("/")));
    let exists = parent_path.exists();
    let already_cached = ctx.groups.contains(&parent_path);

    let placement = GroupPlacement {
        is_base_group: rest.is_empty(),
        ..GroupPlacement::nested()
    };
    let parent = ctx.group(&parent_path, &[node], placement);

    if !exists {
        let group = &mut ctx.graph[parent];
        group.name = Some(CompactString::from(name.as_str()));
        group.path = None;
    }

    if !already_cached {
        create_parent_groups(ctx, rest, parent);
    }
}

/// Rewrite the stored path of `node` relative to the location implied by
/// its ancestors, so that resolving the chain yields `actual_path` again.
pub fn make_path_relative(ctx: &mut BuildContext, node: NodeId, actual_path: &Path) -> Result<(), GenerateError> {
    let mut parts: Vec<String> = ctx
        .graph
        .ancestors(node)
        .filter_map(|ancestor| ancestor.path.as_deref().map(str::to_string))
        .collect();
    parts.reverse();

    let mut location = ctx.base().to_path_buf();
    location.extend(&parts);
    let location = normalize(&location);

    let relative = relative_path(actual_path, &location).ok_or_else(|| GenerateError::RelativePath {
        path: actual_path.to_path_buf(),
        base: location.clone(),
    })?;
    let relative = relative.to_string_lossy().into_owned();

    let element = &mut ctx.graph[node];
    if element.path.as_deref() != Some(relative.as_str()) {
        element.name = Some(CompactString::from(last_component(&PathBuf::from(&relative))));
        element.path = Some(CompactString::from(relative));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sourcetree_core::{ElementKind, ProjectConfig};

    fn context(base: &str) -> BuildContext {
        BuildContext::new(&ProjectConfig::new(base))
    }

    #[test]
    fn test_intermediate_groups_stop_at_base() {
        let mut ctx = context("/p");
        let leaf = ctx.group(Path::new("/p/a/b/c"), &[], GroupPlacement::base(true));

        create_intermediate_groups(&mut ctx, leaf, Path::new("/p/a/b/c"));

        let a = ctx.groups.get(Path::new("/p/a")).unwrap();
        let b = ctx.groups.get(Path::new("/p/a/b")).unwrap();
        assert_eq!(ctx.graph[a].children, vec![b]);
        assert_eq!(ctx.graph[b].children, vec![leaf]);
        assert_eq!(ctx.roots().collect::<Vec<_>>(), vec![a]);
        assert!(!ctx.groups.contains(Path::new("/p")));
    }

    #[test]
    fn test_intermediate_groups_merge_into_existing() {
        let mut ctx = context("/p");
        let first = ctx.group(Path::new("/p/a/one"), &[], GroupPlacement::base(true));
        create_intermediate_groups(&mut ctx, first, Path::new("/p/a/one"));
        let second = ctx.group(Path::new("/p/a/two"), &[], GroupPlacement::base(true));
        create_intermediate_groups(&mut ctx, second, Path::new("/p/a/two"));

        let a = ctx.groups.get(Path::new("/p/a")).unwrap();
        assert_eq!(ctx.graph[a].children, vec![first, second]);
        assert_eq!(ctx.groups.len(), 3);
    }

    #[test]
    fn test_intermediate_groups_never_above_base() {
        let mut ctx = context("/work/p");
        let outside = ctx.group(Path::new("/work/shared"), &[], GroupPlacement::base(true));

        create_intermediate_groups(&mut ctx, outside, Path::new("/work/shared"));

        assert!(!ctx.groups.contains(Path::new("/work")));
        assert!(ctx.is_root(outside));
    }

    #[test]
    fn test_parent_groups_are_name_only() {
        let mut ctx = context("/nonexistent-base");
        let file = ctx.file_reference(
            Path::new("/nonexistent-base/Sources/main.x"),
            Path::new("/nonexistent-base/Sources"),
            None,
        );

        create_parent_groups(&mut ctx, &["Logical".to_string(), "Inner".to_string()], file);

        let inner = ctx.graph[file].parent.unwrap();
        let logical = ctx.graph[inner].parent.unwrap();
        assert_eq!(ctx.graph[inner].name.as_deref(), Some("Inner"));
        assert_eq!(ctx.graph[inner].path, None);
        assert_eq!(ctx.graph[logical].display_name(), "Logical");
        assert_eq!(ctx.graph[logical].kind, ElementKind::Group);
        assert_eq!(ctx.roots().collect::<Vec<_>>(), vec![logical]);
    }

    #[test]
    fn test_make_path_relative_under_synthetic_parent() {
        let mut ctx = context("/nonexistent-base");
        let file = ctx.file_reference(
            Path::new("/nonexistent-base/Sources/main.x"),
            Path::new("/nonexistent-base/Sources"),
            None,
        );
        create_parent_groups(&mut ctx, &["Logical".to_string()], file);

        make_path_relative(&mut ctx, file, Path::new("/nonexistent-base/Sources/main.x")).unwrap();

        assert_eq!(ctx.graph[file].path.as_deref(), Some("Sources/main.x"));
        assert_eq!(ctx.graph[file].name.as_deref(), Some("main.x"));
        assert_eq!(
            ctx.graph.resolved_path(file),
            "Sources/main.x"
        );
    }
}
