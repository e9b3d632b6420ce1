//! sourcetree - deterministic group graphs for declared source roots.
//!
//! Re-exports the data model from `sourcetree-core` and the walking engine
//! from `sourcetree-scan`.
//!
//! ```rust,no_run
//! use sourcetree::{ProductKind, ProjectConfig, SourceRootSpec, TargetSources, TreeBuilder};
//!
//! let config = ProjectConfig::new("/path/to/project");
//! let target = TargetSources::new("App", ProductKind::Application)
//!     .with_source(SourceRootSpec::new("Sources"));
//!
//! let output = TreeBuilder::new(&config).build(&[target]).unwrap();
//! for region in &output.tree.known_regions {
//!     println!("{region}");
//! }
//! ```

pub use sourcetree_core::*;
pub use sourcetree_scan::{
    BuildContext, CachedGroup, GroupCache, GroupPlacement, GroupSources, LOCALE_DIRECTORY_EXTENSION,
    MODEL_BUNDLE_EXTENSION, MODEL_VERSION_EXTENSION, PathMatcher, TreeBuilder, VariantGroupCache,
    assembler, default_role, expand_patterns, is_model_bundle, resolve_role, source_file_record,
};
