//! Source root walking engine for sourcetree.
//!
//! This crate turns declared source roots into a group graph: one group per
//! directory, file references for leaves, and variant groups unifying the
//! per-locale copies of localized resources.
//!
//! # Overview
//!
//! - [`PathMatcher`] expands include/exclude globs (in parallel via rayon)
//!   and filters directory listings
//! - [`GroupCache`] and [`VariantGroupCache`] guarantee one element per
//!   directory and per localized resource
//! - [`TreeBuilder`] walks each source root and produces records with
//!   resolved build roles
//! - the [`assembler`] functions place roots under intermediate and logical
//!   parent groups
//!
//! # Example
//!
//! ```rust,no_run
//! use sourcetree_scan::{ProductKind, ProjectConfig, SourceRootSpec, TargetSources, TreeBuilder};
//!
//! let config = ProjectConfig::builder()
//!     .base_path("/path/to/project")
//!     .create_intermediate_groups(true)
//!     .development_language("en")
//!     .build()
//!     .unwrap();
//!
//! let target = TargetSources::new("App", ProductKind::Application)
//!     .with_source(SourceRootSpec::new("Sources/App"));
//!
//! let output = TreeBuilder::new(&config).build(&[target]).unwrap();
//! println!("Groups: {}", output.tree.stats.total_groups);
//! println!("Files: {}", output.records_for("App").len());
//! ```

pub mod assembler;
mod builder;
mod context;
mod group_cache;
mod matcher;
mod roles;
mod variant_cache;

pub use builder::{GroupSources, LOCALE_DIRECTORY_EXTENSION, TreeBuilder};
pub use context::{BuildContext, MODEL_BUNDLE_EXTENSION, MODEL_VERSION_EXTENSION, is_model_bundle};
pub use group_cache::{CachedGroup, GroupCache, GroupPlacement};
pub use matcher::{DEFAULT_EXCLUDED_EXTENSIONS, DEFAULT_EXCLUDED_FILES, PathMatcher, expand_patterns};
pub use roles::{default_role, resolve_role, source_file_record};
pub use variant_cache::VariantGroupCache;

// Re-export core types for convenience
pub use sourcetree_core::{
    BuildOutput, BuildRole, ElementKind, ElementTree, FileType, FileTypeTable, GenerateError,
    GenerateWarning, NodeId, ProductKind, ProjectConfig, SourceFileRecord, SourceRootSpec,
    SourceType, TargetSources, WarningKind,
};
