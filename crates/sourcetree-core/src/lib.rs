//! Core types and traits for sourcetree.
//!
//! This crate provides the data model shared by the sourcetree crates:
//! the element arena, declared source roots, the extension classification
//! table, per-file records and project configuration.

mod config;
mod error;
mod file_type;
mod graph;
mod node;
pub mod path;
mod record;
mod spec;
mod tree;

pub use config::{BASE_LOCALE, DEFAULT_LOCAL_PACKAGES_GROUP, ProjectConfig, ProjectConfigBuilder};
pub use error::{ConfigError, GenerateError, GenerateWarning, WarningKind};
pub use file_type::{FileType, FileTypeTable};
pub use graph::ElementGraph;
pub use node::{Element, ElementKind, NodeId, SourceTree};
pub use path::PathKey;
pub use record::{FileSettings, SourceFileRecord};
pub use spec::{
    BuildRole, CopyDestination, HeaderVisibility, ProductKind, SourceRootSpec,
    SourceRootSpecBuilder, SourceType, TargetSources,
};
pub use tree::{BuildOutput, ElementTree, TreeStats};
