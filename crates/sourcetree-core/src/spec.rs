//! Declared source roots and build roles.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ConfigError;

/// How a source root is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// A single file reference.
    File,
    /// One opaque reference for a whole directory.
    Folder,
    /// A recursive walk producing groups.
    Group,
}

/// Visibility of a header assigned the `Headers` role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HeaderVisibility {
    #[default]
    Public,
    Private,
    Project,
}

impl HeaderVisibility {
    /// Attribute written into a header's settings.
    pub fn setting_name(&self) -> &'static str {
        match self {
            HeaderVisibility::Public => "Public",
            HeaderVisibility::Private => "Private",
            HeaderVisibility::Project => "Project",
        }
    }
}

/// Where a copy-files role places its files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CopyDestination {
    ProductsDirectory,
    Wrapper,
    Executables,
    Resources,
    Frameworks,
    SharedSupport,
    Plugins,
}

/// Build role assigned to a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildRole {
    Sources,
    Headers,
    Resources,
    Frameworks,
    CopyFiles {
        destination: CopyDestination,
        subpath: String,
    },
    /// Explicitly no role; only meaningful as an override.
    None,
}

impl BuildRole {
    /// Copy role used for public headers and module maps of static libraries.
    pub fn static_library_include() -> Self {
        BuildRole::CopyFiles {
            destination: CopyDestination::ProductsDirectory,
            subpath: "include/$(PRODUCT_NAME)".to_string(),
        }
    }
}

/// Kind of product a target builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductKind {
    /// No product; used for plain file groups.
    #[default]
    None,
    Application,
    Framework,
    StaticLibrary,
    DynamicLibrary,
    Bundle,
    UnitTestBundle,
}

/// A declared source root.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate", error = "ConfigError"))]
pub struct SourceRootSpec {
    /// Path relative to the project base, or absolute.
    pub path: PathBuf,

    /// Display name override for the root element.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub name: Option<String>,

    /// Logical group path, `/`-separated, under which the root is placed.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub group: Option<String>,

    /// Walk mode; inferred from the filesystem when absent.
    #[builder(default, setter(into, strip_option))]
    #[serde(default, rename = "type")]
    pub source_type: Option<SourceType>,

    /// A missing optional root yields nothing instead of an error.
    #[builder(default = "false")]
    #[serde(default)]
    pub optional: bool,

    /// Overrides the project-wide intermediate group setting.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub create_intermediate_groups: Option<bool>,

    /// Role forced onto every file of this root.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub build_role: Option<BuildRole>,

    /// Glob patterns, relative to `path`, selecting what to keep.
    #[builder(default)]
    #[serde(default)]
    pub includes: Vec<String>,

    /// Glob patterns, relative to `path`, selecting what to drop.
    #[builder(default)]
    #[serde(default)]
    pub excludes: Vec<String>,

    #[builder(default)]
    #[serde(default)]
    pub compiler_flags: Vec<String>,

    #[builder(default)]
    #[serde(default)]
    pub attributes: Vec<String>,

    #[builder(default)]
    #[serde(default)]
    pub resource_tags: Vec<String>,

    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub header_visibility: Option<HeaderVisibility>,
}

impl SourceRootSpecBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.path {
            Some(ref path) if path.as_os_str().is_empty() => {
                Err("Source path cannot be empty".to_string())
            }
            Some(_) => Ok(()),
            None => Err("Source path is required".to_string()),
        }
    }
}

impl SourceRootSpec {
    /// Create a new source root builder.
    pub fn builder() -> SourceRootSpecBuilder {
        SourceRootSpecBuilder::default()
    }

    /// Create a plain source root for a path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: None,
            group: None,
            source_type: None,
            optional: false,
            create_intermediate_groups: None,
            build_role: None,
            includes: Vec::new(),
            excludes: Vec::new(),
            compiler_flags: Vec::new(),
            attributes: Vec::new(),
            resource_tags: Vec::new(),
            header_visibility: None,
        }
    }

    /// Walk mode for `path`: the declared type, else `File` for anything that
    /// is a file or has an extension, else `Group`.
    pub fn resolved_type(&self, path: &Path) -> SourceType {
        self.source_type.unwrap_or_else(|| {
            if path.is_file() || path.extension().is_some() {
                SourceType::File
            } else {
                SourceType::Group
            }
        })
    }

    /// Segments of the logical group path, empty segments dropped.
    pub fn group_segments(&self) -> Vec<String> {
        self.group
            .as_deref()
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Ordered source roots of one target.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetSources {
    pub name: String,

    #[serde(default)]
    pub product: ProductKind,

    #[serde(default)]
    pub sources: Vec<SourceRootSpec>,

    /// Roles for specific files, keyed by full path, applied when the source
    /// root does not force one.
    #[serde(default)]
    pub role_overrides: HashMap<PathBuf, BuildRole>,
}

impl TargetSources {
    /// Create a target with no sources.
    pub fn new(name: impl Into<String>, product: ProductKind) -> Self {
        Self {
            name: name.into(),
            product,
            sources: Vec::new(),
            role_overrides: HashMap::new(),
        }
    }

    /// Append a source root.
    pub fn with_source(mut self, source: SourceRootSpec) -> Self {
        self.sources.push(source);
        self
    }
}
