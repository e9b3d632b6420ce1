//! Project-wide generation settings.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::file_type::FileTypeTable;
use crate::path::normalize;

/// Name of the group holding local packages when none is configured.
pub const DEFAULT_LOCAL_PACKAGES_GROUP: &str = "Packages";

/// Locale whose files always name their variant group.
pub const BASE_LOCALE: &str = "Base";

/// Configuration shared by every source root of a generation run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate", error = "ConfigError"))]
pub struct ProjectConfig {
    /// Directory source paths are resolved against.
    pub base_path: PathBuf,

    /// Directory top-level paths are made relative to; defaults to `base_path`.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub project_directory: Option<PathBuf>,

    /// Keep directories that end up with no included children.
    #[builder(default = "false")]
    #[serde(default)]
    pub generate_empty_directories: bool,

    /// Create groups for the directories between a source root and the base.
    #[builder(default = "false")]
    #[serde(default)]
    pub create_intermediate_groups: bool,

    /// Locale identifier of the development language, e.g. `en`.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub development_language: Option<String>,

    /// Name of the group local packages are collected in.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub local_packages_group: Option<String>,

    /// Extension classification.
    #[builder(default)]
    #[serde(default)]
    pub file_types: FileTypeTable,
}

impl From<derive_builder::UninitializedFieldError> for ConfigError {
    fn from(err: derive_builder::UninitializedFieldError) -> Self {
        ConfigError::invalid(err.to_string())
    }
}

impl From<String> for ConfigError {
    fn from(message: String) -> Self {
        ConfigError::invalid(message)
    }
}

impl ProjectConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.base_path {
            Some(ref base) if base.as_os_str().is_empty() => {
                return Err("Base path cannot be empty".to_string());
            }
            Some(_) => {}
            None => return Err("Base path is required".to_string()),
        }
        if let Some(Some(ref language)) = self.development_language {
            if language.trim().is_empty() {
                return Err("Development language cannot be blank".to_string());
            }
        }
        if let Some(Some(ref group)) = self.local_packages_group {
            if group.trim().is_empty() {
                return Err("Local packages group cannot be blank".to_string());
            }
        }
        Ok(())
    }
}

impl ProjectConfig {
    /// Create a new project config builder.
    pub fn builder() -> ProjectConfigBuilder {
        ProjectConfigBuilder::default()
    }

    /// Create a config with default options for a base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            project_directory: None,
            generate_empty_directories: false,
            create_intermediate_groups: false,
            development_language: None,
            local_packages_group: None,
            file_types: FileTypeTable::default(),
        }
    }

    /// Normalized base path.
    pub fn base(&self) -> PathBuf {
        normalize(&self.base_path)
    }

    /// Normalized directory that top-level paths are relative to.
    pub fn project_root(&self) -> PathBuf {
        normalize(self.project_directory.as_ref().unwrap_or(&self.base_path))
    }

    /// Name for the local packages group.
    pub fn local_packages_group_name(&self) -> &str {
        self.local_packages_group
            .as_deref()
            .unwrap_or(DEFAULT_LOCAL_PACKAGES_GROUP)
    }

    /// Whether files of `locale` name their variant group.
    pub fn is_reference_locale(&self, locale: &str) -> bool {
        locale == BASE_LOCALE || self.development_language.as_deref() == Some(locale)
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_config_builder() {
        let config = ProjectConfig::builder()
            .base_path("/work/app")
            .create_intermediate_groups(true)
            .development_language("en")
            .build()
            .unwrap();

        assert_eq!(config.base_path, PathBuf::from("/work/app"));
        assert!(config.create_intermediate_groups);
        assert!(!config.generate_empty_directories);
        assert_eq!(config.project_root(), PathBuf::from("/work/app"));
        assert_eq!(config.local_packages_group_name(), "Packages");
    }

    #[test]
    fn test_config_builder_validation() {
        assert!(ProjectConfig::builder().build().is_err());
        assert!(ProjectConfig::builder().base_path("").build().is_err());
        assert!(
            ProjectConfig::builder()
                .base_path("/work")
                .development_language(" ")
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_project_directory_overrides_root() {
        let config = ProjectConfig::builder()
            .base_path("/work/app/./spec")
            .project_directory("/work/app")
            .build()
            .unwrap();

        assert_eq!(config.base(), Path::new("/work/app/spec"));
        assert_eq!(config.project_root(), Path::new("/work/app"));
    }

    #[test]
    fn test_reference_locales() {
        let mut config = ProjectConfig::new("/work");
        assert!(config.is_reference_locale("Base"));
        assert!(!config.is_reference_locale("en"));

        config.development_language = Some("en".to_string());
        assert!(config.is_reference_locale("en"));
        assert!(!config.is_reference_locale("de"));
    }
}
