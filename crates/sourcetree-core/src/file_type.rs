//! Extension classification table.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::spec::BuildRole;

/// Classification for one file extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileType {
    /// `true` for leaves, `false` for container-like directories that are
    /// walked as groups.
    #[serde(default = "default_true")]
    pub file: bool,

    /// Default build role for files of this type.
    #[serde(default)]
    pub build_role: Option<BuildRole>,

    #[serde(default)]
    pub attributes: Vec<String>,

    #[serde(default)]
    pub compiler_flags: Vec<String>,

    #[serde(default)]
    pub resource_tags: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for FileType {
    fn default() -> Self {
        Self {
            file: true,
            build_role: None,
            attributes: Vec::new(),
            compiler_flags: Vec::new(),
            resource_tags: Vec::new(),
        }
    }
}

impl FileType {
    /// A leaf type with a default role.
    pub fn with_role(build_role: BuildRole) -> Self {
        Self {
            build_role: Some(build_role),
            ..Self::default()
        }
    }

    /// A container type, walked like a directory.
    pub fn container() -> Self {
        Self {
            file: false,
            ..Self::default()
        }
    }
}

/// Validated mapping from extension (without the dot) to [`FileType`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, FileType>", into = "IndexMap<String, FileType>")]
pub struct FileTypeTable {
    types: IndexMap<String, FileType>,
}

impl FileTypeTable {
    /// Build a table, rejecting empty, dotted or duplicate extensions.
    pub fn new<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, FileType)>,
        S: Into<String>,
    {
        let mut types = IndexMap::new();
        for (extension, file_type) in entries {
            let extension = extension.into();
            if extension.is_empty() || extension.starts_with('.') {
                return Err(ConfigError::InvalidExtension { extension });
            }
            if types.contains_key(&extension) {
                return Err(ConfigError::DuplicateExtension { extension });
            }
            types.insert(extension, file_type);
        }
        Ok(Self { types })
    }

    /// Look up an extension.
    pub fn get(&self, extension: &str) -> Option<&FileType> {
        self.types.get(extension)
    }

    /// Look up the classification of a path by its extension.
    pub fn for_path(&self, path: &Path) -> Option<&FileType> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| self.get(e))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TryFrom<IndexMap<String, FileType>> for FileTypeTable {
    type Error = ConfigError;

    fn try_from(types: IndexMap<String, FileType>) -> Result<Self, Self::Error> {
        Self::new(types)
    }
}

impl From<FileTypeTable> for IndexMap<String, FileType> {
    fn from(table: FileTypeTable) -> Self {
        table.types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_path() {
        let table = FileTypeTable::new([
            ("x", FileType::with_role(BuildRole::Sources)),
            ("bundle", FileType::default()),
            ("xcassets", FileType::container()),
        ])
        .unwrap();

        let x = table.for_path(Path::new("/p/main.x")).unwrap();
        assert_eq!(x.build_role, Some(BuildRole::Sources));
        assert!(table.for_path(Path::new("/p/Assets.xcassets")).is_some_and(|t| !t.file));
        assert!(table.for_path(Path::new("/p/Makefile")).is_none());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_rejects_bad_extensions() {
        assert_eq!(
            FileTypeTable::new([(".x", FileType::default())]),
            Err(ConfigError::InvalidExtension {
                extension: ".x".to_string()
            })
        );
        assert!(matches!(
            FileTypeTable::new([("x", FileType::default()), ("x", FileType::container())]),
            Err(ConfigError::DuplicateExtension { .. })
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        let table: FileTypeTable =
            serde_json::from_str(r#"{"x": {"build_role": "sources"}, "y": {"file": false}}"#)
                .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("x").unwrap().build_role, Some(BuildRole::Sources));
        assert!(table.get("x").unwrap().file);
        assert!(!table.get("y").unwrap().file);

        let err = serde_json::from_str::<FileTypeTable>(r#"{"": {}}"#);
        assert!(err.is_err());
    }
}
