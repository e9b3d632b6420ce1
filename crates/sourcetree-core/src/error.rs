//! Error types for group generation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A node path could not be expressed relative to its parent chain.
    #[error("Cannot express {path} relative to {base}")]
    RelativePath { path: PathBuf, base: PathBuf },

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GenerateError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether this error means the path is missing on disk.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised while building configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A configuration field failed validation.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    /// A file type extension is empty or carries a leading dot.
    #[error("Invalid file type extension: {extension:?}")]
    InvalidExtension { extension: String },

    /// The same extension was registered twice.
    #[error("Duplicate file type extension: {extension}")]
    DuplicateExtension { extension: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Kind of generation warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// An include or exclude pattern could not be compiled.
    InvalidPattern,
    /// A directory could not be read while expanding a pattern.
    ReadError,
    /// A localized file matched no variant group.
    UnresolvedVariant,
}

/// Non-fatal condition encountered during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl GenerateWarning {
    /// Create a new warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create an invalid pattern warning for a pattern under `root`.
    pub fn invalid_pattern(root: impl Into<PathBuf>, pattern: &str, error: impl std::fmt::Display) -> Self {
        Self {
            path: root.into(),
            message: format!("Invalid pattern '{pattern}': {error}"),
            kind: WarningKind::InvalidPattern,
        }
    }

    /// Create a read error warning.
    pub fn read_error(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        Self {
            path: path.into(),
            message: format!("Read error: {error}"),
            kind: WarningKind::ReadError,
        }
    }

    /// Create a warning for a localized file kept outside any variant group.
    pub fn unresolved_variant(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("No variant group for localized file: {}", path.display()),
            path,
            kind: WarningKind::UnresolvedVariant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_error_io() {
        let err = GenerateError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.is_not_found());

        let err = GenerateError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, GenerateError::PermissionDenied { .. }));
    }

    #[test]
    fn test_config_error_converts() {
        let err: GenerateError = ConfigError::invalid("bad").into();
        assert_eq!(err.to_string(), "Invalid configuration: bad");
    }

    #[test]
    fn test_warning_creation() {
        let warning = GenerateWarning::invalid_pattern("/src", "[", "unclosed class");
        assert_eq!(warning.kind, WarningKind::InvalidPattern);
        assert!(warning.message.contains("'['"));

        let warning = GenerateWarning::unresolved_variant("/src/de.lproj/Extra.strings");
        assert_eq!(warning.kind, WarningKind::UnresolvedVariant);
    }
}
