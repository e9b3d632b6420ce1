//! Per-file build records.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::node::NodeId;
use crate::spec::BuildRole;

/// Settings attached to a file's build entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    /// Space-joined compiler flags; only kept for `Sources`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_flags: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,

    /// Resource tags; only kept for `Resources`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub asset_tags: Vec<String>,
}

impl FileSettings {
    /// Check if no setting is present.
    pub fn is_empty(&self) -> bool {
        self.compiler_flags.is_none() && self.attributes.is_empty() && self.asset_tags.is_empty()
    }
}

/// A file of a target together with its assigned role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFileRecord {
    /// Full path of the file.
    pub path: PathBuf,

    /// Element the build entry refers to: the file reference, or the
    /// variant group for localized files.
    pub element: NodeId,

    /// Resolved role, `None` when the file takes no part in the build.
    pub build_role: Option<BuildRole>,

    #[serde(default)]
    pub settings: FileSettings,
}

impl SourceFileRecord {
    /// Check if the file ends up in the given role.
    pub fn has_role(&self, role: &BuildRole) -> bool {
        self.build_role.as_ref() == Some(role)
    }
}
