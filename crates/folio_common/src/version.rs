//! Opaque per-path version tokens.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hash::ContentHash;

/// The freshness of a path's content within one file system or cache tier.
///
/// Versions carry no ordering: two versions are either equal or they are not.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileVersion(String);

impl FileVersion {
    /// Creates a version from any opaque token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the underlying token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<ContentHash> for FileVersion {
    fn from(hash: ContentHash) -> Self {
        Self(hash.to_string())
    }
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileVersion({})", self.0)
    }
}
