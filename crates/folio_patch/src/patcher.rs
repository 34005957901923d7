//! The patcher interface and the values it exchanges.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use folio_common::FolioResult;
use folio_fs::FileSystem;
use folio_future::Future;
use serde::{Deserialize, Serialize};

/// Identifies one snapshot of a patch, such as a patchset number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatchVersion(String);

impl PatchVersion {
    /// Creates a version from the upstream token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the upstream token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatchVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The paths a patch touches, grouped by kind of change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchedFiles {
    /// Paths the patch creates.
    pub added: BTreeSet<String>,
    /// Paths the patch removes.
    pub deleted: BTreeSet<String>,
    /// Paths the patch edits.
    pub modified: BTreeSet<String>,
}

impl PatchedFiles {
    /// Paths with content in the patched tree: added and modified.
    pub fn changed(&self) -> Vec<String> {
        self.added.union(&self.modified).cloned().collect()
    }
}

/// Patched file contents keyed by path.
pub type PatchContents = BTreeMap<String, Vec<u8>>;

/// Fetches patches from a code-review service.
pub trait Patcher {
    /// Returns the latest version of the patch.
    fn version(&self) -> FolioResult<PatchVersion>;

    /// Returns the paths touched by `version`, or by the latest version.
    fn patched_files(&self, version: Option<&PatchVersion>) -> FolioResult<PatchedFiles>;

    /// Produces the patched content of `paths`.
    ///
    /// `backing` supplies unpatched content where the patch applies on top of
    /// an existing file.
    fn apply(
        &self,
        paths: &[String],
        backing: Option<Rc<dyn FileSystem>>,
        version: Option<&PatchVersion>,
    ) -> Future<PatchContents>;

    /// A stable name for the patch, such as its review issue.
    fn identity(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changed_merges_added_and_modified() {
        let files = PatchedFiles {
            added: ["docs/new.md".to_string()].into(),
            deleted: ["docs/old.md".to_string()].into(),
            modified: ["docs/index.md".to_string(), "docs/new.md".to_string()].into(),
        };
        assert_eq!(files.changed(), vec!["docs/index.md", "docs/new.md"]);
    }

    #[test]
    fn version_display() {
        assert_eq!(PatchVersion::new("ps3").to_string(), "ps3");
        assert_eq!(PatchVersion::new("ps3").as_str(), "ps3");
    }
}
