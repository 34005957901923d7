//! The file system interface.

use folio_common::{FileVersion, FolioResult};
use folio_future::Future;

/// A versioned, read-only view of a tree of files.
///
/// Missing paths fail with [`Error::NotFound`](folio_common::Error::NotFound).
pub trait FileSystem {
    /// Reads the content of a file.
    fn read(&self, path: &str) -> Future<Vec<u8>>;

    /// Lists the immediate children of a directory.
    ///
    /// Subdirectories are listed with a trailing `/`. Entries are sorted.
    fn read_dir(&self, dir: &str) -> Future<Vec<String>>;

    /// Returns the current version of a file or directory.
    fn stat(&self, path: &str) -> Future<FileVersion>;

    /// A stable name for this file system, used to namespace caches.
    fn identity(&self) -> String;

    /// Lists every file below `dir`, as paths relative to `dir`, sorted.
    fn walk(&self, dir: &str) -> FolioResult<Vec<String>> {
        let root = normalize_dir(dir);
        let mut files = Vec::new();
        let mut pending = vec![String::new()];
        while let Some(relative) = pending.pop() {
            for entry in self.read_dir(&join_path(&root, &relative)).into_result()? {
                let child = format!("{relative}{entry}");
                if entry.ends_with('/') {
                    pending.push(child);
                } else {
                    files.push(child);
                }
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Ensures a non-root directory path ends with `/`.
pub fn normalize_dir(dir: &str) -> String {
    if dir.is_empty() || dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}

/// Joins a directory path and a relative path.
pub fn join_path(dir: &str, relative: &str) -> String {
    format!("{}{relative}", normalize_dir(dir))
}
