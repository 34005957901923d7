//! File system rooted in a directory on disk.

use std::path::{Path, PathBuf};

use folio_common::{ContentHash, Error, FileVersion, FolioResult};
use folio_future::Future;

use crate::file_system::{normalize_dir, FileSystem};

/// A read-only view of a directory on disk.
///
/// A file's version is the XXH3-128 hash of its content, so touching a file
/// without changing it keeps its version. Operations are deferred: nothing is
/// read until the returned future is resolved.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    /// Creates a file system rooted at `root`.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

fn io_error(path: &str, err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        Error::not_found(path)
    } else {
        Error::upstream(format!("reading {path}"), err)
    }
}

fn read_file(root: &Path, path: &str) -> FolioResult<Vec<u8>> {
    std::fs::read(root.join(path)).map_err(|e| io_error(path, e))
}

fn list_dir(root: &Path, dir: &str) -> FolioResult<Vec<String>> {
    let entries = std::fs::read_dir(root.join(dir)).map_err(|e| io_error(dir, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_error(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().map_err(|e| io_error(dir, e))?.is_dir();
        names.push(if is_dir { format!("{name}/") } else { name });
    }
    names.sort();
    Ok(names)
}

fn hash_tree(root: &Path, dir: &str) -> FolioResult<FileVersion> {
    let mut parts = Vec::new();
    let mut pending = vec![dir.to_string()];
    while let Some(current) = pending.pop() {
        for entry in list_dir(root, &current)? {
            let child = format!("{current}{entry}");
            if entry.ends_with('/') {
                pending.push(child);
            } else {
                let hash = ContentHash::from_bytes(&read_file(root, &child)?);
                parts.push((child, hash.to_string()));
            }
        }
    }
    parts.sort();
    Ok(ContentHash::from_parts(parts.iter().flat_map(|(path, hash)| [path.as_str(), hash.as_str()])).into())
}

impl FileSystem for LocalFileSystem {
    fn read(&self, path: &str) -> Future<Vec<u8>> {
        let root = self.root.clone();
        let path = path.to_string();
        Future::deferred(move || read_file(&root, &path))
    }

    fn read_dir(&self, dir: &str) -> Future<Vec<String>> {
        let root = self.root.clone();
        let dir = normalize_dir(dir);
        Future::deferred(move || list_dir(&root, &dir))
    }

    fn stat(&self, path: &str) -> Future<FileVersion> {
        let root = self.root.clone();
        let path = path.to_string();
        Future::deferred(move || {
            if path.is_empty() || path.ends_with('/') {
                hash_tree(&root, &path)
            } else {
                read_file(&root, &path).map(|content| ContentHash::from_bytes(&content).into())
            }
        })
    }

    fn identity(&self) -> String {
        format!("local:{}", self.root.display())
    }
}
