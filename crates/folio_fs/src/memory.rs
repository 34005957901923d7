//! In-memory file system with content-hash versions.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use folio_common::{ContentHash, Error, FileVersion, FolioResult};
use folio_future::Future;

use crate::file_system::{normalize_dir, FileSystem};

/// A mutable tree of files held in memory.
///
/// A file's version is the hash of its content. A directory's version is a
/// hash over every file path and content hash below it, so it changes
/// whenever anything beneath it does. Clones share the same files.
#[derive(Clone)]
pub struct MemoryFileSystem {
    name: String,
    files: Rc<RefCell<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryFileSystem {
    /// Creates an empty file system named `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            files: Rc::new(RefCell::new(BTreeMap::new())),
        }
    }

    /// Creates a file system holding `files`.
    pub fn with_files<I, P, C>(name: &str, files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<Vec<u8>>,
    {
        let fs = Self::new(name);
        for (path, content) in files {
            fs.write(path, content);
        }
        fs
    }

    /// Creates or replaces a file.
    pub fn write(&self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.borrow_mut().insert(path.into(), content.into());
    }

    /// Removes a file. Returns `true` if it existed.
    pub fn remove(&self, path: &str) -> bool {
        self.files.borrow_mut().remove(path).is_some()
    }

    fn dir_version(&self, dir: &str) -> FolioResult<FileVersion> {
        let files = self.files.borrow();
        let below: Vec<(&String, &Vec<u8>)> = files
            .iter()
            .filter(|(path, _)| path.starts_with(dir))
            .collect();
        if below.is_empty() && !dir.is_empty() {
            return Err(Error::not_found(dir));
        }
        let parts = below.iter().flat_map(|(path, content)| {
            [
                path.as_bytes().to_vec(),
                ContentHash::from_bytes(content).to_string().into_bytes(),
            ]
        });
        Ok(ContentHash::from_parts(parts).into())
    }
}

impl FileSystem for MemoryFileSystem {
    fn read(&self, path: &str) -> Future<Vec<u8>> {
        Future::from_result(
            self.files
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| Error::not_found(path)),
        )
    }

    fn read_dir(&self, dir: &str) -> Future<Vec<String>> {
        let dir = normalize_dir(dir);
        let files = self.files.borrow();
        let mut entries = BTreeSet::new();
        for path in files.keys() {
            if let Some(rest) = path.strip_prefix(dir.as_str()) {
                match rest.find('/') {
                    Some(idx) => entries.insert(rest[..=idx].to_string()),
                    None => entries.insert(rest.to_string()),
                };
            }
        }
        if entries.is_empty() && !dir.is_empty() {
            return Future::error(Error::not_found(dir));
        }
        Future::value(entries.into_iter().collect())
    }

    fn stat(&self, path: &str) -> Future<FileVersion> {
        if path.is_empty() || path.ends_with('/') {
            return Future::from_result(self.dir_version(path));
        }
        Future::from_result(
            self.files
                .borrow()
                .get(path)
                .map(|content| ContentHash::from_bytes(content).into())
                .ok_or_else(|| Error::not_found(path)),
        )
    }

    fn identity(&self) -> String {
        format!("memory:{}", self.name)
    }
}
