//! A single compiled-artifact tier.

use std::rc::Rc;

use folio_common::{ContentHash, FileVersion, FolioResult};
use folio_fs::{normalize_dir, FileSystem};
use folio_future::Future;
use folio_store::{ObjectStore, ObjectStoreCreator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One tier of compiled artifacts keyed by path.
pub trait CompiledFileSystem {
    /// The compiled form of a file or directory listing.
    type Artifact: Clone + 'static;

    /// Returns the artifact compiled from the file at `path`.
    fn get_from_file(&self, path: &str) -> Future<Self::Artifact>;

    /// Returns the artifact compiled from every file below `dir`.
    fn get_from_file_listing(&self, dir: &str) -> Future<Self::Artifact>;

    /// Returns the version of `path` this tier would serve an artifact for.
    fn file_version(&self, path: &str) -> Future<FileVersion>;

    /// Returns the version of the listing of `dir` this tier would serve.
    fn file_listing_version(&self, dir: &str) -> Future<FileVersion>;

    /// A stable name for this tier.
    fn identity(&self) -> String;
}

/// Turns raw inputs into artifacts.
///
/// Compilation must be a pure function of its inputs: cached artifacts are
/// reused whenever the input version matches.
pub trait Compiler<A> {
    /// Compiles one file.
    fn compile_file(&self, path: &str, content: &[u8]) -> FolioResult<A>;

    /// Compiles a directory listing; `files` are relative to `dir`.
    fn compile_listing(&self, dir: &str, files: &[String]) -> FolioResult<A>;
}

/// A cached artifact and the input version it was compiled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledEntry<A> {
    /// Version of the input when the artifact was built.
    pub version: FileVersion,
    /// The compiled artifact.
    pub artifact: A,
}

/// Compiles from a [`FileSystem`] and caches results in object stores.
///
/// A cached artifact is served only while its recorded version equals the
/// file system's current version for the path; otherwise the input is read
/// and compiled again and the cache entry replaced.
pub struct CachingCompiledFileSystem<A> {
    file_system: Rc<dyn FileSystem>,
    compiler: Rc<dyn Compiler<A>>,
    file_store: Rc<dyn ObjectStore<CompiledEntry<A>>>,
    listing_store: Rc<dyn ObjectStore<CompiledEntry<A>>>,
    identity: String,
}

impl<A> CachingCompiledFileSystem<A>
where
    A: Clone + Serialize + DeserializeOwned + 'static,
{
    /// Creates a tier compiling `file_system` with `compiler`.
    ///
    /// `category` distinguishes different compilers over the same file system;
    /// stores are namespaced by both.
    pub fn new(
        file_system: Rc<dyn FileSystem>,
        compiler: Rc<dyn Compiler<A>>,
        creator: &ObjectStoreCreator,
        category: &str,
    ) -> FolioResult<Self> {
        let fs_identity = file_system.identity();
        let file_category = format!("{fs_identity}/{category}/file");
        let listing_category = format!("{fs_identity}/{category}/listing");
        let file_store = creator.create("CompiledFileSystem", Some(file_category.as_str()))?;
        let listing_store = creator.create("CompiledFileSystem", Some(listing_category.as_str()))?;
        let identity =
            ContentHash::from_parts(["CompiledFileSystem", fs_identity.as_str(), category])
                .to_string();
        Ok(Self {
            file_system,
            compiler,
            file_store,
            listing_store,
            identity,
        })
    }
}

impl<A> CompiledFileSystem for CachingCompiledFileSystem<A>
where
    A: Clone + Serialize + DeserializeOwned + 'static,
{
    type Artifact = A;

    fn get_from_file(&self, path: &str) -> Future<A> {
        let fs = Rc::clone(&self.file_system);
        let compiler = Rc::clone(&self.compiler);
        let store = Rc::clone(&self.file_store);
        let path = path.to_string();
        Future::deferred(move || {
            let version = fs.stat(&path).into_result()?;
            if let Some(entry) = store.get(&path).into_result()? {
                if entry.version == version {
                    debug!(path = %path, "compiled file cache hit");
                    return Ok(entry.artifact);
                }
            }
            let content = fs.read(&path).into_result()?;
            let artifact = compiler.compile_file(&path, &content)?;
            debug!(path = %path, version = %version, "compiled file");
            store.set(
                &path,
                CompiledEntry {
                    version,
                    artifact: artifact.clone(),
                },
            )?;
            Ok(artifact)
        })
    }

    fn get_from_file_listing(&self, dir: &str) -> Future<A> {
        let fs = Rc::clone(&self.file_system);
        let compiler = Rc::clone(&self.compiler);
        let store = Rc::clone(&self.listing_store);
        let dir = normalize_dir(dir);
        Future::deferred(move || {
            let version = fs.stat(&dir).into_result()?;
            if let Some(entry) = store.get(&dir).into_result()? {
                if entry.version == version {
                    debug!(dir = %dir, "compiled listing cache hit");
                    return Ok(entry.artifact);
                }
            }
            let files = fs.walk(&dir)?;
            let artifact = compiler.compile_listing(&dir, &files)?;
            debug!(dir = %dir, files = files.len(), "compiled listing");
            store.set(
                &dir,
                CompiledEntry {
                    version,
                    artifact: artifact.clone(),
                },
            )?;
            Ok(artifact)
        })
    }

    fn file_version(&self, path: &str) -> Future<FileVersion> {
        cached_or_current_version(&self.file_store, &self.file_system, path.to_string())
    }

    fn file_listing_version(&self, dir: &str) -> Future<FileVersion> {
        cached_or_current_version(&self.listing_store, &self.file_system, normalize_dir(dir))
    }

    fn identity(&self) -> String {
        self.identity.clone()
    }
}

/// The version of the cached entry if there is one, else the file system's.
fn cached_or_current_version<A: 'static>(
    store: &Rc<dyn ObjectStore<CompiledEntry<A>>>,
    fs: &Rc<dyn FileSystem>,
    key: String,
) -> Future<FileVersion> {
    let store = Rc::clone(store);
    let fs = Rc::clone(fs);
    Future::deferred(move || match store.get(&key).into_result()? {
        Some(entry) => Ok(entry.version),
        None => fs.stat(&key).into_result(),
    })
}
