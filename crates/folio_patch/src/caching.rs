//! A patcher that caches upstream responses in object stores.

use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use folio_common::{Error, FolioResult};
use folio_config::PatcherConfig;
use folio_fs::FileSystem;
use folio_future::Future;
use folio_store::{ObjectStore, ObjectStoreCreator};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::patcher::{PatchContents, PatchVersion, PatchedFiles, Patcher};

const VERSION_KEY: &str = "version";

/// A fetched patch version and when it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// The version upstream reported.
    pub version: PatchVersion,
    /// When upstream reported it.
    pub fetched_at: DateTime<Utc>,
}

/// Wraps a [`Patcher`], caching its answers.
///
/// - The latest version is trusted for a configurable window after it was
///   fetched, then fetched again.
/// - File lists are cached per version, forever: a version never changes.
/// - File contents are cached per path and version. A miss fetches every
///   changed file of the version in one upstream call and caches them all.
///
/// Identity is the upstream patcher's, so callers cannot tell the two apart.
pub struct CachingPatcher<P> {
    patcher: Rc<P>,
    version_store: Rc<dyn ObjectStore<VersionEntry>>,
    list_store: Rc<dyn ObjectStore<PatchedFiles>>,
    file_store: Rc<dyn ObjectStore<Vec<u8>>>,
    clock: Box<dyn Clock>,
    trust_window: Duration,
}

impl<P: Patcher + 'static> CachingPatcher<P> {
    /// Wraps `patcher` using the system clock.
    pub fn new(
        patcher: Rc<P>,
        creator: &ObjectStoreCreator,
        config: &PatcherConfig,
    ) -> FolioResult<Self> {
        Self::with_clock(patcher, creator, config, Box::new(SystemClock))
    }

    /// Wraps `patcher`, reading the time from `clock`.
    pub fn with_clock(
        patcher: Rc<P>,
        creator: &ObjectStoreCreator,
        config: &PatcherConfig,
        clock: Box<dyn Clock>,
    ) -> FolioResult<Self> {
        let identity = patcher.identity();
        let version_category = format!("{identity}/version");
        let list_category = format!("{identity}/list");
        let file_category = format!("{identity}/file");
        let window_ms = i64::try_from(config.version_trust_window_ms).unwrap_or(i64::MAX);
        Ok(Self {
            version_store: creator.create("CachingPatcher", Some(version_category.as_str()))?,
            list_store: creator.create("CachingPatcher", Some(list_category.as_str()))?,
            file_store: creator.create("CachingPatcher", Some(file_category.as_str()))?,
            patcher,
            clock,
            trust_window: Duration::milliseconds(window_ms),
        })
    }

    fn resolve_version(&self, version: Option<&PatchVersion>) -> FolioResult<PatchVersion> {
        match version {
            Some(version) => Ok(version.clone()),
            None => self.version(),
        }
    }

    fn start_apply(
        &self,
        paths: &[String],
        backing: Option<Rc<dyn FileSystem>>,
        version: Option<&PatchVersion>,
    ) -> FolioResult<Future<PatchContents>> {
        let version = self.resolve_version(version)?;
        let patched = self.patched_files(Some(&version))?;

        let keys: Vec<String> = paths.iter().map(|path| file_key(path, &version)).collect();
        let stored = self.file_store.get_multi(&keys).into_result()?;
        let mut cached = PatchContents::new();
        let mut missing = Vec::new();
        for (path, key) in paths.iter().zip(&keys) {
            match stored.get(key) {
                Some(content) => {
                    cached.insert(path.clone(), content.clone());
                }
                None => missing.push(path.clone()),
            }
        }
        if missing.is_empty() {
            debug!(version = %version, paths = paths.len(), "patched files served from cache");
            return Ok(Future::value(cached));
        }

        debug!(
            version = %version,
            cached = cached.len(),
            missing = missing.len(),
            "fetching patched files"
        );
        let patcher = Rc::clone(&self.patcher);
        let file_store = Rc::clone(&self.file_store);
        Ok(Future::deferred(move || {
            let fetched = patcher
                .apply(&patched.changed(), backing, Some(&version))
                .into_result()?;
            let entries: HashMap<String, Vec<u8>> = fetched
                .iter()
                .map(|(path, content)| (file_key(path, &version), content.clone()))
                .collect();
            file_store.set_multi(entries)?;

            let mut contents = cached;
            for path in missing {
                let content = fetched.get(&path).cloned().ok_or_else(|| {
                    Error::not_found(format!("{path} was not found in the patch"))
                })?;
                contents.insert(path, content);
            }
            Ok(contents)
        }))
    }
}

impl<P: Patcher + 'static> Patcher for CachingPatcher<P> {
    fn version(&self) -> FolioResult<PatchVersion> {
        let now = self.clock.now();
        if let Some(entry) = self.version_store.get(VERSION_KEY).into_result()? {
            if now - entry.fetched_at < self.trust_window {
                return Ok(entry.version);
            }
        }
        let version = self.patcher.version()?;
        debug!(version = %version, "fetched patch version");
        self.version_store.set(
            VERSION_KEY,
            VersionEntry {
                version: version.clone(),
                fetched_at: self.clock.now(),
            },
        )?;
        Ok(version)
    }

    fn patched_files(&self, version: Option<&PatchVersion>) -> FolioResult<PatchedFiles> {
        let version = self.resolve_version(version)?;
        if let Some(files) = self.list_store.get(version.as_str()).into_result()? {
            return Ok(files);
        }
        let files = self.patcher.patched_files(Some(&version))?;
        self.list_store.set(version.as_str(), files.clone())?;
        Ok(files)
    }

    fn apply(
        &self,
        paths: &[String],
        backing: Option<Rc<dyn FileSystem>>,
        version: Option<&PatchVersion>,
    ) -> Future<PatchContents> {
        self.start_apply(paths, backing, version)
            .unwrap_or_else(Future::error)
    }

    fn identity(&self) -> String {
        self.patcher.identity()
    }
}

fn file_key(path: &str, version: &PatchVersion) -> String {
    format!("{path}@{version}")
}
