//! Builds namespaced object stores from configuration.

use std::rc::Rc;

use folio_common::{ContentHash, FolioResult};
use folio_config::{CacheConfig, StoreBackend};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::StoreError;
use crate::file::FileObjectStore;
use crate::memory::MemoryObjectStore;
use crate::store::ObjectStore;

/// Hands out object stores, one namespace per caller and category.
///
/// The namespace folds in the application version so a new release never
/// reads entries written by an older one.
#[derive(Debug, Clone)]
pub struct ObjectStoreCreator {
    config: CacheConfig,
}

impl ObjectStoreCreator {
    /// Creates a creator for the given cache configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    /// A creator handing out fresh in-memory stores.
    pub fn in_memory(app_version: &str) -> Self {
        Self::new(CacheConfig {
            backend: StoreBackend::Memory,
            dir: None,
            app_version: app_version.to_string(),
            start_empty: false,
        })
    }

    /// Returns the namespace string for a caller and optional category.
    pub fn namespace(&self, caller: &str, category: Option<&str>) -> String {
        match category {
            Some(category) => format!("{caller}/{category}@{}", self.config.app_version),
            None => format!("{caller}@{}", self.config.app_version),
        }
    }

    /// Creates the store for `caller` and `category`.
    ///
    /// With the memory backend every call returns a new, empty store. With the
    /// file backend the store lives in a directory derived from the namespace,
    /// so stores created for the same namespace share entries, including across
    /// processes. `start_empty` clears that directory first.
    pub fn create<V>(
        &self,
        caller: &str,
        category: Option<&str>,
    ) -> FolioResult<Rc<dyn ObjectStore<V>>>
    where
        V: Clone + Serialize + DeserializeOwned + 'static,
    {
        let namespace = self.namespace(caller, category);
        match self.config.backend {
            StoreBackend::Memory => {
                debug!(namespace = %namespace, "creating memory object store");
                Ok(Rc::new(MemoryObjectStore::<V>::new()))
            }
            StoreBackend::File => {
                let root = self.config.dir.as_ref().ok_or_else(|| {
                    StoreError::Misconfigured("file backend requires cache.dir".to_string())
                })?;
                let dir = root.join(ContentHash::from_bytes(namespace.as_bytes()).to_string());
                debug!(namespace = %namespace, dir = %dir.display(), "opening file object store");
                let store = FileObjectStore::<V>::open(&dir, &self.config.app_version)?;
                if self.config.start_empty {
                    store.clear()?;
                }
                Ok(Rc::new(store))
            }
        }
    }
}
