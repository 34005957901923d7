//! The object store interface.

use std::collections::HashMap;

use folio_common::FolioResult;
use folio_future::{all, ErrorFilter, Future};

/// A namespaced key-value store.
///
/// Reads return lazy futures so several lookups can be issued before any is
/// resolved. Absent keys read as `None` (or are omitted from multi-reads);
/// they are never errors.
pub trait ObjectStore<V: 'static> {
    /// Looks up a single key.
    fn get(&self, key: &str) -> Future<Option<V>>;

    /// Looks up several keys, returning only the ones present.
    fn get_multi(&self, keys: &[String]) -> Future<HashMap<String, V>> {
        let lookups: Vec<Future<Option<V>>> = keys.iter().map(|key| self.get(key)).collect();
        let keys = keys.to_vec();
        all(lookups, ErrorFilter::none(), false).map(move |values| {
            keys.into_iter()
                .zip(values)
                .filter_map(|(key, value)| value.flatten().map(|v| (key, v)))
                .collect()
        })
    }

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: V) -> FolioResult<()>;

    /// Stores every entry of `entries`.
    fn set_multi(&self, entries: HashMap<String, V>) -> FolioResult<()> {
        for (key, value) in entries {
            self.set(&key, value)?;
        }
        Ok(())
    }

    /// Removes `key` if present.
    fn del(&self, key: &str) -> FolioResult<()>;
}
