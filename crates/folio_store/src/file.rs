//! Persistent object store: one checksummed entry file per key.
//!
//! Each entry is stored at `<dir>/<hash(key)>.entry` as a 4-byte little-endian
//! header length, a bincode-encoded [`EntryHeader`], and the bincode-encoded
//! value. The header carries magic bytes, the entry format version, the
//! application version that wrote it, the original key, and a checksum of the
//! payload.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use folio_common::{ContentHash, FolioResult};
use folio_future::Future;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::ObjectStore;

/// Magic bytes identifying a folio store entry.
const ENTRY_MAGIC: [u8; 4] = *b"FOLO";

/// Current entry format version. Increment on breaking changes to the header
/// or payload encoding.
const ENTRY_FORMAT_VERSION: u32 = 1;

/// File extension for entry files.
const ENTRY_EXT: &str = "entry";

/// Header prepended to every stored entry for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryHeader {
    /// Magic bytes: must be `b"FOLO"`.
    pub magic: [u8; 4],

    /// Entry format version.
    pub format_version: u32,

    /// Application version that wrote this entry.
    pub app_version: String,

    /// The key this entry was stored under.
    pub key: String,

    /// Content hash of the payload bytes.
    pub checksum: ContentHash,
}

/// Object store persisted as entry files in a single namespace directory.
///
/// All reads are fail-safe: a missing, truncated, corrupt, foreign or
/// outdated entry reads as absent.
pub struct FileObjectStore<V> {
    dir: PathBuf,
    app_version: String,
    _marker: PhantomData<fn() -> V>,
}

impl<V> FileObjectStore<V>
where
    V: Serialize + DeserializeOwned + 'static,
{
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path, app_version: &str) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir).map_err(|e| StoreError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            app_version: app_version.to_string(),
            _marker: PhantomData,
        })
    }

    /// Returns the namespace directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file path used for `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        entry_path(&self.dir, key)
    }

    /// Removes every entry in this namespace. Returns the number removed.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let mut removed = 0;
        let entries = std::fs::read_dir(&self.dir).map_err(|e| StoreError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Io {
                path: self.dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXT) {
                std::fs::remove_file(&path).map_err(|e| StoreError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                removed += 1;
            }
        }

        debug!(dir = %self.dir.display(), removed, "cleared object store namespace");
        Ok(removed)
    }

    fn write_entry(&self, key: &str, value: &V) -> Result<(), StoreError> {
        let payload = bincode::serde::encode_to_vec(value, bincode::config::standard())
            .map_err(|e| StoreError::Serialization {
                reason: e.to_string(),
            })?;

        let header = EntryHeader {
            magic: ENTRY_MAGIC,
            format_version: ENTRY_FORMAT_VERSION,
            app_version: self.app_version.clone(),
            key: key.to_string(),
            checksum: ContentHash::from_bytes(&payload),
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| StoreError::Serialization {
                reason: e.to_string(),
            })?;

        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(&payload);

        let path = self.entry_path(key);
        std::fs::write(&path, &output).map_err(|e| StoreError::Io { path, source: e })
    }
}

fn entry_path(dir: &Path, key: &str) -> PathBuf {
    let name = ContentHash::from_bytes(key.as_bytes());
    dir.join(format!("{name}.{ENTRY_EXT}"))
}

/// Reads and validates one entry, treating every problem as a miss.
fn read_entry<V: DeserializeOwned>(path: &Path, key: &str, app_version: &str) -> Option<V> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(_) => {
            debug!(key, "object store miss");
            return None;
        }
    };

    match decode_entry(&raw, key, app_version) {
        Ok(value) => Some(value),
        Err(reason) => {
            warn!(key, path = %path.display(), reason, "discarding unreadable store entry");
            None
        }
    }
}

fn decode_entry<V: DeserializeOwned>(
    raw: &[u8],
    key: &str,
    app_version: &str,
) -> Result<V, &'static str> {
    if raw.len() < 4 {
        return Err("truncated header length");
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&raw[..4]);
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    if raw.len() < 4 + header_len {
        return Err("truncated header");
    }

    let (header, _): (EntryHeader, usize) =
        bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
            .map_err(|_| "undecodable header")?;

    if header.magic != ENTRY_MAGIC {
        return Err("bad magic");
    }
    if header.format_version != ENTRY_FORMAT_VERSION {
        return Err("format version mismatch");
    }
    if header.app_version != app_version {
        return Err("written by another app version");
    }
    if header.key != key {
        return Err("key collision");
    }

    let payload = &raw[4 + header_len..];
    if ContentHash::from_bytes(payload) != header.checksum {
        return Err("checksum mismatch");
    }

    let (value, _): (V, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())
            .map_err(|_| "undecodable payload")?;
    Ok(value)
}

impl<V> ObjectStore<V> for FileObjectStore<V>
where
    V: Serialize + DeserializeOwned + 'static,
{
    fn get(&self, key: &str) -> Future<Option<V>> {
        let path = self.entry_path(key);
        let key = key.to_string();
        let app_version = self.app_version.clone();
        Future::deferred(move || Ok(read_entry(&path, &key, &app_version)))
    }

    fn set(&self, key: &str, value: V) -> FolioResult<()> {
        self.write_entry(key, &value)?;
        Ok(())
    }

    fn set_multi(&self, entries: HashMap<String, V>) -> FolioResult<()> {
        for (key, value) in &entries {
            self.write_entry(key, value)?;
        }
        Ok(())
    }

    fn del(&self, key: &str) -> FolioResult<()> {
        let path = self.entry_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io { path, source: e }.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, FileObjectStore<Vec<String>>) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileObjectStore::open(dir.path(), "1").unwrap();
        (dir, store)
    }

    fn raw_entry(header: &EntryHeader, payload: &[u8]) -> Vec<u8> {
        let header_bytes =
            bincode::serde::encode_to_vec(header, bincode::config::standard()).unwrap();
        let mut output = Vec::new();
        output.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(payload);
        output
    }

    fn encoded(value: &Vec<String>) -> Vec<u8> {
        bincode::serde::encode_to_vec(value, bincode::config::standard()).unwrap()
    }

    #[test]
    fn set_and_get_roundtrip() {
        let (_dir, store) = make_store();
        let value = vec!["a.html".to_string(), "b.html".to_string()];
        store.set("listing:docs/", value.clone()).unwrap();
        assert_eq!(store.get("listing:docs/").get().unwrap(), Some(value));
    }

    #[test]
    fn get_missing_is_none() {
        let (_dir, store) = make_store();
        assert_eq!(store.get("missing").get().unwrap(), None);
    }

    #[test]
    fn get_is_lazy() {
        let (_dir, store) = make_store();
        let pending = store.get("k");
        store.set("k", vec!["late".to_string()]).unwrap();
        assert_eq!(pending.get().unwrap(), Some(vec!["late".to_string()]));
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileObjectStore::<Vec<String>>::open(dir.path(), "1").unwrap();
            store.set("k", vec!["kept".to_string()]).unwrap();
        }
        let store = FileObjectStore::<Vec<String>>::open(dir.path(), "1").unwrap();
        assert_eq!(store.get("k").get().unwrap(), Some(vec!["kept".to_string()]));
    }

    #[test]
    fn other_app_version_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        FileObjectStore::<Vec<String>>::open(dir.path(), "1")
            .unwrap()
            .set("k", vec!["old".to_string()])
            .unwrap();
        let store = FileObjectStore::<Vec<String>>::open(dir.path(), "2").unwrap();
        assert_eq!(store.get("k").get().unwrap(), None);
    }

    #[test]
    fn garbage_is_a_miss() {
        let (_dir, store) = make_store();
        std::fs::write(store.entry_path("k"), b"garbage data").unwrap();
        assert_eq!(store.get("k").get().unwrap(), None);
    }

    #[test]
    fn truncated_is_a_miss() {
        let (_dir, store) = make_store();
        std::fs::write(store.entry_path("k"), b"AB").unwrap();
        assert_eq!(store.get("k").get().unwrap(), None);
    }

    #[test]
    fn wrong_magic_is_a_miss() {
        let (_dir, store) = make_store();
        let payload = encoded(&vec!["x".to_string()]);
        let header = EntryHeader {
            magic: *b"BAAD",
            format_version: ENTRY_FORMAT_VERSION,
            app_version: "1".to_string(),
            key: "k".to_string(),
            checksum: ContentHash::from_bytes(&payload),
        };
        std::fs::write(store.entry_path("k"), raw_entry(&header, &payload)).unwrap();
        assert_eq!(store.get("k").get().unwrap(), None);
    }

    #[test]
    fn wrong_format_version_is_a_miss() {
        let (_dir, store) = make_store();
        let payload = encoded(&vec!["x".to_string()]);
        let header = EntryHeader {
            magic: ENTRY_MAGIC,
            format_version: 999,
            app_version: "1".to_string(),
            key: "k".to_string(),
            checksum: ContentHash::from_bytes(&payload),
        };
        std::fs::write(store.entry_path("k"), raw_entry(&header, &payload)).unwrap();
        assert_eq!(store.get("k").get().unwrap(), None);
    }

    #[test]
    fn checksum_mismatch_is_a_miss() {
        let (_dir, store) = make_store();
        let payload = encoded(&vec!["x".to_string()]);
        let header = EntryHeader {
            magic: ENTRY_MAGIC,
            format_version: ENTRY_FORMAT_VERSION,
            app_version: "1".to_string(),
            key: "k".to_string(),
            checksum: ContentHash::from_bytes(b"something else"),
        };
        std::fs::write(store.entry_path("k"), raw_entry(&header, &payload)).unwrap();
        assert_eq!(store.get("k").get().unwrap(), None);
    }

    #[test]
    fn foreign_key_is_a_miss() {
        let (_dir, store) = make_store();
        let payload = encoded(&vec!["x".to_string()]);
        let header = EntryHeader {
            magic: ENTRY_MAGIC,
            format_version: ENTRY_FORMAT_VERSION,
            app_version: "1".to_string(),
            key: "other".to_string(),
            checksum: ContentHash::from_bytes(&payload),
        };
        std::fs::write(store.entry_path("k"), raw_entry(&header, &payload)).unwrap();
        assert_eq!(store.get("k").get().unwrap(), None);
    }

    #[test]
    fn get_multi_reads_present_keys() {
        let (_dir, store) = make_store();
        store.set("a", vec!["1".to_string()]).unwrap();
        store.set("b", vec!["2".to_string()]).unwrap();
        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let found = store.get_multi(&keys).get().unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found["b"], vec!["2".to_string()]);
    }

    #[test]
    fn del_removes_and_tolerates_missing() {
        let (_dir, store) = make_store();
        store.set("a", vec![]).unwrap();
        store.del("a").unwrap();
        store.del("a").unwrap();
        assert_eq!(store.get("a").get().unwrap(), None);
    }

    #[test]
    fn clear_removes_every_entry() {
        let (_dir, store) = make_store();
        store.set("a", vec![]).unwrap();
        store.set("b", vec![]).unwrap();
        std::fs::write(store.dir().join("NOTES"), b"not an entry").unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert_eq!(store.get("a").get().unwrap(), None);
        assert!(store.dir().join("NOTES").exists());
    }

    #[test]
    fn entry_path_format() {
        let (_dir, store) = make_store();
        let path = store.entry_path("docs/index.html@7");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("entry"));
        assert_eq!(path.parent(), Some(store.dir()));
    }
}
