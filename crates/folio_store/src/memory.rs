//! In-process object store.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use folio_common::FolioResult;
use folio_future::Future;

use crate::store::ObjectStore;

/// Object store backed by a shared in-process map.
///
/// Clones share the same entries and counters, which lets a test keep a handle
/// on a store it has given away. Entries are lost when the process exits.
#[derive(Clone)]
pub struct MemoryObjectStore<V> {
    entries: Rc<RefCell<HashMap<String, V>>>,
    get_count: Rc<Cell<usize>>,
    set_count: Rc<Cell<usize>>,
    del_count: Rc<Cell<usize>>,
}

impl<V: Clone + 'static> MemoryObjectStore<V> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(HashMap::new())),
            get_count: Rc::new(Cell::new(0)),
            set_count: Rc::new(Cell::new(0)),
            del_count: Rc::new(Cell::new(0)),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Returns `true` if `key` is stored.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Number of keys looked up so far, counting each key of a multi-read.
    pub fn get_count(&self) -> usize {
        self.get_count.get()
    }

    /// Number of keys written so far, counting each key of a multi-write.
    pub fn set_count(&self) -> usize {
        self.set_count.get()
    }

    /// Number of delete calls so far.
    pub fn del_count(&self) -> usize {
        self.del_count.get()
    }

    /// Resets all counters to zero.
    pub fn reset_counts(&self) {
        self.get_count.set(0);
        self.set_count.set(0);
        self.del_count.set(0);
    }
}

impl<V: Clone + 'static> Default for MemoryObjectStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + 'static> ObjectStore<V> for MemoryObjectStore<V> {
    fn get(&self, key: &str) -> Future<Option<V>> {
        self.get_count.set(self.get_count.get() + 1);
        Future::value(self.entries.borrow().get(key).cloned())
    }

    fn get_multi(&self, keys: &[String]) -> Future<HashMap<String, V>> {
        self.get_count.set(self.get_count.get() + keys.len());
        let entries = self.entries.borrow();
        let found = keys
            .iter()
            .filter_map(|key| entries.get(key).map(|v| (key.clone(), v.clone())))
            .collect();
        Future::value(found)
    }

    fn set(&self, key: &str, value: V) -> FolioResult<()> {
        self.set_count.set(self.set_count.get() + 1);
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    fn set_multi(&self, entries: HashMap<String, V>) -> FolioResult<()> {
        self.set_count.set(self.set_count.get() + entries.len());
        self.entries.borrow_mut().extend(entries);
        Ok(())
    }

    fn del(&self, key: &str) -> FolioResult<()> {
        self.del_count.set(self.del_count.get() + 1);
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
