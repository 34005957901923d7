//! Namespaced key-value object stores backing every folio cache.
//!
//! Stores hand out lookups as [`Future`](folio_future::Future)s so callers can
//! issue several reads up front and resolve them later. Two backends exist: an
//! in-process map and a directory of checksummed entry files that survives
//! process restarts. [`ObjectStoreCreator`] picks the backend from
//! configuration and keeps every caller in its own namespace.

#![warn(missing_docs)]

pub mod creator;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use creator::ObjectStoreCreator;
pub use error::StoreError;
pub use file::FileObjectStore;
pub use memory::MemoryObjectStore;
pub use store::ObjectStore;
