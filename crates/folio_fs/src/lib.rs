//! Read-only file system views with per-path versions.
//!
//! Paths are `/`-separated and relative to the file system root. Directory
//! paths end with `/`; the root directory is the empty string.

#![warn(missing_docs)]

pub mod file_system;
pub mod local;
pub mod memory;

pub use file_system::{join_path, normalize_dir, FileSystem};
pub use local::LocalFileSystem;
pub use memory::MemoryFileSystem;
