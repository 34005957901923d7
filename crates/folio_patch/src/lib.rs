//! Patch application with cached versions, file lists and file contents.
//!
//! A [`Patcher`] turns a code-review patchset into file contents. Fetching a
//! patchset is slow and remote, so [`CachingPatcher`] keeps the current
//! version for a short trust window and caches file lists and contents per
//! version in object stores.

#![warn(missing_docs)]

pub mod caching;
pub mod clock;
pub mod patcher;

pub use caching::{CachingPatcher, VersionEntry};
pub use clock::{Clock, ManualClock, SystemClock};
pub use patcher::{PatchContents, PatchVersion, PatchedFiles, Patcher};
