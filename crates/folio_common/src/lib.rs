//! Shared foundational types used across the folio caching layer.
//!
//! This crate provides content hashing, opaque file versions, and the error
//! taxonomy that every other folio crate surfaces.

#![warn(missing_docs)]

pub mod error;
pub mod hash;
pub mod version;

pub use error::{ConstructionError, Error, FolioResult};
pub use hash::ContentHash;
pub use version::FileVersion;
