//! Compiled-artifact caches over versioned file systems.
//!
//! A [`CompiledFileSystem`] turns files (or whole directory listings) into
//! artifacts and remembers which version of the input each artifact was built
//! from. [`ChainedCompiledFileSystem`] stacks several of them, newest first,
//! and serves each request from the oldest tier whose cached version still
//! matches, so artifacts shared across tiers are compiled once.

#![warn(missing_docs)]

pub mod chained;
pub mod compiled;

pub use chained::ChainedCompiledFileSystem;
pub use compiled::{CachingCompiledFileSystem, CompiledEntry, CompiledFileSystem, Compiler};
