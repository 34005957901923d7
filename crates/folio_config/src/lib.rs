//! Parsing and validation of `folio.toml` cache configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`FolioConfig`] describing where cached objects live and how long fetched
//! patch versions are trusted.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use types::*;
