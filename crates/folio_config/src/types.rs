//! Configuration types deserialized from `folio.toml`.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default trust window for a fetched patch version, in milliseconds.
pub const DEFAULT_VERSION_TRUST_WINDOW_MS: u64 = 5_000;

/// The top-level configuration parsed from `folio.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct FolioConfig {
    /// Object store settings shared by every cache.
    pub cache: CacheConfig,
    /// Settings for the caching patcher.
    #[serde(default)]
    pub patcher: PatcherConfig,
}

/// Where cached objects are kept and how their namespaces are versioned.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Storage backend for object stores.
    #[serde(default)]
    pub backend: StoreBackend,
    /// Root directory for the `file` backend.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Application version folded into every namespace. Bumping it starts
    /// all caches afresh.
    pub app_version: String,
    /// Clear each namespace when its store is created.
    #[serde(default)]
    pub start_empty: bool,
}

/// Storage backend for object stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process maps, lost when the process exits.
    #[default]
    Memory,
    /// One file per entry under `cache.dir`, persisted across runs.
    File,
}

/// Settings for the caching patcher.
#[derive(Debug, Clone, Deserialize)]
pub struct PatcherConfig {
    /// How long a fetched patch version is trusted before it is fetched again.
    #[serde(default = "default_trust_window_ms")]
    pub version_trust_window_ms: u64,
}

fn default_trust_window_ms() -> u64 {
    DEFAULT_VERSION_TRUST_WINDOW_MS
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            version_trust_window_ms: DEFAULT_VERSION_TRUST_WINDOW_MS,
        }
    }
}

impl PatcherConfig {
    /// Returns the version trust window as a [`Duration`].
    pub fn version_trust_window(&self) -> Duration {
        Duration::from_millis(self.version_trust_window_ms)
    }
}
