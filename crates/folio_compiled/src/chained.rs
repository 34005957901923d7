//! Serving artifacts from a chain of compiled tiers.
//!
//! The chain is ordered newest first: the primary tier holds request-specific
//! content (a thin patch over a base, say) and each later tier is an older,
//! longer-lived cache. For each request the primary tier's version of the
//! path is looked up, then the chain is walked from the oldest tier back to
//! the primary, and the first tier whose version agrees serves the artifact.
//! Older tiers share most content with the primary and are the ones kept
//! warm, so preferring them avoids recompiling in short-lived tiers.
//!
//! When no version can be established the request falls through to the
//! primary tier's own read, so whatever error that read produces (usually a
//! not-found) reaches the caller unaltered. A path that exists nowhere and a
//! path whose versions disagree everywhere therefore look the same.

use std::rc::Rc;

use folio_common::{ContentHash, FileVersion, FolioResult};
use folio_fs::normalize_dir;
use folio_future::Future;
use tracing::debug;

use crate::compiled::CompiledFileSystem;

/// A tier in the chain, erased to its artifact type.
pub type Tier<A> = Rc<dyn CompiledFileSystem<Artifact = A>>;

/// Serves each path from the oldest tier with a matching version.
pub struct ChainedCompiledFileSystem<A> {
    chain: Vec<Tier<A>>,
}

impl<A: Clone + 'static> ChainedCompiledFileSystem<A> {
    /// Creates a chain from the primary tier and its fallbacks, newest first.
    pub fn new(primary: Tier<A>, fallbacks: Vec<Tier<A>>) -> Self {
        let mut chain = Vec::with_capacity(fallbacks.len() + 1);
        chain.push(primary);
        chain.extend(fallbacks);
        Self { chain }
    }

    /// Returns the artifact for the file at `path`.
    pub fn get_from_file(&self, path: &str) -> Future<A> {
        let reads = self.chain.iter().map(|t| t.get_from_file(path)).collect();
        let versions = self.chain.iter().map(|t| t.file_version(path)).collect();
        serve_from_chain(path.to_string(), reads, versions)
    }

    /// Returns the artifact for the listing of `dir`.
    pub fn get_from_file_listing(&self, dir: &str) -> Future<A> {
        let dir = normalize_dir(dir);
        let reads = self
            .chain
            .iter()
            .map(|t| t.get_from_file_listing(&dir))
            .collect();
        let versions = self
            .chain
            .iter()
            .map(|t| t.file_listing_version(&dir))
            .collect();
        serve_from_chain(dir, reads, versions)
    }

    /// Like [`get_from_file`](Self::get_from_file), resolving to `None` when
    /// the path is not found.
    pub fn get_from_file_or_none(&self, path: &str) -> Future<Option<A>> {
        self.get_from_file(path).then_or_else(
            |artifact| Future::value(Some(artifact)),
            |err| {
                if err.is_not_found() {
                    Future::value(None)
                } else {
                    Future::error(err)
                }
            },
        )
    }

    /// A fingerprint of the fallback tiers.
    ///
    /// The primary tier is left out: it differs per request while the chain
    /// behind it stays the same.
    pub fn identity(&self) -> String {
        ContentHash::from_parts(self.chain.iter().skip(1).map(|t| t.identity())).to_string()
    }
}

/// Builds the deferred selection over reads and versions issued per tier.
fn serve_from_chain<A: 'static>(
    path: String,
    mut reads: Vec<Future<A>>,
    versions: Vec<Future<FileVersion>>,
) -> Future<A> {
    Future::deferred(move || match matching_tier(&versions) {
        Ok(Some(tier)) => {
            debug!(path = %path, tier, "serving artifact from chain");
            reads.swap_remove(tier).into_result()
        }
        Ok(None) => reads.swap_remove(0).into_result(),
        Err(err) if err.is_not_found() => {
            debug!(path = %path, "no tier version; falling through to primary");
            reads.swap_remove(0).into_result()
        }
        Err(err) => Err(err),
    })
}

/// Finds the oldest tier whose version equals the primary tier's.
///
/// A not-found version for the primary is returned as an error; a not-found
/// version for an older tier only disqualifies that tier.
fn matching_tier(versions: &[Future<FileVersion>]) -> FolioResult<Option<usize>> {
    let Some(primary) = versions.first() else {
        return Ok(None);
    };
    let current = primary.resolve().as_ref().map_err(Clone::clone)?;
    for (tier, version) in versions.iter().enumerate().rev() {
        match version.resolve() {
            Ok(version) if version == current => return Ok(Some(tier)),
            Ok(_) => {}
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.clone()),
        }
    }
    Ok(None)
}
