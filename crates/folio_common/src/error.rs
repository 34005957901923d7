//! The error taxonomy shared by futures, stores, file systems and patchers.

use std::sync::Arc;

/// The standard result type for fallible folio operations.
pub type FolioResult<T> = Result<T, Error>;

/// A deferred value was built without a value, an error, or a computation.
///
/// This is a caller defect and is never recovered locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("a future needs a value, an error, or a computation")]
pub struct ConstructionError;

/// Errors surfaced across every folio boundary.
///
/// `Error` is cheap to clone so a memoized failure can be handed out again
/// exactly as it was first captured.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The requested path, artifact or version legitimately does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A deferred value was constructed with nothing to resolve to.
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// An opaque failure from a collaborator (I/O, serialization, network).
    #[error("{context}: {source}")]
    Upstream {
        /// What was being attempted when the failure occurred.
        context: String,
        /// The original error, kept intact for diagnostics.
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Creates a not-found error with the given message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound(message.into())
    }

    /// Wraps a collaborator error, keeping the original as the source.
    pub fn upstream<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Upstream {
            context: context.into(),
            source: Arc::new(source),
        }
    }

    /// Returns `true` for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
