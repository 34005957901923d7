//! Error types for object store operations.

use std::path::PathBuf;

use folio_common::Error;

/// Errors that can occur while writing or managing stored objects.
///
/// Reads never produce these: an unreadable entry is a cache miss. Writes,
/// deletes and namespace setup surface them, converted into
/// [`Error::Upstream`] at the store boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O error occurred while reading or writing store files.
    #[error("object store I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A value could not be encoded for storage.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// The store configuration cannot produce a usable store.
    #[error("misconfigured object store: {0}")]
    Misconfigured(String),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::upstream("object store", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = StoreError::Io {
            path: PathBuf::from("/tmp/folio/ab12.entry"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("object store I/O error"));
        assert!(msg.contains("ab12.entry"));
    }

    #[test]
    fn serialization_display() {
        let err = StoreError::Serialization {
            reason: "sequence too long".to_string(),
        };
        assert!(err.to_string().contains("sequence too long"));
    }

    #[test]
    fn converts_to_upstream() {
        let err: Error = StoreError::Misconfigured("no dir".to_string()).into();
        assert!(matches!(err, Error::Upstream { .. }));
        assert!(err.to_string().contains("no dir"));
    }
}
