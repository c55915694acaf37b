//! Error types for Strand collections.

use crate::element::Key;
use alloc::string::String;
use core::fmt;
use thiserror::Error;

/// Result type alias for Strand operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for view and event source operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Index-based access outside `[0, len)`.
    #[error("Index {index} out of range for view of length {len}")]
    OutOfRange { index: usize, len: usize },
    /// An event named a key (or previous key) the view has never seen.
    ///
    /// This means the event source broke its causal ordering guarantee.
    #[error("Key not found: {key}")]
    KeyNotFound { key: Key },
    /// The event source terminated abnormally.
    #[error("Event source cancelled: {0}")]
    SourceCancelled(SourceError),
    /// The view was torn down and no longer accepts configuration.
    #[error("View has been torn down")]
    TornDown,
}

impl Error {
    /// Creates an out of range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Error::OutOfRange { index, len }
    }

    /// Creates a key not found error.
    pub fn key_not_found(key: impl Into<Key>) -> Self {
        Error::KeyNotFound { key: key.into() }
    }

    /// Creates a source cancelled error.
    pub fn source_cancelled(error: SourceError) -> Self {
        Error::SourceCancelled(error)
    }

    /// Returns true if this error reports a broken event stream.
    #[inline]
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Error::KeyNotFound { .. })
    }
}

/// Why an event source stopped delivering events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CancelKind {
    /// The client lost read access to the collection.
    PermissionDenied,
    /// The connection was dropped and will not be resumed.
    Disconnected,
    /// The credentials backing the subscription expired.
    ExpiredToken,
    /// The service is temporarily unavailable.
    Unavailable,
    /// Any other source-specific failure.
    Other,
}

impl fmt::Display for CancelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CancelKind::PermissionDenied => "permission denied",
            CancelKind::Disconnected => "disconnected",
            CancelKind::ExpiredToken => "expired token",
            CancelKind::Unavailable => "unavailable",
            CancelKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// An abnormal termination reported by an event source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct SourceError {
    pub kind: CancelKind,
    pub message: String,
}

impl SourceError {
    /// Creates a new source error.
    pub fn new(kind: CancelKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a permission denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(CancelKind::PermissionDenied, message)
    }
}
