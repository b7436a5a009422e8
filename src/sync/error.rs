// Error taxonomy for synchronization operations.
// Failures are contained at entry granularity: a NotFound is expected under
// concurrent external mutation, everything else is an I/O or unexpected fault.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for synchronization operations
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while synchronizing a single entry or a whole pass
#[derive(Debug, Error)]
pub enum SyncError {
    /// Path vanished between enumeration and use
    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    /// Read/write/permission failure on a concrete path
    #[error("i/o failure while {operation} {path}: {source}")]
    Io {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// Any other fault
    #[error("unexpected failure: {message}")]
    Unexpected { message: String },
}

impl SyncError {
    /// Classify an `io::Error` with context about the operation and path.
    /// `NotFound` kinds become `SyncError::NotFound`, everything else keeps
    /// the source error.
    pub fn from_io(source: io::Error, operation: &'static str, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => SyncError::NotFound { path },
            _ => SyncError::Io {
                path,
                operation,
                source,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound { .. })
    }
}
