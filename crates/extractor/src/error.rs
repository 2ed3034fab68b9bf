//! Extractor Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::{Path, PathBuf};
use zip::result::ZipError;

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The caller asked for extraction to stop. The destination may be
    /// partially populated.
    #[display("extraction cancelled")]
    Cancelled,
    /// Archive (or a destination directory) does not exist
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Source is not a readable zip archive. Don't retry with the same input.
    #[display("invalid archive: {_0}")]
    InvalidArchive(#[error(not(source))] String),
    /// An entry would be written outside the destination directory.
    #[display("invalid entry path: {}", _0.display())]
    InvalidEntryPath(#[error(not(source))] PathBuf),
    /// The blocking extraction task panicked or was aborted.
    #[display("extraction worker failed")]
    Worker,
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Worker)
    }

    /// Returns `true` if extraction stopped because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub(crate) fn io(err: IoError, path: &Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }

    pub(crate) fn zip(err: ZipError, path: &Path) -> Self {
        match err {
            ZipError::Io(err) => Self::io(err, path),
            other => Self::InvalidArchive(other.to_string()),
        }
    }
}
