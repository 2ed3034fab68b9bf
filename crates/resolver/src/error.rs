//! Resolver Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use renew_version::Version;
use std::io::Error as IoError;
use std::path::PathBuf;

/// A resolver error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for resolver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No package exists for the requested version. Pick another version
    /// or list the available ones again.
    #[display("package not found for version {_0}")]
    PackageNotFound(#[error(not(source))] Version),
    /// File disappeared between being listed and being opened
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Search pattern is not a valid glob
    #[display("invalid search pattern: {_0}")]
    InvalidPattern(#[error(not(source))] String),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::NotFound(_))
    }

    /// Map an I/O error, keeping the path for the kinds a caller can act on.
    pub(crate) fn io(err: IoError, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.into()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.into()),
            _ => Self::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::PackageNotFound(Version::new(2, 0).with_build(0)).to_string(),
            "package not found for version 2.0.0"
        );
        assert_eq!(ErrorKind::InvalidPattern("[".to_string()).to_string(), "invalid search pattern: [");
    }

    #[test]
    fn error_kind_io_mapping() {
        let missing = IoError::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(ErrorKind::io(missing, "1.0.onv"), ErrorKind::NotFound(p) if p == PathBuf::from("1.0.onv")));
        let denied = IoError::new(std::io::ErrorKind::PermissionDenied, "no");
        assert!(matches!(ErrorKind::io(denied, "x"), ErrorKind::PermissionDenied(_)));
        let other = IoError::other("disk on fire");
        assert!(matches!(ErrorKind::io(other, "x"), ErrorKind::Io(_)));
    }

    #[test]
    fn error_kind_retryable() {
        assert!(!ErrorKind::PackageNotFound(Version::new(1, 0)).is_retryable());
        assert!(!ErrorKind::InvalidPattern(String::new()).is_retryable());
        assert!(ErrorKind::Io(IoError::other("flaky")).is_retryable());
    }
}
