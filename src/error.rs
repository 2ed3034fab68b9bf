//! Staging Error Types
//!
//! Errors from the resolver and extractor crates are kept as children of
//! these frames, so the full tree is available when reporting.

use derive_more::{Display, Error};

/// A staging error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for staging operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The resolver could not produce the package.
    #[display("failed to resolve package")]
    Resolve,
    /// The package could not be written to the work directory.
    #[display("failed to fetch package")]
    Fetch,
    /// The package could not be extracted.
    #[display("failed to extract package")]
    Extract,
    /// Staging was cancelled by the caller.
    #[display("staging cancelled")]
    Cancelled,
    /// Configuration cannot be turned into a resolver or extractor.
    #[display("unusable configuration: {_0}")]
    Config(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch)
    }
}
