//! Version Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A version parsing error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for version operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a string is not a version.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Nothing to parse.
    #[display("empty version string")]
    Empty,
    /// Versions carry between two and four components.
    #[display("expected 2 to 4 version components, found {_0}")]
    ComponentCount(#[error(not(source))] usize),
    /// A component is not a non-negative decimal integer in range.
    #[display("invalid version component: {_0:?}")]
    InvalidComponent(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Parsing the same string again gives the same answer.
        false
    }
}
