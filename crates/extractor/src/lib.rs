//! Package extraction.
//!
//! An extractor unpacks a fetched package archive into a directory. All
//! extractors implement [`PackageExtractor`], taking an optional
//! [progress sink](Progress) and an optional [`CancellationToken`]:
//!
//! - progress is reported as a non-decreasing fraction in `[0.0, 1.0]`,
//!   ending at exactly `1.0` when extraction succeeds
//! - cancellation is polled between units of work and ends extraction with
//!   [`ErrorKind::Cancelled`](error::ErrorKind::Cancelled)
//!
//! Only zip archives are supported ([`ZipExtractor`]).

mod archive;
pub mod error;
mod path;
mod progress;

pub use crate::archive::{ArchiveEntry, DEFAULT_CHUNK_SIZE, EntryKind, ExtractReport, ZipExtractor};
pub use crate::progress::{Progress, ProgressHandle};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
pub use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait PackageExtractor: Send + Sync {
    /// Unpack every entry of `source` into `destination`.
    ///
    /// Intermediate directories are created as needed and each entry keeps
    /// its relative path. Existing files are overwritten. On cancellation
    /// `destination` may be left partially populated.
    async fn extract(
        &self,
        source: &Path,
        destination: &Path,
        progress: Option<ProgressHandle>,
        cancellation: Option<&CancellationToken>,
    ) -> error::Result<ExtractReport>;
}

pub type ExtractorHandle = Arc<dyn PackageExtractor + Send + Sync>;
