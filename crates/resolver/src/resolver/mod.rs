//! Package resolver trait and implementations.
//!
//! This module defines the [`PackageResolver`] trait, the contract every
//! package source (local directory, remote endpoint, object store, ...)
//! satisfies, along with the implementations shipped with this crate.

mod aggregate;
pub(crate) mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::aggregate::AggregateResolver;
pub use self::local::LocalResolver;
#[cfg(feature = "mock")]
pub use self::mock::MockResolver;
use crate::error::Result;
use async_trait::async_trait;
use renew_version::Version;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::PathBuf;

/// A package's bytes, positioned at the start.
///
/// `'static` and [`Send`] so it can be moved into
/// [`spawn_blocking`](tokio::task::spawn_blocking) for copying.
pub type PackageReader = Box<dyn Read + Send + 'static>;

/// Version to locator mapping computed during a single resolver call.
///
/// Each version appears at most once. When a source holds several files for
/// the same version, the one observed last during the scan wins.
pub type Snapshot = BTreeMap<Version, PathBuf>;

/// Unified interface for package sources.
///
/// Implementations must not cache between calls: both methods work from a
/// freshly computed view of the source, so a package added after one call is
/// visible to the next.
///
/// # Examples
///
/// ```no_run
/// use std::io::Read;
/// use renew_resolver::{PackageResolver, error::Result};
///
/// async fn newest_package_size(resolver: &dyn PackageResolver) -> Result<Option<usize>> {
///     let Some(version) = resolver.latest_version().await? else {
///         return Ok(None);
///     };
///     let reader = resolver.get_package(version).await?;
///     let bytes = tokio::task::spawn_blocking(move || {
///         let mut buf = Vec::new();
///         let mut reader = reader;
///         reader.read_to_end(&mut buf).map(|_| buf)
///     });
///     Ok(Some(bytes.await.unwrap().unwrap().len()))
/// }
/// ```
#[async_trait]
pub trait PackageResolver: Send + Sync {
    /// Name of the resolver, used for logging only.
    fn name(&self) -> &str;

    /// Every version currently resolvable.
    ///
    /// An empty or missing source is an empty set, not an error.
    async fn list_versions(&self) -> Result<BTreeSet<Version>>;

    /// Open the package for `version`.
    ///
    /// Returns [`PackageNotFound`](crate::error::ErrorKind::PackageNotFound)
    /// carrying `version` if it is not in the current snapshot.
    async fn get_package(&self, version: Version) -> Result<PackageReader>;

    /// The greatest version currently resolvable, if any.
    ///
    /// Default implementation takes the last element of
    /// [`list_versions()`](Self::list_versions).
    async fn latest_version(&self) -> Result<Option<Version>> {
        Ok(self.list_versions().await?.last().copied())
    }
}
