//! Package resolvers.
//!
//! A resolver answers two questions for the update engine: which package
//! versions exist, and what are the bytes of one of them. Every resolver,
//! wherever its packages live, implements [`PackageResolver`] so the caller
//! never has to care.
//!
//! Resolvers deliberately keep no state between calls. Each call takes a
//! fresh [`Snapshot`] of the underlying source, so the answer always reflects
//! the source at the time of the call.

pub mod error;
pub mod resolver;

pub use crate::resolver::{AggregateResolver, LocalResolver, PackageReader, PackageResolver, Snapshot};
#[cfg(feature = "mock")]
pub use crate::resolver::MockResolver;
pub use crate::resolver::local::DEFAULT_SEARCH_PATTERN;
pub use renew_version::Version;
use std::sync::Arc;

pub type ResolverHandle = Arc<dyn PackageResolver + Send + Sync>;
