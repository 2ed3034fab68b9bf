//! Aggregate package resolver.
//!
//! Presents several resolvers as one, so a caller can combine, say, a local
//! mirror with a remote source without knowing there are two.

use crate::error::{ErrorKind, Result};
use crate::resolver::{PackageReader, PackageResolver};
use crate::ResolverHandle;
use async_trait::async_trait;
use renew_version::Version;
use std::collections::BTreeSet;
use std::ops::Deref;
use tracing::instrument;

/// Resolves packages from an ordered list of resolvers.
///
/// Versions are the union of every inner resolver's versions. A package is
/// fetched from the first resolver (in the order given) that has it.
#[derive(Clone)]
pub struct AggregateResolver {
    name: String,
    inner: Vec<ResolverHandle>,
}
impl AggregateResolver {
    pub fn new(inner: impl IntoIterator<Item = ResolverHandle>) -> Self {
        Self {
            name: "aggregate".to_string(),
            inner: inner.into_iter().collect(),
        }
    }

    /// Change the name of the resolver (used in log events).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl PackageResolver for AggregateResolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_versions(&self) -> Result<BTreeSet<Version>> {
        let mut versions = BTreeSet::new();
        for resolver in &self.inner {
            versions.extend(resolver.list_versions().await?);
        }
        Ok(versions)
    }

    #[instrument(skip(self), fields(resolver = %self.name))]
    async fn get_package(&self, version: Version) -> Result<PackageReader> {
        for resolver in &self.inner {
            match resolver.get_package(version).await {
                Ok(reader) => {
                    tracing::debug!(source = resolver.name(), "Resolved package");
                    return Ok(reader);
                },
                Err(e) if matches!(e.deref(), ErrorKind::PackageNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        exn::bail!(ErrorKind::PackageNotFound(version));
    }
}
