//! In-memory package resolver for testing.

use crate::error::{ErrorKind, Result};
use crate::resolver::{PackageReader, PackageResolver};
use async_trait::async_trait;
use renew_version::Version;
use std::collections::{BTreeSet, HashMap};
use std::io::Cursor;
use tokio::sync::RwLock;

/// In-memory package resolver for testing.
///
/// Packages are stored in a `HashMap` behind a [`RwLock`], so packages can
/// be added or removed through `&self` while the resolver is shared. Ideal
/// for tests that need a [`PackageResolver`] without touching the
/// filesystem.
///
/// # Examples
///
/// ```
/// use renew_resolver::{MockResolver, PackageResolver, Version};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let resolver = MockResolver::with_packages([(Version::new(1, 0), b"zip bytes".to_vec())]);
/// resolver.insert(Version::new(1, 1), b"newer".to_vec()).await;
/// assert_eq!(resolver.latest_version().await.unwrap(), Some(Version::new(1, 1)));
/// # }
/// ```
pub struct MockResolver {
    name: String,
    packages: RwLock<HashMap<Version, Vec<u8>>>,
}

impl MockResolver {
    /// Create a mock resolver pre-populated with packages.
    pub fn with_packages(packages: impl IntoIterator<Item = (Version, impl Into<Vec<u8>>)>) -> Self {
        Self {
            name: "mock".to_string(),
            packages: RwLock::new(packages.into_iter().map(|(v, data)| (v, data.into())).collect()),
        }
    }

    /// Change the name of the mock resolver.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add or replace a package.
    pub async fn insert(&self, version: Version, data: impl Into<Vec<u8>>) {
        self.packages.write().await.insert(version, data.into());
    }

    /// Remove a package, returning whether it existed.
    pub async fn remove(&self, version: Version) -> bool {
        self.packages.write().await.remove(&version).is_some()
    }
}
impl Default for MockResolver {
    fn default() -> Self {
        let packages: [(Version, Vec<u8>); 0] = [];
        Self::with_packages(packages)
    }
}

#[async_trait]
impl PackageResolver for MockResolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_versions(&self) -> Result<BTreeSet<Version>> {
        Ok(self.packages.read().await.keys().copied().collect())
    }

    async fn get_package(&self, version: Version) -> Result<PackageReader> {
        let data = self
            .packages
            .read()
            .await
            .get(&version)
            .cloned()
            .ok_or_else(|| exn::Exn::from(ErrorKind::PackageNotFound(version)))?;
        Ok(Box::new(Cursor::new(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[tokio::test]
    async fn test_with_packages() {
        let resolver = MockResolver::with_packages([(Version::new(1, 0), b"one".to_vec())]);
        let mut buf = Vec::new();
        resolver.get_package(Version::new(1, 0)).await.unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"one");
    }

    #[tokio::test]
    async fn test_insert_and_remove() {
        let resolver = MockResolver::default().with_name("test");
        assert_eq!(resolver.name(), "test");
        assert!(resolver.list_versions().await.unwrap().is_empty());
        resolver.insert(Version::new(2, 0), b"two".to_vec()).await;
        assert_eq!(resolver.list_versions().await.unwrap(), BTreeSet::from([Version::new(2, 0)]));
        assert!(resolver.remove(Version::new(2, 0)).await);
        assert!(!resolver.remove(Version::new(2, 0)).await);
    }

    #[tokio::test]
    async fn test_not_found() {
        let resolver = MockResolver::default();
        let err = resolver.get_package(Version::new(9, 9)).await.err().unwrap();
        assert!(matches!(&*err, ErrorKind::PackageNotFound(v) if *v == Version::new(9, 9)));
    }
}
