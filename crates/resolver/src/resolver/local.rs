//! Local directory package resolver.
//!
//! Packages live as files directly inside one directory, each named after
//! its version (`1.2.0.onv`). Files whose name doesn't match the search
//! pattern, or whose stem isn't a version, are unrelated and ignored.

use crate::error::{ErrorKind, Result};
use crate::resolver::{PackageReader, PackageResolver, Snapshot};
use async_stream::stream;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use globset::{Glob, GlobMatcher};
use renew_version::Version;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::fs::{self, DirEntry};
use tracing::instrument;

/// Search pattern used unless another is configured.
pub const DEFAULT_SEARCH_PATTERN: &str = "*.onv";

static DEFAULT_MATCHER: LazyLock<GlobMatcher> =
    LazyLock::new(|| Glob::new(DEFAULT_SEARCH_PATTERN).unwrap().compile_matcher());

enum ScanEntry {
    Package(Version, PathBuf),
    Skip,
}

/// Resolves packages from files in a local directory.
///
/// # Examples
///
/// ```no_run
/// use renew_resolver::{LocalResolver, PackageResolver};
///
/// # async fn example() -> renew_resolver::error::Result<()> {
/// let resolver = LocalResolver::new("/srv/updates").with_pattern("*.zip")?;
/// for version in resolver.list_versions().await? {
///     println!("available: {version}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalResolver {
    name: String,
    /// Repository directory; only its top level is scanned.
    root: PathBuf,
    pattern: GlobMatcher,
}
impl LocalResolver {
    /// Create a resolver over `root` using [`DEFAULT_SEARCH_PATTERN`].
    ///
    /// The directory doesn't need to exist yet; until it does, the resolver
    /// lists no versions.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            name: "local".to_string(),
            root: root.into(),
            pattern: DEFAULT_MATCHER.clone(),
        }
    }

    /// Replace the file name glob used to select package files.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPattern`](ErrorKind::InvalidPattern) if `pattern`
    /// isn't a valid glob.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let glob = Glob::new(pattern).map_err(|e| ErrorKind::InvalidPattern(format!("{pattern}: {e}")))?;
        self.pattern = glob.compile_matcher();
        Ok(self)
    }

    /// Change the name of the resolver (used in log events).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pattern(&self) -> &str {
        self.pattern.glob().glob()
    }

    /// Build a fresh version to file mapping from the directory contents.
    ///
    /// Later files win when two names parse to the same version (for
    /// example `1.0.onv` and `01.0.onv`).
    #[instrument(skip(self), fields(resolver = %self.name, root = %self.root.display()))]
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let snapshot = self
            .scan()
            .try_fold(Snapshot::new(), |mut snapshot, (version, path)| async move {
                if let Some(previous) = snapshot.insert(version, path) {
                    tracing::debug!(%version, replaced = %previous.display(), "Duplicate package version");
                }
                Ok::<_, crate::error::Error>(snapshot)
            })
            .await?;
        tracing::debug!(packages = snapshot.len(), "Scanned package repository");
        Ok(snapshot)
    }

    /// Stream every package file in the repository as it is discovered.
    fn scan(&self) -> impl Stream<Item = Result<(Version, PathBuf)>> + Send + '_ {
        Box::pin(stream! {
            let mut entries = match fs::read_dir(&self.root).await {
                Ok(entries) => entries,
                // A repository that doesn't exist yet simply has no packages.
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => return,
                Err(err) => {
                    yield Err(exn::Exn::from(ErrorKind::io(err, &self.root)));
                    return;
                },
            };
            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(err) => {
                        yield Err(exn::Exn::from(ErrorKind::io(err, &self.root)));
                        return;
                    },
                };
                match self.process_entry(entry).await {
                    Ok(ScanEntry::Package(version, path)) => yield Ok((version, path)),
                    Ok(ScanEntry::Skip) => {},
                    Err(e) => yield Err(e),
                }
            }
        })
    }

    async fn process_entry(&self, entry: DirEntry) -> Result<ScanEntry> {
        let path = entry.path();
        let file_name = entry.file_name();
        if !self.pattern.is_match(&file_name) {
            return Ok(ScanEntry::Skip);
        }
        let version = Path::new(&file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse::<Version>().ok());
        let Some(version) = version else {
            tracing::trace!(path = %path.display(), "Skipping file without a version name");
            return Ok(ScanEntry::Skip);
        };
        // Follows symlinks. A candidate that can't be inspected (dangling or
        // looping link, unreadable entry) is skipped like any other non-file.
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "Skipping unreadable package file");
                return Ok(ScanEntry::Skip);
            },
        };
        match metadata.is_file() {
            true => Ok(ScanEntry::Package(version, path)),
            false => Ok(ScanEntry::Skip),
        }
    }
}

#[async_trait]
impl PackageResolver for LocalResolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_versions(&self) -> Result<BTreeSet<Version>> {
        Ok(self.snapshot().await?.into_keys().collect())
    }

    #[instrument(skip(self), fields(resolver = %self.name))]
    async fn get_package(&self, version: Version) -> Result<PackageReader> {
        let Some(path) = self.snapshot().await?.remove(&version) else {
            exn::bail!(ErrorKind::PackageNotFound(version));
        };
        let file = fs::File::open(&path).await.map_err(|e| ErrorKind::io(e, &path))?;
        tracing::debug!(path = %path.display(), "Opened package");
        Ok(Box::new(file.into_std().await))
    }
}
