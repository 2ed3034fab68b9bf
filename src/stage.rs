//! Fetch a package to disk and extract it next to itself.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use renew_extractor::{CancellationToken, ExtractReport, PackageExtractor, ProgressHandle};
use renew_resolver::{PackageResolver, Version};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::instrument;

/// File extension given to fetched packages.
pub const PACKAGE_EXTENSION: &str = "onv";

/// A package that has been fetched and extracted.
#[derive(Clone, Debug)]
pub struct StagedPackage {
    pub version: Version,
    /// The fetched archive, `<work_dir>/<version>.onv`.
    pub package: PathBuf,
    /// Extracted contents, `<work_dir>/<version>/`.
    pub directory: PathBuf,
    pub report: ExtractReport,
}

/// Write the package for `version` to `path`, returning the bytes written.
///
/// Parent directories of `path` are created. The package is written to a
/// temporary file next to `path` and only moved into place once complete, so
/// a failed fetch leaves no partial file behind. An existing file is
/// replaced.
#[instrument(skip(resolver), fields(resolver = resolver.name(), path = %path.display(), bytes))]
pub async fn fetch_to_file(resolver: &dyn PackageResolver, version: Version, path: &Path) -> Result<u64> {
    let mut reader = resolver.get_package(version).await.or_raise(|| ErrorKind::Resolve)?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&parent).await.or_raise(|| ErrorKind::Fetch)?;
    let target = path.to_path_buf();
    let bytes = tokio::task::spawn_blocking(move || {
        let mut file = NamedTempFile::new_in(&parent)?;
        let bytes = std::io::copy(&mut reader, &mut file)?;
        file.as_file().sync_all()?;
        file.persist(&target).map_err(|e| e.error)?;
        Ok::<_, std::io::Error>(bytes)
    })
    .await
    .or_raise(|| ErrorKind::Fetch)?
    .or_raise(|| ErrorKind::Fetch)?;
    tracing::Span::current().record("bytes", bytes);
    Ok(bytes)
}

/// Fetch `version` into `work_dir` and extract it.
///
/// The package is written to `<work_dir>/<version>.onv` and extracted into
/// `<work_dir>/<version>/`. Cancellation is checked before fetching and
/// throughout extraction; either way it ends with
/// [`ErrorKind::Cancelled`].
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use renew::{LocalResolver, PackageResolver, ZipExtractor, stage_package};
///
/// # async fn run() -> renew::error::Result<()> {
/// let resolver = LocalResolver::new("/srv/updates");
/// let Some(latest) = resolver.latest_version().await.unwrap() else {
///     return Ok(());
/// };
/// let extractor = ZipExtractor::default();
/// let staged = stage_package(&resolver, &extractor, latest, Path::new("/tmp/staging"), None, None).await?;
/// println!("{} staged in {}", staged.version, staged.directory.display());
/// # Ok(())
/// # }
/// ```
#[instrument(skip(resolver, extractor, progress, cancellation), fields(
    resolver = resolver.name(),
    work_dir = %work_dir.display()
))]
pub async fn stage_package(
    resolver: &dyn PackageResolver,
    extractor: &dyn PackageExtractor,
    version: Version,
    work_dir: &Path,
    progress: Option<ProgressHandle>,
    cancellation: Option<&CancellationToken>,
) -> Result<StagedPackage> {
    if cancellation.is_some_and(CancellationToken::is_cancelled) {
        exn::bail!(ErrorKind::Cancelled);
    }
    let package = work_dir.join(format!("{version}.{PACKAGE_EXTENSION}"));
    let directory = work_dir.join(version.to_string());
    fetch_to_file(resolver, version, &package).await?;

    let report = match extractor.extract(&package, &directory, progress, cancellation).await {
        Ok(report) => report,
        Err(err) if err.is_cancelled() => return Err(err.raise(ErrorKind::Cancelled)),
        Err(err) => return Err(err.raise(ErrorKind::Extract)),
    };
    tracing::info!(entries = report.entry_count(), bytes = report.total_bytes, "Staged package");
    Ok(StagedPackage { version, package, directory, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use renew_extractor::ZipExtractor;
    use renew_resolver::{MockResolver, PackageReader};
    use std::collections::BTreeSet;
    use std::io::{Cursor, Read, Write};
    use std::sync::Arc;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn package(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_fetch_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = MockResolver::with_packages([(v("1.0"), b"package bytes".to_vec())]);
        let path = dir.path().join("nested").join("1.0.onv");

        let bytes = fetch_to_file(&resolver, v("1.0"), &path).await.unwrap();
        assert_eq!(bytes, 13);
        assert_eq!(std::fs::read(&path).unwrap(), b"package bytes");
    }

    /// Serves a package whose stream fails after a few bytes.
    struct BrokenResolver;

    struct BrokenReader {
        sent: bool,
    }
    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.sent {
                return Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "stream interrupted"));
            }
            self.sent = true;
            let chunk = b"PK partial";
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    #[async_trait]
    impl PackageResolver for BrokenResolver {
        fn name(&self) -> &str {
            "broken"
        }

        async fn list_versions(&self) -> renew_resolver::error::Result<BTreeSet<Version>> {
            Ok(BTreeSet::from([Version::new(1, 0)]))
        }

        async fn get_package(&self, _: Version) -> renew_resolver::error::Result<PackageReader> {
            Ok(Box::new(BrokenReader { sent: false }))
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.0.onv");

        let err = fetch_to_file(&BrokenResolver, v("1.0"), &path).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Fetch);
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.0.onv");
        std::fs::write(&path, "previous download").unwrap();

        assert!(fetch_to_file(&BrokenResolver, v("1.0"), &path).await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous download");
    }

    #[tokio::test]
    async fn test_fetch_missing_version() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = MockResolver::default();
        let err = fetch_to_file(&resolver, v("1.0"), &dir.path().join("1.0.onv")).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Resolve);
        assert!(!dir.path().join("1.0.onv").exists());
    }

    #[tokio::test]
    async fn test_stage_package() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = package(&[("app.exe", "binary"), ("lib/readme.txt", "docs")]);
        let resolver = MockResolver::with_packages([(v("1.2.0"), bytes)]);
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let progress: ProgressHandle = {
            let seen = Arc::clone(&seen);
            Arc::new(move |f: f64| seen.lock().unwrap().push(f))
        };

        let staged = stage_package(&resolver, &ZipExtractor::default(), v("1.2.0"), dir.path(), Some(progress), None)
            .await
            .unwrap();

        assert_eq!(staged.version, v("1.2.0"));
        assert_eq!(staged.package, dir.path().join("1.2.0.onv"));
        assert_eq!(staged.directory, dir.path().join("1.2.0"));
        assert!(staged.package.is_file());
        assert_eq!(std::fs::read_to_string(staged.directory.join("app.exe")).unwrap(), "binary");
        assert_eq!(std::fs::read_to_string(staged.directory.join("lib/readme.txt")).unwrap(), "docs");
        assert_eq!(staged.report.file_count(), 2);
        assert_eq!(seen.lock().unwrap().last().copied(), Some(1.0));
    }

    #[tokio::test]
    async fn test_cancelled_before_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = MockResolver::with_packages([(v("1.0"), package(&[("a", "a")]))]);
        let token = CancellationToken::new();
        token.cancel();

        let err = stage_package(&resolver, &ZipExtractor::default(), v("1.0"), dir.path(), None, Some(&token))
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Cancelled);
        assert!(!dir.path().join("1.0.onv").exists());
    }

    #[tokio::test]
    async fn test_cancelled_during_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let big = "z".repeat(4096);
        let resolver = MockResolver::with_packages([(v("1.0"), package(&[("big", big.as_str())]))]);
        let token = CancellationToken::new();
        let progress: ProgressHandle = {
            let token = token.clone();
            Arc::new(move |_: f64| token.cancel())
        };

        let extractor = ZipExtractor::default().with_chunk_size(512);
        let err = stage_package(&resolver, &extractor, v("1.0"), dir.path(), Some(progress), Some(&token))
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_corrupt_package() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = MockResolver::with_packages([(v("1.0"), b"not a zip".to_vec())]);
        let err = stage_package(&resolver, &ZipExtractor::default(), v("1.0"), dir.path(), None, None)
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Extract);
    }
}
