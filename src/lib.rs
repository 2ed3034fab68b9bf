//! Acquire and install update packages.
//!
//! `renew` is the package layer of an application self-update engine. It
//! answers "which versions exist?", fetches the bytes of a chosen version,
//! and unpacks them onto disk with progress reporting and cancellation.
//! Deciding *when* to update, swapping directories and relaunching are left
//! to the caller.
//!
//! The pieces live in their own crates and are re-exported here:
//!
//! - [`version`]: the [`Version`] identifier packages are keyed by
//! - [`resolver`]: [`PackageResolver`] and the local directory resolver
//! - [`extractor`]: [`PackageExtractor`] and the zip extractor
//! - [`config`]: layered configuration for both
//!
//! [`stage_package`] ties them together.

pub mod error;
mod stage;

pub use crate::stage::{PACKAGE_EXTENSION, StagedPackage, fetch_to_file, stage_package};
pub use renew_config as config;
pub use renew_extractor as extractor;
pub use renew_extractor::{CancellationToken, PackageExtractor, Progress, ProgressHandle, ZipExtractor};
pub use renew_resolver as resolver;
pub use renew_resolver::{AggregateResolver, LocalResolver, PackageResolver};
pub use renew_version as version;
pub use renew_version::Version;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use renew_config::Config;

/// Build the local resolver and zip extractor described by `config`.
pub fn from_config(config: &Config) -> Result<(LocalResolver, ZipExtractor)> {
    let Some(root) = &config.repository.path else {
        exn::bail!(ErrorKind::Config("repository.path is not set".to_string()));
    };
    let resolver = LocalResolver::new(root)
        .with_pattern(&config.repository.pattern)
        .or_raise(|| ErrorKind::Config(format!("invalid repository.pattern {:?}", config.repository.pattern)))?;
    let extractor = ZipExtractor::new().with_chunk_size(config.extract.chunk_size);
    tracing::debug!(root = %root.display(), pattern = %config.repository.pattern, "Configured resolver");
    Ok((resolver, extractor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::{Path, PathBuf};

    fn config(path: Option<&str>, pattern: &str, chunk_size: usize) -> Config {
        let mut config = Config::default();
        config.repository.path = path.map(PathBuf::from);
        config.repository.pattern = pattern.to_string();
        config.extract.chunk_size = chunk_size;
        config
    }

    #[rstest]
    #[case("*.zip", 4096)]
    #[case(resolver::DEFAULT_SEARCH_PATTERN, extractor::DEFAULT_CHUNK_SIZE)]
    fn test_from_config(#[case] pattern: &str, #[case] chunk_size: usize) {
        let (resolver, extractor) = from_config(&config(Some("/srv/updates"), pattern, chunk_size)).unwrap();
        assert_eq!(resolver.root(), Path::new("/srv/updates"));
        assert_eq!(resolver.pattern(), pattern);
        assert_eq!(extractor.chunk_size(), chunk_size);
    }

    #[test]
    fn test_from_config_without_repository() {
        let err = from_config(&Config::default()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Config(_)));
    }

    #[test]
    fn test_from_config_bad_pattern() {
        let err = from_config(&config(Some("/srv/updates"), "[", 1)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Config(msg) if msg.contains("repository.pattern")));
    }

    #[tokio::test]
    async fn test_stage_from_config() {
        use std::io::Write;
        let repo = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let mut writer = zip::ZipWriter::new(std::fs::File::create(repo.path().join("3.1.onv")).unwrap());
        writer.start_file("payload.txt", zip::write::SimpleFileOptions::default()).unwrap();
        writer.write_all(b"payload").unwrap();
        writer.finish().unwrap();
        std::fs::write(repo.path().join("garbage.onv"), "ignored").unwrap();

        let (resolver, extractor) = from_config(&config(repo.path().to_str(), "*.onv", 16)).unwrap();
        let latest = resolver.latest_version().await.unwrap().unwrap();
        assert_eq!(latest, Version::new(3, 1));
        let staged = stage_package(&resolver, &extractor, latest, work.path(), None, None).await.unwrap();
        assert_eq!(std::fs::read_to_string(staged.directory.join("payload.txt")).unwrap(), "payload");
    }
}
