//! Zip package extraction.

use crate::PackageExtractor;
use crate::error::{ErrorKind, Result};
use crate::path::entry_path;
use crate::progress::{ProgressHandle, Tracker};
use async_trait::async_trait;
use exn::ResultExt;
use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use zip::ZipArchive;

/// Bytes copied between progress reports and cancellation checks.
pub const DEFAULT_CHUNK_SIZE: usize = 81_920;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of an archive, as planned before anything is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Normalized path relative to the extraction root.
    pub path: PathBuf,
    /// Uncompressed length in bytes (zero for directories).
    pub size: u64,
    pub kind: EntryKind,
    index: usize,
}

/// What an extraction wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Entries in archive order.
    pub entries: Vec<ArchiveEntry>,
    /// Sum of uncompressed entry sizes; the progress denominator.
    pub total_bytes: u64,
}
impl ExtractReport {
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of file (non-directory) entries.
    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|e| e.kind == EntryKind::File).count()
    }
}

/// Extracts zip archives.
///
/// Every entry path is validated before the first byte is written, so an
/// archive containing an escaping entry leaves the destination untouched.
/// File contents are copied in chunks of [`DEFAULT_CHUNK_SIZE`] bytes (see
/// [`with_chunk_size`](Self::with_chunk_size)); progress is reported and
/// cancellation checked after every chunk.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use std::sync::Arc;
/// use renew_extractor::{PackageExtractor, ProgressHandle, ZipExtractor};
///
/// # async fn run() -> renew_extractor::error::Result<()> {
/// let extractor = ZipExtractor::default();
/// let progress: ProgressHandle = Arc::new(|fraction: f64| println!("{:.0}%", fraction * 100.0));
/// let report = extractor
///     .extract(Path::new("2.0.onv"), Path::new("staging/2.0"), Some(progress), None)
///     .await?;
/// println!("{} entries, {} bytes", report.entry_count(), report.total_bytes);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ZipExtractor {
    chunk_size: usize,
}
impl ZipExtractor {
    pub fn new() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE }
    }

    /// Copy in chunks of `chunk_size` bytes (at least one).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}
impl Default for ZipExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageExtractor for ZipExtractor {
    #[instrument(skip(self, progress, cancellation), fields(
        source = %source.display(),
        destination = %destination.display(),
        entries,
        total_bytes
    ))]
    async fn extract(
        &self,
        source: &Path,
        destination: &Path,
        progress: Option<ProgressHandle>,
        cancellation: Option<&CancellationToken>,
    ) -> Result<ExtractReport> {
        // The worker watches its own child token. Dropping this future drops
        // the guard, which stops the worker at its next chunk.
        let token = cancellation.map(CancellationToken::child_token).unwrap_or_default();
        let _guard = token.clone().drop_guard();
        let job = Job {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            chunk_size: self.chunk_size,
            progress,
            cancellation: token,
        };
        let span = tracing::Span::current();
        let result = tokio::task::spawn_blocking(move || span.in_scope(|| job.run()))
            .await
            .or_raise(|| ErrorKind::Worker)?;
        match &result {
            Ok(report) => {
                let span = tracing::Span::current();
                span.record("entries", report.entry_count());
                span.record("total_bytes", report.total_bytes);
                tracing::info!("Extraction complete");
            },
            Err(err) if err.is_cancelled() => tracing::info!("Extraction cancelled"),
            Err(_) => {},
        }
        result
    }
}

/// Everything the blocking worker needs, owned.
struct Job {
    source: PathBuf,
    destination: PathBuf,
    chunk_size: usize,
    progress: Option<ProgressHandle>,
    cancellation: CancellationToken,
}

impl Job {
    fn run(self) -> Result<ExtractReport> {
        self.check_cancelled()?;
        let file = File::open(&self.source).map_err(|e| ErrorKind::io(e, &self.source))?;
        let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|e| ErrorKind::zip(e, &self.source))?;
        let entries = self.plan(&mut archive)?;
        let total_bytes = total_size(&entries);
        tracing::debug!(entries = entries.len(), total_bytes, "Planned extraction");

        fs::create_dir_all(&self.destination).map_err(|e| ErrorKind::io(e, &self.destination))?;
        let mut tracker = Tracker::new(self.progress.as_deref(), total_bytes);
        let mut buffer = vec![0; self.chunk_size];
        for entry in &entries {
            self.check_cancelled()?;
            let target = self.destination.join(&entry.path);
            tracing::trace!(path = %entry.path.display(), size = entry.size, "Extracting entry");
            match entry.kind {
                EntryKind::Directory => {
                    fs::create_dir_all(&target).map_err(|e| ErrorKind::io(e, &target))?;
                },
                EntryKind::File => {
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent).map_err(|e| ErrorKind::io(e, parent))?;
                    }
                    let mut reader = archive.by_index(entry.index).map_err(|e| ErrorKind::zip(e, &self.source))?;
                    let mut writer = File::create(&target).map_err(|e| ErrorKind::io(e, &target))?;
                    self.copy(&mut reader, &mut writer, &target, &mut buffer, &mut tracker)?;
                },
            }
        }
        tracker.finish();
        Ok(ExtractReport { entries, total_bytes })
    }

    /// Enumerate and validate every entry without writing anything.
    fn plan<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<ArchiveEntry>> {
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive.by_index(index).map_err(|e| ErrorKind::zip(e, &self.source))?;
            let kind = match file.is_dir() {
                true => EntryKind::Directory,
                false => EntryKind::File,
            };
            entries.push(ArchiveEntry {
                path: entry_path(file.name())?,
                size: if kind == EntryKind::File { file.size() } else { 0 },
                kind,
                index,
            });
        }
        Ok(entries)
    }

    fn copy(
        &self,
        reader: &mut impl Read,
        writer: &mut impl Write,
        target: &Path,
        buffer: &mut [u8],
        tracker: &mut Tracker<'_>,
    ) -> Result<()> {
        loop {
            let read = match reader.read(buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    exn::bail!(ErrorKind::InvalidArchive(e.to_string()))
                },
                Err(e) => exn::bail!(ErrorKind::Io(e)),
            };
            writer.write_all(&buffer[..read]).map_err(|e| ErrorKind::io(e, target))?;
            tracker.advance(read as u64);
            self.check_cancelled()?;
        }
        writer.flush().map_err(|e| ErrorKind::io(e, target))?;
        Ok(())
    }

    fn check_cancelled(&self) -> Result<()> {
        match self.cancellation.is_cancelled() {
            true => exn::bail!(ErrorKind::Cancelled),
            false => Ok(()),
        }
    }
}

/// Sum of entry sizes. Size headers come from the archive and can be
/// crafted, so this saturates instead of overflowing.
fn total_size(entries: &[ArchiveEntry]) -> u64 {
    entries.iter().map(|e| e.size).fold(0, u64::saturating_add)
}
