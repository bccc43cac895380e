//! Filesystem file server.
//!
//! Serves application files from any [`Filesystem`] implementation (local
//! disk, in-memory, ...). Paths are built by a pluggable [`MakePath`]
//! function and applications installed before versioned directories existed
//! are still found through their legacy path.

use crate::paths::{default_make_path, legacy_make_path};
use crate::traits::{
    AssetFile, AssetMetadata, AssetReader, FileServer, SeekableContent, SeekableReader,
    StorageError, StorageResult,
};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::io;
use std::sync::Arc;

/// Builds the filesystem path of `(slug, version, file)`.
pub type MakePath = Arc<dyn Fn(&str, &str, &str) -> String + Send + Sync>;

/// Size and modification time of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Read-only filesystem abstraction
///
/// Paths are absolute and `/`-separated. A missing file (or a path that does
/// not name a regular file) must be reported with `io::ErrorKind::NotFound`;
/// that is the only condition that triggers the legacy path fallback.
/// Opened files are seekable so range requests start reading at the range.
#[async_trait]
pub trait Filesystem: Send + Sync {
    async fn open(&self, path: &str) -> io::Result<SeekableReader>;

    async fn stat(&self, path: &str) -> io::Result<FileStat>;
}

/// Filesystem-backed implementation of [`FileServer`]
#[derive(Clone)]
pub struct FsFileServer {
    fs: Arc<dyn Filesystem>,
    make_path: MakePath,
    legacy_fallback: bool,
}

impl FsFileServer {
    /// Create a new FsFileServer
    ///
    /// # Arguments
    /// * `fs` - Filesystem holding the installed applications
    /// * `make_path` - Path construction; `/{slug}/{version}/{file}` when `None`
    pub fn new(fs: Arc<dyn Filesystem>, make_path: Option<MakePath>) -> Self {
        FsFileServer {
            fs,
            make_path: make_path.unwrap_or_else(|| Arc::new(default_make_path) as MakePath),
            legacy_fallback: true,
        }
    }

    /// Enable or disable the fallback to `/{slug}/{file}`.
    pub fn with_legacy_fallback(mut self, enabled: bool) -> Self {
        self.legacy_fallback = enabled;
        self
    }

    pub fn without_legacy_fallback(self) -> Self {
        self.with_legacy_fallback(false)
    }

    /// Run `op` on the primary path, then once on the legacy path if the
    /// primary one does not exist. Any other error is returned as is.
    async fn resolve<T, F, Fut>(
        &self,
        slug: &str,
        version: &str,
        file: &str,
        op: F,
    ) -> StorageResult<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = io::Result<T>>,
    {
        let path = (self.make_path)(slug, version, file);
        let err = match op(path.clone()).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if err.kind() != io::ErrorKind::NotFound || !self.legacy_fallback {
            return Err(map_io_error(err, &path));
        }

        let legacy_path = legacy_make_path(slug, version, file);
        tracing::debug!(
            slug = %slug,
            version = %version,
            path = %path,
            legacy_path = %legacy_path,
            "Versioned path missing, trying legacy path"
        );
        op(legacy_path.clone())
            .await
            .map_err(|e| map_io_error(e, &legacy_path))
    }

    async fn open_at(&self, path: String) -> io::Result<AssetFile> {
        let stat = self.fs.stat(&path).await?;
        let reader = self.fs.open(&path).await?;
        Ok(AssetFile {
            content: Box::new(SeekableContent::new(path.clone(), reader)),
            name: path,
            metadata: AssetMetadata {
                size: stat.size,
                last_modified: stat.modified,
                etag: None,
            },
        })
    }
}

fn map_io_error(err: io::Error, path: &str) -> StorageError {
    if err.kind() == io::ErrorKind::NotFound {
        return StorageError::NotFound(path.to_string());
    }
    tracing::error!(error = %err, path = %path, "Filesystem read failed");
    StorageError::backend(format!("Failed to read {}", path), err)
}

#[async_trait]
impl FileServer for FsFileServer {
    async fn open(&self, slug: &str, version: &str, file: &str) -> StorageResult<AssetReader> {
        let fs = &self.fs;
        let reader = self
            .resolve(slug, version, file, |path| async move { fs.open(&path).await })
            .await?;
        Ok(Box::pin(reader) as AssetReader)
    }

    async fn open_with_metadata(
        &self,
        slug: &str,
        version: &str,
        file: &str,
    ) -> StorageResult<AssetFile> {
        let start = std::time::Instant::now();
        let asset = self
            .resolve(slug, version, file, |path| self.open_at(path))
            .await?;

        tracing::debug!(
            path = %asset.name,
            size_bytes = asset.metadata.size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Filesystem asset opened"
        );

        Ok(asset)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Fs
    }
}
