//! File server abstraction
//!
//! This module defines the FileServer trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use http::{HeaderMap, Method};
use std::fmt;
use std::io::SeekFrom;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

/// Boxed error kept as the cause of a backend failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Storage operation errors
///
/// Backends fold their native errors into these variants: a missing object,
/// container or file is always `NotFound`, anything else is `BackendError`
/// with the original error kept as source.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {message}")]
    BackendError {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    pub fn backend(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        StorageError::BackendError {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte stream of an asset, positioned at its first byte.
///
/// Dropping the reader releases the underlying file or connection.
pub type AssetReader = Pin<Box<dyn AsyncRead + Send>>;

/// Byte stream that can be repositioned, such as a file or an in-memory buffer
pub trait SeekableRead: AsyncRead + AsyncSeek + Send {}

impl<T: AsyncRead + AsyncSeek + Send> SeekableRead for T {}

pub type SeekableReader = Pin<Box<dyn SeekableRead>>;

/// Logical address of an application file
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Deserialize)]
pub struct AssetCoordinate {
    pub slug: String,
    pub version: String,
    pub file: String,
}

impl AssetCoordinate {
    pub fn new(
        slug: impl Into<String>,
        version: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            version: version.into(),
            file: file.into(),
        }
    }
}

impl fmt::Display for AssetCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.slug, self.version, self.file)
    }
}

/// Metadata obtained when an asset is opened
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetMetadata {
    pub size: u64,
    /// `None` when the backend has no usable modification time
    pub last_modified: Option<DateTime<Utc>>,
    /// Entity tag, forwarded as given by the backend
    pub etag: Option<String>,
}

/// Content of an opened asset
///
/// The content server asks for exactly the bytes it sends, so a range request
/// never transfers the part of the asset before the range.
pub trait AssetContent: Send {
    /// Reader over `length` bytes starting at `offset`.
    fn read_range(
        self: Box<Self>,
        offset: u64,
        length: u64,
    ) -> BoxFuture<'static, StorageResult<AssetReader>>;
}

/// [`AssetContent`] over an already opened, seekable stream
pub struct SeekableContent {
    name: String,
    reader: SeekableReader,
}

impl SeekableContent {
    pub fn new(name: impl Into<String>, reader: SeekableReader) -> Self {
        Self {
            name: name.into(),
            reader,
        }
    }

    async fn read_from(mut self, offset: u64, length: u64) -> StorageResult<AssetReader> {
        if offset > 0 {
            self.reader.seek(SeekFrom::Start(offset)).await.map_err(|e| {
                tracing::error!(error = %e, name = %self.name, offset, "Failed to seek to range start");
                StorageError::backend(format!("Failed to read {}", self.name), e)
            })?;
        }
        Ok(Box::pin(self.reader.take(length)))
    }
}

impl AssetContent for SeekableContent {
    fn read_range(
        self: Box<Self>,
        offset: u64,
        length: u64,
    ) -> BoxFuture<'static, StorageResult<AssetReader>> {
        Box::pin((*self).read_from(offset, length))
    }
}

/// An opened asset: its resolved name, metadata and content
pub struct AssetFile {
    /// Resolved object key or filesystem path, used for content-type inference and logs
    pub name: String,
    pub metadata: AssetMetadata,
    pub content: Box<dyn AssetContent>,
}

impl AssetFile {
    /// Reader over the whole asset.
    pub async fn into_reader(self) -> StorageResult<AssetReader> {
        self.content.read_range(0, self.metadata.size).await
    }
}

impl fmt::Debug for AssetFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetFile")
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Application file server trait
///
/// Implemented by the object-storage and filesystem backends so the HTTP
/// layer can read and serve application files without knowing where they
/// are stored. Implementations hold only immutable configuration and can be
/// shared across requests.
#[async_trait]
pub trait FileServer: Send + Sync {
    /// Open an application file for reading.
    ///
    /// The caller owns the returned reader.
    async fn open(&self, slug: &str, version: &str, file: &str) -> StorageResult<AssetReader> {
        self.open_with_metadata(slug, version, file)
            .await?
            .into_reader()
            .await
    }

    /// Open an application file along with its size, modification time and entity tag.
    async fn open_with_metadata(
        &self,
        slug: &str,
        version: &str,
        file: &str,
    ) -> StorageResult<AssetFile>;

    /// Build the HTTP response serving an application file.
    ///
    /// Conditional requests (`If-None-Match`, `If-Modified-Since`, ...) and
    /// single byte ranges are honored. Only the bytes sent are read; the
    /// reader is moved into the response body and released when the body is
    /// finished or dropped.
    async fn serve_content(
        &self,
        method: &Method,
        headers: &HeaderMap,
        slug: &str,
        version: &str,
        file: &str,
    ) -> StorageResult<Response> {
        let asset = self.open_with_metadata(slug, version, file).await?;
        crate::serve::serve_content(method, headers, asset).await
    }

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
