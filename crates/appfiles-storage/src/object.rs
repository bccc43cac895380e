//! Object-storage file server.
//!
//! Application files are objects named `{slug}/{version}/{file}` in one
//! container per application category.

use crate::paths::object_name;
use crate::traits::{
    AssetContent, AssetFile, AssetMetadata, AssetReader, FileServer, StorageError, StorageResult,
};
use crate::{AppType, StorageBackend};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::TryStreamExt;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{GetOptions, GetResult, ObjectMeta, ObjectStore, ObjectStoreExt};
use std::io;
use std::sync::Arc;
use tokio_util::io::StreamReader;

/// Store handle bound to one container
pub type ContainerStore = Arc<dyn ObjectStore>;

/// Connection to an object-storage service, handing out per-container stores
pub trait ObjectConnection: Send + Sync {
    fn container(&self, name: &str) -> StorageResult<ContainerStore>;
}

/// S3 (and S3-compatible) connection
#[cfg(feature = "storage-s3")]
#[derive(Debug, Clone)]
pub struct S3Connection {
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

#[cfg(feature = "storage-s3")]
impl S3Connection {
    /// Create a new S3Connection
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    ///
    /// Credentials are read from the environment by the object_store builder.
    pub fn new(region: String, endpoint_url: Option<String>) -> Self {
        S3Connection {
            region,
            endpoint_url,
        }
    }
}

#[cfg(feature = "storage-s3")]
impl ObjectConnection for S3Connection {
    fn container(&self, name: &str) -> StorageResult<ContainerStore> {
        use object_store::aws::AmazonS3Builder;

        let mut builder = AmazonS3Builder::from_env()
            .with_region(self.region.clone())
            .with_bucket_name(name);

        if let Some(ref endpoint) = self.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Arc::new(store))
    }
}

/// Object-storage implementation of [`FileServer`]
#[derive(Clone)]
pub struct ObjectFileServer {
    store: ContainerStore,
    container: &'static str,
}

impl ObjectFileServer {
    /// Create a file server reading from the container of `app_type`.
    pub fn new(conn: &dyn ObjectConnection, app_type: AppType) -> StorageResult<Self> {
        let container = app_type.container_name();
        let store = conn.container(container)?;

        tracing::info!(
            container = %container,
            app_type = %app_type,
            "Object storage file server configured"
        );

        Ok(ObjectFileServer { store, container })
    }

    /// Create a file server over a store already bound to the container of `app_type`.
    pub fn with_store(store: ContainerStore, app_type: AppType) -> Self {
        ObjectFileServer {
            store,
            container: app_type.container_name(),
        }
    }

    pub fn container(&self) -> &str {
        self.container
    }
}

/// Location of an object key, taken verbatim.
///
/// Keys that no object can have (`.` or `..` segments, control characters)
/// are reported as not found.
fn object_location(key: &str) -> StorageResult<Path> {
    Path::parse(key).map_err(|e| {
        tracing::debug!(error = %e, key = %key, "Invalid object key");
        StorageError::NotFound(key.to_string())
    })
}

/// Both a missing object and a missing container come back as `NotFound`
/// from the object_store client.
fn map_error(err: ObjectStoreError, container: &str, key: &str, elapsed_ms: f64) -> StorageError {
    match err {
        ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
        other => {
            tracing::error!(
                error = %other,
                container = %container,
                key = %key,
                duration_ms = elapsed_ms,
                "Object storage read failed"
            );
            StorageError::backend(format!("Failed to read object {}", key), other)
        }
    }
}

fn asset_metadata(meta: &ObjectMeta) -> AssetMetadata {
    AssetMetadata {
        size: meta.size,
        // An epoch timestamp means the store had no usable Last-Modified.
        last_modified: Some(meta.last_modified).filter(|time| time.timestamp() > 0),
        etag: meta.e_tag.clone(),
    }
}

fn into_reader(result: GetResult) -> AssetReader {
    let stream = result.into_stream().map_err(io::Error::other);
    Box::pin(StreamReader::new(stream))
}

/// Object content fetched on demand with one ranged request
struct ObjectContent {
    store: ContainerStore,
    container: &'static str,
    key: String,
    location: Path,
    etag: Option<String>,
}

impl ObjectContent {
    async fn fetch(self, offset: u64, length: u64) -> StorageResult<AssetReader> {
        if length == 0 {
            return Ok(Box::pin(tokio::io::empty()));
        }

        let start = std::time::Instant::now();
        // The etag pins the content to the metadata already sent.
        let options = GetOptions::new()
            .with_range(Some(offset..offset + length))
            .with_if_match(self.etag.clone());
        let result = self
            .store
            .get_opts(&self.location, options)
            .await
            .map_err(|e| {
                map_error(
                    e,
                    self.container,
                    &self.key,
                    start.elapsed().as_secs_f64() * 1000.0,
                )
            })?;

        tracing::debug!(
            container = %self.container,
            key = %self.key,
            offset,
            length,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object range requested"
        );

        Ok(into_reader(result))
    }
}

impl AssetContent for ObjectContent {
    fn read_range(
        self: Box<Self>,
        offset: u64,
        length: u64,
    ) -> BoxFuture<'static, StorageResult<AssetReader>> {
        Box::pin((*self).fetch(offset, length))
    }
}

#[async_trait]
impl FileServer for ObjectFileServer {
    async fn open(&self, slug: &str, version: &str, file: &str) -> StorageResult<AssetReader> {
        let start = std::time::Instant::now();
        let key = object_name(slug, version, file);
        let location = object_location(&key)?;

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| map_error(e, self.container, &key, start.elapsed().as_secs_f64() * 1000.0))?;

        tracing::debug!(
            container = %self.container,
            key = %key,
            size_bytes = result.meta.size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object opened"
        );

        Ok(into_reader(result))
    }

    /// Fetches the object metadata only; content is requested when read.
    async fn open_with_metadata(
        &self,
        slug: &str,
        version: &str,
        file: &str,
    ) -> StorageResult<AssetFile> {
        let start = std::time::Instant::now();
        let key = object_name(slug, version, file);
        let location = object_location(&key)?;

        let meta = self
            .store
            .head(&location)
            .await
            .map_err(|e| map_error(e, self.container, &key, start.elapsed().as_secs_f64() * 1000.0))?;
        let metadata = asset_metadata(&meta);

        tracing::debug!(
            container = %self.container,
            key = %key,
            size_bytes = metadata.size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object metadata fetched"
        );

        let content = ObjectContent {
            store: self.store.clone(),
            container: self.container,
            key: key.clone(),
            location,
            etag: metadata.etag.clone(),
        };

        Ok(AssetFile {
            name: key,
            metadata,
            content: Box::new(content),
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Object
    }
}
