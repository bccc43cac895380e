#[cfg(feature = "storage-local")]
use crate::{FsFileServer, LocalFs};
#[cfg(feature = "storage-s3")]
use crate::{ObjectFileServer, S3Connection};
use crate::{FileServer, StorageBackend, StorageError, StorageResult};
use appfiles_core::Config;
use std::sync::Arc;

/// Create the file server selected by configuration
pub async fn create_file_server(config: &Config) -> StorageResult<Arc<dyn FileServer>> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::Object => {
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let conn = S3Connection::new(region, config.s3_endpoint.clone());

            let server = ObjectFileServer::new(&conn, config.app_type)?;
            Ok(Arc::new(server))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::Object => Err(StorageError::ConfigError(
            "Object storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Fs => {
            let root = config.fs_root.clone().ok_or_else(|| {
                StorageError::ConfigError("APPS_FS_ROOT not configured".to_string())
            })?;

            let fs = LocalFs::new(root).await?;
            tracing::info!(
                root = %fs.root().display(),
                legacy_fallback = config.legacy_fallback,
                "Filesystem file server configured"
            );

            let server =
                FsFileServer::new(Arc::new(fs), None).with_legacy_fallback(config.legacy_fallback);
            Ok(Arc::new(server))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Fs => Err(StorageError::ConfigError(
            "Filesystem backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fs_config(root: &str, legacy_fallback: bool) -> Config {
        Config {
            server_port: 8080,
            environment: "test".to_string(),
            storage_backend: StorageBackend::Fs,
            app_type: appfiles_core::AppType::Webapp,
            fs_root: Some(root.to_string()),
            s3_region: None,
            s3_endpoint: None,
            legacy_fallback,
        }
    }

    #[tokio::test]
    async fn test_create_fs_file_server() {
        let dir = tempdir().unwrap();
        tokio::fs::create_dir_all(dir.path().join("mynotes")).await.unwrap();
        tokio::fs::write(dir.path().join("mynotes/index.html"), "legacy")
            .await
            .unwrap();

        let config = fs_config(dir.path().to_str().unwrap(), false);
        let server = create_file_server(&config).await.unwrap();
        assert_eq!(server.backend_type(), StorageBackend::Fs);

        // Fallback disabled by configuration.
        let err = server.open("mynotes", "1.2.0", "index.html").await.err().unwrap();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_missing_fs_root_fails() {
        let config = fs_config("/nonexistent/appfiles/root", true);
        let result = create_file_server(&config).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }

    #[cfg(feature = "storage-s3")]
    #[tokio::test]
    async fn test_object_backend_requires_region() {
        let mut config = fs_config("/unused", true);
        config.storage_backend = StorageBackend::Object;
        let result = create_file_server(&config).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
