//! Shared setup for the HTTP route tests

use appfiles_api::{setup, state::AppState};
use appfiles_core::{AppType, Config, StorageBackend};
use appfiles_storage::{FileServer, FsFileServer, MemoryFs, ObjectFileServer};
use axum_test::TestServer;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStoreExt, PutPayload};
use std::sync::Arc;

fn test_config(storage_backend: StorageBackend, environment: &str) -> Config {
    Config {
        server_port: 0,
        environment: environment.to_string(),
        storage_backend,
        app_type: AppType::Webapp,
        fs_root: Some("/".to_string()),
        s3_region: None,
        s3_endpoint: None,
        legacy_fallback: true,
    }
}

fn server_for(config: Config, file_server: Arc<dyn FileServer>) -> TestServer {
    let state = Arc::new(AppState::new(config, file_server));
    TestServer::new(setup::routes(state).into_make_service())
        .expect("Failed to create test server")
}

/// Test server over the filesystem backend, reading from `fs`
pub fn fs_server(fs: MemoryFs) -> TestServer {
    fs_server_in(fs, "test")
}

/// Same as [`fs_server`], running in the given environment
pub fn fs_server_in(fs: MemoryFs, environment: &str) -> TestServer {
    let file_server = FsFileServer::new(Arc::new(fs), None);
    server_for(test_config(StorageBackend::Fs, environment), Arc::new(file_server))
}

/// Test server over the object-storage backend, seeded with `objects`
pub async fn object_server(objects: &[(&str, &'static str)]) -> TestServer {
    let store = Arc::new(InMemory::new());
    for &(key, data) in objects {
        store
            .put(
                &Path::parse(key).expect("Invalid object key"),
                PutPayload::from_static(data.as_bytes()),
            )
            .await
            .expect("Failed to seed object store");
    }

    let file_server = ObjectFileServer::with_store(store, AppType::Webapp);
    server_for(test_config(StorageBackend::Object, "test"), Arc::new(file_server))
}
