//! Appfiles Storage Library
//!
//! Read-only access to installed application files (webapps and konnectors)
//! through the [`FileServer`] trait, whatever the storage backend.
//!
//! # Path layout
//!
//! A file is addressed by `(slug, version, file)`:
//!
//! - **Object storage**: key `{slug}/{version}/{file}` in the container of the
//!   application's category (`apps-web` or `apps-konnectors`).
//! - **Filesystem**: `/{slug}/{version}/{file}` by default, with a fallback to
//!   the pre-versioning layout `/{slug}/{file}` when the versioned file is
//!   missing.
//!
//! These layouts are shared with the installer and must stay stable. Path
//! construction is centralized in the `paths` module.

pub mod content_type;
pub mod factory;
pub mod fs;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
pub mod object;
pub mod paths;
pub mod serve;
pub mod traits;

// Re-export commonly used types
pub use appfiles_core::{AppType, StorageBackend};
pub use factory::create_file_server;
pub use fs::{FileStat, Filesystem, FsFileServer, MakePath};
#[cfg(feature = "storage-local")]
pub use local::LocalFs;
pub use memory::MemoryFs;
#[cfg(feature = "storage-s3")]
pub use object::S3Connection;
pub use object::{ObjectConnection, ObjectFileServer};
pub use traits::{
    AssetContent, AssetCoordinate, AssetFile, AssetMetadata, AssetReader, FileServer,
    SeekableContent, SeekableRead, SeekableReader, StorageError, StorageResult,
};
