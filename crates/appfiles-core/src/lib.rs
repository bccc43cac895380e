//! Appfiles Core Library
//!
//! This crate provides the application category, storage backend selection,
//! error types and configuration shared by the storage and API crates.

pub mod app_type;
pub mod config;
pub mod constants;
pub mod error;
pub mod storage_types;

// Re-export commonly used types
pub use app_type::AppType;
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
// Note: FileServer, StorageError, StorageResult live in the appfiles-storage crate
