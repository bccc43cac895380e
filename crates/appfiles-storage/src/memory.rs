//! In-memory filesystem.
//!
//! Holds application files in a map keyed by their absolute path. Useful for
//! tests and for embedding assets without touching the disk.

use crate::fs::{FileStat, Filesystem};
use crate::paths::join_segments;
use crate::traits::SeekableReader;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io::{self, Cursor};
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct MemoryFile {
    data: Bytes,
    modified: DateTime<Utc>,
}

/// In-memory [`Filesystem`]
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RwLock<HashMap<String, MemoryFile>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a file, stamped with the current time.
    pub fn insert(&self, path: &str, data: impl Into<Bytes>) {
        self.insert_with_modified(path, data, Utc::now());
    }

    pub fn insert_with_modified(
        &self,
        path: &str,
        data: impl Into<Bytes>,
        modified: DateTime<Utc>,
    ) {
        let file = MemoryFile {
            data: data.into(),
            modified,
        };
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.insert(normalize(path), file);
    }

    fn get(&self, path: &str) -> io::Result<MemoryFile> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files.get(&normalize(path)).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{}: file does not exist", path))
        })
    }
}

fn normalize(path: &str) -> String {
    format!("/{}", join_segments([path]))
}

#[async_trait]
impl Filesystem for MemoryFs {
    async fn open(&self, path: &str) -> io::Result<SeekableReader> {
        let file = self.get(path)?;
        Ok(Box::pin(Cursor::new(file.data)))
    }

    async fn stat(&self, path: &str) -> io::Result<FileStat> {
        let file = self.get(path)?;
        Ok(FileStat {
            size: file.data.len() as u64,
            modified: Some(file.modified),
        })
    }
}
