use crate::fs::{FileStat, Filesystem};
use crate::traits::{SeekableReader, StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Local disk filesystem rooted at a directory
///
/// The absolute `/`-separated paths handed to [`Filesystem`] are resolved
/// under `root`; they can never escape it.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// Create a new LocalFs instance
    ///
    /// # Arguments
    /// * `root` - Directory holding the installed applications (e.g., "/var/lib/appfiles/apps")
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        let meta = fs::metadata(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to access apps directory {}: {}",
                root.display(),
                e
            ))
        })?;
        if !meta.is_dir() {
            return Err(StorageError::ConfigError(format!(
                "Apps directory {} is not a directory",
                root.display()
            )));
        }

        Ok(LocalFs { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Convert a logical path to a path under the root
    ///
    /// Parent (`..`) and platform-specific components are rejected as not
    /// found: nothing outside the root is ever reachable.
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let mut resolved = self.root.clone();
        for part in path.split('/').filter(|p| !p.is_empty() && *p != ".") {
            let mut components = Path::new(part).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(name)), None) => resolved.push(name),
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("{}: path escapes the apps directory", path),
                    ))
                }
            }
        }
        Ok(resolved)
    }
}

fn not_a_file(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: not a regular file", path.display()),
    )
}

#[async_trait]
impl Filesystem for LocalFs {
    async fn open(&self, path: &str) -> io::Result<SeekableReader> {
        let resolved = self.resolve(path)?;
        let file = fs::File::open(&resolved).await?;
        if !file.metadata().await?.is_file() {
            return Err(not_a_file(&resolved));
        }
        Ok(Box::pin(file))
    }

    async fn stat(&self, path: &str) -> io::Result<FileStat> {
        let resolved = self.resolve(path)?;
        let meta = fs::metadata(&resolved).await?;
        if !meta.is_file() {
            return Err(not_a_file(&resolved));
        }

        // A missing or pre-epoch modification time is served without Last-Modified.
        let modified = meta
            .modified()
            .ok()
            .map(DateTime::<Utc>::from)
            .filter(|time| time.timestamp() > 0);

        Ok(FileStat {
            size: meta.len(),
            modified,
        })
    }
}
