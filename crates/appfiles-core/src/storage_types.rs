use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Selects where application files are read from. It's defined in core
/// because it's part of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Object-storage containers (S3 and compatible providers)
    Object,
    /// Hierarchical filesystem rooted at a directory
    Fs,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "object" | "s3" | "swift" => Ok(StorageBackend::Object),
            "fs" | "local" => Ok(StorageBackend::Fs),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Object => write!(f, "object"),
            StorageBackend::Fs => write!(f, "fs"),
        }
    }
}
