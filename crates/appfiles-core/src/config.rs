//! Configuration module
//!
//! Loads the server and storage settings from the environment (and a `.env`
//! file when present).

use std::env;

use crate::app_type::AppType;
use crate::constants::DEFAULT_SERVER_PORT;
use crate::storage_types::StorageBackend;

/// Server and storage configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub storage_backend: StorageBackend,
    /// Category served by this instance; selects the object-storage container
    pub app_type: AppType,
    /// Root directory of the filesystem backend
    pub fs_root: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, Ceph, etc.)
    /// Whether the filesystem backend retries `/slug/file` when `/slug/version/file` is missing
    pub legacy_fallback: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => DEFAULT_SERVER_PORT,
        };

        let storage_backend = lookup("APPS_STORAGE_BACKEND")
            .or_else(|| lookup("STORAGE_BACKEND"))
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or(StorageBackend::Fs);

        let app_type = lookup("APPS_TYPE")
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or(AppType::Webapp);

        let legacy_fallback = match lookup("APPS_LEGACY_FALLBACK") {
            Some(value) => parse_bool(&value).ok_or_else(|| {
                anyhow::anyhow!("APPS_LEGACY_FALLBACK must be true or false, got {}", value)
            })?,
            None => true,
        };

        let config = Config {
            server_port,
            environment,
            storage_backend,
            app_type,
            fs_root: lookup("APPS_FS_ROOT"),
            s3_region: lookup("S3_REGION").or_else(|| lookup("AWS_REGION")),
            s3_endpoint: lookup("S3_ENDPOINT"),
            legacy_fallback,
        };

        if config.storage_backend == StorageBackend::Fs && config.fs_root.is_none() {
            return Err(anyhow::anyhow!(
                "APPS_FS_ROOT is required when the fs storage backend is selected"
            ));
        }

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_for_fs_backend() {
        let config = config_from(&[("APPS_FS_ROOT", "/var/lib/apps")]).unwrap();
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(config.storage_backend, StorageBackend::Fs);
        assert_eq!(config.app_type, AppType::Webapp);
        assert!(config.legacy_fallback);
        assert!(!config.is_production());
    }

    #[test]
    fn test_fs_backend_requires_root() {
        assert!(config_from(&[]).is_err());
    }

    #[test]
    fn test_object_backend_settings() {
        let config = config_from(&[
            ("APPS_STORAGE_BACKEND", "s3"),
            ("APPS_TYPE", "konnector"),
            ("AWS_REGION", "eu-west-3"),
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("APPS_LEGACY_FALLBACK", "false"),
            ("PORT", "9090"),
        ])
        .unwrap();
        assert_eq!(config.storage_backend, StorageBackend::Object);
        assert_eq!(config.app_type, AppType::Konnector);
        assert_eq!(config.s3_region.as_deref(), Some("eu-west-3"));
        assert_eq!(config.s3_endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(!config.legacy_fallback);
        assert_eq!(config.server_port, 9090);
    }

    #[test]
    fn test_unknown_app_type_is_rejected() {
        let result = config_from(&[("APPS_FS_ROOT", "/apps"), ("APPS_TYPE", "plugin")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_from(&[("APPS_FS_ROOT", "/apps"), ("PORT", "http")]).is_err());
        assert!(config_from(&[("APPS_FS_ROOT", "/apps"), ("APPS_LEGACY_FALLBACK", "maybe")]).is_err());
    }
}
