use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::constants::{KONNECTORS_CONTAINER, WEBAPPS_CONTAINER};

/// Application category
///
/// Decides which object-storage container an application's files live in.
/// The set is closed: parsing any other name fails, so a misconfigured
/// category stops startup instead of silently picking a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    Webapp,
    Konnector,
}

impl AppType {
    /// Name of the container the category's files are stored in.
    pub fn container_name(self) -> &'static str {
        match self {
            AppType::Webapp => WEBAPPS_CONTAINER,
            AppType::Konnector => KONNECTORS_CONTAINER,
        }
    }
}

impl FromStr for AppType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "webapp" | "webapps" => Ok(AppType::Webapp),
            "konnector" | "konnectors" | "connector" => Ok(AppType::Konnector),
            _ => Err(anyhow::anyhow!("Unknown application type: {}", s)),
        }
    }
}

impl Display for AppType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AppType::Webapp => write!(f, "webapp"),
            AppType::Konnector => write!(f, "konnector"),
        }
    }
}
