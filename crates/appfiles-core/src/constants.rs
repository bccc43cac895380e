//! Shared constants.

/// Object-storage container holding web application bundles.
pub const WEBAPPS_CONTAINER: &str = "apps-web";

/// Object-storage container holding connector bundles.
pub const KONNECTORS_CONTAINER: &str = "apps-konnectors";

pub const DEFAULT_SERVER_PORT: u16 = 8080;
