use appfiles_api::{setup, state::AppState, telemetry};
use appfiles_core::Config;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    telemetry::init_telemetry().map_err(|e| anyhow::anyhow!("Failed to init tracing: {}", e))?;

    // An unusable backend (unknown category, missing root, bad credentials) aborts startup.
    let file_server = appfiles_storage::create_file_server(&config).await?;
    tracing::info!(
        backend = %file_server.backend_type(),
        app_type = %config.app_type,
        "File server ready"
    );

    let state = Arc::new(AppState::new(config.clone(), file_server));
    let router = setup::routes(state);

    setup::start_server(&config, router).await?;

    Ok(())
}
