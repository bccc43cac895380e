use appfiles_core::Config;
use appfiles_storage::FileServer;
use std::sync::Arc;

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub file_server: Arc<dyn FileServer>,
}

impl AppState {
    pub fn new(config: Config, file_server: Arc<dyn FileServer>) -> Self {
        Self {
            config,
            file_server,
        }
    }
}
