// Application state module

use std::path::PathBuf;

use super::types::Config;

/// Shared application state handed to every connection.
///
/// The gateway is stateless between requests; the only thing worth sharing
/// is the immutable configuration and the resolved data directory.
pub struct AppState {
    pub config: Config,
    pub data_dir: PathBuf,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let data_dir = PathBuf::from(&config.storage.data_dir);
        Self { config, data_dir }
    }
}
