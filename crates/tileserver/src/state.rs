//! Shared, read-only server state

use std::path::Path;
use std::sync::Arc;

use crate::config::TileServerConfig;

/// State handed to every request handler
///
/// Built once at startup; handlers only ever read from it.
#[derive(Debug, Clone)]
pub struct ServerState {
    config: Arc<TileServerConfig>,
    /// Precomputed `Cache-Control` value
    cache_control: Arc<str>,
}

impl ServerState {
    /// Create new server state
    ///
    /// # Arguments
    /// * `config` - Configuration loaded at startup
    pub fn new(config: TileServerConfig) -> Self {
        let cache_control = Arc::from(config.cache_control());
        Self {
            config: Arc::new(config),
            cache_control,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &TileServerConfig {
        &self.config
    }

    /// Get the tiles directory
    pub fn tiles_dir(&self) -> &Path {
        &self.config.tiles_dir
    }

    /// Get the `Cache-Control` value for archive responses
    pub fn cache_control(&self) -> &str {
        &self.cache_control
    }
}
