//! Server configuration loaded from the environment
//!
//! Values are read once at startup (after `.env` has been loaded by the
//! binary) and never change while the server runs.

use std::path::PathBuf;

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use crate::error::ConfigError;

/// Default `Cache-Control` max-age for tile archives, in seconds
pub const DEFAULT_CACHE_MAX_AGE: u64 = 86400;

/// Origins allowed when `CORS_ORIGINS` is not set
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:5173"];

/// Tile server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileServerConfig {
    /// Application name used in startup logs
    pub app_name: String,
    /// Verbose logging
    pub debug: bool,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Directory holding the `.pmtiles` archives
    pub tiles_dir: PathBuf,
    /// Allowed CORS origins, `*` allows any origin
    pub cors_origins: Vec<String>,
    /// `Cache-Control` max-age for archive responses
    pub cache_max_age: u64,
}

impl Default for TileServerConfig {
    fn default() -> Self {
        Self {
            app_name: "Tile Server".to_string(),
            debug: false,
            log_json: false,
            host: "0.0.0.0".to_string(),
            port: 8000,
            tiles_dir: PathBuf::from("app/static/pmtiles"),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
        }
    }
}

impl TileServerConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Unset variables fall back to [`TileServerConfig::default`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: "PORT", value })?,
            None => defaults.port,
        };

        let cache_max_age = match var("TILE_CACHE_MAX_AGE") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "TILE_CACHE_MAX_AGE",
                value,
            })?,
            None => defaults.cache_max_age,
        };

        let debug = match var("DEBUG") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue { key: "DEBUG", value })?,
            None => defaults.debug,
        };

        let log_json = match var("LOG_FORMAT") {
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "json" => true,
                "text" | "pretty" | "full" => false,
                _ => return Err(ConfigError::InvalidValue { key: "LOG_FORMAT", value }),
            },
            None => defaults.log_json,
        };

        let cors_origins = match var("CORS_ORIGINS") {
            Some(value) => value
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.cors_origins,
        };

        Ok(Self {
            app_name: var("APP_NAME").unwrap_or(defaults.app_name),
            debug,
            log_json,
            host: var("HOST").unwrap_or(defaults.host),
            port,
            tiles_dir: var("TILES_DIR").map(PathBuf::from).unwrap_or(defaults.tiles_dir),
            cors_origins,
            cache_max_age,
        })
    }

    /// Address string to bind the listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `Cache-Control` value for archive responses
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age)
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "debug,tower_http=debug"
        } else {
            "info"
        }
    }

    /// CORS layer for the configured origins
    ///
    /// An empty list or `*` allows any origin without credentials. Otherwise
    /// only the listed origins are allowed, with credentials.
    pub fn cors_layer(&self) -> CorsLayer {
        if self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*") {
            return CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
        }

        let origins: Vec<HeaderValue> = self
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
