//! HTTP server for PMTiles map archives
//!
//! This crate serves `.pmtiles` files from a fixed tiles directory with
//! single byte-range support, so that browser map clients can fetch only the
//! parts of an archive they need.

pub mod config;
pub mod error;
pub mod payload;
pub mod range;
mod server;
mod state;
pub mod validate;

pub use config::TileServerConfig;
pub use error::{ConfigError, TileError};
pub use range::{parse_range, ByteRange, RangeError, READ_AHEAD_CAP};
pub use server::{serve_asset, AssetRequest, TileServerApi};
pub use state::ServerState;
pub use validate::{resolve, sanitize, ResolvedAsset, TILE_EXTENSION};

/// Result type alias for tile server operations
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
