//! HTTP server implementation with range request support

use axum::{
    extract::{MatchedPath, Path, Request, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use tower_http::trace::TraceLayer;

use crate::config::TileServerConfig;
use crate::error::TileError;
use crate::payload;
use crate::range::parse_range;
use crate::state::ServerState;
use crate::validate::resolve;

/// A single tile archive request as received from the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    /// Filename exactly as it appeared in the URL, not yet sanitized
    pub requested_name: String,
    /// Raw `Range` header value
    pub range_header: Option<String>,
}

impl AssetRequest {
    /// Build a request from the path segment and request headers
    ///
    /// A `Range` value that is not valid UTF-8 is kept lossily so it is
    /// rejected by the range parser rather than ignored.
    pub fn new(requested_name: String, headers: &HeaderMap) -> Self {
        let range_header = headers
            .get(header::RANGE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
        Self {
            requested_name,
            range_header,
        }
    }
}

/// Tile server API for managing the HTTP server
#[derive(Clone)]
pub struct TileServerApi {
    state: ServerState,
}

impl TileServerApi {
    /// Create a new tile server API
    ///
    /// # Arguments
    /// * `config` - Configuration loaded at startup
    pub fn new(config: TileServerConfig) -> Self {
        Self {
            state: ServerState::new(config),
        }
    }

    /// Get the server state
    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Create the axum router with all routes configured
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/tiles/:filename", get(get_tile))
            .route("/health", get(health_check))
            .with_state(self.state.clone())
            .layer(self.state.config().cors_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                // Record the route template, never the raw client path
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);
                tracing::info_span!("http_request", method = %request.method(), matched_path)
            }))
    }

    /// Start the tile server and run until `shutdown` resolves
    ///
    /// # Arguments
    /// * `shutdown` - Future that completes when the server should stop
    pub async fn serve<F>(self, shutdown: F) -> crate::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config().bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!(
            "Tile server listening on {} (tiles: {})",
            addr,
            self.state.tiles_dir().display()
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Tile server stopped");
        Ok(())
    }
}

/// Resolve, range-check and stream one archive request
pub async fn serve_asset(state: &ServerState, request: AssetRequest) -> Result<Response, TileError> {
    let asset = resolve(state.tiles_dir(), &request.requested_name).await?;

    let range = parse_range(request.range_header.as_deref(), asset.size_bytes).map_err(|source| {
        TileError::Range {
            source,
            size: asset.size_bytes,
        }
    })?;

    payload::respond(&asset, range, state.cache_control()).await
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(HealthStatus { status: "ok" })
}

/// Tile archive handler with range request support
async fn get_tile(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, TileError> {
    serve_asset(&state, AssetRequest::new(filename, &headers)).await
}
