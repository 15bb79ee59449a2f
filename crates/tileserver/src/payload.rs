//! Building tile archive responses with range request support

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::error::TileError;
use crate::range::ByteRange;
use crate::validate::ResolvedAsset;

/// Archives are opaque binary blobs
pub const TILE_CONTENT_TYPE: &str = "application/octet-stream";

/// Headers browser clients must be able to read cross-origin
pub const EXPOSED_HEADERS: &str = "Content-Length, Content-Range";

/// Stream an archive, or a window of it, into a response
///
/// The file handle is owned by the body stream and released once the stream
/// finishes or the client goes away.
///
/// # Arguments
/// * `asset` - Resolved archive
/// * `range` - Validated window, `None` for the whole file
/// * `cache_control` - Value of the `Cache-Control` header
pub async fn respond(
    asset: &ResolvedAsset,
    range: Option<ByteRange>,
    cache_control: &str,
) -> Result<Response, TileError> {
    let mut file = File::open(&asset.path).await?;

    let builder = Response::builder()
        .header(header::CONTENT_TYPE, TILE_CONTENT_TYPE)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::ACCESS_CONTROL_EXPOSE_HEADERS, EXPOSED_HEADERS)
        .header(header::CACHE_CONTROL, cache_control);

    let response = match range {
        Some(range) => {
            file.seek(SeekFrom::Start(range.start)).await?;

            tracing::debug!(
                "Serving {} bytes {}-{} of {}",
                asset.name,
                range.start,
                range.end,
                asset.size_bytes
            );

            let stream = ReaderStream::new(file.take(range.len()));
            builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_RANGE, range.content_range(asset.size_bytes))
                .header(header::CONTENT_LENGTH, range.len())
                .body(Body::from_stream(stream))
        }
        None => {
            tracing::debug!("Serving {} in full ({} bytes)", asset.name, asset.size_bytes);

            let stream = ReaderStream::new(file);
            builder
                .status(StatusCode::OK)
                .header(header::CONTENT_LENGTH, asset.size_bytes)
                .body(Body::from_stream(stream))
        }
    };

    response.map_err(|e| TileError::Internal(format!("Failed to build response: {}", e)))
}
