//! Error types for the tile server

use std::path::PathBuf;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::range::RangeError;

/// JSON body of every error response
#[derive(Debug, Serialize)]
struct ErrorDetail {
    detail: String,
}

/// Failure while answering a tile request
///
/// Messages only ever carry the sanitized filename.
#[derive(Debug, Error)]
pub enum TileError {
    #[error("Only .pmtiles files are supported")]
    InvalidRequest,

    #[error("File {name} not found in {}. Place it there.", .base_dir.display())]
    NotFound { name: String, base_dir: PathBuf },

    #[error("{source}")]
    Range {
        #[source]
        source: RangeError,
        /// Size of the file the range was checked against
        size: u64,
    },

    #[error("Failed to read tile archive: {0}")]
    StorageIo(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl TileError {
    /// HTTP status this error is answered with
    pub fn status_code(&self) -> StatusCode {
        match self {
            TileError::InvalidRequest => StatusCode::BAD_REQUEST,
            TileError::NotFound { .. } => StatusCode::NOT_FOUND,
            TileError::Range { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            TileError::StorageIo(_) | TileError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TileError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("Rejected tile request: {}", self);
        }

        let body = ErrorDetail {
            detail: self.to_string(),
        };
        let mut response = (status, Json(body)).into_response();

        if let TileError::Range { size, .. } = self {
            if let Ok(value) = HeaderValue::from_str(&format!("bytes */{}", size)) {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
        }

        response
    }
}

/// Failure while loading configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(TileError::InvalidRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            TileError::NotFound {
                name: "a.pmtiles".to_string(),
                base_dir: PathBuf::from("/srv/tiles"),
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TileError::Range {
                source: RangeError::UnsupportedUnit("units".to_string()),
                size: 10,
            }
            .status_code(),
            StatusCode::RANGE_NOT_SATISFIABLE
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            TileError::from(io).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = TileError::NotFound {
            name: "world.pmtiles".to_string(),
            base_dir: PathBuf::from("/srv/tiles"),
        };
        assert_eq!(
            err.to_string(),
            "File world.pmtiles not found in /srv/tiles. Place it there."
        );
    }

    #[test]
    fn test_range_response_reports_size() {
        let err = TileError::Range {
            source: RangeError::Malformed("empty range"),
            size: 1000,
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(
            response.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes */1000"
        );
    }
}
