//! API route handlers
//!
//! - `health`: liveness and readiness
//! - `scan`: classify a photo already in the object store
//! - `predict`: classify a photo sent in the request body

pub mod health;
pub mod predict;
pub mod scan;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "DendroScan Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/scan",
            "/api/v1/predict",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
