use crate::error::{ServerError, ServerResult};
use crate::middleware::{is_usable_id, RequestId};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use dendroscan::{PredictResponse, StorageError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Request to classify a photo that already lives in the object store
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Location of the uploaded photo, `http(s)://host/bucket/folder/file`
    pub url: String,

    /// Caller's request id; used in object names when it is a valid path segment
    #[serde(default)]
    pub request_id: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResponse {
    pub scan_id: String,
    pub predict: PredictResponse,
}

/// Downloads the photo, classifies it and returns every plant found
pub async fn scan(
    State(state): State<Arc<ServerState>>,
    Extension(RequestId(header_id)): Extension<RequestId>,
    Json(req): Json<ScanRequest>,
) -> ServerResult<impl IntoResponse> {
    let request_id = req
        .request_id
        .as_deref()
        .map(str::trim)
        .filter(|s| is_usable_id(s))
        .unwrap_or(header_id.as_str())
        .to_string();

    let source = source_url(&req.url, state.config.pipeline.public_bucket_url.as_deref())?;
    info!(
        request_id = %request_id,
        user_id = req.user_id.as_deref().unwrap_or(""),
        source = %source,
        "scan requested"
    );

    let predict = state.pipeline.predict_url(&source, &request_id).await?;

    Ok(Json(ScanResponse {
        scan_id: uuid::Uuid::new_v4().to_string(),
        predict,
    }))
}

/// Where to fetch the photo from: the public bucket when one is configured,
/// otherwise the URL as given.
fn source_url(url: &str, public_bucket: Option<&str>) -> Result<String, ServerError> {
    match public_bucket {
        Some(base) => Ok(storage::resolve_public_url(url, base)?),
        None if url.trim().starts_with("http") => Ok(url.trim().to_string()),
        None => Err(StorageError::InvalidUrl(url.to_string()).into()),
    }
}
