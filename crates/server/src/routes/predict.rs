use crate::error::{ServerError, ServerResult};
use crate::middleware::RequestId;
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::sync::Arc;

/// Classifies the photo sent as the raw request body
pub async fn predict(
    State(state): State<Arc<ServerState>>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    body: Bytes,
) -> ServerResult<impl IntoResponse> {
    if body.is_empty() {
        return Err(ServerError::BadRequest("request body must be an image".into()));
    }
    let response = state.pipeline.predict(&body, &request_id).await?;
    Ok(Json(response))
}
