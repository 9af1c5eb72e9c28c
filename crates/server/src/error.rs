use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dendroscan::{ConfigLoadError, PipelineError, StorageError};
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// `{"error": {"code", "message"}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// HTTP status and stable error code
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::Authentication(_) => (StatusCode::FORBIDDEN, "AUTH_FAILED"),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ServerError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ServerError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            ServerError::Pipeline(err) => classify_pipeline(err),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.classify().0
    }

    pub fn error_code(&self) -> &'static str {
        self.classify().1
    }
}

fn classify_pipeline(err: &PipelineError) -> (StatusCode, &'static str) {
    match err {
        PipelineError::InvalidImage(_) => (StatusCode::BAD_REQUEST, "INVALID_IMAGE"),
        PipelineError::Source(source) => match source {
            StorageError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "INVALID_URL"),
            StorageError::NotFound(_) => (StatusCode::NOT_FOUND, "SOURCE_NOT_FOUND"),
            StorageError::Forbidden(_) => (StatusCode::FORBIDDEN, "SOURCE_FORBIDDEN"),
            StorageError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "SOURCE_UNAVAILABLE"),
            _ => (StatusCode::BAD_GATEWAY, "SOURCE_UNAVAILABLE"),
        },
        PipelineError::Detection(_) if err.is_upstream() => {
            (StatusCode::BAD_GATEWAY, "DETECTOR_UNAVAILABLE")
        }
        PipelineError::Detection(_) => (StatusCode::UNPROCESSABLE_ENTITY, "DETECTOR_UNAVAILABLE"),
        _ if err.is_upstream() => (StatusCode::BAD_GATEWAY, "PIPELINE_ERROR"),
        _ => (StatusCode::UNPROCESSABLE_ENTITY, "PIPELINE_ERROR"),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "request failed");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ServerError {
    fn from(err: StorageError) -> Self {
        ServerError::Pipeline(PipelineError::Source(err))
    }
}

impl From<ConfigLoadError> for ServerError {
    fn from(err: ConfigLoadError) -> Self {
        ServerError::Config(err.to_string())
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}
