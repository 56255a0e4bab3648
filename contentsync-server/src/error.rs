use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use contentsync_types::ValidationError;
use thiserror::Error;
use tracing::error;

/// Request failures, each mapped to one HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad page id in the path: 400.
    #[error("invalid page id: {0}")]
    InvalidPageId(String),

    /// Body names a different page than the path: 400.
    #[error("page id mismatch: path {path}, body {body}")]
    PageMismatch { path: String, body: String },

    /// Record is missing a required field: 422.
    #[error("invalid record: {0}")]
    InvalidRecord(ValidationError),

    /// Body could not be parsed as a record.
    #[error("{message}")]
    Payload { status: StatusCode, message: String },

    #[error("no content for {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored file does not parse, or a record failed to encode.
    #[error("record encoding error: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPageId(_) | ApiError::PageMismatch { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidRecord(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Payload { status, .. } => *status,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Io(_) | ApiError::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingField(_) => ApiError::InvalidRecord(err),
            other => ApiError::InvalidPageId(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Payload {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
