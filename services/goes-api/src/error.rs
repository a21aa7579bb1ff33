//! Maps the retrieval engine's design-level error kinds (§7) onto HTTP status
//! codes and a uniform JSON error body.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use goes_engine::Rejection;
use goes_store::StoreError;
use goes_types::QueryModelError;

/// A uniform error body: `{"error": "<message>"}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Every way a handler in this service can fail, each carrying the HTTP status
/// it maps onto per §7: `ValidationError`/`BusinessRuleError` -> 400,
/// `CapacityError` -> 413/507, schema errors -> 422, unknown query id -> 404,
/// a `FatalQueryError` surfaced through the store -> 500.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body was not valid JSON for the expected schema.
    #[error("malformed request body: {0}")]
    Schema(String),

    /// The request failed catalog/business-rule validation.
    #[error(transparent)]
    Normalize(#[from] QueryModelError),

    /// The estimated file count exceeds the configured ceiling.
    #[error("{0}")]
    TooManyFiles(String),

    /// The estimated size exceeds the configured ceiling.
    #[error("{0}")]
    TooLarge(String),

    /// Insufficient destination disk space for the estimate.
    #[error("{0}")]
    InsufficientDiskSpace(String),

    /// No record exists for the requested query id.
    #[error("query not found: {0}")]
    NotFound(uuid::Uuid),

    /// The restart endpoint was called without (or with the wrong) `X-API-Key`.
    #[error("missing or invalid API key")]
    Unauthorized,

    /// Deletion with `purge=true` was refused because the query is still
    /// processing and `force` was not set.
    #[error("query is still processing; pass force=true to delete anyway")]
    StillProcessing,

    /// An unrecoverable, internal failure (store I/O, filesystem).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::TooManyFiles { .. } => Self::TooManyFiles(rejection.to_string()),
            Rejection::TooLarge { .. } => Self::TooLarge(rejection.to_string()),
            Rejection::InsufficientDiskSpace { .. } => {
                Self::InsufficientDiskSpace(rejection.to_string())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Internal(other.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Schema(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Schema(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Normalize(_) => StatusCode::BAD_REQUEST,
            Self::TooManyFiles(_) | Self::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InsufficientDiskSpace(_) => StatusCode::INSUFFICIENT_STORAGE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::StillProcessing => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if matches!(self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal error handling request");
        }

        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
