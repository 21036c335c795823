//! API error responses.

use std::time::Duration;

use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use invx_core::error::ExtractionError;

/// Errors returned by the HTTP handlers.
///
/// Every variant renders as `{"detail": "<message>"}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The uploaded file is not declared as a PDF.
    #[error("Invalid file type. Please upload a PDF.")]
    InvalidFileType,

    /// The form has no `file` field.
    #[error("No file uploaded. Send the PDF in a multipart field named 'file'.")]
    MissingFile,

    /// The request is not a multipart form.
    #[error("Expected a multipart form upload: {0}")]
    NotMultipart(#[from] MultipartRejection),

    /// The multipart body could not be read.
    #[error("Could not parse multipart form: {0}")]
    Multipart(#[from] MultipartError),

    /// The document was read but no fields could be produced.
    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    /// Reading, queueing and extraction took longer than the request timeout.
    #[error("Request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    /// Anything else, such as a panicking worker.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidFileType | ApiError::MissingFile | ApiError::NotMultipart(_) => {
                StatusCode::BAD_REQUEST
            }
            // Oversized uploads surface as 413 through the multipart rejection.
            ApiError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => e.status(),
            ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            ApiError::Extraction(_) | ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Rejected request: {}", self);
        }

        (status, Json(ErrorBody { detail: self.to_string() })).into_response()
    }
}
