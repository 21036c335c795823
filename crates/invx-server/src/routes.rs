//! HTTP handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::{debug, info};

use invx_core::models::invoice::InvoiceDetails;

use crate::error::ApiError;
use crate::AppState;

/// Multipart field carrying the PDF.
pub const FILE_FIELD: &str = "file";

const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Serialize)]
pub struct Welcome {
    message: &'static str,
}

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    version: &'static str,
}

/// `GET /`
pub async fn root() -> Json<Welcome> {
    Json(Welcome {
        message: "Welcome to the Simple Regex-Powered Invoice Extractor API.",
    })
}

/// `GET /health`
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "available",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// An uploaded PDF.
struct Upload {
    filename: String,
    data: Vec<u8>,
}

/// Take the `file` field out of the form, ignoring any other fields.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping form field {:?}", field.name());
            continue;
        }

        if field.content_type() != Some(PDF_CONTENT_TYPE) {
            return Err(ApiError::InvalidFileType);
        }

        let filename = field.file_name().unwrap_or("upload.pdf").to_string();
        let data = field.bytes().await?;
        return Ok(Upload {
            filename,
            data: data.to_vec(),
        });
    }

    Err(ApiError::MissingFile)
}

/// `POST /extract/`
pub async fn extract(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<InvoiceDetails>, ApiError> {
    let multipart = multipart?;
    let timeout = state.request_timeout;

    tokio::time::timeout(timeout, extract_upload(state, multipart))
        .await
        .map_err(|_| ApiError::Timeout(timeout))?
}

async fn extract_upload(
    state: Arc<AppState>,
    mut multipart: Multipart,
) -> Result<Json<InvoiceDetails>, ApiError> {
    let upload = read_upload(&mut multipart).await?;
    info!("Processing file: {} ({} bytes)", upload.filename, upload.data.len());

    // Waits while all extraction slots are busy.
    let permit = state
        .permits
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| ApiError::Unexpected(e.to_string()))?;

    let start = Instant::now();
    let extractor = state.extractor.clone();
    let data = upload.data;
    // The worker owns the permit so the slot stays taken until it returns.
    let details = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        extractor.extract(&data)
    })
    .await
    .map_err(|e| ApiError::Unexpected(e.to_string()))??;

    info!(
        "Successfully extracted data for file: {} in {}ms",
        upload.filename,
        start.elapsed().as_millis()
    );
    Ok(Json(details))
}
