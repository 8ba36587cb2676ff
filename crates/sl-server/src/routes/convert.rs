//! Conversion submission route handlers.
//!
//! Both endpoints take a multipart upload with the document in a `file`
//! field. The synchronous variant blocks until the engine finishes and
//! returns the artifact inline; the asynchronous variant returns a pending
//! job snapshot immediately.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::context::AppContext;
use crate::error::AppError;
use crate::routes::jobs::JobResponse;

/// Multipart field carrying the document.
const UPLOAD_FIELD: &str = "file";

/// Response of a successful synchronous conversion.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SyncConvertResponse {
    pub status: &'static str,
    pub job_id: String,
    pub musicxml: String,
}

/// Pull the uploaded document out of the multipart body.
async fn read_upload(mut multipart: Multipart) -> sl_core::Result<(String, Vec<u8>)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        sl_core::Error::Validation(format!("malformed multipart body: {e}"))
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| sl_core::Error::Validation("file field has no filename".into()))?;
        let bytes = field.bytes().await.map_err(|e| {
            sl_core::Error::Validation(format!("failed to read upload: {e}"))
        })?;
        return Ok((filename, bytes.to_vec()));
    }

    Err(sl_core::Error::Validation("no file uploaded".into()))
}

/// POST /api/convert
#[utoipa::path(
    post,
    path = "/api/convert",
    responses(
        (status = 200, description = "Conversion succeeded", body = SyncConvertResponse),
        (status = 400, description = "No file or unsupported format"),
        (status = 502, description = "Recognition failed")
    )
)]
pub async fn convert_sync(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<Json<SyncConvertResponse>, AppError> {
    let (filename, content) = read_upload(multipart).await?;
    let (job_id, artifact) = ctx.service.convert_sync(&filename, &content).await?;

    Ok(Json(SyncConvertResponse {
        status: "success",
        job_id: job_id.to_string(),
        musicxml: String::from_utf8_lossy(&artifact).into_owned(),
    }))
}

/// POST /api/convert/async
#[utoipa::path(
    post,
    path = "/api/convert/async",
    responses(
        (status = 202, description = "Job accepted", body = JobResponse),
        (status = 400, description = "No file or unsupported format")
    )
)]
pub async fn convert_async(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (filename, content) = read_upload(multipart).await?;
    let job = ctx.service.convert_async(&filename, &content).await?;

    Ok((StatusCode::ACCEPTED, Json(JobResponse::from_job(&job))))
}
