//! Job status, download, and listing route handlers.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use sl_core::{Job, JobId, JobStatus};

use crate::context::AppContext;
use crate::error::AppError;

/// Job record as returned by the API.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct JobResponse {
    pub job_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub musicxml: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

impl JobResponse {
    pub(crate) fn from_job(job: &Job) -> Self {
        Self {
            job_id: job.id.to_string(),
            status: job.status.to_string(),
            musicxml: None,
            error: job.error.clone(),
            created_at: job.created_at.to_rfc3339(),
            started_at: job.started_at.map(|t| t.to_rfc3339()),
            finished_at: job.finished_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// A malformed identifier names no job, so it reads as unknown rather than
/// as a bad request.
fn parse_job_id(raw: &str) -> Result<JobId, sl_core::Error> {
    raw.parse()
        .map_err(|_| sl_core::Error::not_found("job", raw))
}

/// GET /api/jobs
#[utoipa::path(
    get,
    path = "/api/jobs",
    responses(
        (status = 200, description = "All known job records", body = Vec<JobResponse>)
    )
)]
pub async fn list_jobs(State(ctx): State<AppContext>) -> Json<Vec<JobResponse>> {
    let jobs = ctx.service.list();
    Json(jobs.iter().map(JobResponse::from_job).collect())
}

/// GET /api/jobs/:id
///
/// For a completed job the artifact is embedded in the response. An artifact
/// read failure turns into an error response without touching the stored
/// record, so the job's recorded status stays truthful.
#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job status", body = JobResponse),
        (status = 404, description = "Job not found")
    )
)]
pub async fn get_job(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, AppError> {
    let job_id = parse_job_id(&id)?;
    let job = ctx.service.status(job_id)?;

    let mut response = JobResponse::from_job(&job);
    if job.status == JobStatus::Completed {
        let bytes = ctx.service.artifact(job_id).await?;
        response.musicxml = Some(String::from_utf8_lossy(&bytes).into_owned());
    }

    Ok(Json(response))
}

/// GET /api/jobs/:id/download
#[utoipa::path(
    get,
    path = "/api/jobs/{id}/download",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "MusicXML artifact"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Job not completed yet"),
        (status = 410, description = "Artifact no longer on disk")
    )
)]
pub async fn download_job(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let job_id = parse_job_id(&id)?;
    let bytes = ctx.service.artifact(job_id).await?;

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/vnd.recordare.musicxml+xml".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{job_id}.musicxml\""),
        ),
    ];
    Ok((headers, bytes))
}
