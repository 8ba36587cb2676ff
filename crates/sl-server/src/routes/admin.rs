//! Admin introspection route handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::context::AppContext;
use crate::store::StatusCounts;

/// Worker pool statistics.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct WorkerStats {
    pub slots: usize,
    pub active: usize,
    pub outstanding: usize,
}

/// Dashboard response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    pub jobs: StatusCounts,
    pub workers: WorkerStats,
    pub engine: String,
}

/// GET /api/admin/dashboard
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Job and worker statistics", body = DashboardResponse)
    )
)]
pub async fn dashboard(State(ctx): State<AppContext>) -> Json<DashboardResponse> {
    let (slots, active, outstanding) = ctx.service.pool_stats();

    Json(DashboardResponse {
        jobs: ctx.store.counts(),
        workers: WorkerStats {
            slots,
            active,
            outstanding,
        },
        engine: ctx.service.engine_name().to_string(),
    })
}
