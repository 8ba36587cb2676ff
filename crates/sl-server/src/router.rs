//! Axum router construction.
//!
//! Builds the full application router with all route groups, middleware
//! layers, and the Swagger UI.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Uploaded sheet music (multi-page PDF scans included) can be large.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::convert::convert_sync,
        routes::convert::convert_async,
        routes::jobs::list_jobs,
        routes::jobs::get_job,
        routes::jobs::download_job,
        routes::admin::dashboard,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::convert::SyncConvertResponse,
        routes::jobs::JobResponse,
        routes::admin::DashboardResponse,
        routes::admin::WorkerStats,
        crate::store::StatusCounts,
    ))
)]
struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/convert", post(routes::convert::convert_sync))
        .route("/convert/async", post(routes::convert::convert_async))
        .route("/jobs", get(routes::jobs::list_jobs))
        .route("/jobs/{id}", get(routes::jobs::get_job))
        .route("/jobs/{id}/download", get(routes::jobs::download_job))
        .route("/events", get(routes::events::events_handler))
        .route("/admin/dashboard", get(routes::admin::dashboard))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
