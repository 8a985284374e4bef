use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use hr_recruitment::error::AppError;
use hr_recruitment::workflows::recruitment::{
    offboarding_router, recruitment_router, ApplicationRepository, Clock, DivisionRegistry,
    DivisionView, JobPostingRepository, OffboardingTracker, RecruitmentService,
    StaffAccountProvisioner,
};
use hr_recruitment::workflows::roster::DivisionRosterImporter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct RosterImportRequest {
    pub(crate) roster_csv: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RosterImportResponse {
    pub(crate) imported: Vec<DivisionView>,
}

pub(crate) fn with_recruitment_routes<R, J, P>(
    service: Arc<RecruitmentService<R, J, P>>,
    offboarding: Arc<OffboardingTracker>,
    clock: Arc<dyn Clock>,
) -> axum::Router
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    let divisions = service.divisions().clone();

    recruitment_router(service)
        .merge(offboarding_router(offboarding, clock))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/recruitment/roster",
            axum::routing::post(roster_import_endpoint),
        )
        .layer(Extension(divisions))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Seed additional divisions from a CSV roster posted as JSON.
pub(crate) async fn roster_import_endpoint(
    Extension(divisions): Extension<Arc<DivisionRegistry>>,
    Json(payload): Json<RosterImportRequest>,
) -> Result<(StatusCode, Json<RosterImportResponse>), AppError> {
    let reader = Cursor::new(payload.roster_csv.into_bytes());
    let importer = DivisionRosterImporter::from_reader(reader)?;
    let imported = importer.seed_registry(&divisions)?;

    info!(divisions = imported.len(), "division roster imported");
    Ok((StatusCode::CREATED, Json(RosterImportResponse { imported })))
}
