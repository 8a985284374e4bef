use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::capacity::DivisionView;
use super::domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, DivisionId, ErrorKind, JobId,
};
use super::jobs::JobPostingRequest;
use super::lifecycle::StatusAction;
use super::offboarding::{OffboardingId, OffboardingRequest, OffboardingTracker};
use super::repository::{
    ApplicationRepository, ApplicationStatusView, JobPostingRepository, StaffAccountProvisioner,
    StaffAccountRequest,
};
use super::scheduler::InterviewRequest;
use super::service::{Clock, RecruitmentService};

/// Response to a submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResponse {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistToggle {
    #[serde(alias = "item")]
    pub item_name: String,
    pub value: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CapacityUpdate {
    pub capacity: u32,
}

pub fn error_response(kind: ErrorKind, message: String) -> Response {
    let status = match kind {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::IllegalTransition
        | ErrorKind::CapacityExceeded
        | ErrorKind::PreconditionNotMet => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": message,
        "kind": kind.label(),
    });
    (status, axum::Json(payload)).into_response()
}

type SharedService<R, J, P> = Arc<RecruitmentService<R, J, P>>;

/// Router builder exposing job postings, the application lifecycle, and division capacity.
pub fn recruitment_router<R, J, P>(service: SharedService<R, J, P>) -> Router
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    Router::new()
        .route("/api/v1/recruitment/jobs", post(open_job_handler::<R, J, P>))
        .route(
            "/api/v1/recruitment/jobs/:job_id",
            get(job_handler::<R, J, P>).put(edit_job_handler::<R, J, P>),
        )
        .route(
            "/api/v1/recruitment/jobs/:job_id/close",
            post(close_job_handler::<R, J, P>),
        )
        .route(
            "/api/v1/recruitment/applications",
            post(submit_handler::<R, J, P>),
        )
        .route(
            "/api/v1/recruitment/applications/:application_id",
            get(status_handler::<R, J, P>),
        )
        .route(
            "/api/v1/recruitment/applications/:application_id/status",
            post(action_handler::<R, J, P>),
        )
        .route(
            "/api/v1/recruitment/applications/:application_id/interview",
            put(interview_handler::<R, J, P>),
        )
        .route(
            "/api/v1/recruitment/applications/:application_id/onboarding/items",
            post(checklist_toggle_handler::<R, J, P>),
        )
        .route(
            "/api/v1/recruitment/applications/:application_id/onboarding/complete",
            post(checklist_complete_handler::<R, J, P>),
        )
        .route(
            "/api/v1/recruitment/applications/:application_id/convert",
            post(convert_handler::<R, J, P>),
        )
        .route(
            "/api/v1/recruitment/divisions",
            get(divisions_handler::<R, J, P>),
        )
        .route(
            "/api/v1/recruitment/divisions/:division_id",
            get(division_handler::<R, J, P>),
        )
        .route(
            "/api/v1/recruitment/divisions/:division_id/capacity",
            put(capacity_handler::<R, J, P>),
        )
        .with_state(service)
}

pub(crate) async fn open_job_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    axum::Json(request): axum::Json<JobPostingRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    match service.open_job(request) {
        Ok(posting) => (StatusCode::CREATED, axum::Json(posting)).into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

pub(crate) async fn job_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    match service.get_job(&JobId(job_id)) {
        Ok(posting) => (StatusCode::OK, axum::Json(posting)).into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

pub(crate) async fn edit_job_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<JobPostingRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    match service.edit_job(&JobId(job_id), request) {
        Ok(posting) => (StatusCode::OK, axum::Json(posting)).into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

pub(crate) async fn close_job_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    match service.close_job(&JobId(job_id)) {
        Ok(posting) => (StatusCode::OK, axum::Json(posting)).into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

pub(crate) async fn submit_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    match service.submit(submission) {
        Ok(record) => {
            let response = SubmissionResponse {
                application_id: record.id.clone(),
                status: record.status(),
                rejection_reason: record
                    .stage
                    .rejection()
                    .map(|rejection| rejection.reason.clone()),
            };
            (StatusCode::CREATED, axum::Json(response)).into_response()
        }
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

pub(crate) async fn status_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

pub(crate) async fn action_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    Path(application_id): Path<String>,
    axum::Json(action): axum::Json<StatusAction>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    match service.apply_action(&ApplicationId(application_id), action) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

pub(crate) async fn interview_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<InterviewRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    match service.schedule_interview(&ApplicationId(application_id), request) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

pub(crate) async fn checklist_toggle_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    Path(application_id): Path<String>,
    axum::Json(toggle): axum::Json<ChecklistToggle>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    let id = ApplicationId(application_id);
    match service.toggle_checklist_item(&id, &toggle.item_name, toggle.value) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

pub(crate) async fn checklist_complete_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    match service.complete_checklist(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

#[derive(Debug, Serialize)]
struct ConversionResponse {
    application: ApplicationStatusView,
    staff_account: StaffAccountRequest,
    division: Option<DivisionView>,
}

pub(crate) async fn convert_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    match service.convert_to_staff(&ApplicationId(application_id)) {
        Ok(conversion) => {
            let response = ConversionResponse {
                application: conversion.record.status_view(),
                division: service.division(&conversion.account.division_id).ok(),
                staff_account: conversion.account,
            };
            (StatusCode::OK, axum::Json(response)).into_response()
        }
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

pub(crate) async fn divisions_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    let divisions = service.divisions().list();
    (StatusCode::OK, axum::Json(json!({ "divisions": divisions }))).into_response()
}

pub(crate) async fn division_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    Path(division_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    match service.division(&DivisionId(division_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

pub(crate) async fn capacity_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    Path(division_id): Path<String>,
    axum::Json(update): axum::Json<CapacityUpdate>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobPostingRepository + 'static,
    P: StaffAccountProvisioner + 'static,
{
    let id = DivisionId(division_id);
    match service.divisions().set_capacity(&id, update.capacity) {
        Ok(view) => {
            info!(division = %view.id, capacity = view.capacity, "division capacity changed");
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

type OffboardingState = (Arc<OffboardingTracker>, Arc<dyn Clock>);

/// Router builder for the staff exit checklist.
pub fn offboarding_router(tracker: Arc<OffboardingTracker>, clock: Arc<dyn Clock>) -> Router {
    Router::new()
        .route("/api/v1/offboarding", post(begin_offboarding_handler))
        .route("/api/v1/offboarding/:offboarding_id", get(offboarding_handler))
        .route(
            "/api/v1/offboarding/:offboarding_id/items",
            post(offboarding_toggle_handler),
        )
        .route(
            "/api/v1/offboarding/:offboarding_id/complete",
            post(offboarding_complete_handler),
        )
        .with_state((tracker, clock))
}

pub(crate) async fn begin_offboarding_handler(
    State((tracker, clock)): State<OffboardingState>,
    axum::Json(request): axum::Json<OffboardingRequest>,
) -> Response {
    match tracker.begin(request, clock.now()) {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

pub(crate) async fn offboarding_handler(
    State((tracker, _)): State<OffboardingState>,
    Path(offboarding_id): Path<String>,
) -> Response {
    match tracker.get(&OffboardingId(offboarding_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

pub(crate) async fn offboarding_toggle_handler(
    State((tracker, _)): State<OffboardingState>,
    Path(offboarding_id): Path<String>,
    axum::Json(toggle): axum::Json<ChecklistToggle>,
) -> Response {
    let id = OffboardingId(offboarding_id);
    match tracker.toggle_item(&id, &toggle.item_name, toggle.value) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}

pub(crate) async fn offboarding_complete_handler(
    State((tracker, _)): State<OffboardingState>,
    Path(offboarding_id): Path<String>,
) -> Response {
    match tracker.mark_complete(&OffboardingId(offboarding_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err.kind(), err.to_string()),
    }
}
