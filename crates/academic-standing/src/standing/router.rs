use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::{StudentId, TermSummary};
use super::service::{StandingError, StandingService};

/// Body of a term summary build request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TermRequest {
    pub study_year: u16,
    pub study_term: u8,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TermQuery {
    pub year: u16,
    pub term: u8,
}

/// Build responses wrap the summary because a term without graded registrations
/// produces none.
#[derive(Debug, Serialize)]
pub struct SummaryEnvelope {
    pub summary: Option<TermSummary>,
}

/// Router builder exposing term summary, conformance, co-op and status endpoints.
pub fn standing_router(service: Arc<StandingService>) -> Router {
    Router::new()
        .route(
            "/api/v1/students/:student_id/term-summaries",
            post(build_summary_handler).get(list_summaries_handler),
        )
        .route(
            "/api/v1/students/:student_id/term-summaries/latest",
            post(summarize_latest_handler),
        )
        .route(
            "/api/v1/students/:student_id/term-summaries/:study_year/:study_term",
            get(term_summary_handler),
        )
        .route(
            "/api/v1/students/:student_id/follow-plan",
            get(follow_plan_handler),
        )
        .route(
            "/api/v1/students/:student_id/coop-eligibility",
            get(coop_handler),
        )
        .route("/api/v1/students/:student_id/status", get(status_handler))
        .with_state(service)
}

pub(crate) async fn build_summary_handler(
    State(service): State<Arc<StandingService>>,
    Path(student_id): Path<String>,
    axum::Json(request): axum::Json<TermRequest>,
) -> Response {
    let id = StudentId(student_id);
    match service.build_or_update(&id, request.study_year, request.study_term) {
        Ok(summary) => (StatusCode::OK, axum::Json(SummaryEnvelope { summary })).into_response(),
        Err(error) => standing_error_response(error),
    }
}

pub(crate) async fn summarize_latest_handler(
    State(service): State<Arc<StandingService>>,
    Path(student_id): Path<String>,
) -> Response {
    let id = StudentId(student_id);
    match service.summarize_latest(&id) {
        Ok(summary) => (StatusCode::OK, axum::Json(SummaryEnvelope { summary })).into_response(),
        Err(error) => standing_error_response(error),
    }
}

pub(crate) async fn list_summaries_handler(
    State(service): State<Arc<StandingService>>,
    Path(student_id): Path<String>,
) -> Response {
    let id = StudentId(student_id);
    match service.term_summaries(&id) {
        Ok(summaries) => (StatusCode::OK, axum::Json(summaries)).into_response(),
        Err(error) => standing_error_response(error),
    }
}

pub(crate) async fn term_summary_handler(
    State(service): State<Arc<StandingService>>,
    Path((student_id, study_year, study_term)): Path<(String, u16, u8)>,
) -> Response {
    let id = StudentId(student_id);
    match service.term_summary(&id, study_year, study_term) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => standing_error_response(error),
    }
}

pub(crate) async fn follow_plan_handler(
    State(service): State<Arc<StandingService>>,
    Path(student_id): Path<String>,
    Query(query): Query<TermQuery>,
) -> Response {
    let id = StudentId(student_id);
    match service.is_following_plan(&id, query.year, query.term) {
        Ok(follows_plan) => {
            let payload = json!({
                "student_id": id,
                "study_year": query.year,
                "study_term": query.term,
                "follows_plan": follows_plan,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => standing_error_response(error),
    }
}

pub(crate) async fn coop_handler(
    State(service): State<Arc<StandingService>>,
    Path(student_id): Path<String>,
) -> Response {
    let id = StudentId(student_id);
    match service.is_eligible_for_coop(&id) {
        Ok(eligible) => {
            let payload = json!({
                "student_id": id,
                "coop_eligible": eligible,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => standing_error_response(error),
    }
}

pub(crate) async fn status_handler(
    State(service): State<Arc<StandingService>>,
    Path(student_id): Path<String>,
    Query(query): Query<TermQuery>,
) -> Response {
    let id = StudentId(student_id);
    match service.classify_student(&id, query.year, query.term) {
        Ok(decision) => {
            let payload = json!({
                "student_id": id,
                "study_year": query.year,
                "study_term": query.term,
                "status": decision.status,
                "reason": decision.reason,
                "explanation": decision.reason.summary(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => standing_error_response(error),
    }
}

/// Maps service failures onto HTTP statuses. Store and internal failures are logged and
/// answered with a generic body.
pub fn standing_error_response(error: StandingError) -> Response {
    let (status, message) = match &error {
        StandingError::NotFound(_) => (StatusCode::NOT_FOUND, error.to_string()),
        StandingError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, error.to_string()),
        StandingError::Conflict(_) => (StatusCode::CONFLICT, error.to_string()),
        StandingError::Internal(_)
        | StandingError::Curriculum(_)
        | StandingError::Repository(_) => {
            error!(%error, "standing request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    };

    let payload = json!({ "error": message });
    (status, axum::Json(payload)).into_response()
}
