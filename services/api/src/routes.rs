use crate::infra::{deserialize_optional_date, AppState};
use academic_standing::error::AppError;
use academic_standing::standing::{standing_router, StandingReport, StandingService};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StandingReportRequest {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
    /// Summarize every student's latest term first.
    #[serde(default)]
    pub(crate) refresh: bool,
    #[serde(default)]
    pub(crate) include_markdown: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct StandingReportResponse {
    pub(crate) refreshed: usize,
    pub(crate) status_counts: BTreeMap<&'static str, usize>,
    pub(crate) report: StandingReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) markdown: Option<String>,
}

pub(crate) fn with_standing_routes(service: Arc<StandingService>) -> axum::Router {
    standing_router(service.clone())
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/standing/report",
            axum::routing::post(standing_report_endpoint),
        )
        .layer(Extension(service))
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

pub(crate) async fn standing_report_endpoint(
    Extension(service): Extension<Arc<StandingService>>,
    Json(payload): Json<StandingReportRequest>,
) -> Result<Json<StandingReportResponse>, AppError> {
    let StandingReportRequest {
        as_of,
        refresh,
        include_markdown,
    } = payload;

    let refreshed = if refresh {
        service.summarize_cohort()?.len()
    } else {
        0
    };

    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let report = service.standing_report(as_of)?;
    let markdown = include_markdown.then(|| report.render());

    Ok(Json(StandingReportResponse {
        refreshed,
        status_counts: report.status_counts(),
        report,
        markdown,
    }))
}
