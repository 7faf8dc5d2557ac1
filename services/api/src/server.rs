use crate::cli::ServeArgs;
use crate::infra::{build_standing_service, AppState};
use crate::routes::with_standing_routes;
use academic_standing::config::AppConfig;
use academic_standing::error::AppError;
use academic_standing::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let standing_service = Arc::new(build_standing_service(&config.standing, None)?);

    let app = with_standing_routes(standing_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        probation_gpax = config.standing.thresholds.probation_gpax,
        critical_gpax = config.standing.thresholds.critical_gpax,
        "academic standing service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
