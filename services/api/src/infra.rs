use academic_standing::config::StandingConfig;
use academic_standing::error::AppError;
use academic_standing::standing::{
    Dataset, InMemoryStandingStore, StandingRepositories, StandingService,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the registrar exports (or the bundled sample cohort) into an in-memory store and
/// wire the standing service over it.
pub(crate) fn build_standing_service(
    config: &StandingConfig,
    data_dir_override: Option<&Path>,
) -> Result<StandingService, AppError> {
    let normalizer = config.normalizer();
    let dataset = match data_dir_override.or(config.data_dir.as_deref()) {
        Some(dir) => {
            info!(data_dir = %dir.display(), "loading registrar exports");
            Dataset::from_dir(dir, &normalizer)?
        }
        None => {
            info!("no data directory configured; using bundled sample cohort");
            Dataset::bundled(&normalizer)?
        }
    };

    let store = Arc::new(InMemoryStandingStore::from_dataset(dataset)?);
    Ok(StandingService::new(
        StandingRepositories::from_store(store),
        config.thresholds,
    ))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
