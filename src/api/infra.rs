use crate::config::{AppConfig, ModelConfig};
use crate::error::AppError;
use crate::segmentation::{initialize_with, HistoricalDataset, SegmentationContext};
use crate::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads configuration, applies the CLI dataset override and installs telemetry.
pub(crate) fn bootstrap(dataset: Option<PathBuf>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = dataset {
        config.model.dataset_path = path;
    }

    telemetry::init(&config.telemetry)?;
    Ok(config)
}

/// Reads the historical dataset and builds the scoring context. Failure here is fatal.
pub(crate) fn load_context(config: &ModelConfig) -> Result<SegmentationContext, AppError> {
    info!(path = %config.dataset_path.display(), "loading historical dataset");
    let dataset = HistoricalDataset::from_path(&config.dataset_path, &config.dataset_layout())?;
    info!(
        records = dataset.len(),
        features = dataset.feature_names().len(),
        defaulted = dataset.defaulted_count(),
        "historical dataset loaded"
    );

    let context = initialize_with(&dataset, &config.model_options())?;
    Ok(context)
}
