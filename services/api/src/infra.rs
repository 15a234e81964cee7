use credit_risk::error::AppError;
use credit_risk::scoring::{LogisticOracle, RiskEngine};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) model_version: Option<String>,
}

/// Model artifact loaded into a shareable engine.
pub(crate) struct LoadedEngine {
    pub(crate) engine: RiskEngine,
    pub(crate) model_version: Option<String>,
}

pub(crate) fn load_engine(path: &Path) -> Result<LoadedEngine, AppError> {
    let oracle = LogisticOracle::from_path(path)?;
    let model_version = oracle.model_version().map(str::to_string);
    info!(
        path = %path.display(),
        model_version = model_version.as_deref().unwrap_or("unversioned"),
        "risk model loaded"
    );

    Ok(LoadedEngine {
        engine: RiskEngine::new(Arc::new(oracle)),
        model_version,
    })
}
