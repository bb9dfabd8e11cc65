use kpi_scorecard::config::{ScoringConfig, StorageConfig};
use kpi_scorecard::error::AppError;
use kpi_scorecard::scorecard::{
    FileSnapshotStore, InMemorySnapshotStore, RuleCatalog, ScoringEngine, SnapshotStore,
    StoreError, StoredSnapshot, Timeframe,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Snapshot backend picked from `APP_SNAPSHOT_PATH`.
#[derive(Debug)]
pub(crate) enum ConfiguredStore {
    Memory(InMemorySnapshotStore),
    File(FileSnapshotStore),
}

impl ConfiguredStore {
    pub(crate) fn from_config(config: &StorageConfig) -> Self {
        match &config.snapshot_path {
            Some(path) => {
                info!(path = %path.display(), "using file snapshot store");
                Self::File(FileSnapshotStore::new(path.clone()))
            }
            None => {
                info!("APP_SNAPSHOT_PATH not set; snapshots are kept in memory");
                Self::Memory(InMemorySnapshotStore::default())
            }
        }
    }
}

impl SnapshotStore for ConfiguredStore {
    fn load(&self) -> Result<Option<StoredSnapshot>, StoreError> {
        match self {
            Self::Memory(store) => store.load(),
            Self::File(store) => store.load(),
        }
    }

    fn save(&self, snapshot: StoredSnapshot) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.save(snapshot),
            Self::File(store) => store.save(snapshot),
        }
    }
}

/// Standard roster and objectives with the configured rule catalog and zero policy.
pub(crate) fn build_engine(config: &ScoringConfig) -> Result<ScoringEngine, AppError> {
    let engine = match &config.rules_path {
        Some(path) => {
            let catalog = RuleCatalog::from_path(path)?;
            info!(path = %path.display(), rules = catalog.ids().count(), "loaded rule catalog");
            let standard = ScoringEngine::standard();
            ScoringEngine::new(
                standard.roster().clone(),
                standard.objectives().clone(),
                catalog,
            )
        }
        None => ScoringEngine::standard(),
    };
    Ok(engine.with_zero_policy(config.zero_value_policy))
}

pub(crate) fn parse_timeframe(raw: &str) -> Result<Timeframe, String> {
    raw.parse::<Timeframe>().map_err(|err| AppError::from(err).to_string())
}
