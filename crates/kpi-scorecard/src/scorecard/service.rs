use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use super::catalog::{RuleBook, RuleCatalog};
use super::editor::{apply_edit, EditCommand, EditError};
use super::engine::{ScoreView, ScoringEngine};
use super::snapshot::YearSnapshot;
use super::store::{validate_payload, SnapshotStore, StoreError, StoredSnapshot, EMPTY_SNAPSHOT};

/// Service pairing the scoring engine with the snapshot store.
///
/// Queries run against the in-memory snapshot. Every mutation replaces that
/// snapshot wholesale and then writes the whole blob back to the store.
pub struct ScorecardService<S, R = RuleCatalog> {
    store: Arc<S>,
    engine: Arc<ScoringEngine<R>>,
    current: RwLock<YearSnapshot>,
}

impl<S, R> ScorecardService<S, R>
where
    S: SnapshotStore + 'static,
    R: RuleBook + 'static,
{
    /// Service over a freshly initialized snapshot; the store is not read.
    pub fn new(store: Arc<S>, engine: Arc<ScoringEngine<R>>) -> Self {
        let current = RwLock::new(engine.initialize());
        Self {
            store,
            engine,
            current,
        }
    }

    /// Service seeded from whatever the store currently holds.
    pub fn load(
        store: Arc<S>,
        engine: Arc<ScoringEngine<R>>,
    ) -> Result<Self, ScorecardServiceError> {
        let snapshot = match store.load()? {
            Some(stored) => {
                info!(
                    key = stored.key,
                    updated_at = %stored.updated_at,
                    "hydrating stored snapshot"
                );
                engine.hydrate(&stored.payload)
            }
            None => {
                info!("no stored snapshot; starting from defaults");
                engine.initialize()
            }
        };

        Ok(Self {
            store,
            engine,
            current: RwLock::new(snapshot),
        })
    }

    pub fn engine(&self) -> &ScoringEngine<R> {
        &self.engine
    }

    pub fn snapshot(&self) -> YearSnapshot {
        self.read().clone()
    }

    /// Runs a read-only query against the current snapshot.
    pub fn with_view<T>(&self, query: impl FnOnce(ScoreView<'_, R>) -> T) -> T {
        let snapshot = self.read();
        query(self.engine.view(&snapshot))
    }

    /// Stored blob exactly as it was last written.
    pub fn raw_snapshot(&self) -> Result<String, ScorecardServiceError> {
        let payload = self
            .store
            .load()?
            .map(|stored| stored.payload)
            .unwrap_or_else(|| EMPTY_SNAPSHOT.to_string());
        Ok(payload)
    }

    /// Replaces the stored blob verbatim and re-hydrates the in-memory snapshot.
    ///
    /// Payloads that are not JSON objects are rejected before anything is written.
    pub fn replace_raw(&self, payload: String) -> Result<(), ScorecardServiceError> {
        validate_payload(&payload)?;
        let hydrated = self.engine.hydrate(&payload);

        let mut current = self.write();
        self.store.save(StoredSnapshot::new(payload))?;
        *current = hydrated;
        info!("snapshot replaced");
        Ok(())
    }

    /// Applies one editor command, keeps the result in memory, then persists it.
    ///
    /// A failed write is returned to the caller but the in-memory snapshot keeps
    /// the edit; [`ScorecardService::persist`] retries the write.
    pub fn apply(&self, command: &EditCommand) -> Result<YearSnapshot, ScorecardServiceError> {
        let mut current = self.write();
        let next = apply_edit(&self.engine, &current, command)?;
        *current = next.clone();

        let payload = next.to_json()?;
        if let Err(err) = self.store.save(StoredSnapshot::new(payload)) {
            warn!(
                error = %err,
                manager_id = command.manager_id(),
                "edit kept in memory but the snapshot write failed"
            );
            return Err(err.into());
        }
        Ok(next)
    }

    /// Writes the current in-memory snapshot to the store.
    pub fn persist(&self) -> Result<(), ScorecardServiceError> {
        let current = self.read();
        let payload = current.to_json()?;
        self.store.save(StoredSnapshot::new(payload))?;
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, YearSnapshot> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, YearSnapshot> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Error raised by the scorecard service.
#[derive(Debug, thiserror::Error)]
pub enum ScorecardServiceError {
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("snapshot could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}
