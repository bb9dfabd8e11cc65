use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::scorecard::catalog::{RuleBook, RuleBounds};
use crate::scorecard::domain::{Month, Roster};
use crate::scorecard::editor::{apply_edit, EditCommand};
use crate::scorecard::objectives::ObjectiveTree;
use crate::scorecard::snapshot::YearSnapshot;
use crate::scorecard::store::{InMemorySnapshotStore, SnapshotStore, StoreError, StoredSnapshot};
use crate::scorecard::{scorecard_router, ScorecardService, ScoringEngine};

/// Every metric scores its raw value: base 0, target 100.
pub(super) struct PercentRules;

impl RuleBook for PercentRules {
    fn bounds(&self, _metric_id: &str, _month: Month, _manager_id: &str) -> Option<RuleBounds> {
        Some(RuleBounds {
            base: 0.0,
            target: 100.0,
        })
    }
}

pub(super) fn month(index: u8) -> Month {
    Month::new(index).expect("valid month")
}

pub(super) fn percent_engine() -> ScoringEngine<PercentRules> {
    ScoringEngine::new(Roster::standard(), ObjectiveTree::standard(), PercentRules)
}

pub(super) fn edit<R: RuleBook>(
    engine: &ScoringEngine<R>,
    snapshot: YearSnapshot,
    command: EditCommand,
) -> YearSnapshot {
    apply_edit(engine, &snapshot, &command).expect("edit applies")
}

pub(super) fn set_leaf<R: RuleBook>(
    engine: &ScoringEngine<R>,
    snapshot: YearSnapshot,
    manager_id: &str,
    objective_id: &str,
    leaf_id: &str,
    month: u8,
    value: f64,
) -> YearSnapshot {
    edit(
        engine,
        snapshot,
        EditCommand::SetValue {
            manager_id: manager_id.to_string(),
            objective_id: objective_id.to_string(),
            leaf_id: Some(leaf_id.to_string()),
            month,
            value,
        },
    )
}

pub(super) fn set_single<R: RuleBook>(
    engine: &ScoringEngine<R>,
    snapshot: YearSnapshot,
    manager_id: &str,
    objective_id: &str,
    month: u8,
    value: f64,
) -> YearSnapshot {
    edit(
        engine,
        snapshot,
        EditCommand::SetValue {
            manager_id: manager_id.to_string(),
            objective_id: objective_id.to_string(),
            leaf_id: None,
            month,
            value,
        },
    )
}

pub(super) fn close_months(snapshot: &mut YearSnapshot, manager_id: &str, months: &[u8]) {
    for index in months {
        snapshot.completions.set_closed(manager_id, month(*index), true);
    }
}

pub(super) fn build_service() -> (
    ScorecardService<InMemorySnapshotStore>,
    Arc<InMemorySnapshotStore>,
) {
    let store = Arc::new(InMemorySnapshotStore::default());
    let engine = Arc::new(ScoringEngine::standard());
    let service = ScorecardService::new(store.clone(), engine);
    (service, store)
}

pub(super) fn scorecard_router_with_service(
    service: ScorecardService<InMemorySnapshotStore>,
) -> axum::Router {
    scorecard_router(Arc::new(service))
}

/// Accepts reads but refuses every write.
pub(super) struct ReadOnlyStore;

impl SnapshotStore for ReadOnlyStore {
    fn load(&self) -> Result<Option<StoredSnapshot>, StoreError> {
        Ok(None)
    }

    fn save(&self, _snapshot: StoredSnapshot) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }
}

pub(super) async fn read_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf8 body")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_str(&read_body(response).await).expect("json payload")
}
