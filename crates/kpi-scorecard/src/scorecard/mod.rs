//! Store-manager KPI scorecard: achievement scoring, timeframe rollups and rankings.
//!
//! [`ScoringEngine`] is pure over a [`YearSnapshot`]; [`ScorecardService`] keeps the
//! current snapshot in memory and writes it through a [`SnapshotStore`] after
//! every change.

pub mod achievement;
mod aggregate;
pub mod catalog;
mod compose;
pub mod domain;
pub mod editor;
pub mod engine;
pub mod export;
pub mod ledger;
pub mod objectives;
mod resolver;
pub mod router;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod views;

#[cfg(test)]
mod tests;

pub use achievement::{achievement, ZeroValuePolicy};
pub use catalog::{CatalogLoadError, LeafRule, RuleBook, RuleBounds, RuleCatalog, RuleValue};
pub use domain::{Manager, Month, Quarter, Roster, Timeframe, TimeframeParseError};
pub use editor::{apply_edit, EditCommand, EditError, OverrideBound};
pub use engine::{ScoreView, ScoringEngine};
pub use export::{write_score_matrix, ExportError};
pub use ledger::ClosedMonthLedger;
pub use objectives::{LeafSpec, ObjectiveSpec, ObjectiveTree};
pub use router::scorecard_router;
pub use service::{ScorecardService, ScorecardServiceError};
pub use snapshot::{CompositeEntry, MetricEntry, PeriodEntry, YearSnapshot};
pub use store::{
    FileSnapshotStore, InMemorySnapshotStore, SnapshotStore, StoreError, StoredSnapshot,
    EMPTY_SNAPSHOT, SNAPSHOT_KEY,
};
pub use views::{
    HeatBand, ManagerScore, ManagerScorecard, MetricCard, ObjectiveCard, RadarAxis, RankingEntry,
    TrendPoint, TrendSeries,
};
