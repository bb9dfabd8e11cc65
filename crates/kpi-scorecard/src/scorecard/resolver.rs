use super::achievement::{mean_score, score_metric};
use super::catalog::{RuleBook, RuleBounds};
use super::domain::Month;
use super::engine::ScoreView;
use super::snapshot::{MetricEntry, PeriodEntry};

const DEFAULT_CELL: MetricEntry = MetricEntry {
    value: 0.0,
    enabled: true,
    target_override: None,
    base_override: None,
};

impl<'a, R: RuleBook> ScoreView<'a, R> {
    /// Achievement of one objective in one month, 0..=100.
    ///
    /// Missing entries behave like freshly initialized ones (enabled, value 0).
    /// Quarterly objectives outside quarter-end months and disabled objectives
    /// score 0; callers exclude them from display themselves.
    pub fn resolve_objective(&self, manager_id: &str, objective_id: &str, month: Month) -> u8 {
        let Some(objective) = self.engine.objectives().get(objective_id) else {
            return 0;
        };
        if !objective.is_scored_in(month) {
            return 0;
        }

        let entry = self.snapshot.entry(manager_id, objective_id, month);
        if !entry.map_or(true, PeriodEntry::enabled) {
            return 0;
        }

        if objective.is_leafless() {
            let cell = entry.and_then(PeriodEntry::metric).unwrap_or(&DEFAULT_CELL);
            return self.score_cell(manager_id, &objective.id, cell, month);
        }

        mean_score(objective.leaves.iter().filter_map(|leaf| {
            let cell = entry
                .and_then(|entry| entry.leaf(&leaf.id))
                .unwrap_or(&DEFAULT_CELL);
            cell.enabled
                .then(|| self.score_cell(manager_id, &leaf.id, cell, month))
        }))
    }

    /// Base/target in effect for a metric cell: overrides first, then the rule book.
    pub fn metric_bounds(
        &self,
        manager_id: &str,
        metric_id: &str,
        month: Month,
    ) -> Option<RuleBounds> {
        let cell = self.metric_cell(manager_id, metric_id, month);
        self.bounds_for(manager_id, metric_id, cell, month)
    }

    /// Raw value of a metric when it counts toward `month`, otherwise `None`.
    pub fn metric_value(&self, manager_id: &str, metric_id: &str, month: Month) -> Option<f64> {
        let (objective, _) = self.engine.objectives().find_metric(metric_id)?;
        if !objective.is_scored_in(month) {
            return None;
        }
        let entry = self.snapshot.entry(manager_id, &objective.id, month);
        if !entry.map_or(true, PeriodEntry::enabled) {
            return None;
        }
        let cell = self
            .metric_cell(manager_id, metric_id, month)
            .unwrap_or(&DEFAULT_CELL);
        cell.enabled.then_some(cell.value)
    }

    fn metric_cell(
        &self,
        manager_id: &str,
        metric_id: &str,
        month: Month,
    ) -> Option<&'a MetricEntry> {
        let (objective, leaf) = self.engine.objectives().find_metric(metric_id)?;
        let entry = self.snapshot.entry(manager_id, &objective.id, month)?;
        match leaf {
            Some(leaf) => entry.leaf(&leaf.id),
            None => entry.metric(),
        }
    }

    fn bounds_for(
        &self,
        manager_id: &str,
        metric_id: &str,
        cell: Option<&MetricEntry>,
        month: Month,
    ) -> Option<RuleBounds> {
        let rule = self.engine.rules().bounds(metric_id, month, manager_id)?;
        Some(RuleBounds {
            base: cell.and_then(|cell| cell.base_override).unwrap_or(rule.base),
            target: cell
                .and_then(|cell| cell.target_override)
                .unwrap_or(rule.target),
        })
    }

    fn score_cell(
        &self,
        manager_id: &str,
        metric_id: &str,
        cell: &MetricEntry,
        month: Month,
    ) -> u8 {
        match self.bounds_for(manager_id, metric_id, Some(cell), month) {
            Some(bounds) => score_metric(cell.value, bounds, self.engine.zero_policy()),
            None => 0,
        }
    }
}
