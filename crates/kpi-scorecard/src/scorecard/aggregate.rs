use super::achievement::mean_score;
use super::catalog::RuleBook;
use super::domain::{Month, Timeframe};
use super::engine::ScoreView;

impl<'a, R: RuleBook> ScoreView<'a, R> {
    pub fn closed_months(&self, manager_id: &str, timeframe: Timeframe) -> Vec<Month> {
        self.snapshot
            .completions
            .closed_months(manager_id, timeframe)
    }

    /// Mean objective achievement over the closed months of `timeframe`.
    ///
    /// Nothing closed yet means 0: unvalidated months never feed a rollup.
    pub fn aggregate(&self, manager_id: &str, objective_id: &str, timeframe: Timeframe) -> u8 {
        mean_score(
            self.closed_months(manager_id, timeframe)
                .into_iter()
                .map(|month| self.resolve_objective(manager_id, objective_id, month)),
        )
    }

    /// Mean raw value of a metric over the closed months of `timeframe`, to one decimal.
    ///
    /// Months where the metric is disabled or not scored are skipped.
    pub fn aggregate_value(&self, manager_id: &str, metric_id: &str, timeframe: Timeframe) -> f64 {
        let values: Vec<f64> = self
            .closed_months(manager_id, timeframe)
            .into_iter()
            .filter_map(|month| self.metric_value(manager_id, metric_id, month))
            .collect();
        if values.is_empty() {
            return 0.0;
        }

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let rounded = (mean * 10.0).round() / 10.0;
        if rounded.is_finite() {
            rounded
        } else {
            0.0
        }
    }
}
