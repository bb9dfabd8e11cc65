use super::achievement::mean_score;
use super::catalog::RuleBook;
use super::domain::{Month, Timeframe};
use super::engine::ScoreView;
use super::objectives::ObjectiveSpec;
use super::snapshot::PeriodEntry;
use super::views::{
    HeatBand, ManagerScore, ManagerScorecard, MetricCard, ObjectiveCard, RadarAxis, RankingEntry,
    TrendPoint, TrendSeries,
};

impl<'a, R: RuleBook> ScoreView<'a, R> {
    /// Unweighted mean of every top-level objective's rollup.
    ///
    /// Quarterly objectives stay in the denominator even when the timeframe holds
    /// no quarter-end month.
    pub fn global_score(&self, manager_id: &str, timeframe: Timeframe) -> u8 {
        mean_score(
            self.engine
                .objectives()
                .iter()
                .map(|objective| self.aggregate(manager_id, &objective.id, timeframe)),
        )
    }

    /// Managers ordered by global score, highest first; ties keep roster order.
    ///
    /// With the standard catalog and the measured zero policy, a manager who has
    /// only closed months still ranks above managers with nothing closed: an
    /// empty Performance month rates 25 through the inverted stock rotation leaf.
    pub fn rank(&self, timeframe: Timeframe) -> Vec<RankingEntry> {
        let mut scored: Vec<_> = self
            .engine
            .roster()
            .iter()
            .map(|manager| (manager, self.global_score(&manager.id, timeframe)))
            .collect();
        scored.sort_by(|(_, left), (_, right)| right.cmp(left));

        scored
            .into_iter()
            .enumerate()
            .map(|(position, (manager, score))| RankingEntry {
                rank: position + 1,
                manager_id: manager.id.clone(),
                manager_name: manager.name.clone(),
                color: manager.color.clone(),
                score,
                heat_band: HeatBand::from_score(score),
            })
            .collect()
    }

    /// Overall score for a single month across the objectives active that month.
    ///
    /// Ignores the closed flag; [`ScoreView::trend`] applies it.
    pub fn monthly_score(&self, manager_id: &str, month: Month) -> u8 {
        mean_score(
            self.engine
                .objectives()
                .iter()
                .filter(|objective| self.is_active(manager_id, objective, month))
                .map(|objective| self.resolve_objective(manager_id, &objective.id, month)),
        )
    }

    pub fn trend(&self, manager_id: &str) -> Vec<TrendPoint> {
        Month::all()
            .map(|month| TrendPoint {
                month,
                month_label: month.label(),
                score: self
                    .is_closed(manager_id, month)
                    .then(|| self.monthly_score(manager_id, month)),
            })
            .collect()
    }

    pub fn trends(&self) -> Vec<TrendSeries> {
        self.engine
            .roster()
            .iter()
            .map(|manager| TrendSeries {
                manager_id: manager.id.clone(),
                manager_name: manager.name.clone(),
                color: manager.color.clone(),
                points: self.trend(&manager.id),
            })
            .collect()
    }

    /// One axis per objective with every manager's rollup for `timeframe`.
    pub fn radar(&self, timeframe: Timeframe) -> Vec<RadarAxis> {
        self.engine
            .objectives()
            .iter()
            .map(|objective| RadarAxis {
                objective_id: objective.id.clone(),
                objective_name: objective.name.clone(),
                scores: self
                    .engine
                    .roster()
                    .iter()
                    .map(|manager| ManagerScore {
                        manager_id: manager.id.clone(),
                        score: self.aggregate(&manager.id, &objective.id, timeframe),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Per-objective breakdown for one manager; `None` for managers outside the roster.
    pub fn scorecard(&self, manager_id: &str, timeframe: Timeframe) -> Option<ManagerScorecard> {
        let manager = self.engine.roster().get(manager_id)?;
        let reference = timeframe.reference_month();
        let global_score = self.global_score(manager_id, timeframe);

        let objectives = self
            .engine
            .objectives()
            .iter()
            .filter(|objective| match timeframe {
                Timeframe::Month(month) => objective.is_scored_in(month),
                Timeframe::Quarter(_) | Timeframe::YearToDate => true,
            })
            .map(|objective| {
                let score = self.aggregate(manager_id, &objective.id, timeframe);
                ObjectiveCard {
                    objective_id: objective.id.clone(),
                    name: objective.name.clone(),
                    quarterly: objective.quarterly,
                    score,
                    heat_band: HeatBand::from_score(score),
                    metrics: self.metric_cards(manager_id, objective, timeframe, reference),
                }
            })
            .collect();

        Some(ManagerScorecard {
            manager_id: manager.id.clone(),
            manager_name: manager.name.clone(),
            timeframe,
            timeframe_label: timeframe.label(),
            global_score,
            heat_band: HeatBand::from_score(global_score),
            closed_months: self.closed_months(manager_id, timeframe),
            objectives,
        })
    }

    fn metric_cards(
        &self,
        manager_id: &str,
        objective: &ObjectiveSpec,
        timeframe: Timeframe,
        reference: Month,
    ) -> Vec<MetricCard> {
        let names: Vec<(&str, &str)> = if objective.is_leafless() {
            vec![(objective.id.as_str(), objective.name.as_str())]
        } else {
            objective
                .leaves
                .iter()
                .map(|leaf| (leaf.id.as_str(), leaf.name.as_str()))
                .collect()
        };

        names
            .into_iter()
            .map(|(metric_id, name)| {
                let target = self
                    .metric_bounds(manager_id, metric_id, reference)
                    .map(|bounds| bounds.target);
                let label = match target {
                    Some(target) => self.label_for(metric_id, target),
                    None => name.to_string(),
                };
                MetricCard {
                    metric_id: metric_id.to_string(),
                    name: name.to_string(),
                    label,
                    unit: self.unit_for(metric_id).map(str::to_string),
                    target,
                    average_value: self.aggregate_value(manager_id, metric_id, timeframe),
                }
            })
            .collect()
    }

    fn is_active(&self, manager_id: &str, objective: &ObjectiveSpec, month: Month) -> bool {
        objective.is_scored_in(month)
            && self
                .snapshot
                .entry(manager_id, &objective.id, month)
                .map_or(true, PeriodEntry::enabled)
    }
}
