use super::achievement::ZeroValuePolicy;
use super::catalog::{RuleBook, RuleCatalog};
use super::domain::{Month, Roster};
use super::objectives::ObjectiveTree;
use super::snapshot::YearSnapshot;

/// Stateless scorer holding the roster, objective tree, and rule book.
///
/// All queries run against a borrowed [`YearSnapshot`] through [`ScoringEngine::view`].
#[derive(Debug, Clone)]
pub struct ScoringEngine<R = RuleCatalog> {
    roster: Roster,
    objectives: ObjectiveTree,
    rules: R,
    zero_policy: ZeroValuePolicy,
}

impl ScoringEngine<RuleCatalog> {
    pub fn standard() -> Self {
        Self::new(
            Roster::standard(),
            ObjectiveTree::standard(),
            RuleCatalog::standard(),
        )
    }
}

impl<R: RuleBook> ScoringEngine<R> {
    pub fn new(roster: Roster, objectives: ObjectiveTree, rules: R) -> Self {
        Self {
            roster,
            objectives,
            rules,
            zero_policy: ZeroValuePolicy::default(),
        }
    }

    pub fn with_zero_policy(mut self, zero_policy: ZeroValuePolicy) -> Self {
        self.zero_policy = zero_policy;
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn objectives(&self) -> &ObjectiveTree {
        &self.objectives
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn zero_policy(&self) -> ZeroValuePolicy {
        self.zero_policy
    }

    pub fn initialize(&self) -> YearSnapshot {
        YearSnapshot::initialize(&self.roster, &self.objectives)
    }

    pub fn hydrate(&self, raw: &str) -> YearSnapshot {
        YearSnapshot::hydrate(raw, &self.roster, &self.objectives)
    }

    pub fn view<'a>(&'a self, snapshot: &'a YearSnapshot) -> ScoreView<'a, R> {
        ScoreView {
            engine: self,
            snapshot,
        }
    }
}

/// Read-only query surface over one snapshot.
///
/// The per-period resolver, timeframe aggregator, and composer each extend this type.
pub struct ScoreView<'a, R = RuleCatalog> {
    pub(crate) engine: &'a ScoringEngine<R>,
    pub(crate) snapshot: &'a YearSnapshot,
}

impl<'a, R: RuleBook> ScoreView<'a, R> {
    pub fn engine(&self) -> &'a ScoringEngine<R> {
        self.engine
    }

    pub fn snapshot(&self) -> &'a YearSnapshot {
        self.snapshot
    }

    pub fn is_closed(&self, manager_id: &str, month: Month) -> bool {
        self.snapshot.completions.is_closed(manager_id, month)
    }

    pub fn label_for(&self, metric_id: &str, target: f64) -> String {
        self.engine.rules.label_for(metric_id, target)
    }

    pub fn unit_for(&self, metric_id: &str) -> Option<&'a str> {
        self.engine.rules.unit_for(metric_id)
    }
}
