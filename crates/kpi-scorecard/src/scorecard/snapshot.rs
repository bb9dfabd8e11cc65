use super::domain::{Month, Roster};
use super::ledger::ClosedMonthLedger;
use super::objectives::{ObjectiveSpec, ObjectiveTree};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Month key -> entry for one objective.
pub type ObjectiveMonths = BTreeMap<String, PeriodEntry>;
/// Objective id -> months for one manager.
pub type ManagerData = BTreeMap<String, ObjectiveMonths>;

/// Raw value plus optional overrides for one metric in one month.
///
/// Overrides arrive as `null`, `""`, numbers or numeric strings; anything that is
/// not a finite number means "use the catalog rule".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    #[serde(rename = "v", default, deserialize_with = "lenient_value")]
    pub value: f64,
    #[serde(
        rename = "e",
        default = "enabled_by_default",
        deserialize_with = "lenient_flag"
    )]
    pub enabled: bool,
    #[serde(rename = "t", default, deserialize_with = "lenient_override")]
    pub target_override: Option<f64>,
    #[serde(rename = "b", default, deserialize_with = "lenient_override")]
    pub base_override: Option<f64>,
}

impl Default for MetricEntry {
    fn default() -> Self {
        Self {
            value: 0.0,
            enabled: true,
            target_override: None,
            base_override: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeEntry {
    #[serde(
        rename = "e",
        default = "enabled_by_default",
        deserialize_with = "lenient_flag"
    )]
    pub enabled: bool,
    #[serde(rename = "s")]
    pub leaves: BTreeMap<String, MetricEntry>,
}

/// State of one (manager, objective, month) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeriodEntry {
    Composite(CompositeEntry),
    Single(MetricEntry),
}

impl PeriodEntry {
    pub fn default_for(objective: &ObjectiveSpec) -> Self {
        if objective.is_leafless() {
            Self::Single(MetricEntry::default())
        } else {
            Self::Composite(CompositeEntry {
                enabled: true,
                leaves: objective
                    .leaves
                    .iter()
                    .map(|leaf| (leaf.id.clone(), MetricEntry::default()))
                    .collect(),
            })
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            Self::Composite(entry) => entry.enabled,
            Self::Single(entry) => entry.enabled,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match self {
            Self::Composite(entry) => entry.enabled = enabled,
            Self::Single(entry) => entry.enabled = enabled,
        }
    }

    /// Value cell of a leafless objective.
    pub fn metric(&self) -> Option<&MetricEntry> {
        match self {
            Self::Single(entry) => Some(entry),
            Self::Composite(_) => None,
        }
    }

    pub fn leaf(&self, leaf_id: &str) -> Option<&MetricEntry> {
        match self {
            Self::Composite(entry) => entry.leaves.get(leaf_id),
            Self::Single(_) => None,
        }
    }

    /// Mutable value cell for `metric_id`, reshaping the entry to match the objective.
    pub fn metric_mut(&mut self, objective: &ObjectiveSpec, metric_id: &str) -> &mut MetricEntry {
        self.conform(objective);
        match self {
            Self::Single(entry) => entry,
            Self::Composite(entry) => entry.leaves.entry(metric_id.to_string()).or_default(),
        }
    }

    /// Reshapes a mismatched entry and adds any missing leaf cells.
    pub(crate) fn conform(&mut self, objective: &ObjectiveSpec) {
        let replacement = match self {
            Self::Single(single) if !objective.is_leafless() => {
                let mut reshaped = Self::default_for(objective);
                reshaped.set_enabled(single.enabled);
                Some(reshaped)
            }
            Self::Composite(composite) if objective.is_leafless() => {
                Some(Self::Single(MetricEntry {
                    enabled: composite.enabled,
                    ..MetricEntry::default()
                }))
            }
            Self::Composite(composite) => {
                for leaf in &objective.leaves {
                    composite.leaves.entry(leaf.id.clone()).or_default();
                }
                None
            }
            Self::Single(_) => None,
        };
        if let Some(reshaped) = replacement {
            *self = reshaped;
        }
    }
}

/// Whole-year state: period entries plus the closed-month ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearSnapshot {
    #[serde(default, deserialize_with = "lenient_data")]
    pub data: BTreeMap<String, ManagerData>,
    #[serde(default)]
    pub completions: ClosedMonthLedger,
}

impl YearSnapshot {
    /// Every value 0, every objective and leaf enabled, no overrides, all months open.
    pub fn initialize(roster: &Roster, objectives: &ObjectiveTree) -> Self {
        let mut snapshot = Self::default();
        snapshot.fill_missing(roster, objectives);
        snapshot
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Builds a usable snapshot from whatever the store returned.
    ///
    /// Unparseable payloads and payloads without period data fall back to the
    /// default initializer. Unreadable cells are dropped one by one and every gap
    /// is then filled with defaults.
    pub fn hydrate(raw: &str, roster: &Roster, objectives: &ObjectiveTree) -> Self {
        let mut snapshot = match Self::from_json(raw) {
            Ok(snapshot) if !snapshot.data.is_empty() => snapshot,
            Ok(_) => return Self::initialize(roster, objectives),
            Err(err) => {
                warn!(error = %err, "stored snapshot is malformed; starting from defaults");
                return Self::initialize(roster, objectives);
            }
        };
        snapshot.fill_missing(roster, objectives);
        snapshot
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Ensures every (manager, objective, month) has an entry and every month a flag.
    pub fn fill_missing(&mut self, roster: &Roster, objectives: &ObjectiveTree) {
        for manager in roster.iter() {
            let manager_data = self.data.entry(manager.id.clone()).or_default();
            for objective in objectives.iter() {
                let months = manager_data.entry(objective.id.clone()).or_default();
                for month in Month::all() {
                    months
                        .entry(month.key().to_string())
                        .or_insert_with(|| PeriodEntry::default_for(objective))
                        .conform(objective);
                }
            }
            for month in Month::all() {
                self.completions.ensure(&manager.id, month);
            }
        }
    }

    pub fn entry(
        &self,
        manager_id: &str,
        objective_id: &str,
        month: Month,
    ) -> Option<&PeriodEntry> {
        self.data
            .get(manager_id)?
            .get(objective_id)?
            .get(month.key())
    }

    pub fn entry_mut(
        &mut self,
        manager_id: &str,
        objective: &ObjectiveSpec,
        month: Month,
    ) -> &mut PeriodEntry {
        let entry = self
            .data
            .entry(manager_id.to_string())
            .or_default()
            .entry(objective.id.clone())
            .or_default()
            .entry(month.key().to_string())
            .or_insert_with(|| PeriodEntry::default_for(objective));
        entry.conform(objective);
        entry
    }
}

fn enabled_by_default() -> bool {
    true
}

/// Keeps every readable manager, objective and month; other nodes are skipped.
fn lenient_data<'de, D>(deserializer: D) -> Result<BTreeMap<String, ManagerData>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(managers) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };

    let mut data = BTreeMap::new();
    for (manager_id, objectives) in managers {
        let Value::Object(objectives) = objectives else {
            warn!(%manager_id, "skipping unreadable manager in stored snapshot");
            continue;
        };
        let manager_data: &mut ManagerData = data.entry(manager_id.clone()).or_default();
        for (objective_id, months) in objectives {
            let Value::Object(months) = months else {
                warn!(
                    %manager_id,
                    %objective_id,
                    "skipping unreadable objective in stored snapshot"
                );
                continue;
            };
            let cells = manager_data.entry(objective_id.clone()).or_default();
            for (month_key, cell) in months {
                match serde_json::from_value::<PeriodEntry>(cell) {
                    Ok(entry) => {
                        cells.insert(month_key, entry);
                    }
                    Err(err) => warn!(
                        %manager_id,
                        %objective_id,
                        month = %month_key,
                        error = %err,
                        "skipping unreadable cell in stored snapshot"
                    ),
                }
            }
        }
    }
    Ok(data)
}

fn finite_number(raw: &Value) -> Option<f64> {
    let number = match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|value| value.is_finite())
}

fn lenient_value<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(finite_number(&raw).unwrap_or(0.0))
}

fn lenient_override<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(finite_number))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Bool(flag) => flag,
        Value::Null => false,
        Value::Number(number) => number.as_f64().is_some_and(|value| value != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}
