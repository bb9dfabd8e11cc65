use super::catalog::RuleBook;
use super::domain::Month;
use super::engine::ScoringEngine;
use super::objectives::ObjectiveSpec;
use super::snapshot::YearSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideBound {
    Base,
    Target,
}

/// Single editor mutation. Every command addresses exactly one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditCommand {
    SetValue {
        manager_id: String,
        objective_id: String,
        #[serde(default)]
        leaf_id: Option<String>,
        month: u8,
        value: f64,
    },
    SetOverride {
        manager_id: String,
        objective_id: String,
        #[serde(default)]
        leaf_id: Option<String>,
        month: u8,
        bound: OverrideBound,
        /// `None` clears the override and restores the catalog rule.
        #[serde(default)]
        value: Option<f64>,
    },
    SetObjectiveEnabled {
        manager_id: String,
        objective_id: String,
        month: u8,
        enabled: bool,
    },
    SetLeafEnabled {
        manager_id: String,
        objective_id: String,
        leaf_id: String,
        month: u8,
        enabled: bool,
    },
    SetClosed {
        manager_id: String,
        month: u8,
        closed: bool,
    },
    ToggleClosed {
        manager_id: String,
        month: u8,
    },
}

impl EditCommand {
    pub fn manager_id(&self) -> &str {
        match self {
            Self::SetValue { manager_id, .. }
            | Self::SetOverride { manager_id, .. }
            | Self::SetObjectiveEnabled { manager_id, .. }
            | Self::SetLeafEnabled { manager_id, .. }
            | Self::SetClosed { manager_id, .. }
            | Self::ToggleClosed { manager_id, .. } => manager_id,
        }
    }

    pub fn month(&self) -> u8 {
        match self {
            Self::SetValue { month, .. }
            | Self::SetOverride { month, .. }
            | Self::SetObjectiveEnabled { month, .. }
            | Self::SetLeafEnabled { month, .. }
            | Self::SetClosed { month, .. }
            | Self::ToggleClosed { month, .. } => *month,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("unknown manager '{0}'")]
    UnknownManager(String),
    #[error("unknown objective '{0}'")]
    UnknownObjective(String),
    #[error("objective '{objective_id}' has no leaf '{leaf_id}'")]
    UnknownLeaf {
        objective_id: String,
        leaf_id: String,
    },
    #[error("objective '{0}' has leaves; a leaf id is required")]
    LeafRequired(String),
    #[error("objective '{0}' has no leaves; omit the leaf id")]
    LeafNotAllowed(String),
    #[error("month index {0} is outside 0..=11; the year-to-date view is read-only")]
    MonthOutOfRange(u8),
    #[error("value must be a finite number")]
    NonFiniteValue,
}

/// Applies `command` to a copy of `snapshot` and returns the whole new snapshot.
pub fn apply_edit<R: RuleBook>(
    engine: &ScoringEngine<R>,
    snapshot: &YearSnapshot,
    command: &EditCommand,
) -> Result<YearSnapshot, EditError> {
    let manager_id = command.manager_id();
    if !engine.roster().contains(manager_id) {
        return Err(EditError::UnknownManager(manager_id.to_string()));
    }
    let month = Month::new(command.month()).ok_or(EditError::MonthOutOfRange(command.month()))?;

    let mut next = snapshot.clone();
    match command {
        EditCommand::SetValue {
            objective_id,
            leaf_id,
            value,
            ..
        } => {
            let value = finite(*value)?;
            let objective = find_objective(engine, objective_id)?;
            let metric_id = resolve_metric_id(objective, leaf_id.as_deref())?;
            next.entry_mut(manager_id, objective, month)
                .metric_mut(objective, &metric_id)
                .value = value;
        }
        EditCommand::SetOverride {
            objective_id,
            leaf_id,
            bound,
            value,
            ..
        } => {
            let value = value.map(finite).transpose()?;
            let objective = find_objective(engine, objective_id)?;
            let metric_id = resolve_metric_id(objective, leaf_id.as_deref())?;
            let cell = next
                .entry_mut(manager_id, objective, month)
                .metric_mut(objective, &metric_id);
            match bound {
                OverrideBound::Base => cell.base_override = value,
                OverrideBound::Target => cell.target_override = value,
            }
        }
        EditCommand::SetObjectiveEnabled {
            objective_id,
            enabled,
            ..
        } => {
            let objective = find_objective(engine, objective_id)?;
            next.entry_mut(manager_id, objective, month)
                .set_enabled(*enabled);
        }
        EditCommand::SetLeafEnabled {
            objective_id,
            leaf_id,
            enabled,
            ..
        } => {
            let objective = find_objective(engine, objective_id)?;
            if objective.is_leafless() {
                return Err(EditError::LeafNotAllowed(objective.id.clone()));
            }
            let metric_id = resolve_metric_id(objective, Some(leaf_id.as_str()))?;
            next.entry_mut(manager_id, objective, month)
                .metric_mut(objective, &metric_id)
                .enabled = *enabled;
        }
        EditCommand::SetClosed { closed, .. } => {
            next.completions.set_closed(manager_id, month, *closed);
        }
        EditCommand::ToggleClosed { .. } => {
            next.completions.toggle(manager_id, month);
        }
    }

    Ok(next)
}

fn finite(value: f64) -> Result<f64, EditError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EditError::NonFiniteValue)
    }
}

fn find_objective<'e, R: RuleBook>(
    engine: &'e ScoringEngine<R>,
    objective_id: &str,
) -> Result<&'e ObjectiveSpec, EditError> {
    engine
        .objectives()
        .get(objective_id)
        .ok_or_else(|| EditError::UnknownObjective(objective_id.to_string()))
}

fn resolve_metric_id(
    objective: &ObjectiveSpec,
    leaf_id: Option<&str>,
) -> Result<String, EditError> {
    match (objective.is_leafless(), leaf_id) {
        (true, None) => Ok(objective.id.clone()),
        (true, Some(_)) => Err(EditError::LeafNotAllowed(objective.id.clone())),
        (false, None) => Err(EditError::LeafRequired(objective.id.clone())),
        (false, Some(leaf_id)) => objective
            .leaf(leaf_id)
            .map(|leaf| leaf.id.clone())
            .ok_or_else(|| EditError::UnknownLeaf {
                objective_id: objective.id.clone(),
                leaf_id: leaf_id.to_string(),
            }),
    }
}
