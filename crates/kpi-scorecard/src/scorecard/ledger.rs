use super::domain::{Month, Timeframe};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-manager, per-month "validated" flags gating rollups.
///
/// Only a stored `true` counts as closed; any other stored value is open.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ClosedMonthLedger {
    flags: BTreeMap<String, BTreeMap<String, Value>>,
}

impl ClosedMonthLedger {
    pub fn is_closed(&self, manager_id: &str, month: Month) -> bool {
        self.flags
            .get(manager_id)
            .and_then(|months| months.get(month.key()))
            .is_some_and(|flag| *flag == Value::Bool(true))
    }

    pub fn set_closed(&mut self, manager_id: &str, month: Month, closed: bool) {
        self.flags
            .entry(manager_id.to_string())
            .or_default()
            .insert(month.key().to_string(), Value::Bool(closed));
    }

    /// Flips the flag and returns the new state.
    pub fn toggle(&mut self, manager_id: &str, month: Month) -> bool {
        let closed = !self.is_closed(manager_id, month);
        self.set_closed(manager_id, month, closed);
        closed
    }

    /// Closed months of `timeframe`, in calendar order.
    pub fn closed_months(&self, manager_id: &str, timeframe: Timeframe) -> Vec<Month> {
        timeframe
            .months()
            .into_iter()
            .filter(|month| self.is_closed(manager_id, *month))
            .collect()
    }

    pub(crate) fn ensure(&mut self, manager_id: &str, month: Month) {
        self.flags
            .entry(manager_id.to_string())
            .or_default()
            .entry(month.key().to_string())
            .or_insert(Value::Bool(false));
    }
}

impl<'de> Deserialize<'de> for ClosedMonthLedger {
    /// Managers whose flags are not an object are dropped; flag values are kept verbatim.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Value::Object(managers) = Value::deserialize(deserializer)? else {
            return Ok(Self::default());
        };
        let flags = managers
            .into_iter()
            .filter_map(|(manager_id, months)| match months {
                Value::Object(months) => Some((manager_id, months.into_iter().collect())),
                _ => None,
            })
            .collect();
        Ok(Self { flags })
    }
}
