use super::domain::{Month, Timeframe};
use serde::Serialize;

/// Coarse score classification used to color dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatBand {
    Empty,
    Low,
    Medium,
    High,
}

impl HeatBand {
    pub const fn from_score(score: u8) -> Self {
        match score {
            0 => Self::Empty,
            1..=49 => Self::Low,
            50..=84 => Self::Medium,
            _ => Self::High,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Empty => "No data",
            Self::Low => "Below plan",
            Self::Medium => "Approaching",
            Self::High => "On target",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::Empty => "#cbd5e1",
            Self::Low => "#ef4444",
            Self::Medium => "#f59e0b",
            Self::High => "#10b981",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub manager_id: String,
    pub manager_name: String,
    pub color: String,
    pub score: u8,
    pub heat_band: HeatBand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagerScore {
    pub manager_id: String,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct RadarAxis {
    pub objective_id: String,
    pub objective_name: String,
    pub scores: Vec<ManagerScore>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub month: Month,
    pub month_label: &'static str,
    /// `None` while the month is still open.
    pub score: Option<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendSeries {
    pub manager_id: String,
    pub manager_name: String,
    pub color: String,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricCard {
    pub metric_id: String,
    pub name: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    pub average_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectiveCard {
    pub objective_id: String,
    pub name: String,
    pub quarterly: bool,
    pub score: u8,
    pub heat_band: HeatBand,
    pub metrics: Vec<MetricCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManagerScorecard {
    pub manager_id: String,
    pub manager_name: String,
    pub timeframe: Timeframe,
    pub timeframe_label: String,
    pub global_score: u8,
    pub heat_band: HeatBand,
    pub closed_months: Vec<Month>,
    pub objectives: Vec<ObjectiveCard>,
}
