use super::catalog::RuleBounds;
use serde::{Deserialize, Serialize};

/// How a raw value of exactly zero is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroValuePolicy {
    /// Zero is a genuine measurement and is scored like any other value.
    #[default]
    Measured,
    /// Zero means nothing was entered yet; it always scores 0.
    NoData,
}

impl ZeroValuePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "measured" => Some(Self::Measured),
            "no_data" | "nodata" | "no-data" => Some(Self::NoData),
            _ => None,
        }
    }
}

/// Maps `value` onto 0..=100 where `base` scores 0 and `target` scores 100.
///
/// When `base > target` the scale is inverted and lower values score higher.
/// A degenerate rule (`base == target`) and any non-finite input score 0.
pub fn achievement(value: f64, base: f64, target: f64) -> u8 {
    if !(value.is_finite() && base.is_finite() && target.is_finite()) {
        return 0;
    }

    let ratio = if base < target {
        if value <= base {
            return 0;
        }
        if value >= target {
            return 100;
        }
        (value - base) / (target - base)
    } else if base > target {
        if value >= base {
            return 0;
        }
        if value <= target {
            return 100;
        }
        (base - value) / (base - target)
    } else {
        return 0;
    };

    let score = (ratio * 100.0).round();
    if score.is_finite() {
        score.clamp(0.0, 100.0) as u8
    } else {
        0
    }
}

pub(crate) fn score_metric(value: f64, bounds: RuleBounds, policy: ZeroValuePolicy) -> u8 {
    if policy == ZeroValuePolicy::NoData && value == 0.0 {
        return 0;
    }
    achievement(value, bounds.base, bounds.target)
}

/// Rounded arithmetic mean of integer scores; an empty set scores 0.
pub(crate) fn mean_score<I>(scores: I) -> u8
where
    I: IntoIterator<Item = u8>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), score| {
            (sum + u32::from(score), count + 1)
        });
    if count == 0 {
        return 0;
    }
    let mean = (f64::from(sum) / f64::from(count)).round();
    mean.clamp(0.0, 100.0) as u8
}
