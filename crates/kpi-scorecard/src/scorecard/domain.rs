use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MONTH_KEYS: [&str; 12] = [
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11",
];

const MONTH_LABELS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Calendar month index within the scored year (0 = January).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Month(u8);

impl Month {
    pub const COUNT: u8 = 12;

    pub const fn new(index: u8) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    pub fn all() -> impl Iterator<Item = Month> {
        (0..Self::COUNT).map(Self)
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// Key used for this month in the persisted snapshot maps.
    pub const fn key(self) -> &'static str {
        MONTH_KEYS[self.0 as usize]
    }

    pub fn from_key(key: &str) -> Option<Self> {
        key.trim().parse::<u8>().ok().and_then(Self::new)
    }

    pub const fn label(self) -> &'static str {
        MONTH_LABELS[self.0 as usize]
    }

    pub const fn quarter(self) -> Quarter {
        Quarter(self.0 / 3)
    }

    /// Quarterly objectives are only scored in the last month of each quarter.
    pub const fn is_quarter_end(self) -> bool {
        self.0 % 3 == 2
    }
}

impl TryFrom<u8> for Month {
    type Error = MonthOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(MonthOutOfRange(value))
    }
}

impl From<Month> for u8 {
    fn from(value: Month) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("month index {0} is outside 0..=11")]
pub struct MonthOutOfRange(pub u8);

/// Three consecutive months, indexed 0..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quarter(u8);

impl Quarter {
    pub const COUNT: u8 = 4;

    pub const fn new(index: u8) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    pub const fn months(self) -> [Month; 3] {
        let first = self.0 * 3;
        [Month(first), Month(first + 1), Month(first + 2)]
    }

    pub const fn closing_month(self) -> Month {
        Month(self.0 * 3 + 2)
    }
}

impl TryFrom<u8> for Quarter {
    type Error = TimeframeParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(TimeframeParseError::QuarterOutOfRange(value))
    }
}

impl From<Quarter> for u8 {
    fn from(value: Quarter) -> Self {
        value.0
    }
}

/// Averaging window used by rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Month(Month),
    Quarter(Quarter),
    YearToDate,
}

impl Timeframe {
    pub fn months(self) -> Vec<Month> {
        match self {
            Self::Month(month) => vec![month],
            Self::Quarter(quarter) => quarter.months().to_vec(),
            Self::YearToDate => Month::all().collect(),
        }
    }

    /// Month whose rule values and overrides label a rollup.
    pub const fn reference_month(self) -> Month {
        match self {
            Self::Month(month) => month,
            Self::Quarter(quarter) => quarter.closing_month(),
            Self::YearToDate => Month(Month::COUNT - 1),
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::Month(month) => month.label().to_string(),
            Self::Quarter(quarter) => format!("Q{}", quarter.index() + 1),
            Self::YearToDate => "Year to date".to_string(),
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::YearToDate
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month(month) => write!(f, "month:{}", month.index()),
            Self::Quarter(quarter) => write!(f, "quarter:{}", quarter.index()),
            Self::YearToDate => f.write_str("ytd"),
        }
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_ascii_lowercase();
        match value.as_str() {
            "ytd" | "year" | "accumulated" => return Ok(Self::YearToDate),
            _ => {}
        }

        let (kind, index) = value
            .split_once(':')
            .ok_or_else(|| TimeframeParseError::Unrecognized(raw.to_string()))?;
        let index = index
            .trim()
            .parse::<u8>()
            .map_err(|_| TimeframeParseError::Unrecognized(raw.to_string()))?;

        match kind.trim() {
            "month" => Month::new(index)
                .map(Self::Month)
                .ok_or(TimeframeParseError::MonthOutOfRange(index)),
            "quarter" => Quarter::new(index)
                .map(Self::Quarter)
                .ok_or(TimeframeParseError::QuarterOutOfRange(index)),
            _ => Err(TimeframeParseError::Unrecognized(raw.to_string())),
        }
    }
}

impl Serialize for Timeframe {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timeframe {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeframeParseError {
    #[error("timeframe '{0}' must be 'ytd', 'month:<0-11>' or 'quarter:<0-3>'")]
    Unrecognized(String),
    #[error("month index {0} is outside 0..=11")]
    MonthOutOfRange(u8),
    #[error("quarter index {0} is outside 0..=3")]
    QuarterOutOfRange(u8),
}

/// Identity of a scored manager. The roster is fixed for the year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    managers: Vec<Manager>,
}

impl Roster {
    pub fn new(managers: Vec<Manager>) -> Self {
        Self { managers }
    }

    pub fn standard() -> Self {
        const ENTRIES: [(&str, &str, &str, &str); 10] = [
            ("m1", "Store Manager 01", "S1", "#3b82f6"),
            ("m2", "Store Manager 02", "S2", "#f43f5e"),
            ("m3", "Store Manager 03", "S3", "#10b981"),
            ("m4", "Store Manager 04", "S4", "#f59e0b"),
            ("m5", "Store Manager 05", "S5", "#8b5cf6"),
            ("m6", "Store Manager 06", "S6", "#ec4899"),
            ("m7", "Store Manager 07", "S7", "#06b6d4"),
            ("m8", "Store Manager 08", "S8", "#b45309"),
            ("m9", "Store Manager 09", "S9", "#475569"),
            ("m10", "Store Manager 10", "S10", "#84cc16"),
        ];

        Self::new(
            ENTRIES
                .iter()
                .map(|(id, name, avatar, color)| Manager {
                    id: (*id).to_string(),
                    name: (*name).to_string(),
                    avatar: (*avatar).to_string(),
                    color: (*color).to_string(),
                })
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &Manager> {
        self.managers.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Manager> {
        self.managers.iter().find(|manager| manager.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}
