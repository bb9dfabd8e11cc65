use super::domain::Month;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const TARGET_PLACEHOLDER: &str = "{target}";

/// A base or target definition: constant, one value per month, or per manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Constant(f64),
    Monthly([f64; 12]),
    PerManager {
        managers: BTreeMap<String, RuleValue>,
        default: Box<RuleValue>,
    },
}

impl RuleValue {
    pub fn evaluate(&self, month: Month, manager_id: &str) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Monthly(values) => values[usize::from(month.index())],
            Self::PerManager { managers, default } => managers
                .get(manager_id)
                .unwrap_or(default.as_ref())
                .evaluate(month, manager_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleBounds {
    pub base: f64,
    pub target: f64,
}

/// Scoring rule for one leaf metric (or one leafless objective).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafRule {
    /// Display template; `{target}` is replaced by the resolved target.
    pub label: String,
    pub unit: String,
    pub base: RuleValue,
    pub target: RuleValue,
}

impl LeafRule {
    pub fn bounds(&self, month: Month, manager_id: &str) -> RuleBounds {
        RuleBounds {
            base: self.base.evaluate(month, manager_id),
            target: self.target.evaluate(month, manager_id),
        }
    }

    pub fn label_for(&self, target: f64) -> String {
        self.label
            .replace(TARGET_PLACEHOLDER, &format_number(target))
    }
}

/// Source of base/target values keyed by metric, month, and manager.
pub trait RuleBook: Send + Sync {
    fn bounds(&self, metric_id: &str, month: Month, manager_id: &str) -> Option<RuleBounds>;

    fn label_for(&self, metric_id: &str, _target: f64) -> String {
        metric_id.to_string()
    }

    fn unit_for(&self, _metric_id: &str) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleCatalog {
    rules: BTreeMap<String, LeafRule>,
}

impl RuleCatalog {
    pub fn new(rules: BTreeMap<String, LeafRule>) -> Self {
        Self { rules }
    }

    /// Dashboard rules plus the inverted stock rotation leaf `s4` in Performance.
    ///
    /// Under [`ZeroValuePolicy::Measured`](super::ZeroValuePolicy) an untouched `s4`
    /// sits below its target and scores 100, so a closed month with nothing
    /// entered rates Performance at 25.
    pub fn standard() -> Self {
        let training_target = [
            0.0, 0.0, 9.0, 0.0, 0.0, 18.0, 0.0, 0.0, 27.0, 0.0, 0.0, 36.0,
        ];
        let training_base = [
            0.0, 0.0, 5.0, 0.0, 0.0, 9.0, 0.0, 0.0, 18.0, 0.0, 0.0, 20.0,
        ];

        let mut rules = BTreeMap::new();
        let mut insert = |id: &str, label: &str, unit: &str, base: RuleValue, target: RuleValue| {
            rules.insert(
                id.to_string(),
                LeafRule {
                    label: label.to_string(),
                    unit: unit.to_string(),
                    base,
                    target,
                },
            );
        };

        use RuleValue::{Constant, Monthly};
        insert("s1", "Sales +{target}%", "%", Constant(0.0), Constant(10.0));
        insert("s2", "MAP +{target}%", "%", Constant(0.0), Constant(1.0));
        insert("s3", "Range >{target}%", "%", Constant(80.0), Constant(85.0));
        insert(
            "s4",
            "Stock rotation <{target} days",
            "days",
            Constant(60.8),
            Constant(59.5),
        );
        insert(
            "obj2",
            "Customer satisfaction >{target}pts",
            "pts",
            Constant(60.0),
            Constant(70.0),
        );
        insert(
            "f1",
            "Compliant markdowns {target}%",
            "%",
            Constant(50.0),
            Constant(100.0),
        );
        insert(
            "f2",
            "Markdown clearance {target}%",
            "%",
            Constant(50.0),
            Constant(100.0),
        );
        insert(
            "f3",
            "Discount review {target}%",
            "%",
            Constant(50.0),
            Constant(100.0),
        );
        insert(
            "f4",
            "Code 48 review {target}%",
            "%",
            Constant(50.0),
            Constant(100.0),
        );
        insert(
            "t1",
            "Training {target}h",
            "h",
            Monthly(training_base),
            Monthly(training_target),
        );
        insert(
            "t2",
            "One-to-ones {target}%",
            "%",
            Constant(50.0),
            Constant(100.0),
        );
        insert("t3", "PDI {target}%", "%", Constant(50.0), Constant(100.0));
        insert("t4", "eNPS >{target}%", "%", Constant(60.0), Constant(90.0));
        insert(
            "obj5",
            "Team objectives {target}%",
            "%",
            Constant(50.0),
            Constant(100.0),
        );

        Self::new(rules)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogLoadError> {
        let catalog = serde_json::from_reader(reader)?;
        Ok(catalog)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogLoadError> {
        let file = File::open(path).map_err(|source| CatalogLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn rule(&self, id: &str) -> Option<&LeafRule> {
        self.rules.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

impl RuleBook for RuleCatalog {
    fn bounds(&self, metric_id: &str, month: Month, manager_id: &str) -> Option<RuleBounds> {
        self.rules
            .get(metric_id)
            .map(|rule| rule.bounds(month, manager_id))
    }

    /// Human label for `metric_id` at the given target; unknown ids echo the id.
    fn label_for(&self, metric_id: &str, target: f64) -> String {
        match self.rules.get(metric_id) {
            Some(rule) => rule.label_for(target),
            None => metric_id.to_string(),
        }
    }

    fn unit_for(&self, metric_id: &str) -> Option<&str> {
        self.rules.get(metric_id).map(|rule| rule.unit.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("unable to read rule catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("rule catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(index: u8) -> Month {
        Month::new(index).expect("valid month")
    }

    #[test]
    fn monthly_rules_follow_the_calendar() {
        let catalog = RuleCatalog::standard();
        let march = catalog.bounds("t1", month(2), "m1").expect("t1 rule");
        assert_eq!(march, RuleBounds { base: 5.0, target: 9.0 });
        let december = catalog.bounds("t1", month(11), "m1").expect("t1 rule");
        assert_eq!(
            december,
            RuleBounds {
                base: 20.0,
                target: 36.0
            }
        );
    }

    #[test]
    fn per_manager_rules_fall_back_to_default() {
        let value = RuleValue::PerManager {
            managers: BTreeMap::from([("m2".to_string(), RuleValue::Constant(12.0))]),
            default: Box::new(RuleValue::Constant(10.0)),
        };
        assert_eq!(value.evaluate(month(0), "m2"), 12.0);
        assert_eq!(value.evaluate(month(0), "m3"), 10.0);
    }

    #[test]
    fn labels_render_resolved_targets() {
        let catalog = RuleCatalog::standard();
        assert_eq!(catalog.label_for("s1", 10.0), "Sales +10%");
        assert_eq!(catalog.label_for("s4", 59.5), "Stock rotation <59.5 days");
        assert_eq!(catalog.label_for("unknown", 3.0), "unknown");
        assert_eq!(catalog.unit_for("t1"), Some("h"));
        assert_eq!(catalog.unit_for("unknown"), None);
    }

    #[test]
    fn catalog_loads_from_json() {
        let raw = r#"{
            "x1": { "label": "Visits {target}", "unit": "n", "base": 0, "target": 20 },
            "x2": {
                "label": "Margin {target}%",
                "unit": "%",
                "base": 1,
                "target": { "managers": { "m1": 4 }, "default": 3 }
            }
        }"#;
        let catalog = RuleCatalog::from_reader(raw.as_bytes()).expect("catalog parses");
        assert_eq!(
            catalog.bounds("x1", month(5), "m1"),
            Some(RuleBounds {
                base: 0.0,
                target: 20.0
            })
        );
        assert_eq!(
            catalog.bounds("x2", month(5), "m1").map(|b| b.target),
            Some(4.0)
        );
        assert_eq!(
            catalog.bounds("x2", month(5), "m9").map(|b| b.target),
            Some(3.0)
        );
        assert!(catalog.bounds("s1", month(0), "m1").is_none());
    }

    #[test]
    fn catalog_rejects_malformed_json() {
        let error = RuleCatalog::from_reader("[1, 2".as_bytes()).expect_err("invalid json");
        assert!(matches!(error, CatalogLoadError::Parse(_)));
    }
}
