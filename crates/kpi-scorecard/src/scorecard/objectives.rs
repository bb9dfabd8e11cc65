use super::domain::Month;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafSpec {
    pub id: String,
    pub name: String,
}

/// Top-level objective. Without leaves it is scored as a single metric using its own id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveSpec {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leaves: Vec<LeafSpec>,
    #[serde(default)]
    pub quarterly: bool,
}

impl ObjectiveSpec {
    pub fn is_leafless(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn is_scored_in(&self, month: Month) -> bool {
        !self.quarterly || month.is_quarter_end()
    }

    pub fn leaf(&self, id: &str) -> Option<&LeafSpec> {
        self.leaves.iter().find(|leaf| leaf.id == id)
    }

    /// Ids of the metrics that carry values for this objective.
    pub fn metric_ids(&self) -> Vec<&str> {
        if self.is_leafless() {
            vec![self.id.as_str()]
        } else {
            self.leaves.iter().map(|leaf| leaf.id.as_str()).collect()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectiveTree {
    objectives: Vec<ObjectiveSpec>,
}

impl ObjectiveTree {
    pub fn new(objectives: Vec<ObjectiveSpec>) -> Self {
        Self { objectives }
    }

    pub fn standard() -> Self {
        fn leaves(entries: &[(&str, &str)]) -> Vec<LeafSpec> {
            entries
                .iter()
                .map(|(id, name)| LeafSpec {
                    id: (*id).to_string(),
                    name: (*name).to_string(),
                })
                .collect()
        }

        Self::new(vec![
            ObjectiveSpec {
                id: "obj1".to_string(),
                name: "Performance".to_string(),
                leaves: leaves(&[
                    ("s1", "Sales +10%"),
                    ("s2", "MAP +1%"),
                    ("s3", "Range >85%"),
                    ("s4", "Stock rotation"),
                ]),
                quarterly: false,
            },
            ObjectiveSpec {
                id: "obj3".to_string(),
                name: "FullGreen".to_string(),
                leaves: leaves(&[
                    ("f1", "Compliant markdowns"),
                    ("f2", "Markdown clearance"),
                    ("f3", "Discount review"),
                    ("f4", "Code 48 review"),
                ]),
                quarterly: false,
            },
            ObjectiveSpec {
                id: "obj4".to_string(),
                name: "Talent".to_string(),
                leaves: leaves(&[
                    ("t1", "Training"),
                    ("t2", "One-to-ones"),
                    ("t3", "PDI"),
                    ("t4", "eNPS"),
                ]),
                quarterly: true,
            },
            ObjectiveSpec {
                id: "obj2".to_string(),
                name: "Customer satisfaction".to_string(),
                leaves: Vec::new(),
                quarterly: false,
            },
            ObjectiveSpec {
                id: "obj5".to_string(),
                name: "Team objectives".to_string(),
                leaves: Vec::new(),
                quarterly: false,
            },
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectiveSpec> {
        self.objectives.iter()
    }

    pub fn get(&self, id: &str) -> Option<&ObjectiveSpec> {
        self.objectives.iter().find(|objective| objective.id == id)
    }

    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }

    /// Locates a metric id: either a leaf of some objective or a leafless objective.
    pub fn find_metric(&self, metric_id: &str) -> Option<(&ObjectiveSpec, Option<&LeafSpec>)> {
        self.objectives.iter().find_map(|objective| {
            if objective.is_leafless() {
                (objective.id == metric_id).then_some((objective, None))
            } else {
                objective.leaf(metric_id).map(|leaf| (objective, Some(leaf)))
            }
        })
    }
}
