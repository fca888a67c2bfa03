use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::course::sanitize_credits;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    pub label: String,
    pub min_credits: f64,
    #[serde(default)]
    pub(crate) satisfied_by: BTreeSet<String>,
}

impl Requirement {
    pub fn new(id: impl Into<String>, label: impl Into<String>, min_credits: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            min_credits: sanitize_credits(min_credits),
            satisfied_by: BTreeSet::new(),
        }
    }

    /// Course ids known to count toward this requirement.
    pub fn satisfied_by(&self) -> &BTreeSet<String> {
        &self.satisfied_by
    }
}

/// Requirement buckets of the dual M.Div / MSSW program with their default credit minima.
pub fn default_requirements() -> Vec<Requirement> {
    [
        ("bible", "Bible/Sacred Texts", 12.0),
        ("historical", "Historical Studies", 9.0),
        ("interreligious", "Interreligious Engagement", 6.0),
        ("practical", "Practical Theology", 12.0),
        ("theology_ethics", "Theology & Ethics", 12.0),
        ("field_ed", "Field Education", 6.0),
        ("electives", "Electives", 15.0),
        ("mssw_core", "MSSW Core Courses", 30.0),
        ("integrative_seminar", "Integrative Seminar", 3.0),
        ("social_work_practice", "Social Work Practice", 12.0),
        ("social_work_research", "Social Work Research", 6.0),
        ("social_work_policy", "Social Work Policy", 6.0),
    ]
    .into_iter()
    .map(|(id, label, min)| Requirement::new(id, label, min))
    .collect()
}
