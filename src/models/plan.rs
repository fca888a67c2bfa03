use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A student's selections: semester label -> ordered, duplicate-free course ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub selections: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "Utc::now", with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Default for Plan {
    fn default() -> Self {
        Self::new()
    }
}

impl Plan {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            selections: BTreeMap::new(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `false` when the course was already selected for that semester.
    pub fn add_course(&mut self, semester: &str, course_id: &str) -> bool {
        let ids = self.selections.entry(semester.to_string()).or_default();
        if ids.iter().any(|id| id == course_id) {
            return false;
        }
        ids.push(course_id.to_string());
        self.updated_at = Utc::now();
        true
    }

    /// Returns `false` (and leaves `updated_at` alone) when nothing was removed.
    pub fn remove_course(&mut self, semester: &str, course_id: &str) -> bool {
        let Some(ids) = self.selections.get_mut(semester) else {
            return false;
        };
        let Some(pos) = ids.iter().position(|id| id == course_id) else {
            return false;
        };
        ids.remove(pos);
        self.updated_at = Utc::now();
        true
    }

    pub fn courses_for_semester(&self, semester: &str) -> &[String] {
        self.selections
            .get(semester)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every `(semester, course_id)` pair in semester order.
    pub fn iter_selections(&self) -> impl Iterator<Item = (&str, &str)> {
        self.selections
            .iter()
            .flat_map(|(sem, ids)| ids.iter().map(move |id| (sem.as_str(), id.as_str())))
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let mut plan: Plan = serde_json::from_str(raw)?;
        plan.dedupe();
        Ok(plan)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), AppError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// A missing file yields a fresh plan.
    pub fn load_from_file(path: &Path) -> Result<Self, AppError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_json(&raw),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    // Hand-edited or foreign JSON may repeat ids.
    fn dedupe(&mut self) {
        for ids in self.selections.values_mut() {
            let mut seen = std::collections::HashSet::new();
            ids.retain(|id| seen.insert(id.clone()));
        }
    }
}

mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    // Accepts RFC 3339 as well as naive ISO-8601 (read as UTC).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| D::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
    }
}
