use std::collections::{BTreeMap, HashMap};

use super::assemble::ScrapedCourse;

/// Requirement-category label -> summed credits.
pub type CreditTotals = BTreeMap<String, f64>;

/// Course-code prefix -> requirement-category labels.
#[derive(Debug, Clone)]
pub struct PrefixMap(HashMap<String, Vec<String>>);

impl Default for PrefixMap {
    fn default() -> Self {
        Self::from_pairs(&[
            ("BX", &["Bible/Sacred Texts"]),
            ("BIBL", &["Bible/Sacred Texts"]),
            ("HB", &["Bible/Sacred Texts"]),
            ("OT", &["Bible/Sacred Texts"]),
            ("NT", &["Bible/Sacred Texts"]),
            ("CH", &["Historical Studies"]),
            ("HS", &["Historical Studies"]),
            ("HIST", &["Historical Studies"]),
            ("PR", &["Practical Theology"]),
            ("PT", &["Practical Theology"]),
            ("PRAC", &["Practical Theology"]),
            ("TH", &["Theology & Ethics"]),
            ("THEO", &["Theology & Ethics"]),
            ("ET", &["Theology & Ethics"]),
            ("ETH", &["Theology & Ethics"]),
            ("IE", &["Interreligious Engagement"]),
            ("SW", &["MSSW Core Courses"]),
            ("MSSW", &["MSSW Core Courses"]),
        ])
    }
}

impl PrefixMap {
    pub fn from_pairs(pairs: &[(&str, &[&str])]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(prefix, labels)| {
                    (
                        prefix.to_ascii_uppercase(),
                        labels.iter().map(|l| l.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }

    pub fn categories(&self, code: &str) -> &[String] {
        self.0
            .get(&course_prefix(code))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// The leading alphabetic run of a course code, uppercased (`"BIBL 101"` -> `"BIBL"`).
pub fn course_prefix(code: &str) -> String {
    code.trim()
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect::<String>()
        .to_uppercase()
}

/// Attaches categories to each course and sums credits per category.
pub fn tag_and_tally(courses: &mut [ScrapedCourse], map: &PrefixMap) -> CreditTotals {
    let mut totals = CreditTotals::new();
    for course in courses.iter_mut() {
        course.fields = map.categories(&course.code).to_vec();
        for field in &course.fields {
            *totals.entry(field.clone()).or_insert(0.0) += course.credits;
        }
    }
    totals
}

/// Adds `other` into `into`, category by category.
pub fn merge_totals(into: &mut CreditTotals, other: &CreditTotals) {
    for (category, credits) in other {
        *into.entry(category.clone()).or_insert(0.0) += credits;
    }
}
