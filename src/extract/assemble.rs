use serde::{Deserialize, Serialize};

use crate::models::course::sanitize_credits;

use super::header::{ColumnMap, Field};

/// A course row as scraped from a document, before it becomes a catalog [`crate::models::Course`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedCourse {
    pub code: String,
    pub title: String,
    pub credits: f64,
    pub professor: String,
    pub schedule: String,
    pub delivery: String,
    pub description: String,
    /// Requirement-category labels attached by the tagger.
    #[serde(default)]
    pub fields: Vec<String>,
}

impl ScrapedCourse {
    pub fn from_row(row: &[String], columns: &ColumnMap) -> Self {
        let schedule = [columns.cell(row, Field::DaysTimes), columns.cell(row, Field::Times)]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            code: columns.cell(row, Field::CourseCode).to_string(),
            title: columns.cell(row, Field::CourseTitle).to_string(),
            credits: parse_credits(columns.cell(row, Field::Credits)),
            professor: columns.cell(row, Field::Instructor).to_string(),
            schedule,
            delivery: columns.cell(row, Field::Delivery).to_string(),
            description: columns.cell(row, Field::Description).to_string(),
            fields: Vec::new(),
        }
    }

    /// Appends wrapped text, separated by a single space.
    pub fn append_description(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.description.is_empty() {
            self.description.push(' ');
        }
        self.description.push_str(text);
    }
}

/// Leading numeric token of a credits cell (`"3"`, `"1.5 cr"`); `0.0` when unparsable.
pub fn parse_credits(cell: &str) -> f64 {
    cell.split_whitespace()
        .next()
        .and_then(|token| token.parse::<f64>().ok())
        .map(sanitize_credits)
        .unwrap_or(0.0)
}

/// Turns the rows that follow the header into courses.
///
/// A row with a course code starts a new course. A row without one continues
/// the previous course's description; with no previous course it is dropped.
/// Duplicate codes are kept.
pub fn assemble_courses(rows: &[Vec<String>], columns: &ColumnMap) -> Vec<ScrapedCourse> {
    let mut courses: Vec<ScrapedCourse> = Vec::new();

    for row in rows.iter().filter(|row| !row.is_empty()) {
        if !columns.cell(row, Field::CourseCode).is_empty() {
            courses.push(ScrapedCourse::from_row(row, columns));
            continue;
        }

        let Some(current) = courses.last_mut() else {
            continue;
        };
        let continuation = match columns.position(Field::Description).and_then(|idx| row.get(idx)) {
            Some(cell) => cell.clone(),
            None => row.join(" "),
        };
        current.append_description(&continuation);
    }

    courses
}
