use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Field {
    CourseCode,
    CourseTitle,
    Credits,
    Instructor,
    DaysTimes,
    Times,
    Delivery,
    Description,
}

impl Field {
    pub const MANDATORY: [Field; 3] = [Field::CourseCode, Field::CourseTitle, Field::Credits];

    pub fn name(self) -> &'static str {
        match self {
            Field::CourseCode => "Course Code",
            Field::CourseTitle => "Course Title",
            Field::Credits => "Credits",
            Field::Instructor => "Instructor",
            Field::DaysTimes => "Days/Times",
            Field::Times => "Times",
            Field::Delivery => "Delivery",
            Field::Description => "Description",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Header keywords in priority order. A cell maps to the first keyword it contains.
const HEADER_KEYWORDS: &[(&str, Field)] = &[
    ("course code", Field::CourseCode),
    ("course title", Field::CourseTitle),
    ("title", Field::CourseTitle),
    ("credit", Field::Credits),
    ("instructor", Field::Instructor),
    ("faculty", Field::Instructor),
    ("professor", Field::Instructor),
    ("days/times", Field::DaysTimes),
    ("days", Field::DaysTimes),
    ("schedule", Field::DaysTimes),
    ("time", Field::Times),
    ("delivery", Field::Delivery),
    ("mode", Field::Delivery),
    ("format", Field::Delivery),
    ("description", Field::Description),
];

/// Canonical field -> column position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMap(BTreeMap<Field, usize>);

impl ColumnMap {
    pub fn from_header(header: &[String]) -> Result<Self, ParseError> {
        let mut map = BTreeMap::new();
        for (idx, cell) in header.iter().enumerate() {
            let cell = cell.trim().to_lowercase();
            let hit = HEADER_KEYWORDS
                .iter()
                .find(|(keyword, _)| cell.contains(keyword))
                .map(|&(_, field)| field);
            if let Some(field) = hit {
                map.entry(field).or_insert(idx);
            }
        }

        for field in Field::MANDATORY {
            if !map.contains_key(&field) {
                return Err(ParseError::MissingColumn(field.name()));
            }
        }
        Ok(Self(map))
    }

    pub fn position(&self, field: Field) -> Option<usize> {
        self.0.get(&field).copied()
    }

    /// The cell for `field` in `row`, or `""` when unmapped or the row is short.
    pub fn cell<'a>(&self, row: &'a [String], field: Field) -> &'a str {
        self.position(field)
            .and_then(|idx| row.get(idx))
            .map(|s| s.trim())
            .unwrap_or_default()
    }
}

/// Index of the first row whose joined lowercase text mentions both "course" and "code".
pub fn find_header_row(rows: &[Vec<String>]) -> Result<usize, ParseError> {
    rows.iter()
        .position(|row| {
            let joined = row.join(" ").to_lowercase();
            joined.contains("course") && joined.contains("code")
        })
        .ok_or(ParseError::MissingHeader)
}

/// Locates the header row and maps its columns.
pub fn resolve(rows: &[Vec<String>]) -> Result<(usize, ColumnMap), ParseError> {
    let idx = find_header_row(rows)?;
    let columns = ColumnMap::from_header(&rows[idx])?;
    Ok((idx, columns))
}
