//! Document-to-course extraction pipeline.
//!
//! raw file -> [`rows`] -> [`header`] -> [`assemble`] -> [`tagger`]
//!
//! Files are parsed one at a time and each parse is independent, so a bad
//! file only ever fails itself. [`parse_directory`] records the failure in a
//! [`FileReport`] and moves on.

pub mod assemble;
pub mod header;
pub mod line_match;
pub mod rows;
pub mod rtf;
pub mod tagger;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ParseError;

pub use assemble::{ScrapedCourse, assemble_courses, parse_credits};
pub use header::{ColumnMap, Field};
pub use rows::{DocumentKind, PdfSource, Row};
pub use tagger::{CreditTotals, PrefixMap, course_prefix, merge_totals, tag_and_tally};

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub prefix_map: PrefixMap,
    /// Fall back to single-line matching when a document has no header row.
    pub line_match_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Header,
    LineMatch,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedFile {
    pub filename: String,
    pub semester: String,
    pub strategy: Strategy,
    pub courses: Vec<ScrapedCourse>,
    pub totals: CreditTotals,
}

/// Parses an in-memory document. `filename` selects the format and the semester label.
pub fn parse_bytes(filename: &str, bytes: &[u8], options: &ParseOptions) -> Result<ParsedFile, ParseError> {
    let kind = DocumentKind::from_filename(filename)?;
    let rows = rows::extract_rows_from_bytes(kind, bytes)?;
    parse_rows(filename, &rows, options)
}

/// Parses `path` from inside `data_dir`. Only the file name of `path` is used.
pub fn parse_file(data_dir: &Path, path: &Path, options: &ParseOptions) -> Result<ParsedFile, ParseError> {
    let rows = rows::extract_rows(data_dir, path)?;
    parse_rows(&file_name(path), &rows, options)
}

pub fn parse_rows(filename: &str, rows: &[Row], options: &ParseOptions) -> Result<ParsedFile, ParseError> {
    let (strategy, mut courses) = match header::resolve(rows) {
        Ok((header_idx, columns)) => (
            Strategy::Header,
            assemble_courses(&rows[header_idx + 1..], &columns),
        ),
        Err(ParseError::MissingHeader) if options.line_match_fallback => {
            warn!("{}: no header row, matching lines individually", filename);
            let text = rows.iter().map(|r| r.join("  ")).collect::<Vec<_>>().join("\n");
            (Strategy::LineMatch, line_match::courses_from_text(&text))
        }
        Err(e) => return Err(e),
    };

    let totals = tag_and_tally(&mut courses, &options.prefix_map);
    Ok(ParsedFile {
        filename: filename.to_string(),
        semester: semester_from_filename(filename),
        strategy,
        courses,
        totals,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub status: ParseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub courses_found: usize,
}

impl FileReport {
    pub fn success(parsed: &ParsedFile) -> Self {
        Self {
            filename: parsed.filename.clone(),
            status: ParseStatus::Success,
            error: None,
            courses_found: parsed.courses.len(),
        }
    }

    pub fn failure(filename: &str, error: &ParseError) -> Self {
        Self {
            filename: filename.to_string(),
            status: ParseStatus::Error,
            error: Some(error.to_string()),
            courses_found: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectoryParse {
    pub reports: Vec<FileReport>,
    pub files: Vec<ParsedFile>,
    pub totals: CreditTotals,
}

impl DirectoryParse {
    /// All courses in file order, duplicates included.
    pub fn courses(&self) -> impl Iterator<Item = &ScrapedCourse> {
        self.files.iter().flat_map(|f| f.courses.iter())
    }

    /// First course per code, in file order.
    pub fn dedupe_by_code(&self) -> Vec<ScrapedCourse> {
        let mut seen = std::collections::HashSet::new();
        self.courses()
            .filter(|c| !c.code.is_empty() && seen.insert(c.code.clone()))
            .cloned()
            .collect()
    }
}

/// Lists `.pdf` and `.rtf` files directly inside `dir`, sorted by name.
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>, ParseError> {
    if !dir.is_dir() {
        return Err(ParseError::NotFound(dir.to_path_buf()));
    }
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && DocumentKind::from_filename(&file_name(&path)).is_ok() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Parses every document in `dir`. Failing files are reported and skipped.
pub fn parse_directory(dir: &Path, options: &ParseOptions) -> Result<DirectoryParse, ParseError> {
    let mut out = DirectoryParse::default();

    for path in discover_documents(dir)? {
        let filename = file_name(&path);
        match parse_file(dir, &path, options) {
            Ok(parsed) => {
                info!("{}: {} courses ({:?})", filename, parsed.courses.len(), parsed.strategy);
                merge_totals(&mut out.totals, &parsed.totals);
                out.reports.push(FileReport::success(&parsed));
                out.files.push(parsed);
            }
            Err(e) => {
                warn!("Skipping {}: {}", filename, e);
                out.reports.push(FileReport::failure(&filename, &e));
            }
        }
    }

    Ok(out)
}

static SEASON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(fall|spring|summer|winter)").expect("valid season pattern"));
static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)((?:19|20)\d{2})(?:\D|$)").expect("valid year pattern"));

/// `"2025-Fall-Course-Schedule.pdf"` -> `"Fall 2025"`; falls back to the season alone, then the file stem.
pub fn semester_from_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    let season = SEASON.captures(stem).map(|c| {
        let raw = c[1].to_lowercase();
        let mut chars = raw.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        }
    });
    let year = YEAR.captures(stem).map(|c| c[1].to_string());

    match (season, year) {
        (Some(season), Some(year)) => format!("{} {}", season, year),
        (Some(season), None) => season,
        _ => stem.to_string(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semester_labels_from_names() {
        assert_eq!(semester_from_filename("2025-Fall-Course-Schedule.pdf"), "Fall 2025");
        assert_eq!(semester_from_filename("2026-Spring-Course-Schedule.pdf"), "Spring 2026");
        assert_eq!(semester_from_filename("summer_offerings.rtf"), "Summer");
        assert_eq!(semester_from_filename("MDiv-Program-Guide.pdf"), "MDiv-Program-Guide");
    }
}
