//! Single-line course matching for documents without a header row.
//!
//! Each line is matched on its own against `CODE[ -:]Title (N credits)`.
//! Outcomes are values, not errors: a line either yields a course or says
//! why it was skipped.

use std::sync::LazyLock;

use regex::Regex;

use super::assemble::ScrapedCourse;

static COURSE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([A-Z]{2,4}\s?\d{3,4}[A-Z]?)\b[\s:–—-]+(.+?)(?:\s*\((\d+(?:\.\d+)?)\s*credits?\))?$")
        .expect("valid course line pattern")
});
static STRICT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2,4}\d{3,4}[A-Z]?$").expect("valid code pattern"));
static YEAR_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(19|20)\d{2}$").expect("valid year pattern"));
static SEMESTER_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(fall|spring|summer|winter)\s*\d{4}$").expect("valid semester pattern")
});
static CREDITS_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*credit").expect("valid credits pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    Heading,
    YearOrSemester,
    NoCourseCode,
    MalformedCode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineMatch {
    Course(ScrapedCourse),
    Skipped(SkipReason),
}

pub fn match_line(line: &str) -> LineMatch {
    let line = line.trim();
    if line.is_empty() {
        return LineMatch::Skipped(SkipReason::Blank);
    }
    if YEAR_ONLY.is_match(line) || SEMESTER_ONLY.is_match(line) {
        return LineMatch::Skipped(SkipReason::YearOrSemester);
    }
    if is_heading(line) {
        return LineMatch::Skipped(SkipReason::Heading);
    }

    let Some(caps) = COURSE_LINE.captures(line) else {
        return LineMatch::Skipped(SkipReason::NoCourseCode);
    };
    let code: String = caps[1]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if !STRICT_CODE.is_match(&code) {
        return LineMatch::Skipped(SkipReason::MalformedCode);
    }

    let rest = caps[2].trim();
    let (title, description) = match rest.split_once(" - ") {
        Some((title, description)) => (title.trim(), description.trim()),
        None => (rest, ""),
    };
    let credits = caps
        .get(3)
        .map(|m| m.as_str())
        .or_else(|| CREDITS_IN_TEXT.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str()))
        .and_then(|raw| raw.parse::<f64>().ok())
        .unwrap_or(0.0);

    LineMatch::Course(ScrapedCourse {
        code,
        title: title.to_string(),
        credits,
        professor: String::new(),
        schedule: String::new(),
        delivery: String::new(),
        description: description.to_string(),
        fields: Vec::new(),
    })
}

// All-caps banners like "COURSE SCHEDULE" or "FALL OFFERINGS".
fn is_heading(line: &str) -> bool {
    let has_letters = line.chars().any(char::is_alphabetic);
    let has_lower = line.chars().any(char::is_lowercase);
    let has_digit = line.chars().any(|c| c.is_ascii_digit());
    has_letters && !has_lower && !has_digit
}

/// Matches every line of `text`, keeping only the courses.
pub fn courses_from_text(text: &str) -> Vec<ScrapedCourse> {
    text.lines()
        .filter_map(|line| match match_line(line) {
            LineMatch::Course(course) => Some(course),
            LineMatch::Skipped(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_code_title_and_credits() {
        let LineMatch::Course(course) = match_line("BIBL 101 - Intro to the Bible (3 credits)") else {
            panic!("expected a course");
        };
        assert_eq!(course.code, "BIBL101");
        assert_eq!(course.title, "Intro to the Bible");
        assert_eq!(course.credits, 3.0);
    }

    #[test]
    fn skips_headings_and_dates() {
        assert_eq!(match_line("COURSE SCHEDULE"), LineMatch::Skipped(SkipReason::Heading));
        assert_eq!(match_line("Fall 2025"), LineMatch::Skipped(SkipReason::YearOrSemester));
        assert_eq!(match_line("2025"), LineMatch::Skipped(SkipReason::YearOrSemester));
        assert_eq!(match_line("   "), LineMatch::Skipped(SkipReason::Blank));
        assert_eq!(
            match_line("Office hours by appointment"),
            LineMatch::Skipped(SkipReason::NoCourseCode)
        );
    }
}
