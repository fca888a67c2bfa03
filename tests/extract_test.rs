use std::fs;

use degree_planner::error::ParseError;
use degree_planner::extract::{
    self, ColumnMap, Field, ParseOptions, ParseStatus, PdfSource, Strategy, assemble_courses, header,
    rows::{RawTable, rows_from_pdf},
};

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn schedule_rows() -> Vec<Vec<String>> {
    vec![
        row(&["Fall 2025 Course Schedule"]),
        row(&[
            "Course Code",
            "Course Title",
            "Instructor",
            "Credits",
            "Days",
            "Times",
            "Delivery Mode",
            "Description",
        ]),
        row(&[
            "BIBL 101",
            "Intro to Bible",
            "Dr. Smith",
            "3",
            "MW",
            "10:00-11:30",
            "In Person",
            "intro text",
        ]),
        row(&["", "", "", "", "", "", "", "continued..."]),
        row(&["SW 501", "Practice I", "Dr. Lee", "1.5 cr", "", "", "Online", ""]),
    ]
}

#[test]
fn header_rows_become_courses_with_continuations() {
    let rows = schedule_rows();
    let (idx, columns) = header::resolve(&rows).expect("header present");
    assert_eq!(idx, 1);

    let courses = assemble_courses(&rows[idx + 1..], &columns);
    assert_eq!(courses.len(), 2);

    let bible = &courses[0];
    assert_eq!(bible.code, "BIBL 101");
    assert_eq!(bible.credits, 3.0);
    assert_eq!(bible.professor, "Dr. Smith");
    assert_eq!(bible.schedule, "MW 10:00-11:30");
    assert_eq!(bible.delivery, "In Person");
    assert_eq!(bible.description, "intro text continued...");

    assert_eq!(courses[1].credits, 1.5);
    assert_eq!(courses[1].description, "");
}

#[test]
fn rows_before_any_course_are_dropped() {
    let mut rows = schedule_rows();
    rows.insert(2, row(&["", "", "", "", "", "", "", "orphan text"]));
    let (idx, columns) = header::resolve(&rows).expect("header present");
    let courses = assemble_courses(&rows[idx + 1..], &columns);
    assert_eq!(courses[0].description, "intro text continued...");
}

#[test]
fn first_matching_header_cell_wins() {
    let header = row(&["Course Code", "Title", "Alt Title", "Credits", "Instructor", "Faculty"]);
    let columns = ColumnMap::from_header(&header).expect("mandatory columns");
    assert_eq!(columns.position(Field::CourseTitle), Some(1));
    assert_eq!(columns.position(Field::Instructor), Some(4));

    let courses = assemble_courses(
        &[row(&["BIBL 101", "Intro to Bible", "Bible I", "3", "Dr. Smith", "Dr. Jones"])],
        &columns,
    );
    assert_eq!(courses[0].title, "Intro to Bible");
    assert_eq!(courses[0].professor, "Dr. Smith");
}

#[test]
fn continuation_without_description_column_appends_whole_row() {
    let columns = ColumnMap::from_header(&row(&["Course Code", "Course Title", "Credits"]))
        .expect("mandatory columns");
    let rows = vec![
        row(&["BIBL 101", "Intro to Bible", "3"]),
        row(&["", "taught in", "English"]),
    ];
    let courses = assemble_courses(&rows, &columns);
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].description, "taught in English");
}

#[test]
fn short_continuation_row_appends_whole_row() {
    let columns = ColumnMap::from_header(&row(&["Course Code", "Course Title", "Credits", "Description"]))
        .expect("mandatory columns");
    let rows = vec![
        row(&["BIBL 101", "Intro to Bible", "3", "Survey."]),
        row(&["", "see catalog"]),
    ];
    let courses = assemble_courses(&rows, &columns);
    assert_eq!(courses[0].description, "Survey. see catalog");
}

#[test]
fn unparsable_credits_are_zero() {
    assert_eq!(extract::parse_credits("TBD"), 0.0);
    assert_eq!(extract::parse_credits(""), 0.0);
    assert_eq!(extract::parse_credits("-3"), 0.0);
    assert_eq!(extract::parse_credits("4 credits"), 4.0);
}

#[test]
fn missing_header_and_missing_column_fail_the_file() {
    let options = ParseOptions::default();

    let no_header = vec![row(&["BIBL 101", "Intro", "3"])];
    let err = extract::parse_rows("2025-Fall.pdf", &no_header, &options).unwrap_err();
    assert!(matches!(err, ParseError::MissingHeader));
    assert!(err.is_structural());

    let no_credits = vec![row(&["Course Code", "Course Title", "Instructor"])];
    let err = extract::parse_rows("2025-Fall.pdf", &no_credits, &options).unwrap_err();
    assert!(matches!(err, ParseError::MissingColumn("Credits")));
}

#[test]
fn line_matching_is_opt_in() {
    let rows = vec![
        row(&["COURSE OFFERINGS"]),
        row(&["BIBL 101 - Intro to the Bible (3 credits)"]),
        row(&["HIST 210: Church History"]),
    ];
    let options = ParseOptions {
        line_match_fallback: true,
        ..ParseOptions::default()
    };

    let parsed = extract::parse_rows("2026-Spring.rtf", &rows, &options).expect("line matched");
    assert_eq!(parsed.strategy, Strategy::LineMatch);
    assert_eq!(parsed.semester, "Spring 2026");
    let codes: Vec<_> = parsed.courses.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, ["BIBL101", "HIST210"]);
    assert_eq!(parsed.courses[1].credits, 0.0);
}

#[test]
fn prefix_tagging_accumulates_totals() {
    let parsed = extract::parse_rows("2025-Fall.pdf", &schedule_rows(), &ParseOptions::default())
        .expect("parsed");
    assert_eq!(parsed.strategy, Strategy::Header);
    assert_eq!(parsed.courses[0].fields, vec!["Bible/Sacred Texts"]);
    assert_eq!(parsed.courses[1].fields, vec!["MSSW Core Courses"]);
    assert_eq!(parsed.totals.get("Bible/Sacred Texts"), Some(&3.0));
    assert_eq!(parsed.totals.get("MSSW Core Courses"), Some(&1.5));
}

struct FakePdf {
    tables: Vec<RawTable>,
    pages: Vec<String>,
}

impl PdfSource for FakePdf {
    fn tables(&self) -> Result<Vec<RawTable>, ParseError> {
        Ok(self.tables.clone())
    }

    fn page_texts(&self) -> Result<Vec<String>, ParseError> {
        Ok(self.pages.clone())
    }
}

#[test]
fn pdf_tables_win_over_page_text() {
    let cell = |s: &str| Some(s.to_string());
    let source = FakePdf {
        tables: vec![vec![
            vec![cell("Course Code"), cell("Course Title"), cell("Credits")],
            vec![cell("TH 300"), cell("Ethics"), None],
        ]],
        pages: vec!["ignored  text".to_string()],
    };
    let rows = rows_from_pdf(&source).expect("rows");
    assert_eq!(rows, vec![row(&["Course Code", "Course Title", "Credits"]), row(&["TH 300", "Ethics", ""])]);
}

#[test]
fn pdf_without_tables_falls_back_to_text() {
    let source = FakePdf {
        tables: Vec::new(),
        pages: vec![
            "Course Code   Course Title   Credits".to_string(),
            "TH 300   Ethics   3".to_string(),
        ],
    };
    let rows = rows_from_pdf(&source).expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1], row(&["TH 300", "Ethics", "3"]));
}

const FALL_RTF: &str = r"{\rtf1\ansi{\fonttbl{\f0 Helvetica;}}
Course Code\tab Course Title\tab Credits\tab Instructor\par
BIBL 101\tab Intro to Bible\tab 3\tab Dr. Smith\par
HIST 201\tab Church History\tab 3\tab Dr. Jones\par
}";

#[test]
fn directory_parse_reports_each_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("2025-Fall-Course-Schedule.rtf"), FALL_RTF).expect("write rtf");
    fs::write(dir.path().join("2026-Spring-Course-Schedule.rtf"), r"{\rtf1 Nothing useful\par}")
        .expect("write rtf");
    fs::write(dir.path().join("broken.pdf"), b"not a pdf").expect("write pdf");
    fs::write(dir.path().join("notes.txt"), "ignored").expect("write txt");

    let parsed = extract::parse_directory(dir.path(), &ParseOptions::default()).expect("dir parse");
    assert_eq!(parsed.reports.len(), 3);

    let fall = parsed
        .reports
        .iter()
        .find(|r| r.filename == "2025-Fall-Course-Schedule.rtf")
        .expect("fall report");
    assert_eq!(fall.status, ParseStatus::Success);
    assert_eq!(fall.courses_found, 2);

    let failures: Vec<_> = parsed
        .reports
        .iter()
        .filter(|r| r.status == ParseStatus::Error)
        .map(|r| r.filename.as_str())
        .collect();
    assert_eq!(failures, ["2026-Spring-Course-Schedule.rtf", "broken.pdf"]);

    assert_eq!(parsed.files.len(), 1);
    assert_eq!(parsed.files[0].semester, "Fall 2025");
    assert_eq!(parsed.totals.get("Historical Studies"), Some(&3.0));
}

#[test]
fn duplicate_codes_are_kept_until_deduped() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("2025-Fall.rtf"), FALL_RTF).expect("write");
    fs::write(dir.path().join("2026-Spring.rtf"), FALL_RTF).expect("write");

    let parsed = extract::parse_directory(dir.path(), &ParseOptions::default()).expect("dir parse");
    assert_eq!(parsed.courses().count(), 4);
    assert_eq!(parsed.dedupe_by_code().len(), 2);
}

#[test]
fn file_paths_are_confined_to_the_data_dir() {
    let root = tempfile::tempdir().expect("tempdir");
    let data = root.path().join("data");
    fs::create_dir(&data).expect("mkdir");
    fs::write(root.path().join("secret.rtf"), FALL_RTF).expect("write");

    let err = extract::parse_file(&data, std::path::Path::new("../secret.rtf"), &ParseOptions::default())
        .unwrap_err();
    assert!(matches!(err, ParseError::NotFound(_)));
}

#[test]
fn unsupported_uploads_are_rejected() {
    let err = extract::parse_bytes("schedule.docx", b"whatever", &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedFormat(_)));
}
