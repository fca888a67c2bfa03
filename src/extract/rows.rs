//! Row extraction: document bytes -> ordered rows of trimmed text cells.
//!
//! PDFs are read through a [`PdfSource`]. Table structure wins when the
//! source exposes any; otherwise page text is split into columns on runs of
//! whitespace. RTF has no table path and always goes through text splitting.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use pdfplumber::{Pdf, TableSettings, WordOptions};
use regex::Regex;
use tracing::{debug, error};

use crate::error::ParseError;

use super::rtf;

pub type Row = Vec<String>;

/// One table as rows of optional cells, the shape table-aware readers emit.
pub type RawTable = Vec<Vec<Option<String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Rtf,
}

impl DocumentKind {
    pub fn from_filename(name: &str) -> Result<Self, ParseError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => Ok(DocumentKind::Pdf),
            Some("rtf") => Ok(DocumentKind::Rtf),
            _ => Err(ParseError::UnsupportedFormat(name.to_string())),
        }
    }
}

/// Page-ordered access to a PDF.
pub trait PdfSource {
    /// All tables of all pages, in page order. Sources without table support return none.
    fn tables(&self) -> Result<Vec<RawTable>, ParseError>;

    /// Plain text per page, in page order.
    fn page_texts(&self) -> Result<Vec<String>, ParseError>;
}

/// Reads PDFs with pdfplumber: ruled tables per page, and word-positioned
/// page text in which column gaps survive as runs of spaces.
pub struct PdfplumberSource {
    pdf: Pdf,
    table_settings: TableSettings,
}

impl PdfplumberSource {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        Ok(Self {
            pdf: Pdf::open(bytes, None)?,
            table_settings: TableSettings::default(),
        })
    }
}

impl PdfSource for PdfplumberSource {
    fn tables(&self) -> Result<Vec<RawTable>, ParseError> {
        let mut tables = Vec::new();
        for idx in 0..self.pdf.page_count() {
            let page = self.pdf.page(idx)?;
            for table in page.find_tables(&self.table_settings) {
                tables.push(
                    table
                        .rows
                        .iter()
                        .map(|row| row.iter().map(|cell| cell.text.clone()).collect())
                        .collect(),
                );
            }
        }
        Ok(tables)
    }

    fn page_texts(&self) -> Result<Vec<String>, ParseError> {
        let mut pages = Vec::new();
        for idx in 0..self.pdf.page_count() {
            match self.pdf.page(idx) {
                Ok(page) => {
                    let words = page
                        .extract_words(&WordOptions::default())
                        .into_iter()
                        .map(|w| PlacedWord {
                            x0: w.bbox.x0,
                            x1: w.bbox.x1,
                            top: w.bbox.top,
                            bottom: w.bbox.bottom,
                            text: w.text,
                        })
                        .collect();
                    pages.push(layout_text(words));
                }
                Err(e) => {
                    error!("text extraction failed on page {}: {}", idx + 1, e);
                    pages.push(String::new());
                }
            }
        }
        Ok(pages)
    }
}

/// A word and its box in page coordinates (y grows downward).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
}

// Words whose tops differ by at most this many points share a line.
const LINE_TOLERANCE: f64 = 3.0;
const MIN_COLUMN_GAP: f64 = 6.0;
const COLUMN_SEPARATOR: &str = "   ";

/// Rebuilds page text from positioned words, one line per visual row.
/// A horizontal gap wider than the preceding word's height becomes a column separator.
pub fn layout_text(mut words: Vec<PlacedWord>) -> String {
    words.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0)));

    let mut lines: Vec<Vec<PlacedWord>> = Vec::new();
    for word in words {
        match lines.last_mut() {
            Some(line) if (word.top - line[0].top).abs() <= LINE_TOLERANCE => line.push(word),
            _ => lines.push(vec![word]),
        }
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            let mut text = String::new();
            let mut prev: Option<&PlacedWord> = None;
            for word in &line {
                if let Some(prev) = prev {
                    let gap = word.x0 - prev.x1;
                    let threshold = (prev.bottom - prev.top).max(MIN_COLUMN_GAP);
                    text.push_str(if gap > threshold { COLUMN_SEPARATOR } else { " " });
                }
                text.push_str(&word.text);
                prev = Some(word);
            }
            text
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Confines `path` to `data_dir` by keeping only its file name.
pub fn resolve_in_data_dir(data_dir: &Path, path: &Path) -> Result<PathBuf, ParseError> {
    let name = path
        .file_name()
        .ok_or_else(|| ParseError::NotFound(path.to_path_buf()))?;
    let resolved = data_dir.join(name);
    if !resolved.is_file() {
        return Err(ParseError::NotFound(resolved));
    }
    Ok(resolved)
}

/// Reads a file from `data_dir` and extracts its rows.
pub fn extract_rows(data_dir: &Path, path: &Path) -> Result<Vec<Row>, ParseError> {
    let resolved = resolve_in_data_dir(data_dir, path)?;
    let name = resolved
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let kind = DocumentKind::from_filename(&name)?;
    let bytes = std::fs::read(&resolved)?;
    extract_rows_from_bytes(kind, &bytes)
}

pub fn extract_rows_from_bytes(kind: DocumentKind, bytes: &[u8]) -> Result<Vec<Row>, ParseError> {
    match kind {
        DocumentKind::Pdf => rows_from_pdf(&PdfplumberSource::from_bytes(bytes)?),
        DocumentKind::Rtf => {
            let raw = String::from_utf8_lossy(bytes);
            Ok(rows_from_text(&rtf::to_plain_text(&raw)))
        }
    }
}

pub fn rows_from_pdf(source: &dyn PdfSource) -> Result<Vec<Row>, ParseError> {
    let table_rows = match source.tables() {
        Ok(tables) => rows_from_tables(&tables),
        Err(e) => {
            error!("table extraction failed, falling back to text: {}", e);
            Vec::new()
        }
    };
    if !table_rows.is_empty() {
        debug!("extracted {} rows from tables", table_rows.len());
        return Ok(table_rows);
    }

    let text = source.page_texts()?.join("\n");
    let rows = rows_from_text(&text);
    debug!("extracted {} rows from page text", rows.len());
    Ok(rows)
}

/// Keeps rows with at least one non-blank cell; missing cells become `""`.
pub fn rows_from_tables(tables: &[RawTable]) -> Vec<Row> {
    tables
        .iter()
        .flatten()
        .filter(|row| row.iter().flatten().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            row.iter()
                .map(|cell| cell.as_deref().unwrap_or_default().trim().to_string())
                .collect()
        })
        .collect()
}

static COLUMN_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t|\s{2,}").expect("valid column gap pattern"));

/// Splits each line into cells at tabs and runs of two or more whitespace characters.
/// Empty fragments are dropped, and so are lines that leave none.
pub fn rows_from_text(text: &str) -> Vec<Row> {
    text.lines()
        .map(|line| {
            COLUMN_GAP
                .split(line)
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .map(str::to_string)
                .collect::<Row>()
        })
        .filter(|row| !row.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_wide_gaps_only() {
        let rows = rows_from_text("BIBL 101   Intro to Bible  3\n\n   \nSW 501\tPractice I");
        assert_eq!(
            rows,
            vec![
                vec!["BIBL 101", "Intro to Bible", "3"],
                vec!["SW 501", "Practice I"],
            ]
        );
    }

    fn word(text: &str, x0: f64, top: f64) -> PlacedWord {
        PlacedWord {
            text: text.to_string(),
            x0,
            x1: x0 + 6.0 * text.len() as f64,
            top,
            bottom: top + 12.0,
        }
    }

    #[test]
    fn layout_keeps_column_gaps_and_word_spaces() {
        let words = vec![
            word("3", 400.0, 101.0),
            word("Intro", 200.0, 100.0),
            word("BIBL", 72.0, 100.0),
            word("101", 99.0, 100.0),
            word("to", 233.0, 99.0),
            word("Credits", 400.0, 80.0),
        ];
        let text = layout_text(words);
        assert_eq!(text, "Credits\nBIBL 101   Intro to   3");
        assert_eq!(rows_from_text(&text)[1], vec!["BIBL 101", "Intro to", "3"]);
    }

    #[test]
    fn table_rows_drop_blank_rows_and_fill_missing_cells() {
        let tables = vec![vec![
            vec![Some(" Course Code ".to_string()), Some("Course Title".to_string())],
            vec![None, Some("  ".to_string())],
            vec![Some("BIBL 101".to_string()), None],
        ]];
        assert_eq!(
            rows_from_tables(&tables),
            vec![vec!["Course Code", "Course Title"], vec!["BIBL 101", ""]]
        );
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(DocumentKind::from_filename("a.PDF").unwrap(), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("a.rtf").unwrap(), DocumentKind::Rtf);
        assert!(matches!(
            DocumentKind::from_filename("a.docx"),
            Err(ParseError::UnsupportedFormat(_))
        ));
    }
}
