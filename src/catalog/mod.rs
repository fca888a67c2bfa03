//! The course/requirement catalog and the two-sided tag relation between them.
//!
//! `Course::satisfies` and `Requirement::satisfied_by` are only ever changed
//! together, through [`Catalog::tag`] and the linkers built on top of it.

pub mod keywords;
pub mod sample;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::extract::{self, CreditTotals, DirectoryParse, FileReport, ParseOptions, ScrapedCourse};
use crate::models::{Course, MeetingDays, Requirement, TimeRange, default_requirements};

pub use keywords::KeywordMap;

/// File in the data directory that overrides the default requirement set.
pub const REQUIREMENTS_FILE: &str = "requirements.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    Parsed,
    Sample,
}

#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    courses: Vec<Course>,
    requirements: Vec<Requirement>,
    pub source: CatalogSource,
    pub reports: Vec<FileReport>,
    pub totals: CreditTotals,
    pub loaded_at: DateTime<Utc>,
}

impl Catalog {
    /// Builds a catalog, folding any tags already present on either side into one consistent relation.
    /// Tags naming a course or requirement that is not in the catalog are dropped.
    pub fn new(mut courses: Vec<Course>, mut requirements: Vec<Requirement>) -> Self {
        let course_ids: HashSet<String> = courses.iter().map(|c| c.id.clone()).collect();
        let req_ids: HashSet<String> = requirements.iter().map(|r| r.id.clone()).collect();

        let mut pairs: BTreeSet<(String, String)> = BTreeSet::new();
        for course in &mut courses {
            for req_id in std::mem::take(&mut course.satisfies) {
                pairs.insert((course.id.clone(), req_id));
            }
        }
        for req in &mut requirements {
            for course_id in std::mem::take(&mut req.satisfied_by) {
                pairs.insert((course_id, req.id.clone()));
            }
        }

        let mut catalog = Self {
            courses,
            requirements,
            source: CatalogSource::Parsed,
            reports: Vec::new(),
            totals: CreditTotals::new(),
            loaded_at: Utc::now(),
        };
        for (course_id, req_id) in pairs {
            if course_ids.contains(&course_id) && req_ids.contains(&req_id) {
                catalog.tag(&course_id, &req_id);
            }
        }
        catalog
    }

    /// Converts a directory parse into catalog courses and links them to `requirements`,
    /// first by the tagger's category labels, then by `keywords`.
    pub fn from_parsed(parsed: &DirectoryParse, requirements: Vec<Requirement>, keywords: &KeywordMap) -> Self {
        let mut used_ids: HashMap<String, usize> = HashMap::new();
        let mut courses = Vec::new();
        let mut labels: Vec<(String, Vec<String>)> = Vec::new();

        for file in &parsed.files {
            for scraped in &file.courses {
                let mut course = course_from_scraped(scraped, &file.semester);
                let seen = used_ids.entry(course.id.clone()).or_insert(0);
                *seen += 1;
                if *seen > 1 {
                    course.id = format!("{}-{}", course.id, seen);
                }
                labels.push((course.id.clone(), scraped.fields.clone()));
                courses.push(course);
            }
        }

        let mut catalog = Self::new(courses, requirements);
        catalog.link_by_labels(&labels);
        catalog.link_by_keywords(keywords);

        catalog.reports = parsed.reports.clone();
        catalog.totals = parsed.totals.clone();
        catalog
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn requirement(&self, id: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.id == id)
    }

    /// Records that `course_id` satisfies `req_id` on both sides.
    /// Returns `false` if either id is unknown.
    pub fn tag(&mut self, course_id: &str, req_id: &str) -> bool {
        let Some(course) = self.courses.iter_mut().find(|c| c.id == course_id) else {
            return false;
        };
        let Some(req) = self.requirements.iter_mut().find(|r| r.id == req_id) else {
            return false;
        };
        course.satisfies.insert(req.id.clone());
        req.satisfied_by.insert(course.id.clone());
        true
    }

    /// Tags each course with the requirement whose label equals one of its
    /// category labels, ignoring case. Returns the number of matches.
    pub fn link_by_labels(&mut self, labels: &[(String, Vec<String>)]) -> usize {
        let by_label: HashMap<String, String> = self
            .requirements
            .iter()
            .map(|r| (r.label.to_lowercase(), r.id.clone()))
            .collect();

        let mut linked = 0;
        for (course_id, fields) in labels {
            for field in fields {
                if let Some(req_id) = by_label.get(&field.to_lowercase()) {
                    if self.tag(course_id, req_id) {
                        linked += 1;
                    }
                }
            }
        }
        linked
    }

    /// Tags every course whose uppercased `"{code} {title}"` contains one of a requirement's keywords.
    /// Returns the number of (course, requirement) matches.
    pub fn link_by_keywords(&mut self, keywords: &KeywordMap) -> usize {
        let matches: Vec<(String, String)> = self
            .courses
            .iter()
            .flat_map(|course| {
                let text = format!("{} {}", course.code, course.title).to_uppercase();
                keywords
                    .matching(&text)
                    .map(|req_id| (course.id.clone(), req_id.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect();

        matches
            .iter()
            .filter(|(course_id, req_id)| self.tag(course_id, req_id))
            .count()
    }
}

/// Turns a scraped row into a catalog course for `semester`.
pub fn course_from_scraped(scraped: &ScrapedCourse, semester: &str) -> Course {
    let (days, time) = split_schedule(&scraped.schedule);
    let mut course = Course::new(
        Course::derive_id(&scraped.code, semester, &scraped.professor),
        scraped.code.clone(),
        scraped.title.clone(),
        semester,
        scraped.credits,
    )
    .with_faculty(scraped.professor.clone())
    .with_delivery_mode(scraped.delivery.clone())
    .with_description(scraped.description.clone());
    course.days = days;
    course.time = time;
    course
}

/// `"MW 10:00-11:30"` -> (Mon+Wed, 10:00-11:30). Either part may be absent.
pub fn split_schedule(schedule: &str) -> (MeetingDays, Option<TimeRange>) {
    let schedule = schedule.trim();
    let mut tokens = schedule.splitn(2, char::is_whitespace);
    let first = tokens.next().unwrap_or_default();
    let is_day_codes = !first.is_empty() && first.chars().all(|c| "MTWRF".contains(c));

    if is_day_codes {
        let rest = tokens.next().unwrap_or_default();
        (MeetingDays::from_codes(first), TimeRange::parse(rest))
    } else {
        (MeetingDays::default(), TimeRange::parse(schedule))
    }
}

#[derive(Debug, Deserialize)]
struct RequirementDef {
    id: String,
    label: String,
    min_credits: f64,
}

/// `requirements.json` from `data_dir` when present and valid, the defaults otherwise.
pub fn load_requirements(data_dir: &Path) -> Vec<Requirement> {
    let path = data_dir.join(REQUIREMENTS_FILE);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(_) => return default_requirements(),
    };
    match serde_json::from_str::<Vec<RequirementDef>>(&raw) {
        Ok(defs) => defs
            .into_iter()
            .map(|d| Requirement::new(d.id, d.label, d.min_credits))
            .collect(),
        Err(e) => {
            warn!("Ignoring {}: {}", path.display(), e);
            default_requirements()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub data_dir: PathBuf,
    pub parse: ParseOptions,
    pub keywords: KeywordMap,
}

impl CatalogOptions {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            parse: ParseOptions::default(),
            keywords: KeywordMap::default(),
        }
    }
}

/// Parses the data directory into a fresh catalog.
/// Falls back to the sample catalog when the directory is missing or yields no courses.
pub fn load_catalog(options: &CatalogOptions) -> Catalog {
    let parsed = match extract::parse_directory(&options.data_dir, &options.parse) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Cannot read {}: {}. Using sample data.", options.data_dir.display(), e);
            return sample::sample_catalog();
        }
    };

    if parsed.files.iter().all(|f| f.courses.is_empty()) {
        warn!(
            "No courses extracted from {} ({} files). Using sample data.",
            options.data_dir.display(),
            parsed.reports.len()
        );
        let mut catalog = sample::sample_catalog();
        catalog.reports = parsed.reports;
        return catalog;
    }

    let requirements = load_requirements(&options.data_dir);
    let catalog = Catalog::from_parsed(&parsed, requirements, &options.keywords);
    info!(
        "Catalog loaded: {} courses, {} requirements from {} files",
        catalog.courses.len(),
        catalog.requirements.len(),
        catalog.reports.len()
    );
    catalog
}
