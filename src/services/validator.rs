//! Requirement satisfaction for a plan against a catalog.
//!
//! Everything here is a pure function of its inputs and nothing is cached.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::{Course, Plan, Requirement};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementStatus {
    pub requirement_id: String,
    pub label: String,
    pub selected_courses: Vec<Course>,
    pub total_credits: f64,
    pub min_credits: f64,
    pub is_met: bool,
    pub deficit: f64,
}

impl RequirementStatus {
    pub fn status_text(&self) -> String {
        if self.is_met {
            "Met".to_string()
        } else {
            format!("Need {:.1} more credits", self.deficit)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub total_requirements: usize,
    pub met_requirements: usize,
    pub progress_percentage: f64,
    pub validation_results: BTreeMap<String, RequirementStatus>,
}

fn course_lookup(courses: &[Course]) -> HashMap<&str, &Course> {
    courses.iter().map(|c| (c.id.as_str(), c)).collect()
}

/// Per requirement: the selected courses that satisfy it, their summed credits and the deficit.
/// A course selected in two semesters counts twice; ids missing from `courses` are ignored.
pub fn validate_requirements(
    plan: &Plan,
    courses: &[Course],
    requirements: &[Requirement],
) -> BTreeMap<String, RequirementStatus> {
    let lookup = course_lookup(courses);

    requirements
        .iter()
        .map(|req| {
            let selected: Vec<Course> = plan
                .iter_selections()
                .filter_map(|(_, id)| lookup.get(id).copied())
                .filter(|course| course.satisfies_requirement(&req.id))
                .cloned()
                .collect();
            let total_credits: f64 = selected.iter().map(|c| c.credits).sum();

            let status = RequirementStatus {
                requirement_id: req.id.clone(),
                label: req.label.clone(),
                selected_courses: selected,
                total_credits,
                min_credits: req.min_credits,
                is_met: total_credits >= req.min_credits,
                deficit: (req.min_credits - total_credits).max(0.0),
            };
            (req.id.clone(), status)
        })
        .collect()
}

/// Met / total requirements as a percentage; `0.0` with no requirements.
pub fn requirement_progress(plan: &Plan, courses: &[Course], requirements: &[Requirement]) -> Progress {
    let validation_results = validate_requirements(plan, courses, requirements);
    let total_requirements = requirements.len();
    let met_requirements = validation_results.values().filter(|r| r.is_met).count();
    let progress_percentage = if total_requirements > 0 {
        met_requirements as f64 / total_requirements as f64 * 100.0
    } else {
        0.0
    };

    Progress {
        total_requirements,
        met_requirements,
        progress_percentage,
        validation_results,
    }
}

/// Credits selected in `semester`, or across the whole plan when `None`.
pub fn calculate_total_credits(plan: &Plan, courses: &[Course], semester: Option<&str>) -> f64 {
    let lookup = course_lookup(courses);
    plan.iter_selections()
        .filter(|(sem, _)| semester.is_none_or(|wanted| wanted == *sem))
        .filter_map(|(_, id)| lookup.get(id))
        .map(|c| c.credits)
        .sum()
}

pub fn courses_by_requirement<'a>(courses: &'a [Course], requirement_id: &str) -> Vec<&'a Course> {
    courses
        .iter()
        .filter(|c| c.satisfies_requirement(requirement_id))
        .collect()
}

pub fn courses_by_semester<'a>(courses: &'a [Course], semester: &str) -> Vec<&'a Course> {
    courses.iter().filter(|c| c.semester == semester).collect()
}
