use std::collections::HashMap;

use crate::error::AppError;
use crate::models::{Course, Plan};

pub const CSV_HEADERS: [&str; 10] = [
    "Semester",
    "Course Code",
    "Course Title",
    "Faculty",
    "Credits",
    "Days",
    "Time",
    "Delivery Mode",
    "Description",
    "Satisfies Requirements",
];

/// One row per (semester, course) in the plan. Ids missing from `courses` are skipped.
pub fn export_plan_csv(plan: &Plan, courses: &[Course]) -> Result<String, AppError> {
    let lookup: HashMap<&str, &Course> = courses.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for (semester, id) in plan.iter_selections() {
        let Some(course) = lookup.get(id) else {
            continue;
        };
        let satisfies = course
            .satisfies()
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let credits = format_credits(course.credits);
        let days = course.days.to_string();
        let time = course.time.map(|t| t.to_string()).unwrap_or_default();
        writer.write_record([
            semester,
            course.code.as_str(),
            course.title.as_str(),
            course.faculty.as_str(),
            credits.as_str(),
            days.as_str(),
            time.as_str(),
            course.delivery_mode.as_str(),
            course.description.as_str(),
            satisfies.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|_| AppError::InternalServerError)
}

/// `3.0`, `1.5`, `0.25`: always at least one decimal.
pub fn format_credits(credits: f64) -> String {
    if credits.fract() == 0.0 {
        format!("{:.1}", credits)
    } else {
        credits.to_string()
    }
}
