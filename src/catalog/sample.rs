use crate::models::{Course, default_requirements};

use super::{Catalog, CatalogSource};

/// A small built-in catalog served when no documents could be parsed.
pub fn sample_catalog() -> Catalog {
    let courses = vec![
        Course::new("BIBL101_Fall2025_Smith", "BIBL 101", "Introduction to Biblical Studies", "Fall 2025", 3.0)
            .with_faculty("Dr. Smith")
            .with_days("MW")
            .with_time("10:00-11:30")
            .with_delivery_mode("In Person")
            .with_description("An introduction to the study of biblical texts and their interpretation."),
        Course::new("HIST201_Fall2025_Jones", "HIST 201", "Church History", "Fall 2025", 3.0)
            .with_faculty("Dr. Jones")
            .with_days("TR")
            .with_time("14:00-15:30")
            .with_delivery_mode("In Person")
            .with_description("Survey of Christian history from the early church to the present."),
        Course::new("THEO301_Fall2025_Brown", "THEO 301", "Systematic Theology", "Fall 2025", 3.0)
            .with_faculty("Dr. Brown")
            .with_days("F")
            .with_time("09:00-12:00")
            .with_delivery_mode("In Person")
            .with_description("Comprehensive study of Christian theological doctrines."),
        Course::new("MSSW401_Fall2025_Wilson", "MSSW 401", "Social Work Practice I", "Fall 2025", 3.0)
            .with_faculty("Dr. Wilson")
            .with_days("MW")
            .with_time("16:00-17:30")
            .with_delivery_mode("In Person")
            .with_description("Foundation course in social work practice methods."),
        Course::new("PRAC501_Fall2025_Davis", "PRAC 501", "Pastoral Care", "Fall 2025", 3.0)
            .with_faculty("Dr. Davis")
            .with_days("TR")
            .with_time("10:00-11:30")
            .with_delivery_mode("In Person")
            .with_description("Introduction to pastoral care and counseling."),
    ];

    let mut catalog = Catalog::new(courses, default_requirements());
    for (course_id, req_id) in [
        ("BIBL101_Fall2025_Smith", "bible"),
        ("HIST201_Fall2025_Jones", "historical"),
        ("THEO301_Fall2025_Brown", "theology_ethics"),
        ("MSSW401_Fall2025_Wilson", "mssw_core"),
        ("MSSW401_Fall2025_Wilson", "social_work_practice"),
        ("PRAC501_Fall2025_Davis", "practical"),
    ] {
        catalog.tag(course_id, req_id);
    }
    catalog.source = CatalogSource::Sample;
    catalog
}
