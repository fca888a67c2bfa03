pub mod catalog_store;
pub mod export;
pub mod reloader;
pub mod validator;

pub use catalog_store::CatalogStore;
pub use export::export_plan_csv;
pub use reloader::CatalogReloader;
pub use validator::{
    Progress, RequirementStatus, calculate_total_credits, courses_by_requirement, courses_by_semester,
    requirement_progress, validate_requirements,
};
