pub mod course;
pub mod plan;
pub mod requirement;

pub use course::{Course, MeetingDays, TimeRange, Weekday};
pub use plan::Plan;
pub use requirement::{Requirement, default_requirements};
