//! Shared domain building blocks: identifiers and validation errors.

mod errors;
mod ids;

pub use errors::ValidationError;
pub use ids::{CourseId, EnrollmentId, UserId};
