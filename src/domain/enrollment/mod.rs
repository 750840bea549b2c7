//! Enrollment aggregate and status.

mod enrollment;

pub use enrollment::{Enrollment, EnrollmentStatus};
