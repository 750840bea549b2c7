//! In-memory adapters for tests and local development.

mod enrollment_store;

pub use enrollment_store::InMemoryEnrollmentStore;
