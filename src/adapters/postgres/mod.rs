//! PostgreSQL persistence adapters.

mod enrollment_store;

pub use enrollment_store::PostgresEnrollmentStore;
