//! Enrollment store port (write side).
//!
//! The enrollment committer is the only caller of this port's write methods;
//! no other component may create or mutate enrollments or the entitlement
//! index.
//!
//! # Required store primitives
//!
//! - Conditional insert on the idempotency key `(user_id, course_id,
//!   payment_id)`: when two commits race on the same key, exactly one insert
//!   wins and the loser observes [`InsertOutcome::AlreadyActive`].
//! - Append-to-set semantics on the per-user entitlement index: granting an
//!   already granted course is a no-op, never an error.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::{CourseId, UserId};

/// Result of a conditional enrollment insert.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// The enrollment was written; this request won the idempotency key.
    Inserted,

    /// An active enrollment already holds the key. Carries the existing record
    /// so the caller can answer as an idempotent replay.
    AlreadyActive(Enrollment),
}

/// Errors from the durable store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store failed or rejected the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The operation exceeded its bounded timeout.
    #[error("store operation timed out")]
    Timeout,
}

/// Port for durable enrollment and entitlement-index storage.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Find the active enrollment holding the idempotency key, if any.
    async fn find_active(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        payment_id: &str,
    ) -> Result<Option<Enrollment>, StoreError>;

    /// Insert the enrollment unless an active one already holds its key.
    ///
    /// Must be atomic with respect to the key: concurrent inserts for the same
    /// key yield exactly one `Inserted`.
    async fn insert_enrollment(&self, enrollment: &Enrollment)
        -> Result<InsertOutcome, StoreError>;

    /// Add the course to the user's entitlement index.
    ///
    /// Idempotent; duplicates are silently absorbed.
    async fn grant_entitlement(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<(), StoreError>;

    /// Courses currently present in the user's entitlement index.
    ///
    /// Read path for authorization checks elsewhere in the platform.
    async fn entitlements(&self, user_id: &UserId) -> Result<Vec<CourseId>, StoreError>;
}
