//! In-memory implementation of EnrollmentStore.
//!
//! Used in tests and local development. The compare-and-insert under a single
//! mutex provides the same conditional-write guarantee the partial unique
//! index gives the postgres adapter.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::{CourseId, UserId};
use crate::ports::{EnrollmentStore, InsertOutcome, StoreError};

/// In-memory enrollment store.
#[derive(Default)]
pub struct InMemoryEnrollmentStore {
    enrollments: Mutex<Vec<Enrollment>>,
    entitlements: Mutex<BTreeSet<(String, String)>>,
}

impl InMemoryEnrollmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active enrollment records. Test inspection helper.
    pub fn active_count(&self) -> usize {
        self.enrollments
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.is_active())
            .count()
    }

    /// All stored enrollment records. Test inspection helper.
    pub fn snapshot(&self) -> Vec<Enrollment> {
        self.enrollments.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryEnrollmentStore {
    async fn find_active(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        payment_id: &str,
    ) -> Result<Option<Enrollment>, StoreError> {
        Ok(self
            .enrollments
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.is_active() && e.matches_key(user_id, course_id, payment_id))
            .cloned())
    }

    async fn insert_enrollment(
        &self,
        enrollment: &Enrollment,
    ) -> Result<InsertOutcome, StoreError> {
        // Check and insert under one lock: the conditional-write primitive.
        let mut rows = self.enrollments.lock().unwrap();
        if let Some(existing) = rows.iter().find(|e| {
            e.is_active()
                && e.matches_key(
                    &enrollment.user_id,
                    &enrollment.course_id,
                    &enrollment.payment_id,
                )
        }) {
            return Ok(InsertOutcome::AlreadyActive(existing.clone()));
        }
        rows.push(enrollment.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn grant_entitlement(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<(), StoreError> {
        self.entitlements
            .lock()
            .unwrap()
            .insert((user_id.as_str().to_string(), course_id.as_str().to_string()));
        Ok(())
    }

    async fn entitlements(&self, user_id: &UserId) -> Result<Vec<CourseId>, StoreError> {
        self.entitlements
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| u == user_id.as_str())
            .map(|(_, c)| {
                CourseId::new(c.clone())
                    .map_err(|e| StoreError::Unavailable(format!("invalid course id: {e}")))
            })
            .collect()
    }
}
