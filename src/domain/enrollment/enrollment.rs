//! The Enrollment aggregate: a durably granted course entitlement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, EnrollmentId, UserId};
use crate::domain::payment::VerifiedPayment;

/// Lifecycle status of an enrollment.
///
/// Enrollments are created `Active` and may only ever transition to `Revoked`
/// (refunds and disputes, handled outside this service).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Revoked,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Revoked => "revoked",
        }
    }
}

/// A paid course enrollment.
///
/// The idempotency key is `(user_id, course_id, payment_id)`: at most one
/// active enrollment may exist per key. The enrollment row is the source of
/// truth; the per-user entitlement index is derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub payment_id: String,
    pub order_id: String,
    pub amount_paid: i64,
    pub status: EnrollmentStatus,
    pub platform: String,
    pub created_at: DateTime<Utc>,
}

impl Enrollment {
    /// Creates a new active enrollment from a verified payment.
    ///
    /// This is the only creation path: an `Enrollment` cannot exist without a
    /// [`VerifiedPayment`] behind it.
    pub fn from_verified_payment(payment: &VerifiedPayment) -> Self {
        Self {
            id: EnrollmentId::new(),
            user_id: payment.user_id().clone(),
            course_id: payment.course_id().clone(),
            payment_id: payment.payment_id().to_string(),
            order_id: payment.order_id().to_string(),
            amount_paid: payment.amount(),
            status: EnrollmentStatus::Active,
            platform: "web".to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }

    /// Whether this record holds the given idempotency key.
    pub fn matches_key(&self, user_id: &UserId, course_id: &CourseId, payment_id: &str) -> bool {
        &self.user_id == user_id && &self.course_id == course_id && self.payment_id == payment_id
    }
}
