//! PostgreSQL implementation of EnrollmentStore.
//!
//! Uniqueness of the idempotency key is enforced by a partial unique index on
//! `(user_id, course_id, payment_id) WHERE status = 'active'` (see
//! migrations); concurrent inserts for the same key resolve at the database,
//! not in process. Both tables are written without a cross-table transaction,
//! so the committer sequences enrollment before index and reports a partial
//! commit when only the second write fails.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::enrollment::{Enrollment, EnrollmentStatus};
use crate::domain::foundation::{CourseId, EnrollmentId, UserId};
use crate::ports::{EnrollmentStore, InsertOutcome, StoreError};

/// PostgreSQL implementation of the EnrollmentStore port.
///
/// Every statement is bounded by the configured timeout; an elapsed timeout is
/// reported as [`StoreError::Timeout`] so the committer can classify it by
/// where in the sequence it happened.
pub struct PostgresEnrollmentStore {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PostgresEnrollmentStore {
    /// Creates a store over the given connection pool.
    pub fn new(pool: PgPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }

    async fn bounded<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.statement_timeout, operation).await {
            Err(_) => Err(StoreError::Timeout),
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(StoreError::Unavailable(e.to_string())),
        }
    }
}

/// Database row representation of an enrollment.
#[derive(Debug, sqlx::FromRow)]
struct EnrollmentRow {
    id: Uuid,
    user_id: String,
    course_id: String,
    payment_id: String,
    order_id: String,
    amount_paid: i64,
    status: String,
    platform: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = StoreError;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        let status = match row.status.as_str() {
            "active" => EnrollmentStatus::Active,
            "revoked" => EnrollmentStatus::Revoked,
            other => {
                return Err(StoreError::Unavailable(format!(
                    "invalid enrollment status in row: {other}"
                )))
            }
        };

        Ok(Enrollment {
            id: EnrollmentId::from_uuid(row.id),
            user_id: UserId::new(row.user_id)
                .map_err(|e| StoreError::Unavailable(format!("invalid user_id in row: {e}")))?,
            course_id: CourseId::new(row.course_id)
                .map_err(|e| StoreError::Unavailable(format!("invalid course_id in row: {e}")))?,
            payment_id: row.payment_id,
            order_id: row.order_id,
            amount_paid: row.amount_paid,
            status,
            platform: row.platform,
            created_at: row.created_at,
        })
    }
}

const SELECT_ACTIVE: &str = r"
    SELECT id, user_id, course_id, payment_id, order_id,
           amount_paid, status, platform, created_at
    FROM enrollments
    WHERE user_id = $1 AND course_id = $2 AND payment_id = $3
      AND status = 'active'
";

const INSERT_ENROLLMENT: &str = r"
    INSERT INTO enrollments (id, user_id, course_id, payment_id, order_id,
                             amount_paid, status, platform, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (user_id, course_id, payment_id) WHERE status = 'active'
    DO NOTHING
";

const INSERT_ENTITLEMENT: &str = r"
    INSERT INTO user_entitlements (user_id, course_id, granted_at)
    VALUES ($1, $2, $3)
    ON CONFLICT (user_id, course_id) DO NOTHING
";

const SELECT_ENTITLEMENTS: &str = r"
    SELECT course_id FROM user_entitlements WHERE user_id = $1 ORDER BY granted_at
";

#[async_trait]
impl EnrollmentStore for PostgresEnrollmentStore {
    async fn find_active(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        payment_id: &str,
    ) -> Result<Option<Enrollment>, StoreError> {
        let row: Option<EnrollmentRow> = self
            .bounded(
                sqlx::query_as(SELECT_ACTIVE)
                    .bind(user_id.as_str())
                    .bind(course_id.as_str())
                    .bind(payment_id)
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.map(Enrollment::try_from).transpose()
    }

    async fn insert_enrollment(
        &self,
        enrollment: &Enrollment,
    ) -> Result<InsertOutcome, StoreError> {
        let result = self
            .bounded(
                sqlx::query(INSERT_ENROLLMENT)
                    .bind(enrollment.id.as_uuid())
                    .bind(enrollment.user_id.as_str())
                    .bind(enrollment.course_id.as_str())
                    .bind(&enrollment.payment_id)
                    .bind(&enrollment.order_id)
                    .bind(enrollment.amount_paid)
                    .bind(enrollment.status.as_str())
                    .bind(&enrollment.platform)
                    .bind(enrollment.created_at)
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 1 {
            return Ok(InsertOutcome::Inserted);
        }

        // Conflict with an active row: fetch it for the replay path.
        match self
            .find_active(
                &enrollment.user_id,
                &enrollment.course_id,
                &enrollment.payment_id,
            )
            .await?
        {
            Some(existing) => Ok(InsertOutcome::AlreadyActive(existing)),
            // The winner was revoked between our insert and this read.
            None => Err(StoreError::Unavailable(
                "idempotency conflict without an active enrollment".to_string(),
            )),
        }
    }

    async fn grant_entitlement(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<(), StoreError> {
        self.bounded(
            sqlx::query(INSERT_ENTITLEMENT)
                .bind(user_id.as_str())
                .bind(course_id.as_str())
                .bind(Utc::now())
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn entitlements(&self, user_id: &UserId) -> Result<Vec<CourseId>, StoreError> {
        let rows: Vec<(String,)> = self
            .bounded(
                sqlx::query_as(SELECT_ENTITLEMENTS)
                    .bind(user_id.as_str())
                    .fetch_all(&self.pool),
            )
            .await?;

        rows.into_iter()
            .map(|(course_id,)| {
                CourseId::new(course_id)
                    .map_err(|e| StoreError::Unavailable(format!("invalid course_id in row: {e}")))
            })
            .collect()
    }
}
