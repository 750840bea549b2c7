//! VerifyAndEnrollHandler - verification plus the transactional enrollment commit.
//!
//! This is the settlement gate proper: authenticate the claimed payment, then
//! durably grant the enrollment exactly once. Clients retry after timeouts, so
//! the commit is idempotent on `(user_id, course_id, payment_id)`; the replay
//! path answers success without writing a second row.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::EnrollmentId;
use crate::domain::payment::{
    PaymentClaim, SignatureVerifier, VerificationError, VerifiedPayment,
};
use crate::ports::{EnrollmentStore, InsertOutcome, StoreError};

/// Command carrying the untrusted payment claim.
#[derive(Debug, Clone)]
pub struct VerifyAndEnrollCommand {
    pub claim: PaymentClaim,
}

/// Successful settlement outcome. Both variants are success to the caller.
#[derive(Debug, Clone)]
pub enum EnrollOutcome {
    /// A new enrollment was committed and the entitlement index updated.
    Created(Enrollment),

    /// An active enrollment already held the idempotency key; returned as
    /// success so client retries are harmless.
    Replayed(Enrollment),
}

impl EnrollOutcome {
    pub fn enrollment(&self) -> &Enrollment {
        match self {
            EnrollOutcome::Created(e) | EnrollOutcome::Replayed(e) => e,
        }
    }
}

/// Errors from verification or commit.
#[derive(Debug, Clone, Error)]
pub enum EnrollError {
    /// Signature mismatch or malformed claim. Generic by design.
    #[error("Invalid Signature")]
    InvalidSignature,

    /// The signing secret is absent. Operational fault, alert-worthy.
    #[error("payment verification is not configured")]
    MisconfiguredSecret,

    /// Nothing was written; the caller may safely retry from the top.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The enrollment row exists but the index update failed. Repaired by the
    /// external reconciliation pass, not by resubmission.
    #[error("enrollment {enrollment_id} committed but entitlement index update failed")]
    PartialCommit { enrollment_id: EnrollmentId },
}

/// Handler for the verify-then-commit settlement flow.
pub struct VerifyAndEnrollHandler {
    verifier: Arc<SignatureVerifier>,
    store: Arc<dyn EnrollmentStore>,
}

impl VerifyAndEnrollHandler {
    pub fn new(verifier: Arc<SignatureVerifier>, store: Arc<dyn EnrollmentStore>) -> Self {
        Self { verifier, store }
    }

    /// Verifies the claim and commits the enrollment.
    ///
    /// Verification never mutates state; control reaches the commit only after
    /// the signature check passes. The commit itself runs on a spawned task so
    /// a caller disconnect cannot cancel it halfway through.
    ///
    /// # Errors
    ///
    /// - [`EnrollError::InvalidSignature`] on any mismatch or malformed claim
    /// - [`EnrollError::MisconfiguredSecret`] if the secret is absent
    /// - [`EnrollError::StorageUnavailable`] if the enrollment write never happened
    /// - [`EnrollError::PartialCommit`] if only the index update failed
    pub async fn handle(&self, cmd: VerifyAndEnrollCommand) -> Result<EnrollOutcome, EnrollError> {
        let verified = self.verifier.verify(&cmd.claim).map_err(|e| match e {
            VerificationError::Failed => {
                tracing::warn!(
                    order_id = %cmd.claim.order_id,
                    payment_id = %cmd.claim.payment_id,
                    "payment signature verification failed"
                );
                EnrollError::InvalidSignature
            }
            VerificationError::MisconfiguredSecret => {
                tracing::error!("payment signing secret is not configured");
                EnrollError::MisconfiguredSecret
            }
        })?;

        let store = Arc::clone(&self.store);
        tokio::spawn(commit(store, verified))
            .await
            .map_err(|e| EnrollError::StorageUnavailable(format!("commit task aborted: {e}")))?
    }
}

/// Commits a verified payment: replay check, conditional insert, index update.
async fn commit(
    store: Arc<dyn EnrollmentStore>,
    verified: VerifiedPayment,
) -> Result<EnrollOutcome, EnrollError> {
    let user_id = verified.user_id().clone();
    let course_id = verified.course_id().clone();
    let payment_id = verified.payment_id().to_string();

    // 1. Idempotent replay: a prior attempt may have fully succeeded even
    //    though the client saw a timeout.
    if let Some(existing) = store
        .find_active(&user_id, &course_id, &payment_id)
        .await
        .map_err(storage_unavailable)?
    {
        tracing::info!(
            enrollment_id = %existing.id,
            user_id = %user_id,
            course_id = %course_id,
            "duplicate settlement suppressed, returning existing enrollment"
        );
        return Ok(EnrollOutcome::Replayed(existing));
    }

    // 2. Conditional insert on the idempotency key. The loser of a concurrent
    //    race lands on the replay path instead of erroring.
    let enrollment = Enrollment::from_verified_payment(&verified);
    match store
        .insert_enrollment(&enrollment)
        .await
        .map_err(storage_unavailable)?
    {
        InsertOutcome::AlreadyActive(existing) => {
            tracing::info!(
                enrollment_id = %existing.id,
                user_id = %user_id,
                course_id = %course_id,
                "lost settlement race, returning existing enrollment"
            );
            return Ok(EnrollOutcome::Replayed(existing));
        }
        InsertOutcome::Inserted => {}
    }

    // 3. The enrollment row is now the source of truth. An index failure from
    //    here on is a partial commit: reconciliation repairs the index from
    //    enrollment rows, so the index can lag but never lead.
    if let Err(e) = store.grant_entitlement(&user_id, &course_id).await {
        tracing::error!(
            enrollment_id = %enrollment.id,
            user_id = %user_id,
            course_id = %course_id,
            error = %e,
            "entitlement index update failed after enrollment write; reconciliation required"
        );
        return Err(EnrollError::PartialCommit {
            enrollment_id: enrollment.id,
        });
    }

    tracing::info!(
        enrollment_id = %enrollment.id,
        user_id = %user_id,
        course_id = %course_id,
        payment_id = %payment_id,
        "enrollment committed"
    );
    Ok(EnrollOutcome::Created(enrollment))
}

fn storage_unavailable(error: StoreError) -> EnrollError {
    EnrollError::StorageUnavailable(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CourseId, UserId};
    use crate::domain::payment::sign_payment;
    use crate::ports::StoreError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    const SECRET: &str = "settlement-test-secret";

    fn claim_for(order: &str, payment: &str, user: &str, course: &str) -> PaymentClaim {
        PaymentClaim {
            order_id: order.to_string(),
            payment_id: payment.to_string(),
            signature: sign_payment(SECRET, order, payment),
            user_id: user.to_string(),
            course_id: course.to_string(),
            amount: 49_900,
        }
    }

    fn valid_claim() -> PaymentClaim {
        claim_for("order_1", "pay_1", "user-1", "course-1")
    }

    // ════════════════════════════════════════════════════════════════════════
    // Mock store with failure injection
    // ════════════════════════════════════════════════════════════════════════

    struct MockStore {
        enrollments: Mutex<Vec<Enrollment>>,
        entitlements: Mutex<Vec<(UserId, CourseId)>>,
        fail_find: AtomicBool,
        fail_insert: AtomicBool,
        fail_grant: AtomicBool,
        insert_calls: AtomicUsize,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                enrollments: Mutex::new(Vec::new()),
                entitlements: Mutex::new(Vec::new()),
                fail_find: AtomicBool::new(false),
                fail_insert: AtomicBool::new(false),
                fail_grant: AtomicBool::new(false),
                insert_calls: AtomicUsize::new(0),
            }
        }

        fn active_rows(&self) -> usize {
            self.enrollments
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.is_active())
                .count()
        }

        fn has_entitlement(&self, user: &str, course: &str) -> bool {
            self.entitlements
                .lock()
                .unwrap()
                .iter()
                .any(|(u, c)| u.as_str() == user && c.as_str() == course)
        }
    }

    #[async_trait]
    impl EnrollmentStore for MockStore {
        async fn find_active(
            &self,
            user_id: &UserId,
            course_id: &CourseId,
            payment_id: &str,
        ) -> Result<Option<Enrollment>, StoreError> {
            if self.fail_find.load(Ordering::SeqCst) {
                return Err(StoreError::Timeout);
            }
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
            self.insert_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_insert.load(Ordering::SeqCst) {
                return Err(StoreError::Timeout);
            }
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
            if self.fail_grant.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("index write refused".to_string()));
            }
            let mut index = self.entitlements.lock().unwrap();
            if !index.iter().any(|(u, c)| u == user_id && c == course_id) {
                index.push((user_id.clone(), course_id.clone()));
            }
            Ok(())
        }

        async fn entitlements(&self, user_id: &UserId) -> Result<Vec<CourseId>, StoreError> {
            Ok(self
                .entitlements
                .lock()
                .unwrap()
                .iter()
                .filter(|(u, _)| u == user_id)
                .map(|(_, c)| c.clone())
                .collect())
        }
    }

    fn handler_with(store: Arc<MockStore>) -> VerifyAndEnrollHandler {
        VerifyAndEnrollHandler::new(Arc::new(SignatureVerifier::new(SECRET)), store)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Happy path and idempotency
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn first_commit_creates_enrollment_and_grants_entitlement() {
        let store = Arc::new(MockStore::new());
        let handler = handler_with(store.clone());

        let outcome = handler
            .handle(VerifyAndEnrollCommand {
                claim: valid_claim(),
            })
            .await
            .unwrap();

        match &outcome {
            EnrollOutcome::Created(e) => {
                assert_eq!(e.payment_id, "pay_1");
                assert_eq!(e.amount_paid, 49_900);
            }
            other => panic!("expected Created, got {other:?}"),
        }
        assert_eq!(store.active_rows(), 1);
        assert!(store.has_entitlement("user-1", "course-1"));
    }

    #[tokio::test]
    async fn second_commit_is_suppressed_as_replay() {
        let store = Arc::new(MockStore::new());
        let handler = handler_with(store.clone());
        let cmd = VerifyAndEnrollCommand {
            claim: valid_claim(),
        };

        let first = handler.handle(cmd.clone()).await.unwrap();
        let second = handler.handle(cmd).await.unwrap();

        assert!(matches!(first, EnrollOutcome::Created(_)));
        match &second {
            EnrollOutcome::Replayed(e) => {
                assert_eq!(e.id, first.enrollment().id);
            }
            other => panic!("expected Replayed, got {other:?}"),
        }
        assert_eq!(store.active_rows(), 1);
    }

    #[tokio::test]
    async fn different_courses_enroll_independently() {
        let store = Arc::new(MockStore::new());
        let handler = handler_with(store.clone());

        handler
            .handle(VerifyAndEnrollCommand {
                claim: claim_for("order_1", "pay_1", "user-1", "course-a"),
            })
            .await
            .unwrap();
        handler
            .handle(VerifyAndEnrollCommand {
                claim: claim_for("order_2", "pay_2", "user-1", "course-b"),
            })
            .await
            .unwrap();

        assert_eq!(store.active_rows(), 2);
        assert!(store.has_entitlement("user-1", "course-a"));
        assert!(store.has_entitlement("user-1", "course-b"));
    }

    #[tokio::test]
    async fn concurrent_commits_for_one_key_create_one_enrollment() {
        let store = Arc::new(MockStore::new());
        let handler = Arc::new(handler_with(store.clone()));

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let handler = handler.clone();
            tasks.push(tokio::spawn(async move {
                handler
                    .handle(VerifyAndEnrollCommand {
                        claim: valid_claim(),
                    })
                    .await
            }));
        }

        let mut created = 0;
        for task in tasks {
            match task.await.unwrap().unwrap() {
                EnrollOutcome::Created(_) => created += 1,
                EnrollOutcome::Replayed(_) => {}
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.active_rows(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Failure modes
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn invalid_signature_writes_nothing() {
        let store = Arc::new(MockStore::new());
        let handler = handler_with(store.clone());
        let mut claim = valid_claim();
        claim.signature = sign_payment("wrong-secret", "order_1", "pay_1");

        let result = handler.handle(VerifyAndEnrollCommand { claim }).await;

        assert!(matches!(result, Err(EnrollError::InvalidSignature)));
        assert_eq!(store.active_rows(), 0);
        assert_eq!(store.insert_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_secret_is_not_reported_as_forgery() {
        let store = Arc::new(MockStore::new());
        let handler =
            VerifyAndEnrollHandler::new(Arc::new(SignatureVerifier::new("")), store.clone());

        let result = handler
            .handle(VerifyAndEnrollCommand {
                claim: valid_claim(),
            })
            .await;

        assert!(matches!(result, Err(EnrollError::MisconfiguredSecret)));
        assert_eq!(store.active_rows(), 0);
    }

    #[tokio::test]
    async fn enrollment_write_timeout_is_storage_unavailable() {
        let store = Arc::new(MockStore::new());
        store.fail_insert.store(true, Ordering::SeqCst);
        let handler = handler_with(store.clone());

        let result = handler
            .handle(VerifyAndEnrollCommand {
                claim: valid_claim(),
            })
            .await;

        assert!(matches!(result, Err(EnrollError::StorageUnavailable(_))));
        assert_eq!(store.active_rows(), 0);
        assert!(!store.has_entitlement("user-1", "course-1"));
    }

    #[tokio::test]
    async fn index_failure_after_enrollment_write_is_partial_commit() {
        let store = Arc::new(MockStore::new());
        store.fail_grant.store(true, Ordering::SeqCst);
        let handler = handler_with(store.clone());

        let result = handler
            .handle(VerifyAndEnrollCommand {
                claim: valid_claim(),
            })
            .await;

        let enrollment_id = match result {
            Err(EnrollError::PartialCommit { enrollment_id }) => enrollment_id,
            other => panic!("expected PartialCommit, got {other:?}"),
        };

        // The enrollment row exists for reconciliation, the index lags behind.
        assert_eq!(store.active_rows(), 1);
        assert_eq!(
            store.enrollments.lock().unwrap()[0].id,
            enrollment_id
        );
        assert!(!store.has_entitlement("user-1", "course-1"));
    }

    #[tokio::test]
    async fn retry_after_partial_commit_replays_without_second_row() {
        let store = Arc::new(MockStore::new());
        store.fail_grant.store(true, Ordering::SeqCst);
        let handler = handler_with(store.clone());
        let cmd = VerifyAndEnrollCommand {
            claim: valid_claim(),
        };

        let first = handler.handle(cmd.clone()).await;
        assert!(matches!(first, Err(EnrollError::PartialCommit { .. })));

        // A client resubmission hits the replay path; it does not repair the
        // index (that is reconciliation's job) but it must not duplicate.
        store.fail_grant.store(false, Ordering::SeqCst);
        let second = handler.handle(cmd).await.unwrap();
        assert!(matches!(second, EnrollOutcome::Replayed(_)));
        assert_eq!(store.active_rows(), 1);
    }

    #[tokio::test]
    async fn replay_check_timeout_is_storage_unavailable() {
        let store = Arc::new(MockStore::new());
        store.fail_find.store(true, Ordering::SeqCst);
        let handler = handler_with(store.clone());

        let result = handler
            .handle(VerifyAndEnrollCommand {
                claim: valid_claim(),
            })
            .await;

        assert!(matches!(result, Err(EnrollError::StorageUnavailable(_))));
        assert_eq!(store.active_rows(), 0);
    }
}
