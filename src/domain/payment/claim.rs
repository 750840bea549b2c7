//! Inbound payment claim and its verified counterpart.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, UserId};

/// Untrusted payment result submitted by the client after checkout.
///
/// Exists only for the duration of a verification call. Nothing in this
/// struct may be believed until [`SignatureVerifier::verify`] has accepted it.
///
/// [`SignatureVerifier::verify`]: super::SignatureVerifier::verify
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentClaim {
    /// Order reference issued by the gateway at checkout start.
    pub order_id: String,

    /// Payment reference assigned by the gateway on completion.
    pub payment_id: String,

    /// Hex-encoded HMAC-SHA256 signature presented by the client.
    pub signature: String,

    /// Identity claiming the purchase.
    pub user_id: String,

    /// Course the purchase is for.
    pub course_id: String,

    /// Amount the client says was paid, in the smallest currency unit.
    pub amount: i64,
}

/// A payment claim whose signature has been checked against the shared secret.
///
/// Only the signature verifier constructs this type; holding one is proof that
/// the gateway signed `order_id|payment_id` with the shared secret. The
/// enrollment committer accepts nothing else.
#[derive(Debug, Clone)]
pub struct VerifiedPayment {
    order_id: String,
    payment_id: String,
    user_id: UserId,
    course_id: CourseId,
    amount: i64,
}

impl VerifiedPayment {
    /// Crate-internal constructor. Call sites outside the verifier must not
    /// fabricate verified payments.
    pub(crate) fn new(
        order_id: String,
        payment_id: String,
        user_id: UserId,
        course_id: CourseId,
        amount: i64,
    ) -> Self {
        Self {
            order_id,
            payment_id,
            user_id,
            course_id,
            amount,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn payment_id(&self) -> &str {
        &self.payment_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }
}
