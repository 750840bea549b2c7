//! Payment signature verification.
//!
//! The gateway signs every completed payment as
//! `HMAC-SHA256(secret, "<order_id>|<payment_id>")`, hex-encoded. Verification
//! recomputes that digest and compares it to the presented signature in
//! constant time, so the comparison leaks nothing about which byte differed.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::domain::foundation::{CourseId, UserId};

use super::claim::{PaymentClaim, VerifiedPayment};

type HmacSha256 = Hmac<Sha256>;

/// Outcome of a failed verification.
///
/// A forged or garbled claim and an operational misconfiguration must never be
/// conflated: the first is attack surface, the second is a bug on our side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// Signature mismatch or malformed claim. Deliberately carries no detail
    /// about what differed.
    #[error("payment signature verification failed")]
    Failed,

    /// The shared secret is absent. Configuration fault, not a client forgery.
    #[error("payment signing secret is not configured")]
    MisconfiguredSecret,
}

/// Verifies gateway payment signatures against the shared secret.
///
/// Pure with respect to external state: no store access, and the same claim
/// always verifies the same way under the same secret.
pub struct SignatureVerifier {
    secret: SecretString,
}

impl SignatureVerifier {
    /// Creates a verifier over the shared signing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
        }
    }

    /// Verifies the claim's signature and promotes it to a [`VerifiedPayment`].
    ///
    /// # Errors
    ///
    /// - [`VerificationError::MisconfiguredSecret`] if no secret is configured
    /// - [`VerificationError::Failed`] on any mismatch or missing claim field
    pub fn verify(&self, claim: &PaymentClaim) -> Result<VerifiedPayment, VerificationError> {
        let secret = self.secret.expose_secret();
        if secret.is_empty() {
            return Err(VerificationError::MisconfiguredSecret);
        }

        if claim.order_id.is_empty() || claim.payment_id.is_empty() || claim.signature.is_empty() {
            return Err(VerificationError::Failed);
        }

        let user_id =
            UserId::new(claim.user_id.clone()).map_err(|_| VerificationError::Failed)?;
        let course_id =
            CourseId::new(claim.course_id.clone()).map_err(|_| VerificationError::Failed)?;

        let expected = payment_digest(secret.as_bytes(), &claim.order_id, &claim.payment_id);

        // Malformed hex can short-circuit: it reveals nothing about the digest.
        let presented =
            hex::decode(&claim.signature).map_err(|_| VerificationError::Failed)?;

        if !constant_time_compare(&expected, &presented) {
            return Err(VerificationError::Failed);
        }

        Ok(VerifiedPayment::new(
            claim.order_id.clone(),
            claim.payment_id.clone(),
            user_id,
            course_id,
            claim.amount,
        ))
    }
}

/// Computes the raw HMAC-SHA256 digest over `order_id|payment_id`.
pub(crate) fn payment_digest(secret: &[u8], order_id: &str, payment_id: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key size");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Hex digest the gateway would present for a payment. Test fixture helper.
#[cfg(test)]
pub(crate) fn sign_payment(secret: &str, order_id: &str, payment_id: &str) -> String {
    hex::encode(payment_digest(secret.as_bytes(), order_id, payment_id))
}
