//! Payment claim types and signature verification.

mod claim;
mod verifier;

pub use claim::{PaymentClaim, VerifiedPayment};
pub use verifier::{SignatureVerifier, VerificationError};

#[cfg(test)]
pub(crate) use verifier::sign_payment;
