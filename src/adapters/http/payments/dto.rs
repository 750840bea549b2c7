//! HTTP DTOs for the payment settlement endpoints.
//!
//! The request/response shapes here are a compatibility contract with the
//! deployed web client: field names (`orderCreationId`, `razorpayPaymentId`,
//! ...) and error bodies must not change.

use serde::{Deserialize, Serialize};

use crate::domain::payment::PaymentClaim;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to open a gateway payment order.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    /// Amount in the smallest currency unit.
    pub amount: Option<i64>,

    /// ISO currency code; the configured default applies when omitted.
    #[serde(default)]
    pub currency: Option<String>,
}

/// Request to verify a completed payment and settle the enrollment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    /// The gateway order id issued at checkout start.
    pub order_creation_id: String,

    /// The gateway payment id for the completed payment.
    pub razorpay_payment_id: String,

    /// Hex HMAC-SHA256 signature over `orderCreationId|razorpayPaymentId`.
    pub razorpay_signature: String,

    /// The purchasing user.
    pub user_id: String,

    /// The purchased course.
    pub course_id: String,

    /// Amount the client reports as paid.
    pub amount: i64,
}

impl From<VerifyPaymentRequest> for PaymentClaim {
    fn from(request: VerifyPaymentRequest) -> Self {
        PaymentClaim {
            order_id: request.order_creation_id,
            payment_id: request.razorpay_payment_id,
            signature: request.razorpay_signature,
            user_id: request.user_id,
            course_id: request.course_id,
            amount: request.amount,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Error body for the order endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct OrderErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Success body for the verify endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySuccessResponse {
    /// Always `"success"`.
    pub status: &'static str,

    /// The settled gateway payment id, echoed back.
    pub payment_id: String,
}

/// Failure/error body for the verify endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyErrorResponse {
    /// `"failure"` for signature rejection, `"error"` for faults.
    pub status: &'static str,
    pub message: String,
}
