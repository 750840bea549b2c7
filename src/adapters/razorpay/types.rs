//! Serde types for the Razorpay Orders API.

use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/orders`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderBody<'a> {
    /// Amount in the smallest currency unit (paise for INR).
    pub amount: i64,
    pub currency: &'a str,
    pub receipt: &'a str,
}

/// Typed subset of the order object Razorpay returns.
///
/// Razorpay includes further fields (`entity`, `amount_due`, `attempts`,
/// `notes`, ...); those ride along in the raw JSON the adapter keeps next to
/// this struct.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
}

/// Error envelope Razorpay wraps failures in.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayErrorBody {
    pub error: RazorpayErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_response_parses_with_extra_fields() {
        let body = serde_json::json!({
            "id": "order_IluGWxBm9U8zJ8",
            "entity": "order",
            "amount": 50000,
            "amount_paid": 0,
            "amount_due": 50000,
            "currency": "INR",
            "receipt": "receipt_1700000000000",
            "status": "created",
            "attempts": 0,
            "created_at": 1700000000
        });

        let order: RazorpayOrder = serde_json::from_value(body).unwrap();
        assert_eq!(order.id, "order_IluGWxBm9U8zJ8");
        assert_eq!(order.amount, 50_000);
        assert_eq!(order.currency, "INR");
        assert_eq!(order.receipt.as_deref(), Some("receipt_1700000000000"));
    }

    #[test]
    fn error_body_parses() {
        let body = serde_json::json!({
            "error": {
                "code": "BAD_REQUEST_ERROR",
                "description": "The amount must be atleast INR 1.00",
                "source": "business",
                "step": "payment_initiation"
            }
        });

        let parsed: RazorpayErrorBody = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.error.code.as_deref(), Some("BAD_REQUEST_ERROR"));
    }
}
