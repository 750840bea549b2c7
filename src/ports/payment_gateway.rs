//! Payment gateway port.
//!
//! Contract for the external payment gateway (Razorpay in production). The
//! gateway owns the order lifecycle; this service only asks it to open an
//! order and later checks the signature it produced for the completed payment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order reference issued by the gateway for a pending payment.
///
/// Owned by the gateway and never persisted here; `raw` carries the full
/// gateway response so the caller-facing endpoint can pass it through
/// unchanged, extra fields included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order id (e.g. `order_...`).
    pub id: String,

    /// Amount in the smallest currency unit.
    pub amount: i64,

    /// ISO currency code.
    pub currency: String,

    /// Receipt token supplied at creation.
    pub receipt: Option<String>,

    /// The complete gateway response body.
    pub raw: serde_json::Value,
}

/// Errors from the gateway collaborator.
///
/// None of these are retried internally; the caller decides.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The gateway could not be reached.
    #[error("gateway unreachable: {0}")]
    Network(String),

    /// The gateway answered with a non-success status.
    #[error("gateway rejected the request (status {status}): {body}")]
    Api { status: u16, body: String },

    /// The gateway answered 2xx but the body did not parse.
    #[error("gateway response could not be parsed: {0}")]
    InvalidResponse(String),
}

/// Port for creating payment orders at the gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Ask the gateway to open a pending order.
    ///
    /// No local side effects; the gateway records the pending order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on network failure, gateway rejection, or an
    /// unparseable response.
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError>;
}
