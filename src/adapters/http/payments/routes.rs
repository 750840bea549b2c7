//! Axum router configuration for the payment settlement endpoints.

use axum::{routing::post, Router};

use super::handlers::{create_order, verify_payment, PaymentsAppState};

/// Create the payments API router.
///
/// # Routes
///
/// - `POST /order` - open a pending order at the gateway
/// - `POST /verify` - verify a payment result and settle the enrollment
///
/// Neither route carries session authentication: the order endpoint creates
/// nothing locally, and the verify endpoint authenticates the payment itself
/// via the gateway signature.
pub fn payments_routes() -> Router<PaymentsAppState> {
    Router::new()
        .route("/order", post(create_order))
        .route("/verify", post(verify_payment))
}
