//! HTTP handlers for the payment settlement endpoints.
//!
//! These handlers connect Axum routes to the application layer command
//! handlers and translate outcomes into the caller-facing wire contract.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{
    EnrollError, IssueOrderCommand, IssueOrderError, IssueOrderHandler, VerifyAndEnrollCommand,
    VerifyAndEnrollHandler,
};
use crate::domain::payment::SignatureVerifier;
use crate::ports::{EnrollmentStore, PaymentGateway};

use super::dto::{
    CreateOrderRequest, OrderErrorResponse, VerifyErrorResponse, VerifyPaymentRequest,
    VerifySuccessResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; dependencies are Arc-wrapped for cheap sharing.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub gateway: Arc<dyn PaymentGateway>,
    pub store: Arc<dyn EnrollmentStore>,
    pub verifier: Arc<SignatureVerifier>,
    pub default_currency: String,
}

impl PaymentsAppState {
    pub fn issue_order_handler(&self) -> IssueOrderHandler {
        IssueOrderHandler::new(self.gateway.clone(), self.default_currency.clone())
    }

    pub fn verify_and_enroll_handler(&self) -> VerifyAndEnrollHandler {
        VerifyAndEnrollHandler::new(self.verifier.clone(), self.store.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments/order - open a pending order at the gateway.
///
/// The successful response is the gateway's order object passed through
/// verbatim, extra gateway fields included.
pub async fn create_order(
    State(state): State<PaymentsAppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, OrderApiError> {
    let handler = state.issue_order_handler();
    let cmd = IssueOrderCommand {
        amount: request.amount,
        currency: request.currency,
    };

    let order = handler.handle(cmd).await?;

    Ok(Json(order.raw))
}

/// POST /api/payments/verify - verify a payment result and settle the enrollment.
pub async fn verify_payment(
    State(state): State<PaymentsAppState>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<impl IntoResponse, VerifyApiError> {
    let handler = state.verify_and_enroll_handler();
    let cmd = VerifyAndEnrollCommand {
        claim: request.into(),
    };

    let outcome = handler.handle(cmd).await?;

    let response = VerifySuccessResponse {
        status: "success",
        payment_id: outcome.enrollment().payment_id.clone(),
    };
    Ok(Json(response))
}

/// GET /health - liveness probe.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper for the order endpoint.
pub struct OrderApiError(IssueOrderError);

impl From<IssueOrderError> for OrderApiError {
    fn from(err: IssueOrderError) -> Self {
        Self(err)
    }
}

impl IntoResponse for OrderApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self.0 {
            IssueOrderError::InvalidRequest => (
                StatusCode::BAD_REQUEST,
                OrderErrorResponse {
                    error: "Amount is required".to_string(),
                    details: None,
                },
            ),
            IssueOrderError::UpstreamUnavailable { details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                OrderErrorResponse {
                    error: "Failed to create order".to_string(),
                    details: Some(details),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// API error wrapper for the verify endpoint.
pub struct VerifyApiError(EnrollError);

impl From<EnrollError> for VerifyApiError {
    fn from(err: EnrollError) -> Self {
        Self(err)
    }
}

impl IntoResponse for VerifyApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self.0 {
            // Generic by design: a forger learns nothing about what differed.
            EnrollError::InvalidSignature => (
                StatusCode::BAD_REQUEST,
                VerifyErrorResponse {
                    status: "failure",
                    message: "Invalid Signature".to_string(),
                },
            ),
            // Operational faults: detail goes to the log, not the caller.
            EnrollError::MisconfiguredSecret => (
                StatusCode::INTERNAL_SERVER_ERROR,
                VerifyErrorResponse {
                    status: "error",
                    message: "Payment verification is unavailable".to_string(),
                },
            ),
            EnrollError::StorageUnavailable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                VerifyErrorResponse {
                    status: "error",
                    message: "Enrollment could not be recorded, please retry".to_string(),
                },
            ),
            EnrollError::PartialCommit { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                VerifyErrorResponse {
                    status: "error",
                    message: "Enrollment recorded but not yet activated".to_string(),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}
