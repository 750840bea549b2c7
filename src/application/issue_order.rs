//! IssueOrderHandler - Command handler for opening a gateway payment order.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::ports::{GatewayError, GatewayOrder, PaymentGateway};

/// Command to open a pending order at the payment gateway.
#[derive(Debug, Clone)]
pub struct IssueOrderCommand {
    /// Amount in the smallest currency unit. Must be positive.
    pub amount: Option<i64>,

    /// ISO currency code; falls back to the configured default.
    pub currency: Option<String>,
}

/// Errors from order issuance.
#[derive(Debug, Clone, Error)]
pub enum IssueOrderError {
    /// Caller supplied no amount, or a non-positive one.
    #[error("Amount is required")]
    InvalidRequest,

    /// The gateway collaborator failed. Not retried here; the caller decides.
    #[error("Failed to create order")]
    UpstreamUnavailable { details: String },
}

/// Handler for opening gateway payment orders.
///
/// Stateless and side-effect free locally: the pending order lives at the
/// gateway, and nothing is persisted here.
pub struct IssueOrderHandler {
    gateway: Arc<dyn PaymentGateway>,
    default_currency: String,
}

impl IssueOrderHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, default_currency: impl Into<String>) -> Self {
        Self {
            gateway,
            default_currency: default_currency.into(),
        }
    }

    /// Opens a pending order and returns the gateway's order reference.
    ///
    /// # Errors
    ///
    /// - [`IssueOrderError::InvalidRequest`] for a missing or non-positive amount
    /// - [`IssueOrderError::UpstreamUnavailable`] when the gateway call fails
    pub async fn handle(&self, cmd: IssueOrderCommand) -> Result<GatewayOrder, IssueOrderError> {
        let amount = match cmd.amount {
            Some(amount) if amount > 0 => amount,
            _ => return Err(IssueOrderError::InvalidRequest),
        };

        let currency = cmd
            .currency
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.default_currency.clone());

        let receipt = format!("receipt_{}", Utc::now().timestamp_millis());

        let order = self
            .gateway
            .create_order(amount, &currency, &receipt)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, amount, %currency, "gateway order creation failed");
                IssueOrderError::UpstreamUnavailable {
                    details: gateway_error_details(&e),
                }
            })?;

        tracing::info!(order_id = %order.id, amount, %currency, "gateway order created");
        Ok(order)
    }
}

fn gateway_error_details(error: &GatewayError) -> String {
    match error {
        GatewayError::Network(msg) => msg.clone(),
        GatewayError::Api { status, body } => format!("gateway returned {status}: {body}"),
        GatewayError::InvalidResponse(msg) => msg.clone(),
    }
}
