//! Razorpay payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the Razorpay Orders API.
//! Authentication is HTTP basic auth with the key id as username and the key
//! secret as password; the secret is held in `secrecy::SecretString`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::PaymentConfig;
use crate::ports::{GatewayError, GatewayOrder, PaymentGateway};

use super::types::{CreateOrderBody, RazorpayErrorBody, RazorpayOrder};

/// Razorpay API configuration.
#[derive(Clone)]
pub struct RazorpayConfig {
    key_id: String,
    key_secret: SecretString,
    api_base_url: String,
}

impl RazorpayConfig {
    /// Create a new Razorpay configuration.
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: SecretString::new(key_secret.into()),
            api_base_url: "https://api.razorpay.com".to_string(),
        }
    }

    /// Build from the validated application payment config.
    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self {
            key_id: config.razorpay_key_id.clone(),
            key_secret: SecretString::new(config.razorpay_key_secret.clone()),
            api_base_url: config.api_base_url.clone(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Razorpay gateway adapter.
pub struct RazorpayClient {
    config: RazorpayConfig,
    http_client: reqwest::Client,
}

impl RazorpayClient {
    /// Create a new Razorpay client with the given configuration.
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/v1/orders", self.config.api_base_url);
        let body = CreateOrderBody {
            amount,
            currency,
            receipt,
        };

        let response = self
            .http_client
            .post(&url)
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let description = serde_json::from_str::<RazorpayErrorBody>(&error_text)
                .ok()
                .and_then(|b| b.error.description)
                .unwrap_or(error_text);
            tracing::error!(status = %status, error = %description, "Razorpay create_order failed");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body: description,
            });
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let order: RazorpayOrder = serde_json::from_value(raw.clone())
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(GatewayOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
            receipt: order.receipt,
            raw,
        })
    }
}
