//! Payment gateway seam.
//!
//! The core only needs an externally-hosted payment intent: amount in the
//! currency's smallest unit in, provider order reference out. Capture,
//! webhooks and reconciliation belong to the provider integration, not here.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment provider rejected the request: {0}")]
    Provider(String),
    #[error("no payment provider is configured")]
    Unconfigured,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub provider_order_id: String,
    pub amount: i64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, amount: i64, currency: &str)
        -> Result<PaymentIntent, PaymentError>;
}

/// Mints local references without contacting a provider. Stands in for the
/// hosted gateway in development and single-box deployments.
pub struct OfflineGateway;

#[async_trait]
impl PaymentGateway for OfflineGateway {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        if amount <= 0 {
            return Err(PaymentError::Provider("amount must be positive".into()));
        }
        let intent = PaymentIntent {
            provider_order_id: format!("pi_{}", Uuid::new_v4().simple()),
            amount,
            currency: currency.to_string(),
        };
        tracing::info!(
            provider_order_id = %intent.provider_order_id,
            amount,
            currency,
            "minted offline payment intent"
        );
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_gateway_mints_unique_references() {
        let gateway = OfflineGateway;
        let a = gateway.create_intent(40000, "INR").await.unwrap();
        let b = gateway.create_intent(40000, "INR").await.unwrap();
        assert_ne!(a.provider_order_id, b.provider_order_id);
        assert!(a.provider_order_id.starts_with("pi_"));
        assert_eq!(a.amount, 40000);
    }

    #[tokio::test]
    async fn zero_amount_is_rejected() {
        let gateway = OfflineGateway;
        assert!(gateway.create_intent(0, "INR").await.is_err());
    }
}
