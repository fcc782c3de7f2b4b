//! Best-effort notification dispatch.
//!
//! Lifecycle transitions hand a [`Notification`] to [`dispatch`], which
//! spawns a task with its own error boundary. A transport failure is
//! observable only through logs; it never reaches the caller of the
//! operation that triggered it.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::events::OrderEvent;
use crate::domain::Order;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("publish failed: {0}")]
    Publish(String),
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Transport for order confirmations and status-change messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn order_created(&self, order: &Order, email: &str, name: &str)
        -> Result<(), NotifyError>;
    async fn status_changed(
        &self,
        order: &Order,
        email: &str,
        name: &str,
    ) -> Result<(), NotifyError>;
}

/// A message queued for delivery by [`dispatch`].
#[derive(Debug, Clone)]
pub enum Notification {
    Created {
        order: Order,
        email: String,
        name: String,
    },
    StatusChanged {
        order: Order,
        email: String,
        name: String,
    },
}

impl Notification {
    fn order_id(&self) -> Uuid {
        match self {
            Self::Created { order, .. } | Self::StatusChanged { order, .. } => order.id,
        }
    }
}

/// Fire-and-forget delivery. The spawned task owns the failure; callers get
/// nothing back.
pub fn dispatch(notifier: Arc<dyn Notifier>, message: Notification) {
    tokio::spawn(async move {
        let result = match &message {
            Notification::Created { order, email, name } => {
                notifier.order_created(order, email, name).await
            }
            Notification::StatusChanged { order, email, name } => {
                notifier.status_changed(order, email, name).await
            }
        };
        if let Err(err) = result {
            warn!(order_id = %message.order_id(), error = %err, "notification dispatch failed");
        }
    });
}

/// Publishes serialized order events to NATS subjects; downstream workers
/// turn them into emails and push messages.
pub struct NatsNotifier {
    client: async_nats::Client,
}

impl NatsNotifier {
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }

    async fn publish(&self, event: &OrderEvent) -> Result<(), NotifyError> {
        let payload = serde_json::to_vec(event)?;
        self.client
            .publish(event.subject().to_string(), payload.into())
            .await
            .map_err(|e| NotifyError::Publish(e.to_string()))
    }
}

#[async_trait]
impl Notifier for NatsNotifier {
    async fn order_created(
        &self,
        order: &Order,
        _email: &str,
        _name: &str,
    ) -> Result<(), NotifyError> {
        self.publish(&OrderEvent::created(order)).await
    }

    async fn status_changed(
        &self,
        order: &Order,
        _email: &str,
        _name: &str,
    ) -> Result<(), NotifyError> {
        self.publish(&OrderEvent::status_changed(order)).await
    }
}

/// Fallback transport used when no NATS URL is configured: the messages land
/// in the structured log instead of a mailbox.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn order_created(
        &self,
        order: &Order,
        email: &str,
        name: &str,
    ) -> Result<(), NotifyError> {
        info!(
            order_id = %order.id,
            total_amount = order.total_amount,
            recipient = email,
            name,
            "order confirmation"
        );
        Ok(())
    }

    async fn status_changed(
        &self,
        order: &Order,
        email: &str,
        name: &str,
    ) -> Result<(), NotifyError> {
        info!(
            order_id = %order.id,
            status = %order.delivery_status,
            recipient = email,
            name,
            "order status update"
        );
        Ok(())
    }
}
