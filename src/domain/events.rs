//! Domain events raised by order lifecycle transitions. These are the
//! payloads the notification transport publishes.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::order::{DeliveryStatus, Order};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Created {
        order_id: Uuid,
        owner: Uuid,
        total_amount: i64,
        item_count: usize,
    },
    StatusChanged {
        order_id: Uuid,
        owner: Uuid,
        status: DeliveryStatus,
    },
}

impl OrderEvent {
    pub fn created(order: &Order) -> Self {
        Self::Created {
            order_id: order.id,
            owner: order.owner,
            total_amount: order.total_amount,
            item_count: order.items.len(),
        }
    }

    pub fn status_changed(order: &Order) -> Self {
        Self::StatusChanged {
            order_id: order.id,
            owner: order.owner,
            status: order.delivery_status,
        }
    }

    /// Transport subject this event is published under.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Created { .. } => "orders.created",
            Self::StatusChanged { .. } => "orders.status",
        }
    }
}
