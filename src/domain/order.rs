//! Order aggregate.
//!
//! An order is an immutable snapshot of a cart at checkout time. After
//! creation only `delivery_status` and `updated_at` ever change, and status
//! moves forward-only through the fulfillment state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::cart::CartItem;

/// Position of an order in the forward-only fulfillment state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
}

impl DeliveryStatus {
    /// Transition table. Self-loops are listed as allowed targets and are
    /// treated as accepted no-ops.
    pub fn can_transition_to(self, next: DeliveryStatus) -> bool {
        use DeliveryStatus::{Delivered, Pending, Shipped};
        matches!(
            (self, next),
            (Pending, Pending)
                | (Pending, Shipped)
                | (Shipped, Shipped)
                | (Shipped, Delivered)
                | (Delivered, Delivered)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown delivery status: {0}")]
pub struct ParseStatusError(String);

impl FromStr for DeliveryStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Cannot change status from {from} to {to}.")]
pub struct InvalidTransition {
    pub from: DeliveryStatus,
    pub to: DeliveryStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cod,
    Online,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Online => "online",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown payment method: {0}")]
pub struct ParseMethodError(String);

impl FromStr for PaymentMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(Self::Cod),
            "online" => Ok(Self::Online),
            other => Err(ParseMethodError(other.to_string())),
        }
    }
}

/// Delivery destination. `full_name`, `phone` and `address_line1` are
/// mandatory; the rest is optional detail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl ShippingAddress {
    pub fn is_complete(&self) -> bool {
        !self.full_name.trim().is_empty()
            && !self.phone.trim().is_empty()
            && !self.address_line1.trim().is_empty()
    }
}

/// Snapshot of one cart line at order-creation time. Owned copies only;
/// later cart or catalog changes never reach a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub image: String,
    pub original_price: i64,
    pub discount_price: i64,
    pub quantity: u32,
    pub category: String,
}

impl OrderItem {
    pub fn line_total(&self) -> i64 {
        self.discount_price * i64::from(self.quantity)
    }
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            name: item.name.clone(),
            image: item.image.clone(),
            original_price: item.original_price,
            discount_price: item.discount_price,
            quantity: item.quantity,
            category: item.category.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub owner: Uuid,
    pub items: Vec<OrderItem>,
    pub total_amount: i64,
    pub delivery_status: DeliveryStatus,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds an order from a deep snapshot of cart items. `total_amount` is
    /// computed here, once, and never again.
    pub fn from_cart_snapshot(
        owner: Uuid,
        cart_items: &[CartItem],
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        payment_id: Option<String>,
    ) -> Self {
        let items: Vec<OrderItem> = cart_items.iter().map(OrderItem::from).collect();
        let total_amount = items.iter().map(OrderItem::line_total).sum();
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            owner,
            items,
            total_amount,
            delivery_status: DeliveryStatus::Pending,
            shipping_address,
            payment_method,
            // A payment reference only makes sense for online payment.
            payment_id: match payment_method {
                PaymentMethod::Online => payment_id,
                PaymentMethod::Cod => None,
            },
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transition_to(&mut self, next: DeliveryStatus) -> Result<(), InvalidTransition> {
        if !self.delivery_status.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.delivery_status,
                to: next,
            });
        }
        self.delivery_status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
