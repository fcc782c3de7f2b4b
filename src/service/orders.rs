//! Order lifecycle manager.
//!
//! Owns the cart-to-order transition and the delivery-status state machine.
//! Within one `create_order` call the steps are strictly sequential: the
//! order is persisted before the cart is cleared, and the confirmation is
//! dispatched after both. Cart-clear and notification failures never fail
//! the operation; a persistence failure aborts it before the cart is
//! touched. There is deliberately no cross-document transaction between the
//! order insert and the cart clear.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{DeliveryStatus, Order, PaymentMethod, ShippingAddress, User};
use crate::error::ApiError;
use crate::notify::{dispatch, Notification, Notifier};
use crate::store::{CartStore, OrderStore, UserStore};

/// Checkout request, as resolved from the HTTP body.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// Overrides the user's stored default address when present.
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: PaymentMethod,
    pub payment_id: Option<String>,
}

/// Owner identity resolved to display fields.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerRef {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerRef>,
}

pub struct OrderService {
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderStore>,
    users: Arc<dyn UserStore>,
    notifier: Arc<dyn Notifier>,
}

impl OrderService {
    pub fn new(
        carts: Arc<dyn CartStore>,
        orders: Arc<dyn OrderStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            carts,
            orders,
            users,
            notifier,
        }
    }

    /// Turns the owner's cart into an immutable order.
    pub async fn create_order(&self, owner: Uuid, req: CreateOrder) -> Result<Order, ApiError> {
        let cart = self
            .carts
            .find(owner)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(ApiError::EmptyCart)?;

        let user = self.users.find(owner).await?.ok_or(ApiError::UserNotFound)?;

        let address = req
            .shipping_address
            .or_else(|| user.default_address.clone())
            .ok_or(ApiError::MissingAddress)?;
        if !address.is_complete() {
            return Err(ApiError::MissingAddress);
        }

        if req.payment_method == PaymentMethod::Online && req.payment_id.is_none() {
            return Err(ApiError::Validation(
                "Payment id is required for online payment.".into(),
            ));
        }

        let order = Order::from_cart_snapshot(
            owner,
            &cart.items,
            address,
            req.payment_method,
            req.payment_id,
        );
        self.orders.insert(&order).await?;

        // The order stands even if the clear fails; the two writes are not
        // wrapped in a transaction.
        let mut cleared = cart;
        cleared.clear();
        if let Err(err) = self.carts.upsert(&cleared).await {
            warn!(order_id = %order.id, error = %err, "cart clear failed after order creation");
        }

        dispatch(
            Arc::clone(&self.notifier),
            Notification::Created {
                order: order.clone(),
                email: user.email,
                name: user.name,
            },
        );

        Ok(order)
    }

    /// Moves an order along the fulfillment state machine. Admin only.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        requested: DeliveryStatus,
        actor: &User,
    ) -> Result<Order, ApiError> {
        let mut order = self
            .orders
            .find(order_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found.".into()))?;

        order.transition_to(requested)?;

        if !actor.is_admin() {
            return Err(ApiError::Forbidden);
        }

        // Read-modify-write without a concurrency token; the forward-only
        // table keeps concurrent updates from conflicting destructively.
        let updated = self
            .orders
            .set_status(order_id, order.delivery_status, order.updated_at)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found.".into()))?;

        match self.users.find(updated.owner).await {
            Ok(Some(user)) => dispatch(
                Arc::clone(&self.notifier),
                Notification::StatusChanged {
                    order: updated.clone(),
                    email: user.email,
                    name: user.name,
                },
            ),
            Ok(None) => {
                warn!(order_id = %updated.id, "order owner missing, skipping status notification");
            }
            Err(err) => {
                warn!(order_id = %updated.id, error = %err, "owner lookup failed, skipping status notification");
            }
        }

        Ok(updated)
    }

    /// Fetches one order; only its owner and admins may see it.
    pub async fn get_order(&self, order_id: Uuid, requester: &User) -> Result<OrderView, ApiError> {
        let order = self
            .orders
            .find(order_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found.".into()))?;

        if order.owner != requester.id && !requester.is_admin() {
            return Err(ApiError::Forbidden);
        }

        let customer = self
            .users
            .find(order.owner)
            .await?
            .map(|user| CustomerRef {
                name: user.name,
                email: user.email,
            });

        Ok(OrderView { order, customer })
    }

    /// The requester's own orders, newest first.
    pub async fn orders_for(&self, owner: Uuid) -> Result<Vec<Order>, ApiError> {
        Ok(self.orders.list_for_owner(owner).await?)
    }

    /// Every order, newest first. Callers are expected to have checked the
    /// admin role already.
    pub async fn all_orders(&self) -> Result<Vec<Order>, ApiError> {
        Ok(self.orders.list_all().await?)
    }
}
