//! In-memory store. Backs the test suites and serves as the fallback when no
//! `DATABASE_URL` is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Cart, DeliveryStatus, Order, Product, User};
use crate::store::{CartStore, OrderStore, ProductStore, StoreError, UserStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    carts: RwLock<HashMap<Uuid, Cart>>,
    orders: RwLock<HashMap<Uuid, Order>>,
    users: RwLock<HashMap<Uuid, User>>,
    products: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn find(&self, owner: Uuid) -> Result<Option<Cart>, StoreError> {
        Ok(self.carts.read().await.get(&owner).cloned())
    }

    async fn upsert(&self, cart: &Cart) -> Result<(), StoreError> {
        self.carts.write().await.insert(cart.owner, cart.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: DeliveryStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Order>, StoreError> {
        let mut orders = self.orders.write().await;
        Ok(orders.get_mut(&id).map(|order| {
            order.delivery_status = status;
            order.updated_at = updated_at;
            order.clone()
        }))
    }

    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<Order>, StoreError> {
        let mut matching: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.owner == owner)
            .cloned()
            .collect();
        sort_newest_first(&mut matching);
        Ok(matching)
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let mut all: Vec<Order> = self.orders.read().await.values().cloned().collect();
        sort_newest_first(&mut all);
        Ok(all)
    }
}

fn sort_newest_first(orders: &mut [Order]) {
    // Order ids are v7, so the id tiebreak preserves creation order even for
    // equal timestamps.
    orders.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn upsert(&self, user: &User) -> Result<(), StoreError> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn upsert(&self, product: &Product) -> Result<(), StoreError> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.products.write().await.remove(&id).is_some())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let mut all: Vec<Product> = self.products.read().await.values().cloned().collect();
        all.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(all)
    }
}
