//! Persistence seams.
//!
//! One trait per document collection; the Postgres implementation keeps the
//! document-shaped fields (`items`, `shippingAddress`) in JSONB so the stored
//! shape matches the wire contract, and the in-memory implementation backs
//! tests and `DATABASE_URL`-less runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Cart, DeliveryStatus, Order, Product, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("corrupt document: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait CartStore: Send + Sync {
    /// The cart for `owner`, if one has been created.
    async fn find(&self, owner: Uuid) -> Result<Option<Cart>, StoreError>;
    /// Writes the whole cart document, creating it if absent.
    async fn upsert(&self, cart: &Cart) -> Result<(), StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;
    async fn find(&self, id: Uuid) -> Result<Option<Order>, StoreError>;
    /// Writes the new status and `updated_at`; returns the updated order.
    /// Last write wins, there is no concurrency token.
    async fn set_status(
        &self,
        id: Uuid,
        status: DeliveryStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Order>, StoreError>;
    /// Orders placed by `owner`, newest first.
    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<Order>, StoreError>;
    /// Every order, newest first.
    async fn list_all(&self) -> Result<Vec<Order>, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn upsert(&self, user: &User) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Product>, StoreError>;
    async fn upsert(&self, product: &Product) -> Result<(), StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn list(&self) -> Result<Vec<Product>, StoreError>;
}
