//! Tiffinbox - Food-Ordering Storefront Backend
//!
//! REST backend for a food-ordering storefront: product catalog, per-user
//! shopping cart, order placement and fulfillment tracking, payment-intent
//! creation, and best-effort order notifications.
//!
//! ## Features
//! - Product catalog management
//! - Per-user shopping cart with duplicate-item protection
//! - Cart-to-order transition with immutable priced snapshots
//! - Forward-only delivery status tracking (Pending -> Shipped -> Delivered)
//! - Fire-and-forget order notifications (NATS or log transport)
//! - Payment-intent creation for online checkout

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod notify;
pub mod payment;
pub mod service;
pub mod store;

pub use error::ApiError;

pub type Result<T> = std::result::Result<T, ApiError>;
