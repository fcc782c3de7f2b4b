//! HTTP surface: router, shared state and the auth extractors.

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::http::auth::Sessions;
use crate::payment::PaymentGateway;
use crate::service::{CartService, OrderService};
use crate::store::{ProductStore, UserStore};

pub mod auth;
pub mod cart;
pub mod orders;
pub mod payments;
pub mod products;

#[derive(Clone)]
pub struct AppState {
    pub carts: Arc<CartService>,
    pub orders: Arc<OrderService>,
    pub products: Arc<dyn ProductStore>,
    pub users: Arc<dyn UserStore>,
    pub payments: Arc<dyn PaymentGateway>,
    pub sessions: Arc<Sessions>,
    pub currency: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "healthy", "service": "tiffinbox"})) }),
        )
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/:id",
            get(products::get_one)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/api/cart", get(cart::get_cart).delete(cart::clear))
        .route("/api/cart/items", post(cart::add_item))
        .route(
            "/api/cart/items/:key",
            patch(cart::update_quantity).delete(cart::remove_item),
        )
        .route("/api/orders", post(orders::create).get(orders::list_all))
        .route("/api/orders/myorders", get(orders::my_orders))
        .route("/api/orders/:id", get(orders::get_one))
        .route("/api/orders/:id/status", patch(orders::update_status))
        .route("/api/payments/intent", post(payments::create_intent))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Decodes a request body into a typed request, surfacing serde's
/// missing-field detail inside the standard failure envelope.
pub(crate) fn decode<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|err| ApiError::Validation(format!("Invalid request body: {err}")))
}
