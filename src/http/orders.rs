//! Order handlers: checkout, history, admin listing and status updates.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::{DeliveryStatus, PaymentMethod, ShippingAddress};
use crate::error::ApiError;
use crate::http::auth::{AdminUser, AuthUser};
use crate::http::{decode, AppState};
use crate::service::CreateOrder;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

fn parse_order_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId("Invalid order id.".into()))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let req: CreateOrderRequest = decode(body)?;
    let order = state
        .orders
        .create_order(
            user.id,
            CreateOrder {
                shipping_address: req.shipping_address,
                payment_method: req.payment_method,
                payment_id: req.payment_id,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Order created successfully.",
            "order": order,
        })),
    ))
}

pub async fn my_orders(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let orders = state.orders.orders_for(user.id).await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}

pub async fn list_all(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Value>, ApiError> {
    let orders = state.orders.all_orders().await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}

pub async fn get_one(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let view = state.orders.get_order(order_id, &user).await?;
    Ok(Json(json!({ "success": true, "order": view })))
}

pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let req: UpdateStatusRequest = decode(body)?;
    let status: DeliveryStatus = req
        .status
        .parse()
        .map_err(|_| ApiError::Validation("Invalid status value.".into()))?;

    let order = state.orders.update_status(order_id, status, &admin).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Order status updated.",
        "order": order,
    })))
}
