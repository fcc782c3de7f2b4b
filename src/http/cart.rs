//! Cart handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::domain::CartItem;
use crate::error::ApiError;
use crate::http::auth::AuthUser;
use crate::http::{decode, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub image: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub original_price: i64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub discount_price: i64,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: u32,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub category: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

pub async fn get_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let items = state.carts.items(user.id).await?;
    Ok(Json(json!({ "success": true, "items": items })))
}

pub async fn add_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let req: AddItemRequest = decode(body)?;
    req.validate()?;

    let item = CartItem {
        id: Uuid::new_v4(),
        name: req.name,
        image: req.image,
        original_price: req.original_price,
        discount_price: req.discount_price,
        quantity: req.quantity,
        category: req.category,
        description: req.description,
    };
    let cart = state.carts.add_item(user.id, item).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Item added to cart.",
            "items": cart.items,
        })),
    ))
}

pub async fn update_quantity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(key): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let item_id = Uuid::parse_str(&key)
        .map_err(|_| ApiError::InvalidId("Invalid item id.".into()))?;
    let req: UpdateQuantityRequest = decode(body)?;
    let cart = state
        .carts
        .update_quantity(user.id, item_id, req.quantity)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Quantity updated.",
        "items": cart.items,
    })))
}

pub async fn remove_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let cart = state.carts.remove_item(user.id, &key).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Item removed from cart.",
        "items": cart.items,
    })))
}

pub async fn clear(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>, ApiError> {
    state.carts.clear(user.id).await?;
    Ok(Json(json!({ "success": true, "message": "Cart cleared." })))
}
