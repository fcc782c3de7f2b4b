//! Catalog handlers. Reads are public; writes require the admin role.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::domain::Product;
use crate::error::ApiError;
use crate::http::auth::AdminUser;
use crate::http::{decode, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub image: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub original_price: i64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub discount_price: i64,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub category: String,
    pub description: Option<String>,
}

fn parse_product_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId("Invalid product id.".into()))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let products = state.products.list().await?;
    Ok(Json(json!({ "success": true, "products": products })))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let product_id = parse_product_id(&id)?;
    let product = state
        .products
        .find(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found.".into()))?;
    Ok(Json(json!({ "success": true, "product": product })))
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let req: ProductRequest = decode(body)?;
    req.validate()?;

    let product = Product::new(
        req.name,
        req.image,
        req.original_price,
        req.discount_price,
        req.category,
        req.description,
    );
    state.products.upsert(&product).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Product created.",
            "product": product,
        })),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let product_id = parse_product_id(&id)?;
    let req: ProductRequest = decode(body)?;
    req.validate()?;

    let mut product = state
        .products
        .find(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found.".into()))?;
    product.name = req.name;
    product.image = req.image;
    product.original_price = req.original_price;
    product.discount_price = req.discount_price;
    product.category = req.category;
    product.description = req.description;
    product.updated_at = chrono::Utc::now();
    state.products.upsert(&product).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Product updated.",
        "product": product,
    })))
}

pub async fn remove(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let product_id = parse_product_id(&id)?;
    if !state.products.delete(product_id).await? {
        return Err(ApiError::NotFound("Product not found.".into()));
    }
    Ok(Json(json!({ "success": true, "message": "Product deleted." })))
}
