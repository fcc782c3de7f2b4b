//! Payment-intent handler. Creates a hosted payment reference for the
//! caller's current cart total; the client hands the reference back as
//! `paymentId` when placing an online order.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::domain::cart::CartItem;
use crate::error::ApiError;
use crate::http::auth::AuthUser;
use crate::http::AppState;

pub async fn create_intent(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let items = state.carts.items(user.id).await?;
    if items.is_empty() {
        return Err(ApiError::EmptyCart);
    }
    let amount: i64 = items.iter().map(CartItem::line_total).sum();

    let intent = state.payments.create_intent(amount, &state.currency).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "intent": intent })),
    ))
}
