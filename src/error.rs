//! API error taxonomy and its HTTP mapping.
//!
//! Every failure a caller can see renders as `{"success": false, "message"}`.
//! Internal detail (database, payment transport) stays in the logs; the
//! message field never leaks identifiers or stack traces.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::domain::cart::CartError;
use crate::domain::order::InvalidTransition;
use crate::payment::PaymentError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication required.")]
    Unauthenticated,
    #[error("You are not allowed to access this resource.")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidId(String),
    #[error("Cart is empty. Cannot create order.")]
    EmptyCart,
    #[error("Shipping address is incomplete. Full name, phone and address line 1 are required.")]
    MissingAddress,
    #[error("User not found.")]
    UserNotFound,
    #[error(transparent)]
    InvalidStatus(#[from] InvalidTransition),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Validation(_)
            | Self::InvalidId(_)
            | Self::EmptyCart
            | Self::MissingAddress
            | Self::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Payment(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // Internal failures get a generic message; detail goes to logs.
            Self::Store(err) => {
                tracing::error!(error = %err, "storage failure");
                "Internal server error.".to_string()
            }
            Self::Payment(err) => {
                tracing::error!(error = %err, "payment gateway failure");
                "Payment provider is unavailable right now.".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::DuplicateItem => Self::Conflict(err.to_string()),
            CartError::ItemNotFound => Self::NotFound(err.to_string()),
            CartError::InvalidQuantity => Self::Validation(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut parts: Vec<String> = errs
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let detail = errors
                    .first()
                    .map(|e| e.message.clone().unwrap_or_else(|| e.code.clone()))
                    .unwrap_or(std::borrow::Cow::Borrowed("invalid"));
                format!("{field}: {detail}")
            })
            .collect();
        parts.sort();
        Self::Validation(parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::DeliveryStatus;

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        assert_eq!(
            ApiError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::EmptyCart.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::NotFound("Order not found.".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CartError::DuplicateItem).status_code(),
            StatusCode::CONFLICT
        );
        let transition = InvalidTransition {
            from: DeliveryStatus::Delivered,
            to: DeliveryStatus::Shipped,
        };
        assert_eq!(
            ApiError::from(transition).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn empty_cart_message_is_stable() {
        assert_eq!(
            ApiError::EmptyCart.to_string(),
            "Cart is empty. Cannot create order."
        );
    }
}
