//! Bearer-token authentication.
//!
//! Tokens map to user ids through a time-boxed session table; how tokens are
//! minted is an identity-service concern outside this backend. `AuthUser`
//! rejects with 401, `AdminUser` additionally with 403.

use std::time::Duration;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::cache::TtlCache;
use crate::domain::User;
use crate::error::ApiError;
use crate::http::AppState;

pub struct Sessions {
    tokens: TtlCache<Uuid>,
    ttl: Duration,
}

impl Sessions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            tokens: TtlCache::new(),
            ttl,
        }
    }

    pub async fn issue(&self, token: impl Into<String>, user_id: Uuid) {
        self.tokens.put(token, user_id, self.ttl).await;
    }

    pub async fn resolve(&self, token: &str) -> Option<Uuid> {
        self.tokens.get(token).await
    }

    pub async fn revoke(&self, token: &str) {
        self.tokens.remove(token).await;
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

/// An authenticated requester.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthenticated)?;
        let user_id = state
            .sessions
            .resolve(token)
            .await
            .ok_or(ApiError::Unauthenticated)?;
        let user = state
            .users
            .find(user_id)
            .await?
            .ok_or(ApiError::Unauthenticated)?;
        Ok(Self(user))
    }
}

/// An authenticated requester holding the admin role.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden);
        }
        Ok(Self(user))
    }
}
