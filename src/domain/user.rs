//! User reference. Identity lives in an external service; orders and carts
//! only need the id, display fields, role and stored default address.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::ShippingAddress;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_address: Option<ShippingAddress>,
    #[serde(default)]
    pub push_tokens: Vec<String>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            email: email.into(),
            role,
            default_address: None,
            push_tokens: vec![],
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
