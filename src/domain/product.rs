//! Product catalog record. Read-mostly CRUD, no invariants beyond pricing
//! sanity checked at the request boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub original_price: i64,
    pub discount_price: i64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rating: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        original_price: i64,
        discount_price: i64,
        category: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            image: image.into(),
            original_price,
            discount_price,
            category: category.into(),
            description,
            rating: 0.0,
            created_at: now,
            updated_at: now,
        }
    }
}
