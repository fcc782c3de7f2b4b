//! Cart aggregate.
//!
//! One mutable cart per user, keyed by the owning user's id. Line items are
//! unique by case-insensitive name; placing an order empties the cart but
//! keeps the document around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Item already exists in cart.")]
    DuplicateItem,
    #[error("Item not found in cart.")]
    ItemNotFound,
    #[error("Quantity must be at least 1.")]
    InvalidQuantity,
}

/// One product entry in a cart, carrying both the list price and the price
/// actually charged at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub original_price: i64,
    pub discount_price: i64,
    pub quantity: u32,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CartItem {
    /// Amount charged for this line: discounted unit price times quantity.
    pub fn line_total(&self) -> i64 {
        self.discount_price * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub owner: Uuid,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(owner: Uuid) -> Self {
        let now = Utc::now();
        Self {
            owner,
            items: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Appends a line item. Names are unique within a cart, compared
    /// case-insensitively.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }
        if self
            .items
            .iter()
            .any(|i| i.name.to_lowercase() == item.name.to_lowercase())
        {
            return Err(CartError::DuplicateItem);
        }
        self.items.push(item);
        self.touch();
        Ok(())
    }

    /// Removes the line item matching `name` (case-insensitive).
    pub fn remove_item(&mut self, name: &str) -> Result<(), CartError> {
        let needle = name.to_lowercase();
        let before = self.items.len();
        self.items.retain(|i| i.name.to_lowercase() != needle);
        if self.items.len() == before {
            return Err(CartError::ItemNotFound);
        }
        self.touch();
        Ok(())
    }

    pub fn update_quantity(&mut self, item_id: Uuid, quantity: u32) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or(CartError::ItemNotFound)?;
        item.quantity = quantity;
        self.touch();
        Ok(())
    }

    /// Empties the item list. The cart document itself stays.
    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    /// Amount charged for the whole cart at current contents.
    pub fn total_amount(&self) -> i64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
