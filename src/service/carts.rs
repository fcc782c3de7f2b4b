//! Cart operations consumed by the storefront and the order lifecycle.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Cart, CartError, CartItem};
use crate::error::ApiError;
use crate::store::CartStore;

pub struct CartService {
    store: Arc<dyn CartStore>,
}

impl CartService {
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        Self { store }
    }

    /// Appends a line item, creating the cart document on first use.
    pub async fn add_item(&self, owner: Uuid, item: CartItem) -> Result<Cart, ApiError> {
        let mut cart = self
            .store
            .find(owner)
            .await?
            .unwrap_or_else(|| Cart::new(owner));
        cart.add_item(item)?;
        self.store.upsert(&cart).await?;
        Ok(cart)
    }

    /// Current line items; an absent cart reads as empty, never as an error.
    pub async fn items(&self, owner: Uuid) -> Result<Vec<CartItem>, ApiError> {
        Ok(self
            .store
            .find(owner)
            .await?
            .map(|cart| cart.items)
            .unwrap_or_default())
    }

    pub async fn remove_item(&self, owner: Uuid, name: &str) -> Result<Cart, ApiError> {
        let mut cart = self
            .store
            .find(owner)
            .await?
            .ok_or(CartError::ItemNotFound)?;
        cart.remove_item(name)?;
        self.store.upsert(&cart).await?;
        Ok(cart)
    }

    pub async fn update_quantity(
        &self,
        owner: Uuid,
        item_id: Uuid,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity.into());
        }
        let mut cart = self
            .store
            .find(owner)
            .await?
            .ok_or(CartError::ItemNotFound)?;
        cart.update_quantity(item_id, quantity)?;
        self.store.upsert(&cart).await?;
        Ok(cart)
    }

    /// Empties the cart. Succeeds as a no-op when no cart exists yet.
    pub async fn clear(&self, owner: Uuid) -> Result<(), ApiError> {
        if let Some(mut cart) = self.store.find(owner).await? {
            cart.clear();
            self.store.upsert(&cart).await?;
        }
        Ok(())
    }
}
