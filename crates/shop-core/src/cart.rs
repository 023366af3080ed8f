//! # Carts and Wishlists
//!
//! Per-user mutable collections. A cart line is keyed by
//! (product, size, color); the cart total is always recomputed from the
//! current price of each line's own product.

use crate::error::{ShopError, ShopResult};
use crate::product::{Color, Product, Size};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
    pub size: Option<Size>,
    pub color: Option<Color>,
}

impl CartItem {
    fn matches(&self, product_id: &str, size: Option<Size>, color: Option<Color>) -> bool {
        self.product_id == product_id && self.size == size && self.color == color
    }
}

/// Request body for add/update/remove
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub color: Option<Color>,
}

impl CartLine {
    pub fn require_product(&self) -> ShopResult<()> {
        if self.product_id.trim().is_empty() {
            return Err(ShopError::validation("Product ID is required"));
        }
        Ok(())
    }

    pub fn require_quantity(&self) -> ShopResult<()> {
        self.require_product()?;
        if self.quantity == 0 {
            return Err(ShopError::validation(
                "Product ID and quantity are required",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub user_id: String,
    pub items: Vec<CartItem>,
    /// Derived; smallest currency unit
    pub total: i64,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            items: Vec::new(),
            total: 0,
            updated_at: Utc::now(),
        }
    }

    /// Add units of a product, merging with an existing line
    pub fn add(&mut self, product: &Product, line: &CartLine) -> ShopResult<()> {
        line.require_quantity()?;
        let existing = self
            .items
            .iter()
            .position(|i| i.matches(&product.id, line.size, line.color));
        let wanted = existing
            .map(|idx| self.items[idx].quantity)
            .unwrap_or(0)
            .checked_add(line.quantity)
            .ok_or_else(|| ShopError::validation("Cart quantity is too large"))?;
        product.check_available(wanted, line.size, line.color)?;

        match existing {
            Some(idx) => self.items[idx].quantity = wanted,
            None => self.items.push(CartItem {
                product_id: product.id.clone(),
                quantity: line.quantity,
                size: line.size,
                color: line.color,
            }),
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Set the quantity of an existing line
    pub fn update(&mut self, product: &Product, line: &CartLine) -> ShopResult<()> {
        line.require_quantity()?;
        product.check_available(line.quantity, line.size, line.color)?;
        let item = self
            .items
            .iter_mut()
            .find(|i| i.matches(&product.id, line.size, line.color))
            .ok_or_else(|| ShopError::not_found("Cart item", &line.product_id))?;
        item.quantity = line.quantity;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn remove(&mut self, line: &CartLine) -> ShopResult<()> {
        line.require_product()?;
        let idx = self
            .items
            .iter()
            .position(|i| i.matches(&line.product_id, line.size, line.color))
            .ok_or_else(|| ShopError::not_found("Cart item", &line.product_id))?;
        self.items.remove(idx);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.total = 0;
        self.updated_at = Utc::now();
    }

    /// Drop lines whose product no longer exists and recompute the total.
    /// Returns how many lines were dropped.
    pub fn reprice<F>(&mut self, price_of: F) -> usize
    where
        F: Fn(&str) -> Option<i64>,
    {
        let before = self.items.len();
        self.items.retain(|i| price_of(&i.product_id).is_some());
        self.total = self
            .items
            .iter()
            .filter_map(|i| price_of(&i.product_id).map(|p| p.saturating_mul(i.quantity as i64)))
            .fold(0i64, i64::saturating_add);
        before - self.items.len()
    }
}

/// Saved-for-later product ids
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub user_id: String,
    pub items: Vec<String>,
}

impl Wishlist {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            items: Vec::new(),
        }
    }

    /// Returns false when the product was already listed
    pub fn add(&mut self, product_id: &str) -> bool {
        if self.items.iter().any(|id| id == product_id) {
            return false;
        }
        self.items.push(product_id.to_string());
        true
    }

    pub fn remove(&mut self, product_id: &str) {
        self.items.retain(|id| id != product_id);
    }
}
