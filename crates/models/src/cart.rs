use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;
use crate::record::{Record, RecordId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: RecordId,
    pub quantity: u32,
}

impl CartItem {
    pub fn new(product: RecordId, quantity: u32) -> Self { Self { product, quantity } }
}

/// Shopping cart. Holds at most one item per product id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: RecordId,
    #[serde(default)]
    pub products: Vec<CartItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Cart {
    fn id(&self) -> RecordId { self.id }
}

pub fn validate_quantity(quantity: u32) -> Result<(), ModelError> {
    if quantity == 0 {
        return Err(ModelError::validation("quantity must be at least 1"));
    }
    Ok(())
}

impl Cart {
    pub fn new(id: RecordId) -> Self { Self { id, products: Vec::new(), extra: Map::new() } }

    pub fn item(&self, product: RecordId) -> Option<&CartItem> {
        self.products.iter().find(|i| i.product == product)
    }

    /// Increment the item for `product`, appending it with quantity 1 if absent.
    pub fn add_one(&mut self, product: RecordId) {
        match self.products.iter_mut().find(|i| i.product == product) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.products.push(CartItem::new(product, 1)),
        }
    }

    /// Returns whether the product was in the cart.
    pub fn set_quantity(&mut self, product: RecordId, quantity: u32) -> Result<bool, ModelError> {
        validate_quantity(quantity)?;
        match self.products.iter_mut().find(|i| i.product == product) {
            Some(item) => {
                item.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn remove(&mut self, product: RecordId) -> bool {
        let before = self.products.len();
        self.products.retain(|i| i.product != product);
        self.products.len() != before
    }

    pub fn clear(&mut self) { self.products.clear(); }

    /// Replace all items. Duplicate products are merged by summing quantities,
    /// keeping the position of the first occurrence.
    pub fn replace(&mut self, items: Vec<CartItem>) -> Result<(), ModelError> {
        let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
        for item in items {
            validate_quantity(item.quantity)?;
            match merged.iter_mut().find(|m| m.product == item.product) {
                Some(m) => m.quantity = m.quantity.saturating_add(item.quantity),
                None => merged.push(item),
            }
        }
        self.products = merged;
        Ok(())
    }

    pub fn total_quantity(&self) -> u64 {
        self.products.iter().map(|i| u64::from(i.quantity)).sum()
    }
}
