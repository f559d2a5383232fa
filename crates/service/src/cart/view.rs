use serde::Serialize;

use models::cart::Cart;
use models::product::Product;
use models::record::{find_by_id, RecordId};

/// A cart item joined with its current product record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> f64 { self.product.price * f64::from(self.quantity) }
}

/// Cart with product details filled in.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartView {
    pub id: RecordId,
    pub lines: Vec<CartLine>,
    /// Items whose product no longer exists in the catalog.
    pub missing: Vec<RecordId>,
    pub total: f64,
}

impl CartView {
    pub fn build(cart: &Cart, products: &[Product]) -> Self {
        let mut lines = Vec::with_capacity(cart.products.len());
        let mut missing = Vec::new();
        for item in &cart.products {
            match find_by_id(products, item.product) {
                Some(product) => lines.push(CartLine { product: product.clone(), quantity: item.quantity }),
                None => missing.push(item.product),
            }
        }
        let total = lines.iter().map(CartLine::subtotal).sum();
        Self { id: cart.id, lines, missing, total }
    }
}
