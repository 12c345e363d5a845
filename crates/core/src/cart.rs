//! Client-local shopping cart.
//!
//! The cart lives on the client (persisted as JSON and rehydrated on load),
//! holds product snapshots unique by product id, and mirrors the server's
//! pricing formula for display. It is not authoritative: the order engine
//! recomputes pricing from the submitted line items at checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::PriceBreakdown;
use crate::types::ProductId;

/// A product snapshot plus quantity held in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// The referenced product.
    pub product_id: ProductId,
    /// Product name at the time it was added.
    pub name: String,
    /// Unit price at the time it was added.
    pub price: Decimal,
    /// Primary product image.
    pub image: Option<String>,
    /// Requested quantity, always at least 1.
    pub quantity: u32,
}

/// An ordered list of cart items, unique by product id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a snapshot to the cart.
    ///
    /// If the product is already present, its quantity is increased by the
    /// new item's quantity and the stored snapshot is left untouched.
    pub fn add(&mut self, item: CartItem) {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.product_id == item.product_id)
        {
            Some(existing) => existing.quantity += item.quantity,
            None => self.items.push(item),
        }
    }

    /// Remove a product from the cart. Unknown ids are ignored.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product_id != product_id);
    }

    /// Set the quantity for a product.
    ///
    /// A quantity below 1 removes the item. Unknown ids are ignored.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity < 1 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            item.quantity = quantity;
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units across all items.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// The price breakdown the server will compute for these items.
    #[must_use]
    pub fn totals(&self) -> PriceBreakdown {
        PriceBreakdown::compute(self.items.iter().map(|item| (item.price, item.quantity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i32, price: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            name: format!("product-{id}"),
            price: price.parse().expect("decimal literal"),
            image: None,
            quantity,
        }
    }

    #[test]
    fn test_add_merges_by_product_id() {
        let mut cart = Cart::new();
        cart.add(item(1, "20", 1));
        cart.add(item(2, "5", 1));
        cart.add(item(1, "20", 2));

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.count(), 4);
    }

    #[test]
    fn test_update_quantity_below_one_removes() {
        let mut cart = Cart::new();
        cart.add(item(1, "20", 2));
        cart.update_quantity(ProductId::new(1), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_sets_absolute_value() {
        let mut cart = Cart::new();
        cart.add(item(1, "20", 2));
        cart.update_quantity(ProductId::new(1), 5);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(item(1, "20", 1));
        cart.remove(ProductId::new(99));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_totals_mirror_order_pricing() {
        let mut cart = Cart::new();
        cart.add(item(1, "20", 2));

        let totals = cart.totals();
        assert_eq!(totals.items_price, "40".parse::<Decimal>().expect("decimal"));
        assert_eq!(
            totals.total_price,
            "53.20".parse::<Decimal>().expect("decimal")
        );
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(item(1, "20", 1));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut cart = Cart::new();
        cart.add(item(1, "19.99", 2));
        let json = serde_json::to_string(&cart).expect("serialize");
        let restored: Cart = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, cart);
    }
}
