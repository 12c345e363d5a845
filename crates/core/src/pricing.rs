//! Order price breakdown.
//!
//! The single pricing formula for the whole system: the order engine applies
//! it when an order is persisted, and the client cart applies it for display
//! before submission. Keeping it here is what guarantees the two agree.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::round_to_cents;

/// Orders above this item subtotal ship free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Flat shipping price below the free-shipping threshold.
pub const FLAT_SHIPPING_PRICE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Sales tax rate applied to the item subtotal (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// The derived price breakdown of an order.
///
/// Invariant: `total_price = items_price + shipping_price + tax_price`,
/// each rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// Sum of unit price times quantity over all line items.
    pub items_price: Decimal,
    /// Zero above the free-shipping threshold, flat rate otherwise.
    pub shipping_price: Decimal,
    /// Item subtotal times the tax rate.
    pub tax_price: Decimal,
    /// Grand total.
    pub total_price: Decimal,
}

impl PriceBreakdown {
    /// Compute the breakdown from `(unit price, quantity)` pairs.
    ///
    /// The formula, applied in order:
    /// - items = Σ price × quantity
    /// - shipping = 0 if items > 100, else 10
    /// - tax = round(items × 0.08, 2)
    /// - total = round(items + shipping + tax, 2)
    #[must_use]
    pub fn compute<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (Decimal, u32)>,
    {
        let items_price: Decimal = items
            .into_iter()
            .map(|(price, quantity)| price * Decimal::from(quantity))
            .sum();
        let items_price = round_to_cents(items_price);

        let shipping_price = if items_price > FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            FLAT_SHIPPING_PRICE
        };

        let tax_price = round_to_cents(items_price * TAX_RATE);
        let total_price = round_to_cents(items_price + shipping_price + tax_price);

        Self {
            items_price,
            shipping_price,
            tax_price,
            total_price,
        }
    }
}
