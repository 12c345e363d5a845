//! Two-decimal currency rounding.
//!
//! All monetary amounts are [`rust_decimal::Decimal`] values in the
//! currency's standard unit (dollars, not cents).

use rust_decimal::{Decimal, RoundingStrategy};

/// Round an amount to cents, away from zero on ties.
///
/// Matches the rounding the storefront applied everywhere money is shown or
/// stored (`(x).toFixed(2)` semantics for positive amounts).
#[must_use]
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_half_up() {
        assert_eq!(round_to_cents(Decimal::new(8805, 3)), Decimal::new(881, 2));
        assert_eq!(round_to_cents(Decimal::new(8804, 3)), Decimal::new(880, 2));
    }

    #[test]
    fn test_already_exact() {
        let amount = Decimal::new(11880, 2);
        assert_eq!(round_to_cents(amount), amount);
    }
}
