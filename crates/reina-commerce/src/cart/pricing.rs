//! Cart totals.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Price breakdown shown on the cart and checkout pages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CartTotals {
    /// Units across all rows.
    pub count: u64,
    /// Sum of line totals.
    pub subtotal: Money,
    /// Flat delivery charge.
    pub delivery_fee: Money,
    /// `subtotal + delivery_fee`.
    pub grand_total: Money,
}

impl CartTotals {
    /// Build totals from a subtotal and a fee in the same currency.
    ///
    /// A fee in another currency is treated as zero.
    pub fn new(count: u64, subtotal: Money, delivery_fee: Money) -> Self {
        let delivery_fee = if delivery_fee.currency == subtotal.currency {
            delivery_fee
        } else {
            tracing::warn!(
                subtotal = %subtotal.currency,
                fee = %delivery_fee.currency,
                "delivery fee currency differs from cart; ignoring fee"
            );
            Money::zero(subtotal.currency)
        };
        let grand_total = Money::saturating_sum([subtotal, delivery_fee], subtotal.currency);
        Self {
            count,
            subtotal,
            delivery_fee,
            grand_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_grand_total_adds_fee() {
        let totals = CartTotals::new(
            3,
            Money::new(250000, Currency::LKR),
            Money::new(35000, Currency::LKR),
        );
        assert_eq!(totals.grand_total, Money::new(285000, Currency::LKR));
    }

    #[test]
    fn test_foreign_fee_ignored() {
        let totals = CartTotals::new(
            1,
            Money::new(1000, Currency::LKR),
            Money::new(500, Currency::USD),
        );
        assert!(totals.delivery_fee.is_zero());
        assert_eq!(totals.grand_total.amount_cents, 1000);
    }
}
