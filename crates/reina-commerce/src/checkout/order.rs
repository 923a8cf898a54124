//! Order types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLineItem};
use crate::checkout::CustomerDetails;
use crate::error::CommerceError;
use crate::ids::OrderId;
use crate::money::{Currency, Money};

/// Flat delivery charge in minor units of LKR (Rs. 350.00).
pub const DEFAULT_DELIVERY_FEE_CENTS: i64 = 35_000;

/// The storefront's standard delivery fee.
pub fn default_delivery_fee() -> Money {
    Money::new(DEFAULT_DELIVERY_FEE_CENTS, Currency::LKR)
}

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order placed, awaiting processing.
    #[default]
    Pending,
    /// Order being prepared.
    Processing,
    /// Order handed to the courier.
    Shipped,
    /// Order delivered and paid.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether an admin may move an order from `self` to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (*self, next),
            (Pending, Processing | Shipped | Cancelled)
                | (Processing, Shipped | Cancelled)
                | (Shipped, Delivered)
        )
    }

    /// Validate and return the next status.
    pub fn transition_to(&self, next: OrderStatus) -> Result<OrderStatus, CommerceError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CommerceError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CommerceError::UnknownStatus(s.to_string()))
    }
}

/// A cash-on-delivery order built from a cart snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Delivery details.
    pub customer: CustomerDetails,
    /// The cart rows, copied verbatim.
    pub items: Vec<CartLineItem>,
    /// Sum of line totals.
    pub subtotal: Money,
    /// Delivery charge.
    pub delivery_fee: Money,
    /// `subtotal + delivery_fee`.
    pub total_amount: Money,
    /// Order status.
    pub status: OrderStatus,
    /// Always `true`; the storefront only takes cash on delivery.
    pub is_cod: bool,
    /// Courier tracking number, once shipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build a pending order from the current cart.
    pub fn from_cart(
        cart: &Cart,
        customer: CustomerDetails,
        delivery_fee: Money,
    ) -> Result<Self, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        customer.validate()?;

        let totals = cart.totals(delivery_fee);
        Ok(Self {
            id: OrderId::generate(),
            customer,
            items: cart.items().to_vec(),
            subtotal: totals.subtotal,
            delivery_fee: totals.delivery_fee,
            total_amount: totals.grand_total,
            status: OrderStatus::Pending,
            is_cod: true,
            tracking_number: None,
            created_at: Utc::now(),
        })
    }

    /// Total units ordered.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Move the order to `next`, enforcing the allowed transitions.
    pub fn set_status(&mut self, next: OrderStatus) -> Result<(), CommerceError> {
        self.status = self.status.transition_to(next)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::IdentityPolicy;
    use crate::catalog::{CatalogProduct, VariantSelection};

    fn customer() -> CustomerDetails {
        CustomerDetails::new("Nimal", "0771234567", "12 Galle Rd, Colombo").unwrap()
    }

    #[test]
    fn test_from_cart_copies_snapshot_and_totals() {
        let mut cart = Cart::new(IdentityPolicy::ProductAndSize, Currency::LKR);
        let a = CatalogProduct::new("A", "Slide", Money::new(100000, Currency::LKR));
        cart.add_item(&a, &VariantSelection::none().with_size("40"));
        cart.add_item(&a, &VariantSelection::none().with_size("40"));

        let order = Order::from_cart(&cart, customer(), default_delivery_fee()).unwrap();
        assert_eq!(order.items, cart.items());
        assert_eq!(order.subtotal.amount_cents, 200000);
        assert_eq!(order.delivery_fee.amount_cents, 35000);
        assert_eq!(order.total_amount.amount_cents, 235000);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.is_cod);
        assert_eq!(order.item_count(), 2);
    }

    #[test]
    fn test_from_empty_cart_fails() {
        let cart = Cart::new(IdentityPolicy::ProductId, Currency::LKR);
        assert!(matches!(
            Order::from_cart(&cart, customer(), default_delivery_fee()),
            Err(CommerceError::EmptyCart)
        ));
    }

    #[test]
    fn test_status_transitions() {
        use OrderStatus::*;

        assert!(Pending.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
        assert!(Processing.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Shipped.can_transition_to(Cancelled));

        assert!(Delivered.is_terminal() && Cancelled.is_terminal());
        assert!(matches!(
            Delivered.transition_to(Shipped),
            Err(CommerceError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(" Delivered ".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_as_display_name() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            r#""Pending""#
        );
    }
}
