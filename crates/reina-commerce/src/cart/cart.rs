//! The in-memory cart.

use serde::Serialize;

use crate::cart::line_item::clamp_quantity;
use crate::cart::{CartLineItem, CartTotals, IdentityPolicy, LineKey};
use crate::catalog::{CatalogProduct, VariantSelection};
use crate::ids::ProductId;
use crate::money::{Currency, Money};

/// What an effective cart mutation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CartEvent {
    /// Contents were loaded from durable storage.
    Hydrated { items: usize },
    /// A row was appended or its quantity incremented.
    ItemAdded { key: LineKey, quantity: u32 },
    /// A row was deleted.
    ItemRemoved { key: LineKey },
    /// Every row of a product was deleted.
    ProductRemoved { product_id: ProductId, rows: usize },
    /// A row's quantity was changed.
    QuantityChanged { key: LineKey, quantity: u32 },
    /// The cart was emptied.
    Cleared,
}

/// An ordered list of line items, unique by identity key.
///
/// Mutators return the resulting [`CartEvent`], or `None` when the input
/// did not match anything and the cart is unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    items: Vec<CartLineItem>,
    policy: IdentityPolicy,
    currency: Currency,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(policy: IdentityPolicy, currency: Currency) -> Self {
        Self {
            items: Vec::new(),
            policy,
            currency,
        }
    }

    /// Build a cart from previously stored rows, restoring the invariants
    /// the stored data may have lost: quantities are clamped, rows whose
    /// keys collide are merged into the first, and rows priced in another
    /// currency are dropped.
    pub fn from_items(
        items: impl IntoIterator<Item = CartLineItem>,
        policy: IdentityPolicy,
        currency: Currency,
    ) -> Self {
        let mut cart = Self::new(policy, currency);
        for mut item in items {
            if item.unit_price.currency != currency {
                tracing::warn!(
                    product_id = %item.id,
                    currency = %item.unit_price.currency,
                    "dropping stored cart row priced in another currency"
                );
                continue;
            }
            let key = item.key(policy);
            match cart.position(&key) {
                Some(idx) => {
                    let existing = &mut cart.items[idx];
                    existing.quantity = clamp_quantity(
                        i64::from(existing.quantity) + i64::from(item.quantity),
                    );
                }
                None => {
                    item.quantity = clamp_quantity(i64::from(item.quantity));
                    cart.items.push(item);
                }
            }
        }
        cart
    }

    /// The rows, in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub(crate) fn items_vec(&self) -> &Vec<CartLineItem> {
        &self.items
    }

    /// The identity policy in force.
    pub fn policy(&self) -> IdentityPolicy {
        self.policy
    }

    /// The currency every row is priced in.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct rows.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Key for a product and size under this cart's policy.
    pub fn key(&self, product_id: impl Into<ProductId>, size: Option<&str>) -> LineKey {
        self.policy.key(product_id.into(), size)
    }

    /// Get a row by key.
    pub fn get(&self, key: &LineKey) -> Option<&CartLineItem> {
        self.position(key).map(|idx| &self.items[idx])
    }

    fn position(&self, key: &LineKey) -> Option<usize> {
        self.items.iter().position(|i| i.matches(key, self.policy))
    }

    /// Add one unit of a product variant.
    ///
    /// An existing row with the same key gains one unit; otherwise a new row
    /// with quantity 1 is appended. A product priced in another currency, or
    /// a row already at [`MAX_QUANTITY_PER_ITEM`](crate::cart::MAX_QUANTITY_PER_ITEM), is left alone.
    pub fn add_item(
        &mut self,
        product: &CatalogProduct,
        variant: &VariantSelection,
    ) -> Option<CartEvent> {
        if product.price.currency != self.currency {
            tracing::warn!(
                product_id = %product.id,
                expected = %self.currency,
                got = %product.price.currency,
                "ignoring add of product priced in another currency"
            );
            return None;
        }

        let key = self.policy.key(product.id.clone(), variant.size.as_deref());
        let quantity = match self.position(&key) {
            Some(idx) => {
                let existing = &mut self.items[idx];
                let before = existing.quantity;
                existing.adjust_quantity(1);
                if existing.quantity == before {
                    return None;
                }
                existing.quantity
            }
            None => {
                self.items
                    .push(CartLineItem::from_product(product, variant));
                1
            }
        };
        Some(CartEvent::ItemAdded { key, quantity })
    }

    /// Delete the row with `key`.
    pub fn remove_item(&mut self, key: &LineKey) -> Option<CartEvent> {
        let idx = self.position(key)?;
        self.items.remove(idx);
        Some(CartEvent::ItemRemoved { key: key.clone() })
    }

    /// Delete every row of a product, whatever its size.
    pub fn remove_product(&mut self, product_id: &ProductId) -> Option<CartEvent> {
        let before = self.items.len();
        self.items.retain(|i| &i.id != product_id);
        let rows = before - self.items.len();
        if rows == 0 {
            return None;
        }
        Some(CartEvent::ProductRemoved {
            product_id: product_id.clone(),
            rows,
        })
    }

    /// Add `delta` to a row's quantity, clamping to at least 1.
    ///
    /// A row is never removed this way, however negative `delta` is.
    /// Returns `None` when the row is missing or its quantity is unchanged.
    pub fn update_quantity(&mut self, key: &LineKey, delta: i64) -> Option<CartEvent> {
        let idx = self.position(key)?;
        let item = &mut self.items[idx];
        let before = item.quantity;
        item.adjust_quantity(delta);
        if item.quantity == before {
            return None;
        }
        Some(CartEvent::QuantityChanged {
            key: key.clone(),
            quantity: item.quantity,
        })
    }

    /// Remove every row.
    pub fn clear(&mut self) -> CartEvent {
        self.items.clear();
        CartEvent::Cleared
    }

    /// Total units across all rows.
    pub fn count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of `unit_price * quantity` across all rows.
    pub fn total(&self) -> Money {
        Money::saturating_sum(self.items.iter().map(CartLineItem::line_total), self.currency)
    }

    /// Totals with a delivery fee added on top.
    pub fn totals(&self, delivery_fee: Money) -> CartTotals {
        CartTotals::new(self.count(), self.total(), delivery_fee)
    }
}
