//! Cart line items and their identity keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogProduct, VariantSelection};
use crate::ids::ProductId;
use crate::money::Money;

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: u32 = 9999;

/// How two add operations are decided to refer to the same cart row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPolicy {
    /// One row per product, whatever size was picked.
    ProductId,
    /// One row per product and size.
    #[default]
    ProductAndSize,
}

impl IdentityPolicy {
    /// Build the key for a product and optional size under this policy.
    pub fn key(&self, product_id: ProductId, size: Option<&str>) -> LineKey {
        let size = match self {
            IdentityPolicy::ProductId => None,
            IdentityPolicy::ProductAndSize => size.map(str::to_string),
        };
        LineKey { product_id, size }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityPolicy::ProductId => "product_id",
            IdentityPolicy::ProductAndSize => "product_and_size",
        }
    }
}

/// Identity of a cart row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    pub size: Option<String>,
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.size {
            Some(size) => write!(f, "{} (size {})", self.product_id, size),
            None => write!(f, "{}", self.product_id),
        }
    }
}

/// One row in the cart.
///
/// Name, price and image are snapshots taken when the product was first
/// added; later catalog edits do not reach them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLineItem {
    /// Catalog product ID.
    pub id: ProductId,
    /// Product name at add-time.
    pub name: String,
    /// Unit price at add-time.
    pub unit_price: Money,
    /// Image reference at add-time.
    #[serde(default, alias = "image_url", alias = "image")]
    pub image_ref: String,
    /// Units of this row, always in `1..=MAX_QUANTITY_PER_ITEM`.
    pub quantity: u32,
    /// Selected size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Selected color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CartLineItem {
    /// Snapshot a product and variant into a new row with quantity 1.
    pub fn from_product(product: &CatalogProduct, variant: &VariantSelection) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            image_ref: product.image_url.clone(),
            quantity: 1,
            size: variant.size.clone(),
            color: variant.color.clone(),
        }
    }

    /// This row's key under `policy`.
    pub fn key(&self, policy: IdentityPolicy) -> LineKey {
        policy.key(self.id.clone(), self.size.as_deref())
    }

    /// Whether this row answers to `key` under `policy`.
    pub fn matches(&self, key: &LineKey, policy: IdentityPolicy) -> bool {
        self.id == key.product_id
            && match policy {
                IdentityPolicy::ProductId => true,
                IdentityPolicy::ProductAndSize => self.size == key.size,
            }
    }

    /// `unit_price * quantity`.
    pub fn line_total(&self) -> Money {
        self.unit_price.saturating_mul(self.quantity)
    }

    /// Apply a signed delta, keeping the quantity within bounds.
    pub(crate) fn adjust_quantity(&mut self, delta: i64) {
        self.quantity = clamp_quantity(i64::from(self.quantity).saturating_add(delta));
    }
}

/// Clamp any integer into the valid quantity range.
pub(crate) fn clamp_quantity(quantity: i64) -> u32 {
    quantity.clamp(1, i64::from(MAX_QUANTITY_PER_ITEM)) as u32
}
