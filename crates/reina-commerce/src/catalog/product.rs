//! Catalog products and the record adapter.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};

/// A product as the storefront sells it.
///
/// Only [`CatalogProduct::from_record`] (or [`CatalogProduct::new`]) builds
/// one, so every field a cart line needs is present and typed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogProduct {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current unit price.
    pub price: Money,
    /// Display image URL; empty when the record has none.
    pub image_url: String,
    /// Collection/category label.
    pub category: Option<String>,
    /// Units in stock. `None` when the record does not track stock.
    pub stock_quantity: Option<u32>,
    /// Sizes offered.
    pub sizes: Vec<String>,
    /// Colors offered.
    pub colors: Vec<String>,
}

/// The variant a shopper picked on the product page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSelection {
    pub size: Option<String>,
    pub color: Option<String>,
}

impl VariantSelection {
    /// No variant chosen.
    pub fn none() -> Self {
        Self::default()
    }

    /// Select a size.
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = non_blank(size.into());
        self
    }

    /// Select a color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = non_blank(color.into());
        self
    }
}

impl CatalogProduct {
    /// Create a product with just the fields a cart needs.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image_url: String::new(),
            category: None,
            stock_quantity: None,
            sizes: Vec::new(),
            colors: Vec::new(),
        }
    }

    /// Set the tracked stock level.
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock_quantity = Some(stock);
        self
    }

    /// Narrow a loosely-typed catalog record into a product.
    ///
    /// Accepts the shapes the hosted catalog returns: `id` as a string or an
    /// integer, `price` as a number or numeric string (in major units),
    /// `image_url` or `image`, and `stock_quantity` or `stock`. `id`,
    /// `name` and `price` are required; everything else defaults.
    pub fn from_record(record: &Value, currency: Currency) -> Result<Self, CommerceError> {
        let obj = record
            .as_object()
            .ok_or_else(|| CommerceError::InvalidProduct("record is not an object".into()))?;

        let id = match obj.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
            _ => return Err(CommerceError::InvalidProduct("missing id".into())),
        };

        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .and_then(|s| non_blank(s.to_string()))
            .ok_or_else(|| CommerceError::InvalidProduct(format!("{}: missing name", id)))?;

        let price = parse_price(obj.get("price"), currency)
            .ok_or_else(|| CommerceError::InvalidProduct(format!("{}: invalid price", id)))?;

        let image_url = first_str(obj, &["image_url", "image"]).unwrap_or_default();
        let category = first_str(obj, &["category"]).and_then(non_blank);
        let stock_quantity = ["stock_quantity", "stock"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(parse_stock));

        Ok(Self {
            id: ProductId::new(id),
            name,
            price,
            image_url,
            category,
            stock_quantity,
            sizes: string_list(obj.get("sizes")),
            colors: string_list(obj.get("colors")),
        })
    }

    /// Whether the product can be added to a cart. Untracked stock counts
    /// as available.
    pub fn in_stock(&self) -> bool {
        self.stock_quantity.map_or(true, |s| s > 0)
    }

    /// Stock left after selling `quantity` units, floored at zero.
    pub fn stock_after_sale(&self, quantity: u32) -> Option<u32> {
        self.stock_quantity.map(|s| s.saturating_sub(quantity))
    }
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn first_str(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

fn parse_price(value: Option<&Value>, currency: Currency) -> Option<Money> {
    let amount = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    Money::from_decimal(amount, currency)
}

fn parse_stock(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    Some(n.clamp(0, i64::from(u32::MAX)) as u32)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => non_blank(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}
