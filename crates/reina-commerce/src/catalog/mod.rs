//! Product catalog module.
//!
//! Narrows hosted catalog records into typed products the cart accepts,
//! and keeps the stock levels sales draw down.

mod inventory;
mod product;

pub use inventory::{Inventory, StockChange};
pub use product::{CatalogProduct, VariantSelection};
