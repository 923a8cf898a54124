//! Shopping cart module.
//!
//! Contains line items, the in-memory cart, totals, and the durable store
//! the rest of the application reads and mutates.

mod cart;
mod line_item;
mod pricing;
mod store;

pub use cart::{Cart, CartEvent};
pub use line_item::{CartLineItem, IdentityPolicy, LineKey, MAX_QUANTITY_PER_ITEM};
pub use pricing::CartTotals;
pub use store::{CartStore, StoreState, SubscriptionId, DEFAULT_CART_SLOT};
