//! Storefront domain types and logic for Reina.
//!
//! - **Catalog**: typed products narrowed from loose catalog records
//! - **Cart**: line items, identity policy, totals, and the durable store
//! - **Checkout**: customer details, cash-on-delivery orders, submission
//!
//! # Example
//!
//! ```rust,ignore
//! use reina_commerce::prelude::*;
//! use reina_cache::{Cache, Slot};
//!
//! let product = CatalogProduct::from_record(&record, Currency::LKR)?;
//!
//! let slot = Slot::new(Cache::open(".reina")?, DEFAULT_CART_SLOT);
//! let mut store = CartStore::open(slot, IdentityPolicy::ProductAndSize, Currency::LKR);
//! store.add_item(&product, &VariantSelection::none().with_size("41"));
//!
//! let totals = store.totals(default_delivery_fee());
//! println!("Total: {}", totals.grand_total);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{CatalogProduct, Inventory, StockChange, VariantSelection};

    // Cart
    pub use crate::cart::{
        Cart, CartEvent, CartLineItem, CartStore, CartTotals, IdentityPolicy, LineKey,
        StoreState, SubscriptionId, DEFAULT_CART_SLOT, MAX_QUANTITY_PER_ITEM,
    };

    // Checkout
    pub use crate::checkout::{
        default_delivery_fee, place_order, CustomerDetails, Order, OrderBook, OrderGateway,
        OrderStatus, OrderSummary,
    };
}
