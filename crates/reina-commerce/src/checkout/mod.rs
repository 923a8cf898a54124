//! Checkout module.
//!
//! Contains customer details, cash-on-delivery orders, and order submission.

mod customer;
mod gateway;
mod order;

pub use customer::CustomerDetails;
pub use gateway::{place_order, OrderBook, OrderGateway, OrderSummary};
pub use order::{default_delivery_fee, Order, OrderStatus, DEFAULT_DELIVERY_FEE_CENTS};
