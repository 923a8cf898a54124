//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in storefront operations.
///
/// Cart mutations never produce these; malformed cart input is a no-op.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// A catalog record could not be narrowed into a product.
    #[error("Invalid product record: {0}")]
    InvalidProduct(String),

    /// Checkout customer details are incomplete.
    #[error("Invalid customer details: missing {0}")]
    InvalidCustomer(String),

    /// Checkout was attempted on an empty cart.
    #[error("Cannot place an order for an empty cart")]
    EmptyCart,

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Invalid order status transition.
    #[error("Invalid order status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Unknown order status name.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    /// The order service rejected or failed to record an order.
    #[error("Order service error: {0}")]
    OrderService(String),

    /// Cache error.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<reina_cache::CacheError> for CommerceError {
    fn from(e: reina_cache::CacheError) -> Self {
        CommerceError::CacheError(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
