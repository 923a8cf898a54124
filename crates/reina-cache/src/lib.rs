//! Durable key-value slots for the Reina storefront.
//!
//! Provides a small, ergonomic API for keeping JSON documents in a
//! key-value store, either in memory or as files in a directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use reina_cache::{cache_key, Cache};
//!
//! let cache = Cache::open(".reina")?;
//!
//! // Store a value
//! cache.set(&cache_key!("order", order.id), &order)?;
//!
//! // Retrieve a value
//! let order: Option<Order> = cache.get("order:ord_abc")?;
//!
//! // Delete a value
//! cache.delete("order:ord_abc")?;
//! ```

mod error;
mod kv;
mod slot;

pub use error::CacheError;
pub use kv::{Cache, FileStore, KeyValueStore, MemoryStore};
pub use slot::Slot;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KeyValueStore, MemoryStore, Slot};
}
