//! Named durable slots.

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use crate::{Cache, CacheError};

/// A single named entry in a [`Cache`] holding one value of type `T`.
///
/// This is the "local storage key" abstraction: one well-known name, one
/// JSON document, always replaced as a whole.
///
/// # Example
///
/// ```rust,ignore
/// use reina_cache::{Cache, Slot};
///
/// let slot = Slot::<Vec<String>>::new(Cache::open(".reina")?, "reina_cart");
/// slot.save(&vec!["A".to_string()])?;
/// let items = slot.load()?.unwrap_or_default();
/// ```
pub struct Slot<T> {
    cache: Cache,
    name: String,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Slot<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Bind a slot name within a cache.
    pub fn new(cache: Cache, name: impl Into<String>) -> Self {
        Self {
            cache,
            name: name.into(),
            _phantom: PhantomData,
        }
    }

    /// The slot's key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the slot. `Ok(None)` means the slot has never been written.
    pub fn load(&self) -> Result<Option<T>, CacheError> {
        self.cache.get(&self.name)
    }

    /// Replace the slot's contents.
    pub fn save(&self, value: &T) -> Result<(), CacheError> {
        self.cache.set(&self.name, value)?;
        tracing::trace!(slot = %self.name, "slot written");
        Ok(())
    }

    /// Remove the slot entirely.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.cache.delete(&self.name)
    }
}

impl<T> std::fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyValueStore, MemoryStore};

    #[test]
    fn test_slot_load_empty() {
        let slot = Slot::<Vec<u32>>::new(Cache::in_memory(), "numbers");
        assert_eq!(slot.load().unwrap(), None);
    }

    #[test]
    fn test_slot_save_replaces() {
        let slot = Slot::<Vec<u32>>::new(Cache::in_memory(), "numbers");
        slot.save(&vec![1, 2]).unwrap();
        slot.save(&vec![3]).unwrap();
        assert_eq!(slot.load().unwrap(), Some(vec![3]));
    }

    #[test]
    fn test_slot_writes_under_its_name() {
        let store = MemoryStore::new();
        let slot = Slot::<Vec<u32>>::new(Cache::new(store.clone()), "reina_cart");
        slot.save(&Vec::new()).unwrap();

        assert_eq!(store.get("reina_cart").unwrap(), Some(b"[]".to_vec()));

        slot.clear().unwrap();
        assert!(!store.exists("reina_cart").unwrap());
    }
}
