//! Durable cart store with change notification.

use reina_cache::Slot;

use crate::cart::{Cart, CartEvent, CartLineItem, CartTotals, IdentityPolicy, LineKey};
use crate::catalog::{CatalogProduct, VariantSelection};
use crate::ids::ProductId;
use crate::money::{Currency, Money};

/// Default name of the durable slot holding the cart.
pub const DEFAULT_CART_SLOT: &str = "reina_cart";

/// Lifecycle of a [`CartStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Durable storage has not been read yet.
    Uninitialized,
    /// The one read has happened; mutations are written back.
    Ready,
}

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&CartEvent, &Cart)>;

/// The application's single cart.
///
/// Owns the in-memory [`Cart`], mirrors it into a durable [`Slot`] after
/// every effective mutation, and notifies subscribers. The in-memory cart
/// is authoritative: storage failures are logged and otherwise ignored.
///
/// Storage is read exactly once. Any mutation on an uninitialized store
/// hydrates it first, so a later read can never overwrite fresh state.
///
/// # Example
///
/// ```rust,ignore
/// let slot = Slot::new(Cache::open(".reina")?, DEFAULT_CART_SLOT);
/// let mut store = CartStore::open(slot, IdentityPolicy::ProductAndSize, Currency::LKR);
///
/// store.subscribe(|event, cart| println!("{:?}: {} items", event, cart.count()));
/// store.add_item(&product, &VariantSelection::none().with_size("41"));
/// println!("Total: {}", store.total());
/// ```
pub struct CartStore {
    cart: Cart,
    slot: Slot<Vec<CartLineItem>>,
    state: StoreState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl CartStore {
    /// Create an uninitialized store over `slot`.
    pub fn new(slot: Slot<Vec<CartLineItem>>, policy: IdentityPolicy, currency: Currency) -> Self {
        Self {
            cart: Cart::new(policy, currency),
            slot,
            state: StoreState::Uninitialized,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Create a store and hydrate it immediately.
    pub fn open(slot: Slot<Vec<CartLineItem>>, policy: IdentityPolicy, currency: Currency) -> Self {
        let mut store = Self::new(slot, policy, currency);
        store.hydrate();
        store
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Read durable storage into the cart, once.
    ///
    /// Returns `true` if this call performed the read. An absent slot leaves
    /// the cart empty; an unreadable or corrupt one is logged and also
    /// leaves it empty.
    pub fn hydrate(&mut self) -> bool {
        if self.state == StoreState::Ready {
            return false;
        }

        let stored = match self.slot.load() {
            Ok(Some(items)) => items,
            Ok(None) => {
                tracing::debug!(slot = self.slot.name(), "no stored cart");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(slot = self.slot.name(), error = %e, "failed to load stored cart; starting empty");
                Vec::new()
            }
        };

        self.cart = Cart::from_items(stored, self.cart.policy(), self.cart.currency());
        self.state = StoreState::Ready;
        tracing::debug!(
            slot = self.slot.name(),
            items = self.cart.len(),
            "cart hydrated"
        );

        let event = CartEvent::Hydrated {
            items: self.cart.len(),
        };
        self.notify(&event);
        true
    }

    /// Register a listener called after every effective mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&CartEvent, &Cart) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() < before
    }

    /// Add one unit of a product variant.
    pub fn add_item(&mut self, product: &CatalogProduct, variant: &VariantSelection) {
        self.hydrate();
        let event = self.cart.add_item(product, variant);
        self.commit(event);
    }

    /// Delete the row with `key`. Returns `false` if there was none.
    pub fn remove_item(&mut self, key: &LineKey) -> bool {
        self.hydrate();
        let event = self.cart.remove_item(key);
        self.commit(event)
    }

    /// Delete every row of a product. Returns `false` if there were none.
    pub fn remove_product(&mut self, product_id: &ProductId) -> bool {
        self.hydrate();
        let event = self.cart.remove_product(product_id);
        self.commit(event)
    }

    /// Add `delta` to a row's quantity, never going below 1.
    ///
    /// Returns the new quantity, or `None` if there is no such row.
    pub fn update_quantity(&mut self, key: &LineKey, delta: i64) -> Option<u32> {
        self.hydrate();
        let event = self.cart.update_quantity(key, delta);
        self.commit(event);
        self.cart.get(key).map(|i| i.quantity)
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.hydrate();
        let event = self.cart.clear();
        self.commit(Some(event));
    }

    /// Total units in the cart.
    pub fn count(&self) -> u64 {
        self.cart.count()
    }

    /// Total value of the cart, before delivery.
    pub fn total(&self) -> Money {
        self.cart.total()
    }

    /// Totals including a delivery fee.
    pub fn totals(&self, delivery_fee: Money) -> CartTotals {
        self.cart.totals(delivery_fee)
    }

    /// Read access to the cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Key for a product and size under the store's policy.
    pub fn key(&self, product_id: impl Into<ProductId>, size: Option<&str>) -> LineKey {
        self.cart.key(product_id, size)
    }

    /// A copy of the current rows.
    pub fn snapshot(&self) -> Vec<CartLineItem> {
        self.cart.items().to_vec()
    }

    fn commit(&mut self, event: Option<CartEvent>) -> bool {
        let Some(event) = event else {
            return false;
        };
        tracing::debug!(?event, count = self.cart.count(), "cart changed");
        self.persist();
        self.notify(&event);
        true
    }

    fn persist(&self) {
        if let Err(e) = self.slot.save(self.cart.items_vec()) {
            tracing::warn!(slot = self.slot.name(), error = %e, "failed to persist cart");
        }
    }

    fn notify(&mut self, event: &CartEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event, &self.cart);
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("slot", &self.slot.name())
            .field("cart", &self.cart)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reina_cache::{Cache, CacheError, KeyValueStore, MemoryStore};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn product(id: &str, price: i64) -> CatalogProduct {
        CatalogProduct::new(id, id, Money::new(price, Currency::LKR))
    }

    fn slot(store: &MemoryStore) -> Slot<Vec<CartLineItem>> {
        Slot::new(Cache::new(store.clone()), DEFAULT_CART_SLOT)
    }

    fn stored_items(store: &MemoryStore) -> Vec<CartLineItem> {
        let bytes = store.get(DEFAULT_CART_SLOT).unwrap().unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn open(store: &MemoryStore) -> CartStore {
        CartStore::open(slot(store), IdentityPolicy::ProductAndSize, Currency::LKR)
    }

    /// A store whose writes always fail.
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            self.0.get(key)
        }
        fn set(&self, key: &str, _value: &[u8]) -> Result<(), CacheError> {
            Err(CacheError::InvalidKey(key.to_string()))
        }
        fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Ok(())
        }
        fn keys(&self) -> Result<Vec<String>, CacheError> {
            self.0.keys()
        }
    }

    #[test]
    fn test_add_twice_then_large_negative_update() {
        let mem = MemoryStore::new();
        let mut store = open(&mem);
        let a = product("A", 1000);

        store.add_item(&a, &VariantSelection::none());
        store.add_item(&a, &VariantSelection::none());
        let key = store.key("A", None);
        assert_eq!(store.update_quantity(&key, -5), Some(1));

        assert_eq!(store.cart().len(), 1);
        assert_eq!(store.count(), 1);
        assert_eq!(store.total().amount_cents, 1000);
        assert_eq!(stored_items(&mem)[0].quantity, 1);
    }

    #[test]
    fn test_clear_writes_empty_list() {
        let mem = MemoryStore::new();
        let mut store = open(&mem);
        store.add_item(&product("A", 1000), &VariantSelection::none());
        store.add_item(&product("B", 500), &VariantSelection::none());
        store.clear();

        assert_eq!(store.count(), 0);
        assert!(store.total().is_zero());
        assert_eq!(mem.get(DEFAULT_CART_SLOT).unwrap(), Some(b"[]".to_vec()));
    }

    #[test]
    fn test_rehydration_round_trip() {
        let mem = MemoryStore::new();
        let mut store = open(&mem);
        store.add_item(&product("A", 1000), &VariantSelection::none().with_size("40"));
        store.add_item(&product("B", 250), &VariantSelection::none().with_color("Red"));
        store.add_item(&product("A", 1000), &VariantSelection::none().with_size("40"));
        let before = store.snapshot();
        let (count, total) = (store.count(), store.total());
        drop(store);

        let reopened = open(&mem);
        assert_eq!(reopened.snapshot(), before);
        assert_eq!(reopened.count(), count);
        assert_eq!(reopened.total(), total);
    }

    #[test]
    fn test_corrupt_slot_starts_empty() {
        let mem = MemoryStore::new();
        mem.set(DEFAULT_CART_SLOT, b"{\"not\": \"a list\"").unwrap();

        let mut store = open(&mem);
        assert_eq!(store.state(), StoreState::Ready);
        assert!(store.cart().is_empty());

        store.add_item(&product("A", 1000), &VariantSelection::none());
        assert_eq!(stored_items(&mem).len(), 1);
    }

    #[test]
    fn test_hydrate_runs_once() {
        let mem = MemoryStore::new();
        let mut store = CartStore::new(slot(&mem), IdentityPolicy::ProductAndSize, Currency::LKR);
        assert_eq!(store.state(), StoreState::Uninitialized);

        assert!(store.hydrate());
        store.add_item(&product("A", 1000), &VariantSelection::none());

        // Someone else rewrites the slot; a second hydrate must not clobber us.
        mem.set(DEFAULT_CART_SLOT, b"[]").unwrap();
        assert!(!store.hydrate());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_mutation_before_hydrate_reads_storage_first() {
        let mem = MemoryStore::new();
        open(&mem).add_item(&product("A", 1000), &VariantSelection::none());

        let mut store = CartStore::new(slot(&mem), IdentityPolicy::ProductAndSize, Currency::LKR);
        store.add_item(&product("A", 1000), &VariantSelection::none());

        assert_eq!(store.state(), StoreState::Ready);
        assert_eq!(store.count(), 2);
        assert_eq!(stored_items(&mem)[0].quantity, 2);
    }

    #[test]
    fn test_noop_mutation_does_not_write_or_notify() {
        let mem = MemoryStore::new();
        let mut store = open(&mem);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        store.subscribe(move |event, _| sink.borrow_mut().push(event.clone()));

        let missing = store.key("Z", None);
        assert!(!store.remove_item(&missing));
        assert_eq!(store.update_quantity(&missing, 2), None);

        assert!(events.borrow().is_empty());
        assert_eq!(mem.get(DEFAULT_CART_SLOT).unwrap(), None);
    }

    #[test]
    fn test_unchanged_quantity_does_not_write_or_notify() {
        let mem = MemoryStore::new();
        let mut store = open(&mem);
        store.add_item(&product("A", 1000), &VariantSelection::none());
        let key = store.key("A", None);

        let events = Rc::new(RefCell::new(0));
        let sink = events.clone();
        store.subscribe(move |_, _| *sink.borrow_mut() += 1);
        mem.delete(DEFAULT_CART_SLOT).unwrap();

        assert_eq!(store.update_quantity(&key, -5), Some(1));
        assert_eq!(store.update_quantity(&key, 0), Some(1));

        assert_eq!(*events.borrow(), 0);
        assert_eq!(mem.get(DEFAULT_CART_SLOT).unwrap(), None);
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let mem = MemoryStore::new();
        let mut store = CartStore::new(slot(&mem), IdentityPolicy::ProductAndSize, Currency::LKR);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = store.subscribe(move |event, cart| {
            sink.borrow_mut().push((event.clone(), cart.count()));
        });

        let a = product("A", 1000);
        store.add_item(&a, &VariantSelection::none());
        let key = store.key("A", None);
        store.update_quantity(&key, 2);
        store.remove_item(&key);

        assert_eq!(
            *seen.borrow(),
            vec![
                (CartEvent::Hydrated { items: 0 }, 0),
                (
                    CartEvent::ItemAdded {
                        key: key.clone(),
                        quantity: 1
                    },
                    1
                ),
                (
                    CartEvent::QuantityChanged {
                        key: key.clone(),
                        quantity: 3
                    },
                    3
                ),
                (CartEvent::ItemRemoved { key }, 0),
            ]
        );

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.clear();
        assert_eq!(seen.borrow().len(), 4);
    }

    #[test]
    fn test_write_failure_keeps_memory_authoritative() {
        let mem = MemoryStore::new();
        let slot = Slot::new(Cache::new(ReadOnlyStore(mem.clone())), DEFAULT_CART_SLOT);
        let mut store = CartStore::open(slot, IdentityPolicy::ProductAndSize, Currency::LKR);

        store.add_item(&product("A", 1000), &VariantSelection::none());
        store.add_item(&product("A", 1000), &VariantSelection::none());

        assert_eq!(store.count(), 2);
        assert_eq!(mem.get(DEFAULT_CART_SLOT).unwrap(), None);
    }

    #[test]
    fn test_remove_product_under_size_policy() {
        let mem = MemoryStore::new();
        let mut store = open(&mem);
        let a = product("A", 1000);
        store.add_item(&a, &VariantSelection::none().with_size("40"));
        store.add_item(&a, &VariantSelection::none().with_size("41"));

        assert!(store.remove_product(&ProductId::new("A")));
        assert!(store.cart().is_empty());
        assert!(stored_items(&mem).is_empty());
    }
}
