//! Key-value stores and the typed JSON cache built on top of them.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{de::DeserializeOwned, Serialize};

use crate::CacheError;

/// Raw byte-level key-value storage.
///
/// Implementations hold whole values under string keys. Writes replace the
/// previous value entirely.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Check whether `key` holds a value.
    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }

    /// List all keys, sorted.
    fn keys(&self) -> Result<Vec<String>, CacheError>;
}

/// In-process store.
///
/// Clones share the same entries, so a test can keep a handle and inspect
/// what a component wrote through its own clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let entries = self.entries.read().map_err(|_| CacheError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let entries = self.entries.read().map_err(|_| CacheError::Poisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
///
/// Keys may contain ASCII alphanumerics, `-`, `_`, `.` and `:`; a `:` is
/// written as `+` on disk so namespaced keys stay portable. Writes go to a
/// temporary file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

const FILE_EXTENSION: &str = "json";
const NAMESPACE_SEPARATOR: &str = "+";

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| CacheError::OpenError {
            path: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Root directory of this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether `key` can be stored: non-empty, no leading `.`, and only
    /// ASCII alphanumerics, `-`, `_`, `.` and `:`.
    pub fn is_valid_key(key: &str) -> bool {
        !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CacheError> {
        if !Self::is_valid_key(key) {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        let file_name = format!("{}.{}", key.replace(':', NAMESPACE_SEPARATOR), FILE_EXTENSION);
        Ok(self.dir.join(file_name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("tmp");
        let io_err = |source: std::io::Error| CacheError::Io {
            key: key.to_string(),
            source,
        };
        fs::write(&tmp, value).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.path_for(key)?.is_file())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let read_dir = fs::read_dir(&self.dir).map_err(|source| CacheError::Io {
            key: "*".to_string(),
            source,
        })?;

        let mut keys = Vec::new();
        for entry in read_dir.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.replace(NAMESPACE_SEPARATOR, ":"));
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Type-safe cache over any [`KeyValueStore`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`.
pub struct Cache {
    store: Box<dyn KeyValueStore>,
}

impl Cache {
    /// Wrap an existing store.
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// A cache over a fresh, private in-memory store.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Open a directory-backed cache.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open(".reina")?;
    /// ```
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        Ok(Self::new(FileStore::open(dir)?))
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist, and an error if the stored
    /// bytes do not decode as `T`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let order: Option<Order> = cache.get("order:ord_abc")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store.exists(key)
    }

    /// Get all keys in the cache.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.store.keys()
    }

    /// Get all keys under a namespace prefix such as `"order"`.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let namespace = format!("{}:", prefix);
        Ok(self
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(&namespace))
            .collect())
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = cache_key!("order", order_id);
/// // Returns "order:ord_abc"
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        quantity: u32,
    }

    #[test]
    fn test_memory_store_shares_entries_between_clones() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.set("k", b"v").unwrap();
        assert_eq!(handle.get("k").unwrap(), Some(b"v".to_vec()));

        handle.delete("k").unwrap();
        assert!(!store.exists("k").unwrap());
    }

    #[test]
    fn test_cache_get_missing_is_none() {
        let cache = Cache::in_memory();
        let value: Option<Item> = cache.get("nothing").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_cache_set_get() {
        let cache = Cache::in_memory();
        let item = Item {
            id: "A".into(),
            quantity: 2,
        };
        cache.set("item", &item).unwrap();
        assert_eq!(cache.get::<Item>("item").unwrap(), Some(item));
    }

    #[test]
    fn test_cache_get_corrupt_is_error() {
        let store = MemoryStore::new();
        store.set("item", b"{not json").unwrap();
        let cache = Cache::new(store);
        assert!(matches!(
            cache.get::<Item>("item"),
            Err(CacheError::SerializeError(_))
        ));
    }

    #[test]
    fn test_keys_with_prefix() {
        let cache = Cache::in_memory();
        cache.set("order:1", &1).unwrap();
        cache.set("order:2", &2).unwrap();
        cache.set("reina_cart", &0).unwrap();

        assert_eq!(
            cache.keys_with_prefix("order").unwrap(),
            vec!["order:1".to_string(), "order:2".to_string()]
        );
    }

    #[test]
    fn test_cache_key_macro() {
        let key = cache_key!("order", "ord_1");
        assert_eq!(key, "order:ord_1");

        let key = cache_key!("cart", "user", 7);
        assert_eq!(key, "cart:user:7");
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get("reina_cart").unwrap(), None);
        store.set("reina_cart", b"[]").unwrap();
        assert_eq!(store.get("reina_cart").unwrap(), Some(b"[]".to_vec()));
        assert!(store.exists("reina_cart").unwrap());

        store.delete("reina_cart").unwrap();
        store.delete("reina_cart").unwrap();
        assert!(!store.exists("reina_cart").unwrap());
    }

    #[test]
    fn test_file_store_namespaced_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("order:abc", b"1").unwrap();
        store.set("order:ord__x-y", b"2").unwrap();
        store.set("reina_cart", b"3").unwrap();

        assert!(dir.path().join("order+abc.json").is_file());
        assert_eq!(
            store.keys().unwrap(),
            vec![
                "order:abc".to_string(),
                "order:ord__x-y".to_string(),
                "reina_cart".to_string()
            ]
        );
    }

    #[test]
    fn test_file_store_rejects_bad_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        for key in ["", "../escape", "a/b", ".hidden", "a+b", "a b"] {
            assert!(!FileStore::is_valid_key(key));
            assert!(
                matches!(store.set(key, b"x"), Err(CacheError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_file_store_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        Cache::open(dir.path())
            .unwrap()
            .set("reina_cart", &vec![1, 2, 3])
            .unwrap();

        let reopened = Cache::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get::<Vec<i32>>("reina_cart").unwrap(),
            Some(vec![1, 2, 3])
        );
    }
}
