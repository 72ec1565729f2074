//! String-keyed mutation-aware dictionary

use indexmap::IndexMap;

use super::{Tracked, TrackedCell};
use crate::any::{Any, FromAny};

/// Storage of an [`AnyDictionary`].
pub type DictionaryItems = IndexMap<String, Any>;

/// Mapping from unique string keys to dynamic values.
///
/// Insertion order is preserved but carries no meaning. Every invalidating
/// operation (assign, clear, remove, insert, swap) stamps the container.
pub type AnyDictionary = Tracked<DictionaryItems>;

impl TrackedCell<DictionaryItems> {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.read(IndexMap::len)
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.read(IndexMap::is_empty)
    }

    /// Whether `key` is present.
    pub fn has_key(&self, key: &str) -> bool {
        self.read(|items| items.contains_key(key))
    }

    /// A copy of the value at `key`.
    pub fn get(&self, key: &str) -> Option<Any> {
        self.read(|items| items.get(key).cloned())
    }

    /// Run `f` on the value at `key` without copying it.
    pub fn with_value<R>(&self, key: &str, f: impl FnOnce(&Any) -> R) -> Option<R> {
        self.read(|items| items.get(key).map(f))
    }

    /// The value at `key` as `T`, only if it is stored with exactly that type.
    pub fn get_if_set<T: FromAny>(&self, key: &str) -> Option<T> {
        self.read(|items| items.get(key).and_then(T::from_any))
    }

    /// The typed value at `key` if set; otherwise store `default` and return it.
    ///
    /// An existing entry of a different type is left in place.
    pub fn set_default<T>(&self, key: &str, default: T) -> T
    where
        T: FromAny + Into<Any> + Clone,
    {
        if let Some(existing) = self.get_if_set::<T>(key) {
            return existing;
        }
        if !self.has_key(key) {
            self.insert(key, default.clone());
        }
        default
    }

    /// All keys, in storage order.
    pub fn keys(&self) -> Vec<String> {
        self.read(|items| items.keys().cloned().collect())
    }

    /// The key at position `index`, if any.
    pub fn key_at(&self, index: usize) -> Option<String> {
        self.read(|items| items.get_index(index).map(|(k, _)| k.clone()))
    }

    /// Insert or overwrite `key`, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Any>) -> Option<Any> {
        let key = key.into();
        let value = value.into();
        self.write(|items| items.insert(key, value))
    }

    /// Remove `key`, returning its value.
    pub fn remove(&self, key: &str) -> Option<Any> {
        self.write(|items| items.shift_remove(key))
    }

    /// Remove every entry.
    ///
    /// Entries are dropped after the storage borrow ends, so their
    /// destructors may read this dictionary.
    pub fn clear(&self) {
        drop(self.take());
    }
}

impl<K: Into<String>, V: Into<Any>> FromIterator<(K, V)> for AnyDictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Tracked::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
