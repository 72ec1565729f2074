//! Index-addressable mutation-aware sequence

use super::{Tracked, TrackedCell};
use crate::any::Any;

/// Storage of an [`AnyVector`].
pub type VectorItems = Vec<Any>;

/// Ordered list of dynamic values.
///
/// Shares the stamping contract of [`AnyDictionary`](super::AnyDictionary):
/// assign, clear, remove, insert, push, pop, set, truncate and swap stamp
/// the container; reads never do.
pub type AnyVector = Tracked<VectorItems>;

impl TrackedCell<VectorItems> {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.read(Vec::len)
    }

    /// Whether the vector has no elements.
    pub fn is_empty(&self) -> bool {
        self.read(Vec::is_empty)
    }

    /// A copy of the element at `index`.
    pub fn get(&self, index: usize) -> Option<Any> {
        self.read(|items| items.get(index).cloned())
    }

    /// Run `f` on the element at `index` without copying it.
    pub fn with_item<R>(&self, index: usize, f: impl FnOnce(&Any) -> R) -> Option<R> {
        self.read(|items| items.get(index).map(f))
    }

    /// A copy of all elements.
    pub fn to_vec(&self) -> Vec<Any> {
        self.read(Vec::clone)
    }

    /// Append an element.
    pub fn push(&self, value: impl Into<Any>) {
        let value = value.into();
        self.write(|items| items.push(value));
    }

    /// Insert before `index`; an index past the end appends.
    pub fn insert(&self, index: usize, value: impl Into<Any>) {
        let value = value.into();
        self.write(|items| {
            let index = index.min(items.len());
            items.insert(index, value);
        });
    }

    /// Overwrite the element at `index`, returning the old one.
    ///
    /// Returns `None` without stamping if `index` is out of range.
    pub fn set(&self, index: usize, value: impl Into<Any>) -> Option<Any> {
        if index >= self.len() {
            return None;
        }
        let value = value.into();
        self.write(|items| Some(std::mem::replace(&mut items[index], value)))
    }

    /// Remove and return the element at `index`.
    ///
    /// Returns `None` without stamping if `index` is out of range.
    pub fn remove(&self, index: usize) -> Option<Any> {
        if index >= self.len() {
            return None;
        }
        self.write(|items| Some(items.remove(index)))
    }

    /// Remove and return the last element.
    pub fn pop(&self) -> Option<Any> {
        if self.is_empty() {
            return None;
        }
        self.write(Vec::pop)
    }

    /// Shorten the vector to `len` elements.
    pub fn truncate(&self, len: usize) {
        let tail = self.write(|items| items.split_off(len.min(items.len())));
        drop(tail);
    }

    /// Remove every element.
    ///
    /// Elements are dropped after the storage borrow ends.
    pub fn clear(&self) {
        drop(self.take());
    }
}

impl<V: Into<Any>> FromIterator<V> for AnyVector {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Tracked::new(iter.into_iter().map(Into::into).collect())
    }
}
