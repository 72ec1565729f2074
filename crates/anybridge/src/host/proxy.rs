//! Host-visible proxies over mutation-aware containers
//!
//! A proxy holds the container's [`MutationStamp`], never the container
//! itself. Every access first resolves the stamp to live storage, so a proxy
//! whose container was destroyed on the native side reports
//! `ContainerInvalidated` instead of touching freed memory.

use std::cell::Cell;
use std::rc::Rc;

use super::{HostRuntime, HostValue};
use crate::error::{BridgeError, Result};
use crate::tracked::{
    AnyDictionary, AnyVector, DictionaryItems, MutationStamp, Tracked, TrackedCell, VectorItems,
    INVALID_REVISION,
};

/// Proxy over an [`AnyDictionary`].
///
/// Identity-stable: the host runtime hands out one proxy per stamp.
#[derive(Debug)]
pub struct AnyDictionaryProxy {
    stamp: Rc<MutationStamp<DictionaryItems>>,
    observed: Cell<i64>,
}

impl AnyDictionaryProxy {
    pub(crate) fn from_stamp(stamp: Rc<MutationStamp<DictionaryItems>>) -> Self {
        let observed = Cell::new(stamp.revision());
        Self { stamp, observed }
    }

    /// Create a proxy owning a fresh, empty dictionary.
    pub fn new(host: &HostRuntime) -> Rc<Self> {
        host.dictionary_proxy(MutationStamp::owning())
    }

    /// Create a proxy owning a dictionary converted from a host mapping.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if `value` does not convert to a dictionary,
    /// or any error of the underlying conversion.
    pub fn from_host_dict(host: &HostRuntime, value: &HostValue) -> Result<Rc<Self>> {
        let converted = host.to_any_dictionary(value)?;
        let proxy = Self::new(host);
        proxy.container()?.swap(&converted);
        proxy.touch();
        Ok(proxy)
    }

    /// The stamp this proxy observes.
    pub fn mutation_stamp(&self) -> &Rc<MutationStamp<DictionaryItems>> {
        &self.stamp
    }

    /// Current revision of the underlying container.
    pub fn revision(&self) -> i64 {
        self.stamp.revision()
    }

    /// Whether the underlying container is still alive.
    pub fn is_valid(&self) -> bool {
        self.stamp.is_valid()
    }

    /// Whether the container changed since this proxy last touched it.
    pub fn is_stale(&self) -> bool {
        self.observed.get() != self.stamp.revision()
    }

    fn container(&self) -> Result<Rc<TrackedCell<DictionaryItems>>> {
        let cell = self.stamp.container()?;
        self.touch();
        Ok(cell)
    }

    // Writes call this again once they finish
    fn touch(&self) {
        self.observed.set(self.stamp.revision());
    }

    /// Number of entries.
    pub fn len(&self) -> Result<usize> {
        Ok(self.container()?.len())
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.container()?.is_empty())
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.container()?.has_key(key))
    }

    /// All keys.
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.container()?.keys())
    }

    /// Convert the value at `key` for the host.
    ///
    /// Nested containers come back as proxies sharing their stamp, so
    /// writes through them are visible in this dictionary.
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if `key` is absent.
    pub fn get_item(&self, host: &HostRuntime, key: &str) -> Result<HostValue> {
        let cell = self.container()?;
        cell.with_value(key, |value| host.to_host(value, false))
            .ok_or_else(|| BridgeError::KeyNotFound {
                key: key.to_string(),
            })?
    }

    /// Like [`get_item`](Self::get_item) but returns `default` when absent.
    pub fn get(&self, host: &HostRuntime, key: &str, default: HostValue) -> Result<HostValue> {
        let cell = self.container()?;
        cell.with_value(key, |value| host.to_host(value, false))
            .unwrap_or(Ok(default))
    }

    /// Convert `value` to native form and store it at `key`.
    pub fn set_item(&self, host: &HostRuntime, key: &str, value: &HostValue) -> Result<()> {
        let converted = host.to_native(value)?;
        self.container()?.insert(key, converted);
        self.touch();
        Ok(())
    }

    /// Remove `key`.
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if `key` is absent; the container is then left
    /// unstamped.
    pub fn del_item(&self, key: &str) -> Result<()> {
        let cell = self.container()?;
        if !cell.has_key(key) {
            return Err(BridgeError::KeyNotFound {
                key: key.to_string(),
            });
        }
        cell.remove(key);
        self.touch();
        Ok(())
    }

    /// Remove every entry.
    pub fn clear(&self) -> Result<()> {
        self.container()?.clear();
        self.touch();
        Ok(())
    }

    /// Key/value pairs converted for the host.
    pub fn items(&self, host: &HostRuntime) -> Result<Vec<(String, HostValue)>> {
        let cell = self.container()?;
        cell.read(|items| {
            items
                .iter()
                .map(|(k, v)| Ok((k.clone(), host.to_host(v, false)?)))
                .collect()
        })
    }

    /// Iterate over keys, failing if the dictionary changes underneath.
    pub fn iter(&self) -> DictionaryIter {
        DictionaryIter {
            stamp: Rc::clone(&self.stamp),
            start: self.stamp.revision(),
            index: 0,
            done: false,
        }
    }

    /// Copy of the backing container, for handing back to native code.
    ///
    /// Entries are copied as native values; nothing is re-converted.
    pub fn to_native(&self) -> Result<AnyDictionary> {
        Ok(self.container()?.read(|items| Tracked::new(items.clone())))
    }
}

/// Key iterator over an [`AnyDictionaryProxy`].
///
/// Yields one error and then ends if the dictionary is mutated or destroyed
/// during iteration.
#[derive(Debug)]
pub struct DictionaryIter {
    stamp: Rc<MutationStamp<DictionaryItems>>,
    start: i64,
    index: usize,
    done: bool,
}

impl Iterator for DictionaryIter {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let key = check_revision(&self.stamp, self.start)
            .and_then(|()| self.stamp.container())
            .map(|cell| cell.key_at(self.index));
        match key {
            Ok(Some(key)) => {
                self.index += 1;
                Some(Ok(key))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Proxy over an [`AnyVector`].
///
/// Identity-stable: the host runtime hands out one proxy per stamp.
/// Indexes may be negative and then count from the end.
#[derive(Debug)]
pub struct AnyVectorProxy {
    stamp: Rc<MutationStamp<VectorItems>>,
    observed: Cell<i64>,
}

impl AnyVectorProxy {
    pub(crate) fn from_stamp(stamp: Rc<MutationStamp<VectorItems>>) -> Self {
        let observed = Cell::new(stamp.revision());
        Self { stamp, observed }
    }

    /// Create a proxy owning a fresh, empty vector.
    pub fn new(host: &HostRuntime) -> Rc<Self> {
        host.vector_proxy(MutationStamp::owning())
    }

    /// Create a proxy owning a vector converted from a host sequence.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if `value` does not convert to a vector.
    pub fn from_host_sequence(host: &HostRuntime, value: &HostValue) -> Result<Rc<Self>> {
        let converted = match host.to_native(value)? {
            crate::Any::Vector(vector) => vector,
            other => {
                return Err(BridgeError::TypeMismatch {
                    expected: "an AnyVector".to_string(),
                    got: crate::error::type_name(&other).to_string(),
                })
            }
        };
        let proxy = Self::new(host);
        proxy.container()?.swap(&converted);
        proxy.touch();
        Ok(proxy)
    }

    /// The stamp this proxy observes.
    pub fn mutation_stamp(&self) -> &Rc<MutationStamp<VectorItems>> {
        &self.stamp
    }

    /// Current revision of the underlying container.
    pub fn revision(&self) -> i64 {
        self.stamp.revision()
    }

    /// Whether the underlying container is still alive.
    pub fn is_valid(&self) -> bool {
        self.stamp.is_valid()
    }

    /// Whether the container changed since this proxy last touched it.
    pub fn is_stale(&self) -> bool {
        self.observed.get() != self.stamp.revision()
    }

    fn container(&self) -> Result<Rc<TrackedCell<VectorItems>>> {
        let cell = self.stamp.container()?;
        self.touch();
        Ok(cell)
    }

    fn touch(&self) {
        self.observed.set(self.stamp.revision());
    }

    /// Number of elements.
    pub fn len(&self) -> Result<usize> {
        Ok(self.container()?.len())
    }

    /// Whether the vector has no elements.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.container()?.is_empty())
    }

    /// Convert the element at `index` for the host.
    pub fn get_item(&self, host: &HostRuntime, index: i64) -> Result<HostValue> {
        let cell = self.container()?;
        let slot = resolve_index(index, cell.len())?;
        cell.with_item(slot, |value| host.to_host(value, false))
            .ok_or(BridgeError::IndexOutOfRange {
                index,
                len: cell.len(),
            })?
    }

    /// Convert `value` and overwrite the element at `index`.
    pub fn set_item(&self, host: &HostRuntime, index: i64, value: &HostValue) -> Result<()> {
        let converted = host.to_native(value)?;
        let cell = self.container()?;
        let slot = resolve_index(index, cell.len())?;
        cell.set(slot, converted);
        self.touch();
        Ok(())
    }

    /// Remove the element at `index`.
    pub fn del_item(&self, index: i64) -> Result<()> {
        let cell = self.container()?;
        let slot = resolve_index(index, cell.len())?;
        cell.remove(slot);
        self.touch();
        Ok(())
    }

    /// Convert `value` and append it.
    pub fn append(&self, host: &HostRuntime, value: &HostValue) -> Result<()> {
        let converted = host.to_native(value)?;
        self.container()?.push(converted);
        self.touch();
        Ok(())
    }

    /// Convert `value` and insert it before `index`, clamping like a list.
    pub fn insert(&self, host: &HostRuntime, index: i64, value: &HostValue) -> Result<()> {
        let converted = host.to_native(value)?;
        let cell = self.container()?;
        let len = cell.len();
        let slot = if index < 0 {
            let back = usize::try_from(index.unsigned_abs()).unwrap_or(usize::MAX);
            len.saturating_sub(back)
        } else {
            usize::try_from(index).unwrap_or(usize::MAX).min(len)
        };
        cell.insert(slot, converted);
        self.touch();
        Ok(())
    }

    /// Remove the element at `index` (default: last) and return it.
    ///
    /// The removed value is returned as a top-level conversion: it no
    /// longer has a parent to share storage with.
    pub fn pop(&self, host: &HostRuntime, index: Option<i64>) -> Result<HostValue> {
        let cell = self.container()?;
        let slot = resolve_index(index.unwrap_or(-1), cell.len())?;
        let removed = cell.remove(slot).ok_or(BridgeError::IndexOutOfRange {
            index: index.unwrap_or(-1),
            len: cell.len(),
        })?;
        self.touch();
        host.to_host(&removed, true)
    }

    /// Remove every element.
    pub fn clear(&self) -> Result<()> {
        self.container()?.clear();
        self.touch();
        Ok(())
    }

    /// Iterate over converted elements, failing if the vector changes
    /// underneath.
    pub fn iter<'h>(&self, host: &'h HostRuntime) -> VectorIter<'h> {
        VectorIter {
            host,
            stamp: Rc::clone(&self.stamp),
            start: self.stamp.revision(),
            index: 0,
            done: false,
        }
    }

    /// Copy of the backing container, for handing back to native code.
    pub fn to_native(&self) -> Result<AnyVector> {
        Ok(self.container()?.read(|items| Tracked::new(items.clone())))
    }
}

/// Element iterator over an [`AnyVectorProxy`].
pub struct VectorIter<'h> {
    host: &'h HostRuntime,
    stamp: Rc<MutationStamp<VectorItems>>,
    start: i64,
    index: usize,
    done: bool,
}

impl<'h> Iterator for VectorIter<'h> {
    type Item = Result<HostValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let host = self.host;
        let index = self.index;
        let item = check_revision(&self.stamp, self.start)
            .and_then(|()| self.stamp.container())
            .and_then(|cell| {
                cell.with_item(index, |value| host.to_host(value, false))
                    .transpose()
            });
        match item {
            Ok(Some(value)) => {
                self.index += 1;
                Some(Ok(value))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

fn check_revision<T>(stamp: &MutationStamp<T>, start: i64) -> Result<()> {
    match stamp.revision() {
        INVALID_REVISION => Err(BridgeError::ContainerInvalidated),
        revision if revision != start => Err(BridgeError::MutatedDuringIteration),
        _ => Ok(()),
    }
}

fn resolve_index(index: i64, len: usize) -> Result<usize> {
    let out_of_range = || BridgeError::IndexOutOfRange { index, len };
    let len_i = i64::try_from(len).map_err(|_| out_of_range())?;
    let resolved = if index < 0 { index + len_i } else { index };
    if resolved < 0 || resolved >= len_i {
        return Err(out_of_range());
    }
    usize::try_from(resolved).map_err(|_| out_of_range())
}
