//! The host runtime side of the bridge
//!
//! [`HostRuntime`] is the per-interpreter state the conversion layer needs:
//! the injected dispatch table, configuration, the serialization lock and
//! the identity caches that make a native container or object map to one
//! host object for as long as that host object lives.

mod lock;
mod object;
mod proxy;
mod value;

pub use lock::{HostGuard, HostLock};
pub use object::ObjectHandle;
pub use proxy::{AnyDictionaryProxy, AnyVectorProxy, DictionaryIter, VectorIter};
pub use value::HostValue;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use tracing::trace;

use crate::any::Any;
use crate::context::BridgeConfig;
use crate::convert::{self, ConversionRegistry};
use crate::error::Result;
use crate::keepalive;
use crate::native::Retainer;
use crate::tracked::{AnyDictionary, DictionaryItems, MutationStamp, VectorItems};

/// State of one host runtime instance.
///
/// Not `Send`: everything here belongs to the thread running the host.
/// Only the registry is shared.
pub struct HostRuntime {
    registry: Arc<ConversionRegistry>,
    config: BridgeConfig,
    lock: Rc<HostLock>,
    dictionaries: RefCell<IdentityCache<AnyDictionaryProxy>>,
    vectors: RefCell<IdentityCache<AnyVectorProxy>>,
    objects: RefCell<IdentityCache<ObjectHandle>>,
}

impl HostRuntime {
    /// Create a runtime using the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(ConversionRegistry::global())
    }

    /// Create a runtime with an injected registry.
    pub fn with_registry(registry: Arc<ConversionRegistry>) -> Self {
        Self {
            registry,
            config: BridgeConfig::default(),
            lock: Rc::new(HostLock::new()),
            dictionaries: RefCell::new(IdentityCache::new()),
            vectors: RefCell::new(IdentityCache::new()),
            objects: RefCell::new(IdentityCache::new()),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// The dispatch table in use.
    pub fn registry(&self) -> &Arc<ConversionRegistry> {
        &self.registry
    }

    /// Current configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The serialization lock.
    pub fn lock(&self) -> &Rc<HostLock> {
        &self.lock
    }

    /// Acquire the serialization lock.
    pub fn acquire(&self) -> HostGuard<'_> {
        self.lock.acquire()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Conversion entry points
    // ═══════════════════════════════════════════════════════════════════

    /// Convert a native value for the host.
    ///
    /// With `is_top_level`, composite storage is moved into a new owning
    /// proxy; otherwise the proxy observes the container in place.
    pub fn to_host(&self, value: &Any, is_top_level: bool) -> Result<HostValue> {
        self.registry.to_host(self, value, is_top_level)
    }

    /// Convert a host value into native form.
    pub fn to_native(&self, value: &HostValue) -> Result<Any> {
        convert::to_native(self, value)
    }

    /// Convert a host value that must become a dictionary.
    pub fn to_any_dictionary(&self, value: &HostValue) -> Result<AnyDictionary> {
        convert::to_any_dictionary(self, value)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Identity caches
    // ═══════════════════════════════════════════════════════════════════

    /// The live proxy for `stamp`, or a new one.
    pub(crate) fn dictionary_proxy(
        &self,
        stamp: Rc<MutationStamp<DictionaryItems>>,
    ) -> Rc<AnyDictionaryProxy> {
        let key = Rc::as_ptr(&stamp) as usize;
        get_or_insert(&self.dictionaries, key, || {
            AnyDictionaryProxy::from_stamp(stamp)
        })
    }

    /// The live proxy for `stamp`, or a new one.
    pub(crate) fn vector_proxy(&self, stamp: Rc<MutationStamp<VectorItems>>) -> Rc<AnyVectorProxy> {
        let key = Rc::as_ptr(&stamp) as usize;
        get_or_insert(&self.vectors, key, || AnyVectorProxy::from_stamp(stamp))
    }

    /// The host handle for a native object.
    ///
    /// A new handle gets a keepalive monitor, applied immediately, so the
    /// handle survives for as long as native code also holds the object.
    ///
    /// An object carries one monitor. Wrapping it from a second runtime moves
    /// the keepalive to that runtime's handle.
    pub fn wrap_object(&self, retainer: &Retainer) -> Rc<ObjectHandle> {
        let key = retainer.address();
        if let Some(handle) = self.objects.borrow().get(key) {
            return handle;
        }

        let handle = Rc::new(ObjectHandle::new(retainer.clone()));
        self.objects.borrow_mut().insert(key, &handle);
        trace!(schema = retainer.schema_name(), "wrapped native object");

        // The cache borrow must be released before the listener first fires
        keepalive::install_external_keepalive_monitor(self, &handle, true);
        handle
    }

    /// Number of live cached host objects (proxies and handles).
    pub fn live_host_objects(&self) -> usize {
        self.dictionaries.borrow().live()
            + self.vectors.borrow().live()
            + self.objects.borrow().live()
    }
}

impl Default for HostRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Entries never swept below this size.
const MIN_SWEEP: usize = 64;

/// Address-keyed map of weak host objects.
///
/// Dead entries stay until the map doubles past its size after the last
/// sweep, so inserts are amortized O(1).
struct IdentityCache<T> {
    entries: HashMap<usize, Weak<T>>,
    sweep_at: usize,
}

impl<T> IdentityCache<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            sweep_at: MIN_SWEEP,
        }
    }

    fn get(&self, key: usize) -> Option<Rc<T>> {
        self.entries.get(&key).and_then(Weak::upgrade)
    }

    /// Record `value` under `key`, replacing a dead entry there.
    fn insert(&mut self, key: usize, value: &Rc<T>) {
        if self.entries.len() >= self.sweep_at {
            self.entries.retain(|_, weak| weak.strong_count() > 0);
            self.sweep_at = (self.entries.len() * 2).max(MIN_SWEEP);
            trace!(live = self.entries.len(), "swept identity cache");
        }
        self.entries.insert(key, Rc::downgrade(value));
    }

    fn live(&self) -> usize {
        self.entries.values().filter(|w| w.strong_count() > 0).count()
    }
}

fn get_or_insert<T>(
    cache: &RefCell<IdentityCache<T>>,
    key: usize,
    make: impl FnOnce() -> T,
) -> Rc<T> {
    let mut cache = cache.borrow_mut();
    if let Some(existing) = cache.get(key) {
        return existing;
    }
    let created = Rc::new(make());
    cache.insert(key, &created);
    created
}
