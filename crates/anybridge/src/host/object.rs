//! Host wrapper around a native object

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::{AnyDictionaryProxy, HostRuntime, HostValue};
use crate::keepalive::KeepaliveBridge;
use crate::native::Retainer;

/// A native object as seen from the host.
///
/// Holds one retainer of its own, which is the "bookkeeping" reference the
/// keepalive bridge discounts.
pub struct ObjectHandle {
    retainer: Retainer,
    attributes: RefCell<IndexMap<String, HostValue>>,
    keepalive: RefCell<Weak<KeepaliveBridge>>,
}

impl ObjectHandle {
    pub(crate) fn new(retainer: Retainer) -> Self {
        Self {
            retainer,
            attributes: RefCell::new(IndexMap::new()),
            keepalive: RefCell::new(Weak::new()),
        }
    }

    /// The handle's own retainer.
    pub fn retainer(&self) -> &Retainer {
        &self.retainer
    }

    /// Schema name of the native object.
    pub fn schema_name(&self) -> &str {
        self.retainer.schema_name()
    }

    /// The object's metadata as a proxy that shares its storage.
    pub fn metadata(&self, host: &HostRuntime) -> Rc<AnyDictionaryProxy> {
        let stamp = self.retainer.metadata().get_or_create_mutation_stamp();
        host.dictionary_proxy(stamp)
    }

    /// Set a host-side attribute.
    pub fn set_attr(&self, name: &str, value: HostValue) {
        self.attributes.borrow_mut().insert(name.to_string(), value);
    }

    /// Read a host-side attribute.
    pub fn get_attr(&self, name: &str) -> Option<HostValue> {
        self.attributes.borrow().get(name).cloned()
    }

    /// The keepalive bridge monitoring this object, while installed.
    pub fn keepalive(&self) -> Option<Rc<KeepaliveBridge>> {
        self.keepalive.borrow().upgrade()
    }

    pub(crate) fn set_keepalive(&self, bridge: &Rc<KeepaliveBridge>) {
        *self.keepalive.borrow_mut() = Rc::downgrade(bridge);
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("object", &self.retainer)
            .field("attributes", &self.attributes.borrow().len())
            .finish()
    }
}
