//! Native objects with an observable external reference count
//!
//! This is the interface the keepalive bridge needs from the native data
//! model: a named object carrying metadata, an owning [`Retainer`] handle
//! whose clones and drops are counted, and a [`RefCountListener`] that is
//! told about every change of that count.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::tracked::AnyDictionary;

/// Observer of a native object's external reference count.
///
/// Invoked synchronously after every increment and decrement, including
/// the final decrement to zero just before the object is destroyed.
pub trait RefCountListener {
    /// The object's count is now `count`.
    fn ref_count_changed(&self, count: usize);
}

/// A native object shared between the native core and the host.
pub struct SerializableObject {
    schema_name: String,
    metadata: AnyDictionary,
    ref_count: Cell<usize>,
    listener: RefCell<Option<Rc<dyn RefCountListener>>>,
}

impl SerializableObject {
    /// Create an object and return the first retainer (count 1).
    pub fn create(schema_name: impl Into<String>) -> Retainer {
        Self::with_metadata(schema_name, AnyDictionary::default())
    }

    /// Create an object carrying `metadata`.
    pub fn with_metadata(schema_name: impl Into<String>, metadata: AnyDictionary) -> Retainer {
        let object = Rc::new(Self {
            schema_name: schema_name.into(),
            metadata,
            ref_count: Cell::new(1),
            listener: RefCell::new(None),
        });
        Retainer { object }
    }

    /// Schema name, e.g. `"Clip.2"`.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// The object's metadata dictionary.
    pub fn metadata(&self) -> &AnyDictionary {
        &self.metadata
    }

    /// Number of live retainers.
    pub fn current_ref_count(&self) -> usize {
        self.ref_count.get()
    }

    /// Install `listener`, replacing any previous one.
    ///
    /// An object has one listener. A replaced listener is dropped and gets
    /// no further notifications. With `apply_now`, the new listener is
    /// invoked immediately with the current count.
    pub fn install_ref_count_listener(&self, listener: Rc<dyn RefCountListener>, apply_now: bool) {
        let old = self.listener.replace(Some(Rc::clone(&listener)));
        if old.is_some() {
            debug!(schema = %self.schema_name, "replaced ref count listener");
        }
        drop(old);
        if apply_now {
            listener.ref_count_changed(self.ref_count.get());
        }
    }

    /// Remove the installed listener, if any.
    pub fn remove_ref_count_listener(&self) {
        let old = self.listener.borrow_mut().take();
        drop(old);
    }

    /// Whether a listener is installed.
    pub fn has_ref_count_listener(&self) -> bool {
        self.listener.borrow().is_some()
    }

    fn notify(&self) {
        // Release the slot before calling out; the listener may reenter
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener.ref_count_changed(self.ref_count.get());
        }
    }
}

impl fmt::Debug for SerializableObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializableObject")
            .field("schema_name", &self.schema_name)
            .field("ref_count", &self.ref_count.get())
            .finish()
    }
}

/// Owning, counted reference to a [`SerializableObject`].
///
/// The object is destroyed when its last retainer is dropped.
pub struct Retainer {
    object: Rc<SerializableObject>,
}

impl Retainer {
    /// A non-owning handle that does not affect the count.
    pub fn downgrade(&self) -> Weak<SerializableObject> {
        Rc::downgrade(&self.object)
    }

    /// Whether both retainers refer to the same object.
    pub fn ptr_eq(&self, other: &Retainer) -> bool {
        Rc::ptr_eq(&self.object, &other.object)
    }

    /// Stable address of the object, for identity maps.
    pub(crate) fn address(&self) -> usize {
        Rc::as_ptr(&self.object) as usize
    }
}

impl Deref for Retainer {
    type Target = SerializableObject;

    fn deref(&self) -> &Self::Target {
        &self.object
    }
}

impl Clone for Retainer {
    fn clone(&self) -> Self {
        let object = Rc::clone(&self.object);
        object.ref_count.set(object.ref_count.get() + 1);
        object.notify();
        Self { object }
    }
}

impl Drop for Retainer {
    fn drop(&mut self) {
        let count = self.object.ref_count.get().saturating_sub(1);
        self.object.ref_count.set(count);
        self.object.notify();
    }
}

impl PartialEq for Retainer {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Retainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.object, f)
    }
}
