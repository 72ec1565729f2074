//! Mutation-aware containers
//!
//! A [`Tracked`] container behaves like the collection it wraps, except that
//! every operation which would invalidate outstanding references bumps the
//! revision of an attached [`MutationStamp`]. The stamp lives outside the
//! container's storage, so an external holder can tell in O(1) whether the
//! container was mutated or destroyed since it last looked.
//!
//! Ownership is one-directional: the container holds only a weak slot for its
//! stamp, and an observing stamp holds only a weak back reference to the
//! container. The one exception is an owning stamp, which holds the container
//! outright.

mod dictionary;
mod stamp;
mod vector;

pub use dictionary::{AnyDictionary, DictionaryItems};
pub use stamp::{MutationStamp, INVALID_REVISION};
pub use vector::{AnyVector, VectorItems};

use std::cell::{Ref, RefCell};
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

/// Shared storage of a tracked container.
///
/// Reachable both from the owning [`Tracked`] handle and, through a stamp,
/// from external proxies. All access goes through interior mutability so
/// either side can operate on it with a shared reference.
pub struct TrackedCell<T> {
    items: RefCell<T>,
    stamp: RefCell<Weak<MutationStamp<T>>>,
}

impl<T> TrackedCell<T> {
    fn new(items: T) -> Self {
        Self {
            items: RefCell::new(items),
            stamp: RefCell::new(Weak::new()),
        }
    }

    /// Record that outstanding references are about to be invalidated.
    pub(crate) fn mutate(&self) {
        let stamp = self.stamp.borrow().upgrade();
        if let Some(stamp) = stamp {
            stamp.bump();
        }
    }

    /// The stamp currently attached to this container, if any.
    pub fn mutation_stamp(&self) -> Option<Rc<MutationStamp<T>>> {
        self.stamp.borrow().upgrade()
    }

    /// Run `f` with read-only access to the items. Never touches the stamp.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.items.borrow())
    }

    /// Borrow the items for reading.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.items.borrow()
    }

    /// Run `f` with mutable access to the items, stamping first.
    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.mutate();
        f(&mut self.items.borrow_mut())
    }

    /// Replace the items wholesale, returning the previous ones.
    pub fn replace(&self, items: T) -> T {
        self.mutate();
        self.items.replace(items)
    }

    /// Assign a copy of `other`'s items to this container.
    pub fn assign(&self, other: &TrackedCell<T>)
    where
        T: Clone,
    {
        if std::ptr::eq(self, other) {
            return;
        }
        let items = other.items.borrow().clone();
        self.replace(items);
    }

    /// Exchange items with `other`. Both containers are stamped.
    pub fn swap(&self, other: &TrackedCell<T>) {
        if std::ptr::eq(self, other) {
            return;
        }
        self.mutate();
        other.mutate();
        self.items.swap(&other.items);
    }

    /// Remove and return all items, leaving the container empty.
    pub fn take(&self) -> T
    where
        T: Default,
    {
        self.replace(T::default())
    }
}

/// Owning handle of a mutation-aware container.
///
/// Dropping the handle destroys the storage; an attached stamp is then
/// marked invalid instead of being destroyed, since external proxies may
/// still hold it. Cloning copies the items but never the stamp.
pub struct Tracked<T> {
    cell: Rc<TrackedCell<T>>,
}

impl<T> Tracked<T> {
    /// Create a container holding `items`.
    pub fn new(items: T) -> Self {
        Self {
            cell: Rc::new(TrackedCell::new(items)),
        }
    }

    /// Return the attached stamp, creating an observing one if none exists.
    ///
    /// Idempotent: at most one stamp is attached to a container at a time.
    pub fn get_or_create_mutation_stamp(&self) -> Rc<MutationStamp<T>> {
        if let Some(stamp) = self.cell.mutation_stamp() {
            return stamp;
        }
        let stamp = MutationStamp::observing(Rc::downgrade(&self.cell));
        *self.cell.stamp.borrow_mut() = Rc::downgrade(&stamp);
        tracing::trace!(revision = stamp.revision(), "attached mutation stamp");
        stamp
    }

    pub(crate) fn cell(&self) -> &Rc<TrackedCell<T>> {
        &self.cell
    }
}

impl<T> Deref for Tracked<T> {
    type Target = TrackedCell<T>;

    fn deref(&self) -> &Self::Target {
        &self.cell
    }
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        let stamp = self.cell.stamp.replace(Weak::new()).upgrade();
        if let Some(stamp) = stamp {
            tracing::trace!("destroying container with an attached stamp");
            stamp.invalidate();
        }
    }
}

impl<T: Default> Default for Tracked<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        Self::new(self.read(T::clone))
    }
}

impl<T: PartialEq> PartialEq for Tracked<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell) || self.read(|a| other.read(|b| a == b))
    }
}

impl<T: fmt::Debug> fmt::Debug for TrackedCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.items.try_borrow() {
            Ok(items) => fmt::Debug::fmt(&*items, f),
            Err(_) => write!(f, "<borrowed>"),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.cell, f)
    }
}
