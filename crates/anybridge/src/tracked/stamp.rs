//! Out-of-band revision and invalidation record for a tracked container

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::{Tracked, TrackedCell};
use crate::error::{BridgeError, Result};

/// Revision value meaning "the container is gone, do not dereference".
pub const INVALID_REVISION: i64 = -1;

/// What the stamp is attached to.
enum StampLink<T> {
    /// Observes a container that lives elsewhere
    Observing(Weak<TrackedCell<T>>),
    /// Owns a container allocated for it
    Owning(Tracked<T>),
    /// The container was destroyed
    Detached,
}

/// Revision counter and back reference for one tracked container.
///
/// External holders keep the stamp alive through an `Rc`; the container
/// keeps only a weak slot for it. The revision starts at 1, increases
/// monotonically with every invalidating operation on the container, and
/// becomes [`INVALID_REVISION`] once the container is destroyed.
pub struct MutationStamp<T> {
    revision: Cell<i64>,
    link: RefCell<StampLink<T>>,
}

impl<T> MutationStamp<T> {
    pub(super) fn observing(cell: Weak<TrackedCell<T>>) -> Rc<Self> {
        Rc::new(Self {
            revision: Cell::new(1),
            link: RefCell::new(StampLink::Observing(cell)),
        })
    }

    /// Create a stamp that owns a fresh, empty container.
    pub fn owning() -> Rc<Self>
    where
        T: Default,
    {
        Self::owning_with(T::default())
    }

    /// Create a stamp that owns a fresh container holding `items`.
    pub fn owning_with(items: T) -> Rc<Self> {
        let stamp = Rc::new(Self {
            revision: Cell::new(1),
            link: RefCell::new(StampLink::Owning(Tracked::new(items))),
        });
        if let StampLink::Owning(tracked) = &*stamp.link.borrow() {
            *tracked.cell.stamp.borrow_mut() = Rc::downgrade(&stamp);
        }
        stamp
    }

    /// The current revision, or [`INVALID_REVISION`].
    pub fn revision(&self) -> i64 {
        self.revision.get()
    }

    /// Whether the container is still alive.
    pub fn is_valid(&self) -> bool {
        self.revision.get() != INVALID_REVISION
    }

    /// Whether this stamp owns its container.
    pub fn is_owning(&self) -> bool {
        matches!(&*self.link.borrow(), StampLink::Owning(_))
    }

    /// The container this stamp tracks.
    ///
    /// # Errors
    ///
    /// Returns `ContainerInvalidated` once the container has been destroyed.
    pub fn container(&self) -> Result<Rc<TrackedCell<T>>> {
        if !self.is_valid() {
            return Err(BridgeError::ContainerInvalidated);
        }
        match &*self.link.borrow() {
            StampLink::Observing(cell) => cell.upgrade().ok_or(BridgeError::ContainerInvalidated),
            StampLink::Owning(tracked) => Ok(Rc::clone(tracked.cell())),
            StampLink::Detached => Err(BridgeError::ContainerInvalidated),
        }
    }

    pub(super) fn bump(&self) {
        if self.is_valid() {
            self.revision.set(self.revision.get() + 1);
        }
    }

    pub(super) fn invalidate(&self) {
        self.revision.set(INVALID_REVISION);
        // Drop the old link only after the borrow is released
        let old = self.link.replace(StampLink::Detached);
        drop(old);
        tracing::debug!("mutation stamp invalidated");
    }
}

impl<T> Drop for MutationStamp<T> {
    fn drop(&mut self) {
        let this: *const Self = self;
        match self.link.get_mut() {
            StampLink::Observing(cell) => {
                if let Some(cell) = cell.upgrade() {
                    let mut slot = cell.stamp.borrow_mut();
                    if std::ptr::eq(slot.as_ptr(), this) {
                        *slot = Weak::new();
                    }
                }
            }
            StampLink::Owning(tracked) => {
                // The owned container is dropped along with the link
                *tracked.cell.stamp.borrow_mut() = Weak::new();
            }
            StampLink::Detached => {}
        }
    }
}

impl<T> fmt::Debug for MutationStamp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let link = match self.link.try_borrow() {
            Ok(link) => match &*link {
                StampLink::Observing(_) => "observing",
                StampLink::Owning(_) => "owning",
                StampLink::Detached => "detached",
            },
            Err(_) => "<borrowed>",
        };
        f.debug_struct("MutationStamp")
            .field("revision", &self.revision.get())
            .field("link", &link)
            .finish()
    }
}
