//! Reference-count-driven keepalive for wrapped native objects
//!
//! A host [`ObjectHandle`] holds one retainer of its native object. While
//! native code holds more retainers than that, the handle must outlive every
//! host reference to it, because native code may hand the object back to
//! the host later and expects the same handle (with its host-side
//! attributes). Once the count falls back to the handle's own retainer, the
//! bridge lets go and the handle lives only as long as the host keeps it.
//!
//! The bridge is a two-state machine:
//!
//! ```text
//!              count > 1
//!   Unreferenced ─────────▶ KeptAlive
//!        ▲                      │
//!        └──────────────────────┘
//!              count <= 1
//! ```
//!
//! Transitions run with the host lock held, since a release may destroy the
//! handle and, through it, the native object.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::host::{HostGuard, HostLock, HostRuntime, ObjectHandle};
use crate::native::RefCountListener;

/// Whether the bridge holds a strong reference to its handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepaliveState {
    /// Only weakly referenced by the bridge
    Unreferenced,
    /// Strongly held on behalf of native code
    KeptAlive,
}

/// A state change taken by [`KeepaliveBridge::on_ref_count_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A strong reference was taken
    Acquired,
    /// The strong reference was dropped
    Released,
}

/// Keepalive state machine for one object handle.
pub struct KeepaliveBridge {
    handle: Weak<ObjectHandle>,
    held: RefCell<Option<Rc<ObjectHandle>>>,
    acquisitions: Cell<usize>,
    releases: Cell<usize>,
}

impl KeepaliveBridge {
    /// Create an unreferenced bridge for `handle`.
    pub fn new(handle: &Rc<ObjectHandle>) -> Self {
        Self {
            handle: Rc::downgrade(handle),
            held: RefCell::new(None),
            acquisitions: Cell::new(0),
            releases: Cell::new(0),
        }
    }

    /// Current state.
    pub fn state(&self) -> KeepaliveState {
        if self.held.borrow().is_some() {
            KeepaliveState::KeptAlive
        } else {
            KeepaliveState::Unreferenced
        }
    }

    /// Number of strong references taken so far.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.get()
    }

    /// Number of strong references released so far.
    pub fn releases(&self) -> usize {
        self.releases.get()
    }

    /// React to the native object's reference count becoming `count`.
    ///
    /// Requires the host lock: a release may run the handle's destructor
    /// synchronously before this returns. Returns the transition taken.
    pub fn on_ref_count_changed(&self, _guard: &HostGuard<'_>, count: usize) -> Option<Transition> {
        let kept_alive = self.held.borrow().is_some();

        if count > 1 && !kept_alive {
            // The handle is already gone; nothing left to keep alive
            let handle = self.handle.upgrade()?;
            *self.held.borrow_mut() = Some(handle);
            self.acquisitions.set(self.acquisitions.get() + 1);
            debug!(count, "keepalive acquired");
            return Some(Transition::Acquired);
        }

        if count <= 1 && kept_alive {
            let released = self.held.borrow_mut().take();
            self.releases.set(self.releases.get() + 1);
            debug!(count, "keepalive released");
            // May destroy the handle and reenter this bridge
            drop(released);
            return Some(Transition::Released);
        }

        None
    }
}

impl fmt::Debug for KeepaliveBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeepaliveBridge")
            .field("state", &self.state())
            .field("acquisitions", &self.acquisitions.get())
            .field("releases", &self.releases.get())
            .finish()
    }
}

/// Adapter installed on the native object.
///
/// Acquires the host lock around every notification, so native code that
/// does not hold it can still clone and drop retainers.
pub struct KeepaliveMonitor {
    lock: Rc<HostLock>,
    bridge: Rc<KeepaliveBridge>,
}

impl KeepaliveMonitor {
    /// Create a monitor forwarding to `bridge` under `lock`.
    pub fn new(lock: Rc<HostLock>, bridge: Rc<KeepaliveBridge>) -> Self {
        Self { lock, bridge }
    }

    /// The bridge notifications are forwarded to.
    pub fn bridge(&self) -> &Rc<KeepaliveBridge> {
        &self.bridge
    }
}

impl RefCountListener for KeepaliveMonitor {
    fn ref_count_changed(&self, count: usize) {
        let guard = self.lock.acquire();
        self.bridge.on_ref_count_changed(&guard, count);
    }
}

/// Install a keepalive monitor for `handle` on its native object.
///
/// With `apply_now`, the current count is applied immediately. Replaces any
/// monitor installed earlier for the same object.
pub fn install_external_keepalive_monitor(
    host: &HostRuntime,
    handle: &Rc<ObjectHandle>,
    apply_now: bool,
) -> Rc<KeepaliveBridge> {
    let bridge = Rc::new(KeepaliveBridge::new(handle));
    handle.set_keepalive(&bridge);
    let monitor = KeepaliveMonitor::new(Rc::clone(host.lock()), Rc::clone(&bridge));
    handle
        .retainer()
        .install_ref_count_listener(Rc::new(monitor), apply_now);
    bridge
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::SerializableObject;

    #[test]
    fn test_transitions() {
        let host = HostRuntime::new();
        let clip = SerializableObject::create("Clip.2");
        let handle = Rc::new(ObjectHandle::new(clip.clone()));
        let bridge = KeepaliveBridge::new(&handle);
        let guard = host.acquire();

        assert_eq!(bridge.on_ref_count_changed(&guard, 1), None);
        assert_eq!(
            bridge.on_ref_count_changed(&guard, 2),
            Some(Transition::Acquired)
        );
        assert_eq!(bridge.on_ref_count_changed(&guard, 3), None);
        assert_eq!(bridge.state(), KeepaliveState::KeptAlive);
        assert_eq!(
            bridge.on_ref_count_changed(&guard, 1),
            Some(Transition::Released)
        );
        assert_eq!(bridge.on_ref_count_changed(&guard, 0), None);
        assert_eq!((bridge.acquisitions(), bridge.releases()), (1, 1));
    }

    #[test]
    fn test_no_acquire_after_handle_is_gone() {
        let host = HostRuntime::new();
        let clip = SerializableObject::create("Clip.2");
        let handle = Rc::new(ObjectHandle::new(clip.clone()));
        let bridge = KeepaliveBridge::new(&handle);
        drop(handle);

        let guard = host.acquire();
        assert_eq!(bridge.on_ref_count_changed(&guard, 2), None);
        assert_eq!(bridge.state(), KeepaliveState::Unreferenced);
    }

    #[test]
    fn test_monitor_forwards_and_releases_the_lock() {
        let host = HostRuntime::new();
        let clip = SerializableObject::create("Clip.2");
        let handle = Rc::new(ObjectHandle::new(clip.clone()));
        let bridge = Rc::new(KeepaliveBridge::new(&handle));
        let monitor = KeepaliveMonitor::new(Rc::clone(host.lock()), Rc::clone(&bridge));

        monitor.ref_count_changed(2);
        assert_eq!(bridge.state(), KeepaliveState::KeptAlive);
        assert!(!host.lock().is_held());

        monitor.ref_count_changed(1);
        assert_eq!(bridge.state(), KeepaliveState::Unreferenced);
        assert_eq!(Rc::strong_count(&handle), 1);
    }
}
