//! The host runtime's serialization lock

use std::cell::Cell;

/// Global serialization lock of a host runtime.
///
/// Reentrant: native callbacks that fire while host code already holds the
/// lock (a retainer cloned during a conversion, say) acquire it again
/// without deadlocking. The runtime is single-threaded, so holding the lock
/// is tracked as a depth counter.
#[derive(Debug, Default)]
pub struct HostLock {
    depth: Cell<usize>,
}

impl HostLock {
    /// Create an unheld lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for the lifetime of the returned guard.
    pub fn acquire(&self) -> HostGuard<'_> {
        self.depth.set(self.depth.get() + 1);
        HostGuard { lock: self }
    }

    /// Whether any guard is alive.
    pub fn is_held(&self) -> bool {
        self.depth.get() > 0
    }

    /// Number of nested acquisitions.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }
}

/// RAII proof that the host lock is held.
///
/// Functions that call back into host object construction or destruction
/// take `&HostGuard` to make the precondition explicit.
///
/// # Example
///
/// ```
/// use anybridge::HostLock;
///
/// let lock = HostLock::new();
/// {
///     let _guard = lock.acquire();
///     assert!(lock.is_held());
/// }
/// // guard dropped, lock released
/// assert!(!lock.is_held());
/// ```
#[derive(Debug)]
pub struct HostGuard<'a> {
    lock: &'a HostLock,
}

impl<'a> HostGuard<'a> {
    /// The lock this guard holds.
    pub fn lock(&self) -> &'a HostLock {
        self.lock
    }
}

impl<'a> Drop for HostGuard<'a> {
    fn drop(&mut self) {
        self.lock.depth.set(self.lock.depth.get() - 1);
    }
}
