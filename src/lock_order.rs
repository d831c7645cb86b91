//! Debug-only enforcement of invariant I6: a thread may take the root lock
//! only from inside a scope that already holds a file-node lock, and must
//! never take a file-node lock while already holding the root lock.
//!
//! This costs nothing in release builds (the thread-local is still touched,
//! but the assertions it backs compile to nothing) and catches ordering
//! mistakes the first time they run under test, rather than as an
//! occasional deadlock under load.

use std::cell::Cell;

thread_local! {
    static ROOT_LOCK_HELD: Cell<bool> = const { Cell::new(false) };
}

pub(crate) fn enter_root_lock() {
    ROOT_LOCK_HELD.with(|c| c.set(true));
}

pub(crate) fn exit_root_lock() {
    ROOT_LOCK_HELD.with(|c| c.set(false));
}

pub(crate) fn assert_root_not_held() {
    debug_assert!(
        !ROOT_LOCK_HELD.with(|c| c.get()),
        "I6 violated: attempted to take a file-node lock while the root lock was already held"
    );
}

/// RAII marker that records "this thread holds the root lock" for the
/// duration of its lifetime, independent of the `MutexGuard` itself -- so it
/// can be held across a `Condvar::wait_timeout` call, which needs to take
/// the `MutexGuard` by value.
pub(crate) struct RootLockMarker;

impl RootLockMarker {
    pub(crate) fn new() -> Self {
        enter_root_lock();
        RootLockMarker
    }
}

impl Drop for RootLockMarker {
    fn drop(&mut self) {
        exit_root_lock();
    }
}
