//! The server-wide root: the recall arena plus the ready/in-flight queues a
//! consumer drains via `ReceiveRecalls`.
//!
//! Grounded on `struct pnfs_mount_type`'s recall list and wait queue in
//! `original_source/fs/exofs/pnfs_layout_logic.h`, and on the teacher's
//! `session_mt.rs::MtState`, which coordinates worker threads with exactly
//! the `Mutex` + `Condvar` + flag combination used here for
//! `ReceiveRecalls`'s blocking wait.

use std::collections::{HashSet, VecDeque};
use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard};

use log::debug;

use crate::arena::Arena;
use crate::error::{Result, Status};
use crate::file_node::{FileNode, FileNodeState};
use crate::ids::Waiter;
use crate::lock_order;
use crate::recall::{Recall, RecallEvent, RecallId};

/// Mutable state guarded by the root lock.
pub struct RootState {
    pub(crate) recalls: Arena<Recall>,
    pub(crate) ready: VecDeque<RecallId>,
    pub(crate) in_flight: HashSet<RecallId>,
    canceled: bool,
    interrupt_requested: bool,
}

impl RootState {
    fn new() -> Self {
        RootState {
            recalls: Arena::new(),
            ready: VecDeque::new(),
            in_flight: HashSet::new(),
            canceled: false,
            interrupt_requested: false,
        }
    }
}

/// A lock guard over [`RootState`] that carries a thread-local I6 marker
/// alongside it, cleared on drop (even if the critical section panics) by
/// the marker's own `Drop` impl.
pub struct RootGuard<'a> {
    guard: MutexGuard<'a, RootState>,
    _marker: lock_order::RootLockMarker,
}

impl Deref for RootGuard<'_> {
    type Target = RootState;
    fn deref(&self) -> &RootState {
        &self.guard
    }
}

impl DerefMut for RootGuard<'_> {
    fn deref_mut(&mut self) -> &mut RootState {
        &mut self.guard
    }
}

/// The server-wide anchor for every recall, reachable from one process.
pub struct RootNode {
    state: Mutex<RootState>,
    condvar: Condvar,
}

impl Default for RootNode {
    fn default() -> Self {
        Self::new()
    }
}

impl RootNode {
    pub fn new() -> Self {
        RootNode {
            state: Mutex::new(RootState::new()),
            condvar: Condvar::new(),
        }
    }

    /// Lock the root. Marks this thread as holding the root lock so a
    /// subsequent `FileNode::lock()` call can assert `I6`.
    pub(crate) fn lock(&self) -> RootGuard<'_> {
        RootGuard {
            guard: self.state.lock().unwrap_or_else(|e| e.into_inner()),
            _marker: lock_order::RootLockMarker::new(),
        }
    }

    pub(crate) fn notify(&self) {
        self.condvar.notify_all();
    }

    /// `ReceiveRecalls` (`§4.4`, `§6.2`): a single-consumer blocking drain.
    ///
    /// Moves up to `max_events` entries from `ready` into `in_flight`,
    /// copying their payloads out as cookies the caller must echo back via
    /// `LayoutReturn`/`LayoutCommit`. If nothing was ready and `allow_sleep`
    /// is true, blocks on the wait primitive until a recall arrives, the
    /// root is canceled, or this thread's wait is interrupted -- then loops
    /// to try again (`again:` in `§4.4`). `I5`: a pending cancellation is
    /// consumed at most once and only suppresses sleeping; it never
    /// discards already-queued events.
    pub fn receive_recalls(&self, max_events: usize, allow_sleep: bool) -> Result<Vec<RecallEvent>> {
        if max_events == 0 {
            return Ok(Vec::new());
        }
        // Held independently of the `MutexGuard` below so the guard can be
        // passed by value into `Condvar::wait_timeout`, which requires it.
        let _marker = lock_order::RootLockMarker::new();
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            let mut dont_sleep = false;
            if guard.canceled {
                guard.canceled = false;
                dont_sleep = true;
            }

            let mut events = Vec::with_capacity(max_events.min(guard.ready.len()));
            while events.len() < max_events {
                let Some(id) = guard.ready.pop_front() else {
                    break;
                };
                guard.in_flight.insert(id);
                let Some(recall) = guard.recalls.get(id) else {
                    continue;
                };
                events.push(RecallEvent {
                    cookie: id,
                    segment: recall.segment,
                    io_mode: recall.io_mode,
                    client_id: recall.client_id,
                    recall_file_info: recall.recall_file_info,
                });
            }

            if !events.is_empty() {
                debug!("ReceiveRecalls delivering {} event(s)", events.len());
                return Ok(events);
            }
            if !allow_sleep || dont_sleep {
                return Ok(events);
            }
            if guard.interrupt_requested {
                guard.interrupt_requested = false;
                return Err(Status::Interrupted);
            }

            let (next_guard, _timeout) = self
                .condvar
                .wait_timeout(guard, std::time::Duration::from_secs(30))
                .unwrap_or_else(|e| e.into_inner());
            guard = next_guard;
            if guard.interrupt_requested {
                guard.interrupt_requested = false;
                debug!("ReceiveRecalls wait interrupted");
                return Err(Status::Interrupted);
            }
        }
    }

    /// `CancelRecalls` (`§4.4`, `§6.2`): level-triggered, one-shot. Sets a
    /// flag that forces the *next* `ReceiveRecalls` call to skip sleeping
    /// (it still returns whatever events were already queued); the flag is
    /// consumed by that call and does not persist beyond it (`I5`).
    pub fn cancel_recalls(&self) {
        let mut guard = self.lock();
        guard.canceled = true;
        drop(guard);
        self.notify();
    }

    /// The `debug_magic` branch of `CancelRecalls` (`§4.4`): a testing hook
    /// from the original source that, instead of canceling anything, issues
    /// a wildcard `Any` recall over `[0, infinity)` against every file
    /// passed in and reports whether any of them actually queued one. The
    /// original calls this against every inode under the mount; this core
    /// doesn't enumerate the files it manages the way a mount point does,
    /// so the caller supplies the set to sweep.
    pub fn debug_recall_all<'a>(&self, files: impl IntoIterator<Item = &'a FileNode>) -> bool {
        let mut recalled_any = false;
        for file in files {
            let outcome = with_file_and_root(file, self, |f, r| {
                crate::recall::layout_recall(
                    f,
                    r,
                    crate::ids::IoMode::ANY,
                    crate::range::Range::to_infinity(0),
                    crate::ids::CLIENT_WILDCARD_REQUEST,
                    None,
                )
            });
            if matches!(outcome, crate::recall::RecallOutcome::Queued(_)) {
                recalled_any = true;
            }
        }
        self.notify();
        recalled_any
    }

    /// Wake a blocked `ReceiveRecalls` call with `Status::Interrupted`
    /// without canceling the root, standing in for the original's
    /// OS-signal-driven `wait_event_interruptible` wakeup.
    pub fn request_interrupt(&self) {
        let mut guard = self.lock();
        guard.interrupt_requested = true;
        drop(guard);
        self.notify();
    }

    pub fn is_canceled(&self) -> bool {
        self.lock().canceled
    }
}

/// Run `f` with the file lock taken first and the root lock taken from
/// inside that critical section (`I6`), the only order lock-order-safe
/// operations that need both locks may use.
pub fn with_file_and_root<R>(
    file: &FileNode,
    root: &RootNode,
    f: impl FnOnce(&mut FileNodeState, &mut RootState) -> R,
) -> R {
    let mut file_guard = file.lock();
    let mut root_guard = root.lock();
    f(&mut file_guard, &mut root_guard)
}

/// `§4.4`'s `_lo_remove_empty_recalls`: drop any recall referenced by this
/// file that has absorbed every one of its layouts back out via
/// `LayoutReturn`, freeing its arena slot and purging it from both queues.
///
/// Returns the waiters of every recall collected this way, per `§4.3` step 5
/// / the original's `if (waiter) complete(waiter);`: the caller must invoke
/// each one after releasing the file/root locks this function was called
/// under, since a waiter is free to do anything once woken, including
/// re-entering this crate.
#[must_use]
pub fn remove_empty_recalls(file: &mut FileNodeState, root: &mut RootState) -> Vec<Waiter> {
    let mut freed = Vec::new();
    let mut waiters = Vec::new();
    file.recalls_for_this_file.retain(|&id| {
        let empty = root.recalls.get(id).map(|r| r.is_empty()).unwrap_or(true);
        if empty {
            if let Some(recall) = root.recalls.remove(id) {
                waiters.extend(recall.waiter);
            }
            root.in_flight.remove(&id);
            freed.push(id);
        }
        !empty
    });
    if !freed.is_empty() {
        root.ready.retain(|id| !freed.contains(id));
    }
    waiters
}
