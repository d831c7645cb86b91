//! Per-file layout bookkeeping.
//!
//! Grounded on `struct pnfs_inode_info` (the `i_layouts`/`i_recalls` lists)
//! in `original_source/fs/exofs/pnfs_layout_logic.h` and `.c`. Recall *data*
//! lives in the root node's arena (`root.rs`) -- a file node only keeps the
//! ids of recalls that reference one of its layouts (the "dual anchoring"
//! variant called out in `§9`, which avoids the out-of-order-return race the
//! single-anchored `pkc_*` variant has).

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

use log::{debug, warn};
use smallvec::SmallVec;

use crate::arena::Arena;
use crate::file_handle::FileHandle;
use crate::ids::RecallFileInfo;
use crate::layout::{Layout, LayoutId};
use crate::lock_order;
use crate::recall::RecallId;
use crate::root::RootState;

/// Mutable state guarded by a file node's lock.
pub struct FileNodeState {
    pub(crate) layouts: Arena<Layout>,
    pub(crate) live: HashSet<LayoutId>,
    pub(crate) recalls_for_this_file: HashSet<RecallId>,
    pub(crate) recall_file_info: Option<RecallFileInfo>,
    /// Set while a "return on close" recall is outstanding against this
    /// file; purely advisory (logging/diagnostics), never consulted for
    /// correctness.
    pub(crate) in_roc_state: bool,
    /// Current end-of-file size as last observed or advanced by a
    /// `LayoutCommit` (`§4.5` step 2).
    pub(crate) i_size: u64,
    pub(crate) atime: SystemTime,
    pub(crate) mtime: SystemTime,
    /// Accumulated object-storage device size delta reported across every
    /// `LayoutCommit` that carried one (`§4.5` step 3).
    pub(crate) dev_size: i64,
    /// Set by `LayoutCommit` whenever it actually changes `i_size`/`mtime`/
    /// `dev_size`, mirroring `mark_inode_dirty_sync` in the original; purely
    /// advisory, same as `in_roc_state`.
    pub(crate) dirty: bool,
}

impl FileNodeState {
    fn new() -> Self {
        FileNodeState {
            layouts: Arena::new(),
            live: HashSet::new(),
            recalls_for_this_file: HashSet::new(),
            recall_file_info: None,
            in_roc_state: false,
            i_size: 0,
            atime: SystemTime::UNIX_EPOCH,
            mtime: SystemTime::UNIX_EPOCH,
            dev_size: 0,
            dirty: false,
        }
    }

    /// Add a freshly granted layout to this file's live set and to the
    /// handle that requested it (`§4.3` `LayoutGet`).
    pub(crate) fn insert_layout(
        &mut self,
        handle: &mut FileHandle,
        layout: Layout,
        recall_file_info: Option<RecallFileInfo>,
    ) -> LayoutId {
        if let (Some(prev), Some(next)) = (self.recall_file_info, recall_file_info) {
            if prev != next {
                debug!("file's recall_file_info changed from {prev:?} to {next:?}");
            }
        }
        if recall_file_info.is_some() {
            self.recall_file_info = recall_file_info;
        }
        let id = self.layouts.insert(layout);
        self.live.insert(id);
        handle.owned.insert(id);
        id
    }

    /// Move a layout out of the live set without freeing it, because a
    /// recall is about to take ownership of its id instead (`I1`: reachable
    /// from exactly one index set at a time). The layout stays in the arena.
    pub(crate) fn remove_from_live(&mut self, id: LayoutId) -> bool {
        self.live.remove(&id)
    }

    /// Permanently discard a layout: drop it from the live set (if present)
    /// and free its arena slot. Used when a layout is genuinely done with --
    /// handle close or a satisfied `LayoutReturn` -- not when it's merely
    /// moving into a recall.
    pub(crate) fn free_layout(&mut self, id: LayoutId) -> Option<Layout> {
        self.live.remove(&id);
        self.layouts.remove(id)
    }

    pub fn is_live(&self, id: LayoutId) -> bool {
        self.live.contains(&id)
    }

    pub fn live_layouts(&self) -> impl Iterator<Item = (LayoutId, &Layout)> {
        self.live.iter().filter_map(|&id| self.layouts.get(id).map(|l| (id, l)))
    }

    pub fn i_size(&self) -> u64 {
        self.i_size
    }

    pub fn dev_size(&self) -> i64 {
        self.dev_size
    }

    pub fn mtime(&self) -> SystemTime {
        self.mtime
    }

    /// `LayoutCommit` (`§4.5`): apply a client's end-of-write report to this
    /// file's size/time/device-size bookkeeping. `now` stands in for the
    /// original's `current_fs_time` wall-clock read.
    ///
    /// `new_time`, if supplied, only moves `mtime` forward -- a commit
    /// arriving out of order must never rewind it (the original's
    /// `timespec_compare` guard); otherwise `now` is used. Returns the
    /// resulting size if `new_offset` advanced it past the current one.
    pub(crate) fn apply_commit(
        &mut self,
        new_time: Option<SystemTime>,
        now: SystemTime,
        last_write: Option<u64>,
        dsu_delta: Option<i64>,
    ) -> Option<u64> {
        let mtime = match new_time {
            Some(t) if t >= self.mtime => t,
            _ => now,
        };
        self.atime = mtime;
        self.mtime = mtime;

        let mut new_size = None;
        if let Some(last_write) = last_write {
            let candidate = last_write.saturating_add(1);
            if self.i_size < candidate {
                self.i_size = candidate;
                new_size = Some(candidate);
            }
        }

        if let Some(delta) = dsu_delta {
            self.dev_size += delta;
        }

        self.dirty = true;
        new_size
    }

    pub fn recall_file_info(&self) -> Option<RecallFileInfo> {
        self.recall_file_info
    }
}

/// A file's layout registry, one per pNFS-exported inode.
pub struct FileNode {
    state: Mutex<FileNodeState>,
}

impl Default for FileNode {
    fn default() -> Self {
        Self::new()
    }
}

impl FileNode {
    pub fn new() -> Self {
        FileNode {
            state: Mutex::new(FileNodeState::new()),
        }
    }

    /// Lock this file node. Panics via `debug_assert` in debug builds if the
    /// calling thread already holds a root lock (`I6`).
    pub fn lock(&self) -> MutexGuard<'_, FileNodeState> {
        lock_order::assert_root_not_held();
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Release every layout a closing handle owns, freeing its capabilities
    /// and letting any recall waiting on them complete. Returns the layouts
    /// that were released, for the caller to log or account for.
    ///
    /// A handle can own an id that is no longer live: `layout_recall` may
    /// have already absorbed it into a pending recall (`I1`: it moves from
    /// `live` into the recall's set, never both). The client that owned the
    /// closing handle can no longer satisfy that recall with a `LayoutReturn`
    /// of its own, so this detaches the id from whichever recall holds it and
    /// frees it directly -- otherwise the recall would wait forever on a
    /// return that can never come, leaking it in `in_flight` (`I2`).
    ///
    /// Must be called with the root lock reachable from the same critical
    /// section so recall bookkeeping stays consistent; see
    /// `with_file_and_root`. Caller must still run `remove_empty_recalls`
    /// afterward and invoke whatever waiters it returns.
    pub(crate) fn release_handle_locked(
        state: &mut FileNodeState,
        root: &mut RootState,
        handle: FileHandle,
    ) -> SmallVec<[Layout; 4]> {
        let mut released = SmallVec::with_capacity(handle.owned.len());
        for id in handle.owned {
            if state.is_live(id) {
                if let Some(layout) = state.free_layout(id) {
                    released.push(layout);
                }
                continue;
            }
            let recall_ids: Vec<_> = state.recalls_for_this_file.iter().copied().collect();
            for recall_id in recall_ids {
                if let Some(recall) = root.recalls.get_mut(recall_id) {
                    if recall.layouts.remove(&id) {
                        if let Some(layout) = state.free_layout(id) {
                            released.push(layout);
                        }
                        break;
                    }
                }
            }
        }
        released
    }

    /// Best-effort shutdown check: warn if a file node still has live
    /// layouts or unresolved recalls when it's about to be dropped.
    pub fn assert_quiescent(&self) {
        let state = self.lock();
        if !state.live.is_empty() {
            warn!(
                "file node released with {} layout(s) still live",
                state.live.len()
            );
        }
        if !state.recalls_for_this_file.is_empty() {
            warn!(
                "file node released with {} recall(s) still referencing it",
                state.recalls_for_this_file.len()
            );
        }
    }
}
