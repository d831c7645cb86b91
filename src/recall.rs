//! A single in-flight layout recall and the merge logic that widens it as
//! more conflicting layouts are discovered.
//!
//! Grounded on `struct pnfs_recall` and `_recall_merge_seg` in
//! `original_source/fs/exofs/pnfs_layout_logic.c`, with one deliberate
//! deviation: `_recall_merge_seg` zero-initializes `length` while setting
//! `offset` to the `NFS4_MAX_UINT64` sentinel, so the first merge always
//! widens the recall's segment to infinity. That contradicts the scenario
//! the spec itself describes (a recall merging down to a finite `[0, 32K)`
//! range), so merging here starts from [`Range::empty`] instead and treats
//! it as the identity element of [`Range::merge`] -- see `range.rs`.

use std::collections::HashSet;

use smallvec::SmallVec;

use crate::arena::Index;
use crate::file_node::FileNodeState;
use crate::ids::{IoMode, RecallFileInfo, Waiter, CLIENT_ANY, CLIENT_WILDCARD_REQUEST};
use crate::layout::{Layout, LayoutId};
use crate::range::Range;
use crate::root::RootState;

/// An in-flight recall: the union of every layout segment it has absorbed so
/// far, plus enough bookkeeping to let a consumer act on it once delivered.
pub struct Recall {
    pub segment: Range,
    pub io_mode: IoMode,
    pub client_id: u64,
    pub recall_file_info: Option<RecallFileInfo>,
    pub layouts: HashSet<LayoutId>,
    pub waiter: Option<Waiter>,
}

pub type RecallId = Index<Recall>;

impl Recall {
    pub fn new(recall_file_info: Option<RecallFileInfo>) -> Self {
        Recall {
            segment: Range::empty(),
            io_mode: IoMode::empty(),
            client_id: CLIENT_WILDCARD_REQUEST,
            recall_file_info,
            layouts: HashSet::new(),
            waiter: None,
        }
    }

    /// Absorb one more conflicting layout into this recall (`I2`/`I3`): the
    /// segment only ever widens, the client id collapses to
    /// [`CLIENT_ANY`] the moment a second distinct client shows up, and the
    /// mode accumulates every mode recalled against.
    pub fn merge_layout(&mut self, id: LayoutId, layout: &Layout) {
        self.segment = self.segment.merge(&layout.segment.range);
        self.io_mode |= layout.segment.mode;
        if self.layouts.is_empty() {
            self.client_id = layout.client_id;
        } else if self.client_id != layout.client_id {
            self.client_id = CLIENT_ANY;
        }
        self.layouts.insert(id);
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

/// One delivered recall, as handed to a consumer by `ReceiveRecalls`
/// (`§4.4`, `§6.2`). `cookie` is what the consumer must echo back on
/// `LayoutReturn`/`LayoutCommit` to identify which recall it is satisfying.
#[derive(Debug, Clone)]
pub struct RecallEvent {
    pub cookie: RecallId,
    pub segment: Range,
    pub io_mode: IoMode,
    pub client_id: u64,
    pub recall_file_info: Option<RecallFileInfo>,
}

/// Outcome of attempting to issue a layout recall against a file (`§4.4`).
#[derive(Debug)]
pub enum RecallOutcome {
    /// At least one conflicting layout was found and folded into a freshly
    /// queued recall.
    Queued(RecallId),
    /// No live layout conflicted, but an already-pending, still-nonempty
    /// recall overlaps the same range and mode -- the caller should treat
    /// this the same as `Queued` (a recall is in flight) rather than
    /// proceeding as if nothing was recalled.
    TryAgain(RecallId),
    /// No live layout conflicted and no pending recall overlaps either.
    NoMatch,
}

/// `LayoutRecall(file, caller_client_id, mode, range, waiter)` (`§4.4`):
/// scan a file's live layouts for conflicts with `(req_mode, req_range,
/// req_client)` and fold every conflicting one into a freshly allocated
/// recall. Each conflicting layout moves from the file's live set into the
/// recall's `layouts` set -- never both, per `I1` -- widening the recall's
/// segment/mode/client-id bookkeeping (`I2`/`I3`) as it goes.
///
/// If nothing conflicts, the fresh recall is discarded and this falls back
/// to checking whether an existing, still-nonempty recall for this file
/// already overlaps the requested range and mode (`TryAgain`) before giving
/// up (`NoMatch`).
///
/// Caller must hold both the file lock and the root lock, file lock first
/// (`I6`); see `root::with_file_and_root`.
pub fn layout_recall(
    file: &mut FileNodeState,
    root: &mut RootState,
    req_mode: IoMode,
    req_range: Range,
    req_client: u64,
    waiter: Option<Waiter>,
) -> RecallOutcome {
    // Most recalls absorb a handful of layouts (the width of one shared
    // stripe group, typically); inline storage avoids an allocation for the
    // common case, mirroring `reply.rs`'s `SmallVec`-backed response buffer.
    let conflicting: SmallVec<[LayoutId; 4]> = file
        .live_layouts()
        .filter(|&(_, layout)| {
            crate::conflict::conflict(layout.segment, req_mode, req_range, layout.client_id, req_client)
        })
        .map(|(id, _)| id)
        .collect();

    if conflicting.is_empty() {
        let pending = file
            .recalls_for_this_file
            .iter()
            .copied()
            .find(|&id| {
                root.recalls.get(id).is_some_and(|r| {
                    !r.is_empty() && r.segment.overlaps(&req_range) && r.io_mode.intersects(req_mode)
                })
            });
        return match pending {
            Some(id) => RecallOutcome::TryAgain(id),
            None => RecallOutcome::NoMatch,
        };
    }

    let mut recall = Recall::new(file.recall_file_info());
    for id in conflicting {
        let Some(layout) = file.layouts.get(id).cloned() else {
            continue;
        };
        file.remove_from_live(id);
        recall.merge_layout(id, &layout);
    }
    recall.waiter = waiter;

    let id = root.recalls.insert(recall);
    file.recalls_for_this_file.insert(id);
    root.ready.push_back(id);
    RecallOutcome::Queued(id)
}
