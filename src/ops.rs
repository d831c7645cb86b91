//! The six control operations a pNFS object-layout data server exposes
//! (`§6.2`): `LayoutGet`, `LayoutCommit`, `LayoutReturn`, `GetDeviceInfo`,
//! `ReceiveRecalls`, `CancelRecalls`. Each is grounded on its namesake in
//! `original_source/fs/exofs/export_ioctl.c` (`_pnfs_layout_get`,
//! `_pkc_pnfs_layout_commit`, `_pkc_pnfs_layout_return`,
//! `_pkc_pnfs_device_info`) and `pnfs_layout_logic.c`'s recall delivery path.
//!
//! This module is the only place callers need to import from for normal
//! use; `root::RootNode` and `file_node::FileNode` expose the primitives
//! directly for callers who need finer control (tests, mostly).

use log::{info, warn};

use crate::config::DataServerConfig;
use crate::device::{DeviceDirectory, DeviceInfo};
use crate::error::{Result, Status};
use crate::file_handle::FileHandle;
use crate::file_node::FileNode;
use crate::ids::{Capability, DeviceId, IoMode};
use crate::layout::{Layout, LayoutId, Segment};
use crate::range::Range;
use crate::recall::{self, RecallEvent, RecallOutcome};
use crate::root::{self, RootNode};
use crate::striping::{self, StripingLayout};

/// Receives the I/O errors (if any) a consumer reports while satisfying a
/// `LayoutReturn`, so the server can act on them (e.g. mark a device
/// degraded) without `LayoutReturn` itself needing to know what that means.
pub trait IoErrorSink {
    fn report(&mut self, range: Range, status: Status);
}

/// An `IoErrorSink` that discards everything; the default for callers that
/// don't care.
#[derive(Debug, Default)]
pub struct NullIoErrorSink;

impl IoErrorSink for NullIoErrorSink {
    fn report(&mut self, _range: Range, _status: Status) {}
}

/// The outcome of a successful `LayoutGet`.
#[derive(Debug)]
pub struct GrantedLayout {
    pub id: LayoutId,
    pub segment: Segment,
    /// True if granting this layout required synchronously recalling
    /// conflicting layouts from other clients first (`§4.3` step 2); the
    /// recall itself is already queued by the time this returns.
    pub required_recall: bool,
    /// Number of bytes of `buf` the encoded response body occupies.
    pub encoded_len: usize,
}

/// Encodes a `LayoutGet` response body into `buf` (`§4.3` step 3): the
/// layout header (range, mode) followed by one opaque object credential per
/// component. `component_creds` must carry exactly `group_width * mirrors`
/// entries -- their derivation is the object-storage client's job (out of
/// scope here, per `§1`); this only serializes what it's given. Returns the
/// number of bytes written, or `Status::TooSmall` unchanged if `buf` is too
/// small to hold the body, per the encoder's buffer-exhaustion contract.
fn encode_layout_response(buf: &mut [u8], segment: Segment, component_creds: &[&[u8]]) -> Result<usize> {
    let mut enc = crate::xdr::Encoder::new(buf);
    enc.put_u64(segment.range.offset)?;
    enc.put_u64(segment.range.length)?;
    enc.put_u32(segment.mode.bits())?;
    enc.put_u32(component_creds.len() as u32)?;
    for cred in component_creds {
        enc.put_opaque(cred)?;
    }
    Ok(enc.len())
}

/// `LayoutGet` (`§4.3`): align the requested range to the file's striping
/// geometry. If the alignment needed to widen across shared RW-redundant
/// stripes, synchronously recall whatever conflicts with that wider range
/// first and report `RecallConflict` rather than handing out a layout this
/// call -- the caller is expected to retry once the recall is satisfied.
#[allow(clippy::too_many_arguments)]
pub fn layout_get(
    file: &FileNode,
    root: &RootNode,
    handle: &mut FileHandle,
    striping: &StripingLayout,
    requested: Segment,
    client_id: u64,
    capability: Capability,
    config: &DataServerConfig,
    buf: &mut [u8],
    component_creds: &[&[u8]],
) -> Result<GrantedLayout> {
    let aligned = striping::align(striping, requested, config.shared_stripes);

    if aligned.need_recall {
        let outcome = root::with_file_and_root(file, root, |f, r| {
            // "SIMULATE DF Map growth": if the aligned segment already
            // reaches past the file's current size, widen the recall to
            // `[0, infinity)` instead of just the aligned range -- the
            // original's debug stand-in for `ore_calc_stripe_info` deciding
            // the map is about to grow (`§9` open question).
            let recall_range = if aligned.segment.range.last_offset() > f.i_size() {
                Range::to_infinity(0)
            } else {
                aligned.segment.range
            };
            recall::layout_recall(f, r, IoMode::READ_WRITE, recall_range, client_id, None)
        });
        root.notify();
        match outcome {
            RecallOutcome::Queued(id) => {
                info!("layout_get queued recall {id:?} to clear shared stripes");
                return Err(Status::RecallConflict);
            }
            RecallOutcome::TryAgain(id) => {
                info!("layout_get found recall {id:?} already pending over this range");
                return Err(Status::RecallConflict);
            }
            RecallOutcome::NoMatch => {}
        }
    }

    let encoded_len = encode_layout_response(buf, aligned.segment, component_creds)?;

    let mut guard = file.lock();
    let id = guard.insert_layout(
        handle,
        Layout {
            segment: aligned.segment,
            client_id,
            capability,
        },
        guard.recall_file_info(),
    );

    Ok(GrantedLayout {
        id,
        segment: aligned.segment,
        required_recall: aligned.need_recall,
        encoded_len,
    })
}

/// Decoded body of a `LayoutCommit` request (`§4.5`): an optional new
/// end-of-write offset, an optional client-reported timestamp, and an
/// optional device-size delta -- each field absent when the client didn't
/// report that piece.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutCommitArgs {
    pub new_time: Option<std::time::SystemTime>,
    /// Last byte offset written; `i_size` advances to `last_write + 1` if
    /// that exceeds the current size.
    pub last_write: Option<u64>,
    pub dsu_delta: Option<i64>,
}

/// Outcome of a `LayoutCommit` that actually applied (i.e. wasn't
/// short-circuited by `in_layout_recall`).
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutCommitResult {
    /// Present only when `i_size` was advanced by this commit.
    pub new_size: Option<u64>,
}

/// `LayoutCommit` (`§4.5`): the client reports progress on an outstanding
/// write. If `in_layout_recall` is true -- the caller is satisfying this
/// commit as part of responding to an externally-driven truncate/recall --
/// the commit is a pure no-op (the original: "we ignore the new size and
/// mtime since they are going to be changed again by truncate"). Otherwise,
/// `mtime`/`atime` advance (never backward, per `new_time`'s forward-only
/// rule), `i_size` advances if `last_write` pushed past it, and any
/// device-size delta accumulates onto the file node's running total.
pub fn layout_commit(
    file: &FileNode,
    args: LayoutCommitArgs,
    now: std::time::SystemTime,
    in_layout_recall: bool,
) -> Result<LayoutCommitResult> {
    if in_layout_recall {
        info!("layout_commit no-op: file is mid-recall");
        return Ok(LayoutCommitResult::default());
    }
    let mut guard = file.lock();
    let new_size = guard.apply_commit(args.new_time, now, args.last_write, args.dsu_delta);
    Ok(LayoutCommitResult { new_size })
}

/// `LayoutReturn` (`§4.6`): the client is done with a layout, whether
/// because it chose to return it or because it's satisfying a recall.
/// Detaches the layout from wherever it lives (the file's live set, or a
/// recall's absorbed set), frees its arena slot, drains any I/O errors the
/// caller reports against it, and garbage-collects any recall left empty --
/// waking that recall's waiter, if it had one (`§4.3` step 5, the original's
/// `if (waiter) complete(waiter);`).
pub fn layout_return(
    file: &FileNode,
    root: &RootNode,
    handle: &mut FileHandle,
    layout_id: LayoutId,
    io_errors: impl IntoIterator<Item = (Range, Status)>,
    sink: &mut dyn IoErrorSink,
) -> Result<()> {
    let (removed, waiters) = root::with_file_and_root(file, root, |f, r| {
        if f.is_live(layout_id) {
            return (f.free_layout(layout_id), Vec::new());
        }
        // Not live: it may be sitting inside one of this file's recalls
        // instead, absorbed there by an earlier `layout_recall` (`I1`: it's
        // reachable from exactly one of the two places, never both).
        let candidates: Vec<_> = f.recalls_for_this_file.iter().copied().collect();
        for recall_id in candidates {
            if let Some(recall) = r.recalls.get_mut(recall_id) {
                if recall.layouts.remove(&layout_id) {
                    let freed = f.free_layout(layout_id);
                    let waiters = root::remove_empty_recalls(f, r);
                    return (freed, waiters);
                }
            }
        }
        (None, Vec::new())
    });

    handle.owned.remove(&layout_id);

    // Invoked with both locks released: a waiter is free to do anything once
    // woken, including re-entering this crate.
    for waiter in waiters {
        waiter();
    }

    match removed {
        Some(_layout) => {
            for (range, status) in io_errors {
                sink.report(range, status);
            }
            Ok(())
        }
        None => Err(Status::BadLayout),
    }
}

/// `GetDeviceInfo` (`§4.6`): resolve a device id and encode
/// `{system_id, osd_name, network_address, availability}` into `buf`, with a
/// leading length word reserved ahead of the body and backfilled once the
/// body's size is known. `DeviceId` out of range surfaces as `Status::NoEnt`
/// (the original's `-ENODEV` when `devno >= numdevs`), not a panic. Returns
/// the total number of bytes written to `buf`, including the length word.
pub fn get_device_info(directory: &dyn DeviceDirectory, id: DeviceId, buf: &mut [u8]) -> Result<usize> {
    let info = directory.lookup(id)?;
    let mut enc = crate::xdr::Encoder::new(buf);
    let len_at = enc.reserve_len()?;
    let body_start = enc.len();
    enc.put_u64(info.system_id)?;
    enc.put_opaque(info.osd_name.as_bytes())?;
    enc.put_opaque(info.network_address.as_bytes())?;
    enc.put_bool(info.available)?;
    let body_len = enc.len() - body_start;
    enc.backfill_len(len_at, body_len as u32);
    Ok(enc.len())
}

/// `ReceiveRecalls` (`§4.4`): thin pass-through to [`RootNode::receive_recalls`]
/// using the server's configured batch size when the caller doesn't specify
/// one.
pub fn receive_recalls(
    root: &RootNode,
    config: &DataServerConfig,
    max_events: Option<usize>,
    allow_sleep: bool,
) -> Result<Vec<RecallEvent>> {
    root.receive_recalls(max_events.unwrap_or(config.max_recall_batch), allow_sleep)
}

/// `CancelRecalls` (`§4.4`, `§6.2`): if `debug_magic` is nonzero, this is the
/// source's testing hook -- sweep `files` with a wildcard `Any` recall over
/// `[0, infinity)` and report whether any of them actually queued one,
/// rather than touching the cancellation flag at all. Otherwise, the normal
/// path: set the root's one-shot cancellation flag and wake the event
/// channel, always returning `false`.
pub fn cancel_recalls<'a>(root: &RootNode, debug_magic: u64, files: impl IntoIterator<Item = &'a FileNode>) -> bool {
    if debug_magic != 0 {
        return root.debug_recall_all(files);
    }
    root.cancel_recalls();
    false
}

/// Release every layout a closing file handle owns (`§4.1`/`§4.8`), waking
/// up any recall waiting on them.
pub fn close_handle(file: &FileNode, root: &RootNode, handle: FileHandle) {
    let (released, waiters) = root::with_file_and_root(file, root, |f, r| {
        let released = FileNode::release_handle_locked(f, r, handle);
        let waiters = root::remove_empty_recalls(f, r);
        (released, waiters)
    });
    if !released.is_empty() {
        warn!("closed handle released {} outstanding layout(s)", released.len());
    }
    for waiter in waiters {
        waiter();
    }
    root.notify();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CLIENT_WILDCARD_REQUEST;

    fn striping() -> StripingLayout {
        StripingLayout {
            stripe_unit: 4096,
            group_width: 1,
            group_depth: 1,
            mirrors: 1,
            parity: 0,
        }
    }

    #[test]
    fn layout_get_then_return_round_trips() {
        let file = FileNode::new();
        let root = RootNode::new();
        let mut handle = FileHandle::new();
        let config = DataServerConfig::default();
        let mut buf = [0u8; 256];

        let granted = layout_get(
            &file,
            &root,
            &mut handle,
            &striping(),
            Segment {
                range: Range::new(0, 4096),
                mode: IoMode::READ,
            },
            1,
            Capability(1),
            &config,
            &mut buf,
            &[],
        )
        .unwrap();
        assert!(!granted.required_recall);
        assert!(granted.encoded_len > 0);

        let mut sink = NullIoErrorSink;
        layout_return(&file, &root, &mut handle, granted.id, std::iter::empty(), &mut sink).unwrap();
        assert!(handle.is_empty());
    }

    #[test]
    fn map_growth_widens_recall_to_infinity_when_past_i_size() {
        // S5: i_size == 0 and the aligned RW-redundant range extends past
        // it, so the synchronous recall must use [0, infinity), not just
        // the aligned segment.
        let file = FileNode::new();
        let root = RootNode::new();
        let mut handle_a = FileHandle::new();
        let mut handle_b = FileHandle::new();
        let config = DataServerConfig::default();
        let mut buf = [0u8; 256];
        let layout = StripingLayout {
            stripe_unit: 4096,
            group_width: 3,
            group_depth: 1,
            mirrors: 1,
            parity: 1,
        };
        layout_get(
            &file,
            &root,
            &mut handle_a,
            &layout,
            Segment {
                range: Range::new(0, 4096),
                mode: IoMode::READ_WRITE,
            },
            1,
            Capability(1),
            &config,
            &mut buf,
            &[],
        )
        .unwrap();
        layout_get(
            &file,
            &root,
            &mut handle_b,
            &layout,
            Segment {
                range: Range::new(0, 4096),
                mode: IoMode::READ_WRITE,
            },
            2,
            Capability(2),
            &config,
            &mut buf,
            &[],
        )
        .unwrap_err();

        let events = root.receive_recalls(8, false).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].segment, Range::to_infinity(0));
    }

    #[test]
    fn returning_unknown_layout_is_bad_layout() {
        let file = FileNode::new();
        let root = RootNode::new();
        let mut handle = FileHandle::new();
        let mut sink = NullIoErrorSink;
        let bogus_id = {
            let mut arena: crate::arena::Arena<Layout> = crate::arena::Arena::new();
            let id = arena.insert(Layout {
                segment: Segment {
                    range: Range::new(0, 1),
                    mode: IoMode::READ,
                },
                client_id: 1,
                capability: Capability(1),
            });
            arena.remove(id);
            id
        };
        assert_eq!(
            layout_return(&file, &root, &mut handle, bogus_id, std::iter::empty(), &mut sink),
            Err(Status::BadLayout)
        );
    }

    #[test]
    fn redundant_write_get_queues_a_recall_against_other_clients() {
        let file = FileNode::new();
        let root = RootNode::new();
        let mut handle_a = FileHandle::new();
        let mut handle_b = FileHandle::new();
        let config = DataServerConfig::default();
        let mut buf = [0u8; 256];
        let layout = StripingLayout {
            stripe_unit: 4096,
            group_width: 3,
            group_depth: 1,
            mirrors: 1,
            parity: 1,
        };

        layout_get(
            &file,
            &root,
            &mut handle_a,
            &layout,
            Segment {
                range: Range::new(0, 4096),
                mode: IoMode::READ_WRITE,
            },
            1,
            Capability(1),
            &config,
            &mut buf,
            &[],
        )
        .unwrap();

        let err = layout_get(
            &file,
            &root,
            &mut handle_b,
            &layout,
            Segment {
                range: Range::new(0, 4096),
                mode: IoMode::READ_WRITE,
            },
            2,
            Capability(2),
            &config,
            &mut buf,
            &[],
        )
        .unwrap_err();
        assert_eq!(err, Status::RecallConflict);

        let events = root.receive_recalls(8, false).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].client_id, 1);
        let _ = CLIENT_WILDCARD_REQUEST;
    }

    #[test]
    fn layout_commit_is_noop_during_recall() {
        let file = FileNode::new();
        let now = std::time::SystemTime::now();
        let result = layout_commit(
            &file,
            LayoutCommitArgs {
                last_write: Some(4095),
                ..Default::default()
            },
            now,
            true,
        )
        .unwrap();
        assert_eq!(result.new_size, None);
        assert_eq!(file.lock().i_size(), 0);
    }

    #[test]
    fn layout_commit_advances_size_and_time() {
        let file = FileNode::new();
        let now = std::time::SystemTime::now();
        let result = layout_commit(
            &file,
            LayoutCommitArgs {
                last_write: Some(4095),
                dsu_delta: Some(512),
                ..Default::default()
            },
            now,
            false,
        )
        .unwrap();
        assert_eq!(result.new_size, Some(4096));
        let guard = file.lock();
        assert_eq!(guard.i_size(), 4096);
        assert_eq!(guard.dev_size(), 512);
        assert_eq!(guard.mtime(), now);
    }

    #[test]
    fn layout_commit_never_shrinks_size() {
        let file = FileNode::new();
        let now = std::time::SystemTime::now();
        layout_commit(
            &file,
            LayoutCommitArgs {
                last_write: Some(8191),
                ..Default::default()
            },
            now,
            false,
        )
        .unwrap();
        let result = layout_commit(
            &file,
            LayoutCommitArgs {
                last_write: Some(4095),
                ..Default::default()
            },
            now,
            false,
        )
        .unwrap();
        assert_eq!(result.new_size, None);
        assert_eq!(file.lock().i_size(), 8192);
    }

    #[test]
    fn layout_commit_time_cannot_move_backward() {
        let file = FileNode::new();
        let later = std::time::SystemTime::now();
        let earlier = later - std::time::Duration::from_secs(60);
        layout_commit(
            &file,
            LayoutCommitArgs {
                new_time: Some(later),
                ..Default::default()
            },
            later,
            false,
        )
        .unwrap();
        layout_commit(
            &file,
            LayoutCommitArgs {
                new_time: Some(earlier),
                ..Default::default()
            },
            later,
            false,
        )
        .unwrap();
        assert_eq!(file.lock().mtime(), later);
    }

    #[test]
    fn get_device_info_backfills_body_length() {
        let mut table = crate::device::DeviceTable::new();
        let id = DeviceId {
            super_block_id: 1,
            device_index: 0,
        };
        table.register(
            id,
            DeviceInfo {
                system_id: 42,
                osd_name: "osd0".to_string(),
                network_address: "10.0.0.1:860".to_string(),
                available: true,
            },
        );
        let mut buf = [0u8; 256];
        let total = get_device_info(&table, id, &mut buf).unwrap();
        let mut dec = crate::xdr::Decoder::new(&buf[..total]);
        let body_len = dec.get_u32().unwrap() as usize;
        assert_eq!(body_len, total - 4);
        assert_eq!(dec.get_u64().unwrap(), 42);
        assert_eq!(dec.get_opaque().unwrap(), b"osd0");
    }

    #[test]
    fn get_device_info_unknown_device_is_no_ent() {
        let table = crate::device::DeviceTable::new();
        let mut buf = [0u8; 256];
        let id = DeviceId {
            super_block_id: 9,
            device_index: 9,
        };
        assert_eq!(get_device_info(&table, id, &mut buf), Err(Status::NoEnt));
    }

    #[test]
    fn layout_get_surfaces_too_small_unchanged() {
        let file = FileNode::new();
        let root = RootNode::new();
        let mut handle = FileHandle::new();
        let config = DataServerConfig::default();
        let mut buf = [0u8; 4]; // not enough room for the layout header
        let err = layout_get(
            &file,
            &root,
            &mut handle,
            &striping(),
            Segment {
                range: Range::new(0, 4096),
                mode: IoMode::READ,
            },
            1,
            Capability(1),
            &config,
            &mut buf,
            &[],
        )
        .unwrap_err();
        assert_eq!(err, Status::TooSmall);
        assert!(handle.is_empty(), "a failed encode must not grant the layout");
    }

    #[test]
    fn cancel_recalls_suppresses_sleep_once() {
        let root = RootNode::new();
        cancel_recalls(&root, 0, std::iter::empty());
        assert_eq!(root.receive_recalls(8, true).unwrap(), Vec::new());
        // The flag was consumed by the call above; a second call would block
        // forever if `allow_sleep` were true and nothing were queued, so
        // this only checks the non-sleeping path stays non-blocking.
        assert_eq!(root.receive_recalls(8, false).unwrap(), Vec::new());
    }

    #[test]
    fn layout_return_wakes_the_recalls_waiter() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let file = FileNode::new();
        let root = RootNode::new();
        let mut handle = FileHandle::new();
        let config = DataServerConfig::default();
        let mut buf = [0u8; 256];

        let granted = layout_get(
            &file,
            &root,
            &mut handle,
            &striping(),
            Segment {
                range: Range::new(0, 4096),
                mode: IoMode::READ,
            },
            1,
            Capability(1),
            &config,
            &mut buf,
            &[],
        )
        .unwrap();

        let woken = Arc::new(AtomicBool::new(false));
        let woken_clone = Arc::clone(&woken);
        let outcome = root::with_file_and_root(&file, &root, |f, r| {
            recall::layout_recall(
                f,
                r,
                IoMode::ANY,
                Range::new(0, 4096),
                CLIENT_WILDCARD_REQUEST,
                Some(Box::new(move || woken_clone.store(true, Ordering::SeqCst))),
            )
        });
        assert!(matches!(outcome, RecallOutcome::Queued(_)));

        let mut sink = NullIoErrorSink;
        layout_return(&file, &root, &mut handle, granted.id, std::iter::empty(), &mut sink).unwrap();

        assert!(woken.load(Ordering::SeqCst), "emptying the recall must wake its waiter");
    }

    #[test]
    fn close_handle_resolves_a_recall_that_absorbed_one_of_its_layouts() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let file = FileNode::new();
        let root = RootNode::new();
        let mut handle_a = FileHandle::new();
        let config = DataServerConfig::default();
        let mut buf = [0u8; 256];

        layout_get(
            &file,
            &root,
            &mut handle_a,
            &striping(),
            Segment {
                range: Range::new(0, 4096),
                mode: IoMode::READ,
            },
            1,
            Capability(1),
            &config,
            &mut buf,
            &[],
        )
        .unwrap();

        let woken = Arc::new(AtomicBool::new(false));
        let woken_clone = Arc::clone(&woken);
        let outcome = root::with_file_and_root(&file, &root, |f, r| {
            recall::layout_recall(
                f,
                r,
                IoMode::ANY,
                Range::new(0, 4096),
                CLIENT_WILDCARD_REQUEST,
                Some(Box::new(move || woken_clone.store(true, Ordering::SeqCst))),
            )
        });
        let recall_id = match outcome {
            RecallOutcome::Queued(id) => id,
            other => panic!("expected the read layout to conflict with the wildcard recall: {other:?}"),
        };

        // handle_a's only layout was absorbed into the recall above (I1: it
        // moved out of the live set), so it's no longer handle_a's to return.
        // Closing handle_a must still resolve the recall instead of leaking
        // it forever waiting on a `LayoutReturn` that can now never come.
        close_handle(&file, &root, handle_a);

        assert!(
            woken.load(Ordering::SeqCst),
            "closing the only handle holding the recalled layout must resolve it"
        );
        assert!(!root.lock().recalls.contains(recall_id));
    }

    #[test]
    fn cancel_recalls_does_not_discard_queued_events() {
        let file = FileNode::new();
        let root = RootNode::new();
        let config = DataServerConfig::default();
        let layout = StripingLayout {
            stripe_unit: 4096,
            group_width: 3,
            group_depth: 1,
            mirrors: 1,
            parity: 1,
        };
        let mut handle_a = FileHandle::new();
        let mut handle_b = FileHandle::new();
        let mut buf = [0u8; 256];
        layout_get(
            &file,
            &root,
            &mut handle_a,
            &layout,
            Segment {
                range: Range::new(0, 4096),
                mode: IoMode::READ_WRITE,
            },
            1,
            Capability(1),
            &config,
            &mut buf,
            &[],
        )
        .unwrap();
        layout_get(
            &file,
            &root,
            &mut handle_b,
            &layout,
            Segment {
                range: Range::new(0, 4096),
                mode: IoMode::READ_WRITE,
            },
            2,
            Capability(2),
            &config,
            &mut buf,
            &[],
        )
        .unwrap_err();

        cancel_recalls(&root, 0, std::iter::empty());
        let events = root.receive_recalls(8, true).unwrap();
        assert_eq!(events.len(), 1, "cancellation must not drop already-queued events");
    }
}
