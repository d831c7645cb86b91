//! The conflict predicate over `(range, mode, client)` triples.
//!
//! A pure function (`§4.2` / `§2.5`), grounded directly on `seg_conflict` in
//! `original_source/fs/exofs/pnfs_layout_logic.c`. Policy about *when* to
//! call it (e.g. only with mode `Any` or `ReadWrite`) belongs to the caller;
//! this function just answers "do these two things conflict".

use crate::ids::IoMode;
use crate::layout::Segment;
use crate::range::Range;

/// True if a live segment held by `seg_client` conflicts with a request for
/// `req_mode` over `req_range` made by `req_client`.
///
/// `req_client == 0` is a wildcard meaning "recall from everyone, including
/// the caller" (`§4.2`).
pub fn conflict(
    seg: Segment,
    req_mode: IoMode,
    req_range: Range,
    seg_client: u64,
    req_client: u64,
) -> bool {
    if req_client != crate::ids::CLIENT_WILDCARD_REQUEST && seg_client == req_client {
        return false;
    }
    if !seg.mode.intersects(req_mode) {
        return false;
    }
    seg.range.overlaps(&req_range)
}
