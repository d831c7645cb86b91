//! A single issued layout lease.

use crate::arena::Index;
use crate::ids::{Capability, IoMode};
use crate::range::Range;

/// A byte range plus the I/O mode it was granted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub range: Range,
    pub mode: IoMode,
}

/// An issued lease over a byte range of a file.
///
/// Lives in exactly one of: a file node's live-layout set plus a file
/// handle's owned-layout set (reachable simultaneously from both, per `I1`),
/// or a single recall's layout list. Never both, never neither while live.
#[derive(Debug, Clone)]
pub struct Layout {
    pub segment: Segment,
    pub client_id: u64,
    pub capability: Capability,
}

/// A typed handle to a [`Layout`] stored in a [`crate::file_node::FileNode`]'s
/// arena.
pub type LayoutId = Index<Layout>;
