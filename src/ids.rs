//! Small opaque identifiers threaded through the layout/recall machinery.
//!
//! `caps`, `recall_file_info`, and `waiter` are collaborator-owned opaque
//! handles per the design notes (`§9`): the core stores, compares, and
//! passes them through, but never interprets their contents.

use bitflags::bitflags;

bitflags! {
    /// I/O mode of a layout segment or a recall request.
    ///
    /// Bit values follow the nfsstat4 `layoutiomode4` enum the original
    /// source encodes against (`READ = 1`, `READ_WRITE = 2`, `ANY = 3`), so
    /// that `Read | ReadWrite == Any` falls out of plain bitwise OR exactly
    /// as `recall->ev.seg.io_mode |= lo->seg.io_mode` does in
    /// `pnfs_layout_logic.c`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IoMode: u32 {
        /// Read-only access.
        const READ = 1 << 0;
        /// Read/write access.
        const READ_WRITE = 1 << 1;
        /// Query-only wildcard; live layouts never carry this mode.
        const ANY = Self::READ.bits() | Self::READ_WRITE.bits();
    }
}

/// A request client id of `0` is a wildcard meaning "recall from everyone,
/// including the caller" (`§4.2`).
pub const CLIENT_WILDCARD_REQUEST: u64 = 0;

/// A recall's `client_id` of `u64::MAX` means the event targets every client
/// (`I4`): it is set once two different clients contribute layouts to the
/// same recall.
pub const CLIENT_ANY: u64 = u64::MAX;

/// Identifies an object-storage device within an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId {
    pub super_block_id: u64,
    pub device_index: u64,
}

/// Opaque credential granting a client I/O access to an object; owned by
/// exactly one [`crate::layout::Layout`] and released exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capability(pub u64);

/// Opaque per-file token supplied by the consumer and echoed back on recall
/// events; identifies the NFS server-side file context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecallFileInfo(pub u64);

/// A one-shot wake for whatever blocked on a recall's return.
///
/// Modeled as an opaque callback rather than a trait: the core only ever
/// consumes it exactly once, via [`FnOnce`], and never inspects what it does.
pub type Waiter = Box<dyn FnOnce() + Send>;
