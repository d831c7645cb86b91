//! A client's open-file handle and the layouts it currently owns.
//!
//! Grounded on the per-`pnfs_osd_cred`/open-owner bookkeeping described in
//! `§4.1`/`§4.8`: closing a handle (or the file itself going away) must
//! release every layout that handle was ever granted, so recalls blocked on
//! those layouts can make progress.

use std::collections::HashSet;

use crate::layout::LayoutId;

/// Tracks which layouts were handed out against a particular open-file
/// handle, so closing it can detach all of them in one step.
#[derive(Debug, Default)]
pub struct FileHandle {
    pub(crate) owned: HashSet<LayoutId>,
}

impl FileHandle {
    pub fn new() -> Self {
        FileHandle::default()
    }

    pub fn owned_layouts(&self) -> impl Iterator<Item = LayoutId> + '_ {
        self.owned.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::ids::{Capability, IoMode};
    use crate::layout::{Layout, Segment};
    use crate::range::Range;

    #[test]
    fn owned_layouts_reflects_arena_inserts() {
        let mut arena: Arena<Layout> = Arena::new();
        let mut handle = FileHandle::new();
        let id = arena.insert(Layout {
            segment: Segment {
                range: Range::new(0, 4096),
                mode: IoMode::READ,
            },
            client_id: 1,
            capability: Capability(1),
        });
        handle.owned.insert(id);
        assert!(!handle.is_empty());
        assert_eq!(handle.owned_layouts().count(), 1);
    }
}
