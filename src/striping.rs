//! Striping math: aligning a requested range to stripe/group boundaries.
//!
//! A pure function of the file's layout descriptor (`§4.7`), grounded on
//! `_align_io` in `original_source/fs/exofs/export_ioctl.c`.

use crate::ids::IoMode;
use crate::layout::Segment;

/// Redundancy-relevant geometry of a striped layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripingLayout {
    pub stripe_unit: u64,
    pub group_width: u64,
    pub group_depth: u64,
    pub mirrors: u64,
    pub parity: u64,
}

impl StripingLayout {
    fn stripe_size(&self) -> u64 {
        (self.group_width - self.parity) * self.stripe_unit
    }

    fn group_size(&self) -> u64 {
        self.stripe_size() * self.group_depth
    }

    fn is_redundant(&self) -> bool {
        self.parity > 0 || self.mirrors > 1
    }
}

/// Result of aligning a requested segment to the layout's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    pub segment: Segment,
    /// True when the alignment expanded to RW-redundant shared stripes,
    /// meaning the caller must synchronously recall conflicting writers
    /// before handing out the new layout (`§4.3` step 2).
    pub need_recall: bool,
}

/// Snap `requested` down to a stripe or group boundary per `§4.7`:
///
/// - Read, or non-redundant: snap `offset` down to a multiple of
///   `group_size`, widen `length` to `group_size`. `need_recall = false`.
/// - ReadWrite with redundancy (parity or mirrors): snap `offset` down to a
///   multiple of `stripe_size`, widen `length` to
///   `stripe_size * shared_stripes`. `need_recall = true`.
pub fn align(layout: &StripingLayout, requested: Segment, shared_stripes: u64) -> Alignment {
    if requested.mode != IoMode::READ && layout.is_redundant() {
        let stripe_size = layout.stripe_size();
        let offset = (requested.range.offset / stripe_size) * stripe_size;
        let length = stripe_size * shared_stripes;
        Alignment {
            segment: Segment {
                range: crate::range::Range::new(offset, length),
                mode: requested.mode,
            },
            need_recall: true,
        }
    } else {
        let group_size = layout.group_size();
        let offset = (requested.range.offset / group_size) * group_size;
        Alignment {
            segment: Segment {
                range: crate::range::Range::new(offset, group_size),
                mode: requested.mode,
            },
            need_recall: false,
        }
    }
}
