//! Segments are the building blocks of an [`IndexSet`](crate::IndexSet).
//! - A segment is a base index plus up to `MAX_SEGMENT_SIZE` local `u16` offsets.
//! - Real index = `base + offset`; offsets are strictly increasing and below
//!   `MAX_SEGMENT_SIZE`, so a segment spans fewer than `MAX_SEGMENT_SIZE` indices.
//! - Offsets are stored either implicitly (a contiguous range, no storage at all)
//!   or as an explicit slice borrowed from an arena.
//! - Segments never own memory. They are `Copy` and cheap to slice and shift.

use std::ops::Range;

use crate::static_offsets::{MAX_SEGMENT_SIZE, static_offsets_prefix};

/// Runs shorter than this are linearly probed before switching to a galloping
/// search in [`contiguous_run_len`].
const LINEAR_PROBE_LEN: usize = 8;

/// Storage of the local offsets of a [`Segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentOffsets<'a> {
    /// The offsets are `[0, len)`. Nothing is stored; the static identity
    /// table stands in whenever a slice is required.
    Range { len: u16 },
    /// Strictly increasing offsets, each below `MAX_SEGMENT_SIZE`.
    Explicit(&'a [u16]),
}

/// A run of selected indices sharing one base offset.
///
/// Overview
/// - `base` is added to every local offset to produce a real index.
/// - Offsets are either a contiguous range or an explicit sorted list, see
///   [`SegmentOffsets`].
/// - A segment references its offsets; the memory belongs to an
///   [`IndexArena`](crate::IndexArena) or to the static identity table.
///
/// Contracts
/// - Offsets are strictly increasing and below [`MAX_SEGMENT_SIZE`]. Debug builds
///   verify this on construction.
#[derive(Clone, Copy)]
pub struct Segment<'a> {
    base: i64,
    offsets: SegmentOffsets<'a>,
}

impl Segment<'static> {
    /// Creates a segment covering `[start, start + len)`.
    ///
    /// # Panics
    ///
    /// Panics if `len > MAX_SEGMENT_SIZE`.
    #[inline]
    pub fn range(start: i64, len: usize) -> Segment<'static> {
        assert!(len <= MAX_SEGMENT_SIZE, "segment length {len} out of bounds");
        Segment {
            base: start,
            offsets: SegmentOffsets::Range { len: len as u16 },
        }
    }
}

impl<'a> Segment<'a> {
    /// Creates a segment from explicit local offsets.
    ///
    /// `offsets` must be strictly increasing and below `MAX_SEGMENT_SIZE`.
    #[inline]
    pub fn explicit(base: i64, offsets: &'a [u16]) -> Segment<'a> {
        debug_assert!(
            offsets.is_sorted_by(|a, b| a < b),
            "segment offsets must be strictly increasing"
        );
        debug_assert!(
            offsets
                .last()
                .is_none_or(|&last| (last as usize) < MAX_SEGMENT_SIZE),
            "segment offsets must be below {MAX_SEGMENT_SIZE}"
        );
        Segment {
            base,
            offsets: SegmentOffsets::Explicit(offsets),
        }
    }

    #[inline]
    pub fn base(&self) -> i64 {
        self.base
    }

    #[inline]
    pub fn offsets(&self) -> SegmentOffsets<'a> {
        self.offsets
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self.offsets {
            SegmentOffsets::Range { len } => len as usize,
            SegmentOffsets::Explicit(offsets) => offsets.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the local offsets as a slice. Range segments borrow a prefix of
    /// the static identity table.
    #[inline]
    pub fn local_offsets(&self) -> &'a [u16] {
        match self.offsets {
            SegmentOffsets::Range { len } => static_offsets_prefix(len as usize),
            SegmentOffsets::Explicit(offsets) => offsets,
        }
    }

    /// Returns `true` if the indices of this segment are consecutive.
    ///
    /// This holds for range storage and for explicit offsets without gaps.
    #[inline]
    pub fn is_range(&self) -> bool {
        match self.offsets {
            SegmentOffsets::Range { .. } => true,
            SegmentOffsets::Explicit(offsets) => match (offsets.first(), offsets.last()) {
                (Some(&first), Some(&last)) => (last - first) as usize + 1 == offsets.len(),
                _ => true,
            },
        }
    }

    /// Returns the covered indices as a range if they are consecutive.
    #[inline]
    pub fn to_range(&self) -> Option<Range<i64>> {
        if self.is_empty() {
            return Some(self.base..self.base);
        }
        self.is_range().then(|| self.first()..self.last() + 1)
    }

    /// Returns the `i`-th index of the segment.
    #[inline]
    pub fn get(&self, i: usize) -> i64 {
        match self.offsets {
            SegmentOffsets::Range { len } => {
                debug_assert!(i < len as usize);
                self.base + i as i64
            }
            SegmentOffsets::Explicit(offsets) => self.base + offsets[i] as i64,
        }
    }

    /// Smallest index of a non-empty segment.
    #[inline]
    pub fn first(&self) -> i64 {
        self.get(0)
    }

    /// Largest index of a non-empty segment.
    #[inline]
    pub fn last(&self) -> i64 {
        self.get(self.len() - 1)
    }

    /// Half-open interval `[first, last + 1)`; empty for an empty segment.
    #[inline]
    pub fn bounds(&self) -> Range<i64> {
        if self.is_empty() {
            self.base..self.base
        } else {
            self.first()..self.last() + 1
        }
    }

    /// Returns the sub-segment holding the elements at positions `range`.
    ///
    /// Range segments fold the start into the base; explicit segments keep the
    /// base and narrow the offset slice. No memory is copied.
    #[inline]
    pub fn slice(&self, range: Range<usize>) -> Segment<'a> {
        assert!(
            range.start <= range.end && range.end <= self.len(),
            "slice {range:?} out of bounds for segment of length {}",
            self.len()
        );
        match self.offsets {
            SegmentOffsets::Range { .. } => Segment {
                base: self.base + range.start as i64,
                offsets: SegmentOffsets::Range {
                    len: (range.end - range.start) as u16,
                },
            },
            SegmentOffsets::Explicit(offsets) => Segment {
                base: self.base,
                offsets: SegmentOffsets::Explicit(&offsets[range]),
            },
        }
    }

    /// Returns the same segment with every index moved by `offset`. The offset
    /// storage is shared.
    #[inline]
    pub fn shift(&self, offset: i64) -> Segment<'a> {
        Segment {
            base: self.base + offset,
            offsets: self.offsets,
        }
    }

    /// Position of `index` within the segment, if present.
    pub fn find(&self, index: i64) -> Option<usize> {
        let local = index - self.base;
        match self.offsets {
            SegmentOffsets::Range { len } => (0..len as i64)
                .contains(&local)
                .then_some(local as usize),
            SegmentOffsets::Explicit(offsets) => {
                if !(0..MAX_SEGMENT_SIZE as i64).contains(&local) {
                    return None;
                }
                offsets.binary_search(&(local as u16)).ok()
            }
        }
    }

    /// Position of the smallest index `>= index`, if any.
    pub fn find_first_at_or_after(&self, index: i64) -> Option<usize> {
        let local = index - self.base;
        let pos = match self.offsets {
            SegmentOffsets::Range { len } => local.clamp(0, len as i64) as usize,
            SegmentOffsets::Explicit(offsets) => {
                offsets.partition_point(|&offset| (offset as i64) < local)
            }
        };
        (pos < self.len()).then_some(pos)
    }

    /// Position of the largest index `<= index`, if any.
    pub fn find_last_at_or_before(&self, index: i64) -> Option<usize> {
        let local = index - self.base;
        let count = match self.offsets {
            SegmentOffsets::Range { len } => (local + 1).clamp(0, len as i64) as usize,
            SegmentOffsets::Explicit(offsets) => {
                offsets.partition_point(|&offset| (offset as i64) <= local)
            }
        };
        count.checked_sub(1)
    }

    /// Calls `f` for every index in ascending order.
    #[inline]
    pub fn foreach_index(&self, mut f: impl FnMut(i64)) {
        match self.offsets {
            SegmentOffsets::Range { len } => {
                (self.base..self.base + len as i64).for_each(f);
            }
            SegmentOffsets::Explicit(offsets) => {
                for &offset in offsets {
                    f(self.base + offset as i64);
                }
            }
        }
    }

    /// Iterator over the indices of the segment.
    pub fn indices(&self) -> SegmentIndices<'a> {
        SegmentIndices {
            base: self.base,
            offsets: self.local_offsets().iter(),
        }
    }

    /// Iterator over the maximal runs of consecutive indices.
    pub fn runs(&self) -> SegmentRuns<'a> {
        SegmentRuns {
            segment: *self,
            pos: 0,
        }
    }
}

impl std::fmt::Debug for Segment<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.offsets {
            SegmentOffsets::Range { len } => {
                write!(f, "Segment::Range({:?})", self.base..self.base + len as i64)
            }
            SegmentOffsets::Explicit(offsets) => f
                .debug_struct("Segment::Explicit")
                .field("base", &self.base)
                .field("len", &offsets.len())
                .finish(),
        }
    }
}

/// Iterator over the indices of a [`Segment`].
#[derive(Clone)]
pub struct SegmentIndices<'a> {
    base: i64,
    offsets: std::slice::Iter<'a, u16>,
}

impl Iterator for SegmentIndices<'_> {
    type Item = i64;

    #[inline]
    fn next(&mut self) -> Option<i64> {
        self.offsets.next().map(|&offset| self.base + offset as i64)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.offsets.size_hint()
    }
}

impl DoubleEndedIterator for SegmentIndices<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<i64> {
        self.offsets
            .next_back()
            .map(|&offset| self.base + offset as i64)
    }
}

impl ExactSizeIterator for SegmentIndices<'_> {}

/// Iterator over the maximal runs of consecutive indices in a [`Segment`].
#[derive(Clone)]
pub struct SegmentRuns<'a> {
    segment: Segment<'a>,
    pos: usize,
}

impl Iterator for SegmentRuns<'_> {
    type Item = Range<i64>;

    fn next(&mut self) -> Option<Range<i64>> {
        if self.pos >= self.segment.len() {
            return None;
        }
        let base = self.segment.base;
        match self.segment.offsets {
            SegmentOffsets::Range { len } => {
                self.pos = len as usize;
                Some(base..base + len as i64)
            }
            SegmentOffsets::Explicit(offsets) => {
                let rest = &offsets[self.pos..];
                let run = contiguous_run_len(rest);
                self.pos += run;
                let start = base + rest[0] as i64;
                Some(start..start + run as i64)
            }
        }
    }
}

/// Length of the contiguous run at the front of `offsets`.
///
/// Returns the largest `k` such that `offsets[..k]` are consecutive values.
/// Short runs are probed linearly; longer ones by doubling the probe distance
/// and then bisecting, so a run of length `k` costs `O(log k)` comparisons.
/// Also answers "distance to the next gap" for complement computations.
pub(crate) fn contiguous_run_len(offsets: &[u16]) -> usize {
    let Some(&first) = offsets.first() else {
        return 0;
    };
    let n = offsets.len();
    let is_run = |len: usize| (offsets[len - 1] - first) as usize == len - 1;

    let linear = n.min(LINEAR_PROBE_LEN);
    for len in 2..=linear {
        if !is_run(len) {
            return len - 1;
        }
    }
    if linear == n {
        return n;
    }

    // is_run(lo) holds and is_run(hi) does not.
    let mut lo = linear;
    let mut step = linear;
    let mut hi = loop {
        let probe = lo + step;
        if probe >= n {
            if is_run(n) {
                return n;
            }
            break n;
        }
        if is_run(probe) {
            lo = probe;
            step *= 2;
        } else {
            break probe;
        }
    };
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if is_run(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}
