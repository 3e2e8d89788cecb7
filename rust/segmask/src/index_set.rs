//! The segmented index set: an ordered, duplicate-free selection of `i64`
//! indices stored as a table of [`Segment`]s.

use std::ops::Range;

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use segmask_ranges::{RangeIteratorsExt, complement_ranges};

use crate::arena::IndexArena;
use crate::bit_array::BitArray;
use crate::config::ExecutionConfig;
use crate::index_value::IndexValue;
use crate::iter::{Indices, Ranges};
use crate::segment::Segment;
use crate::static_offsets::MAX_SEGMENT_SIZE;

const N: i64 = MAX_SEGMENT_SIZE as i64;

/// Location of an element: the segment it lives in and its position inside
/// that segment, as seen through the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SegmentPosition {
    pub segment: usize,
    pub index_in_segment: usize,
}

impl SegmentPosition {
    pub fn new(segment: usize, index_in_segment: usize) -> SegmentPosition {
        SegmentPosition {
            segment,
            index_in_segment,
        }
    }
}

/// A sorted, duplicate-free set of non-negative `i64` indices.
///
/// Overview
/// - Indices are grouped into segments of at most `MAX_SEGMENT_SIZE` elements,
///   each a base index plus `u16` local offsets (see [`Segment`]).
/// - A set is a lightweight `Copy` view. Its segment table, cumulative size
///   table and offset arrays live in an [`IndexArena`] (or nowhere at all for
///   a plain range) and are shared by every copy and slice of the view.
/// - Slicing narrows the view without copying storage. Shifting allocates only
///   a new segment table.
///
/// Layout
/// - `Range`: a single contiguous run `[start, start + size)` with no storage.
///   Segments are synthesized on demand in chunks of `MAX_SEGMENT_SIZE`.
/// - `Segmented`: a borrowed segment table plus cumulative sizes, with the
///   view possibly starting inside the first segment and ending inside the
///   last.
///
/// Positions
/// - Position `p` is the rank of an element, `0 <= p < size()`. A
///   [`SegmentPosition`] names the same element by segment and offset inside
///   the segment as seen through this view.
#[derive(Clone, Copy)]
pub struct IndexSet<'a> {
    pub(crate) layout: Layout<'a>,
}

#[derive(Clone, Copy)]
pub(crate) enum Layout<'a> {
    Range { start: i64, size: i64 },
    Segmented(SegmentTable<'a>),
}

/// Borrowed segment table of a segmented set.
#[derive(Clone, Copy)]
pub(crate) struct SegmentTable<'a> {
    pub(crate) segments: &'a [Segment<'a>],
    /// `cumulative_sizes[i + 1] - cumulative_sizes[i] == segments[i].len()`.
    /// Only differences are meaningful: slices of a table keep the values of
    /// the table they came from.
    pub(crate) cumulative_sizes: &'a [i64],
    /// Elements of `segments[0]` excluded from the front of the view.
    pub(crate) begin_in_first: usize,
    /// Elements of the last segment included in the view.
    pub(crate) end_in_last: usize,
    pub(crate) size: i64,
}

impl<'a> SegmentTable<'a> {
    #[inline]
    fn segment(&self, i: usize) -> Segment<'a> {
        let segment = self.segments[i];
        let start = if i == 0 { self.begin_in_first } else { 0 };
        let end = if i + 1 == self.segments.len() {
            self.end_in_last
        } else {
            segment.len()
        };
        if start == 0 && end == segment.len() {
            segment
        } else {
            segment.slice(start..end)
        }
    }

    /// Number of view elements before the first element of segment `i`.
    #[inline]
    fn position_of_segment(&self, i: usize) -> i64 {
        if i == 0 {
            0
        } else {
            self.cumulative_sizes[i] - self.cumulative_sizes[0] - self.begin_in_first as i64
        }
    }
}

impl<'a> IndexSet<'a> {
    /// The empty set.
    #[inline]
    pub const fn empty() -> IndexSet<'a> {
        IndexSet {
            layout: Layout::Range { start: 0, size: 0 },
        }
    }

    /// The set holding every index of `range`. Needs no storage.
    ///
    /// # Panics
    ///
    /// Panics if `range.start` is negative.
    #[inline]
    pub fn from_range(range: Range<i64>) -> IndexSet<'a> {
        assert!(range.start >= 0, "negative index {}", range.start);
        if range.is_empty() {
            return IndexSet::empty();
        }
        IndexSet {
            layout: Layout::Range {
                start: range.start,
                size: range.end - range.start,
            },
        }
    }

    /// Builds a set over `segments`, storing the segment and size tables in
    /// `arena`. Empty segments are not allowed.
    pub(crate) fn from_segments(
        segments: Vec<Segment<'a>>,
        arena: &'a IndexArena,
    ) -> IndexSet<'a> {
        if segments.is_empty() {
            return IndexSet::empty();
        }
        debug_assert!(segments.iter().all(|s| !s.is_empty()));
        debug_assert!(
            segments.windows(2).all(|w| w[0].last() < w[1].first()),
            "segments must be ordered and disjoint"
        );
        let mut cumulative_sizes = Vec::with_capacity(segments.len() + 1);
        let mut total = 0i64;
        cumulative_sizes.push(0);
        for segment in &segments {
            total += segment.len() as i64;
            cumulative_sizes.push(total);
        }
        let end_in_last = segments[segments.len() - 1].len();
        IndexSet {
            layout: Layout::Segmented(SegmentTable {
                segments: arena.adopt_segments(segments),
                cumulative_sizes: arena.adopt_sizes(cumulative_sizes),
                begin_in_first: 0,
                end_in_last,
                size: total,
            }),
        }
    }

    /// Number of indices in the set.
    #[inline]
    pub fn size(&self) -> i64 {
        match self.layout {
            Layout::Range { size, .. } => size,
            Layout::Segmented(table) => table.size,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns the set as a single half-open range if its indices are
    /// consecutive. The empty set yields `Some(0..0)`.
    #[inline]
    pub fn to_range(&self) -> Option<Range<i64>> {
        match self.layout {
            Layout::Range { start, size } => Some(start..start + size),
            Layout::Segmented(_) => {
                let (first, last) = (self.first()?, self.last()?);
                (last - first + 1 == self.size()).then_some(first..last + 1)
            }
        }
    }

    /// Smallest index.
    #[inline]
    pub fn first(&self) -> Option<i64> {
        match self.layout {
            Layout::Range { start, size } => (size > 0).then_some(start),
            Layout::Segmented(table) => Some(table.segment(0).first()),
        }
    }

    /// Largest index.
    #[inline]
    pub fn last(&self) -> Option<i64> {
        match self.layout {
            Layout::Range { start, size } => (size > 0).then_some(start + size - 1),
            Layout::Segmented(table) => Some(table.segment(table.segments.len() - 1).last()),
        }
    }

    /// `first..last + 1`, or `0..0` for the empty set.
    pub fn bounds(&self) -> Range<i64> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => first..last + 1,
            _ => 0..0,
        }
    }

    /// Length an array must have to be addressable by every index of the
    /// set: `last + 1`, or zero for the empty set.
    #[inline]
    pub fn min_array_size(&self) -> i64 {
        self.last().map_or(0, |last| last + 1)
    }

    /// Number of segments visible through this view.
    #[inline]
    pub fn segments_num(&self) -> usize {
        match self.layout {
            Layout::Range { size, .. } => (size as usize).div_ceil(MAX_SEGMENT_SIZE),
            Layout::Segmented(table) => table.segments.len(),
        }
    }

    /// The `i`-th segment of the view, trimmed to the view's bounds.
    ///
    /// # Panics
    ///
    /// Panics if `i >= segments_num()`.
    #[inline]
    pub fn segment(&self, i: usize) -> Segment<'a> {
        match self.layout {
            Layout::Range { start, size } => {
                let offset = i as i64 * N;
                assert!(offset < size, "segment {i} out of bounds");
                Segment::range(start + offset, (size - offset).min(N) as usize)
            }
            Layout::Segmented(table) => table.segment(i),
        }
    }

    /// Iterator over the segments of the view.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = Segment<'a>> + Clone + use<'a> {
        let set = *self;
        (0..set.segments_num()).map(move |i| set.segment(i))
    }

    /// Element at position `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside `[0, size())`.
    #[inline]
    pub fn get(&self, pos: i64) -> i64 {
        match self.layout {
            Layout::Range { start, size } => {
                assert!((0..size).contains(&pos), "position {pos} out of bounds");
                start + pos
            }
            Layout::Segmented(table) => {
                let sp = self.segment_position(pos);
                table.segment(sp.segment).get(sp.index_in_segment)
            }
        }
    }

    /// Converts a flat position to a segment position.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside `[0, size())`.
    pub fn segment_position(&self, pos: i64) -> SegmentPosition {
        assert!(
            (0..self.size()).contains(&pos),
            "position {pos} out of bounds (size: {})",
            self.size()
        );
        match self.layout {
            Layout::Range { .. } => SegmentPosition::new((pos / N) as usize, (pos % N) as usize),
            Layout::Segmented(table) => {
                let base = table.cumulative_sizes[0];
                let target = pos + table.begin_in_first as i64;
                let segment = table.cumulative_sizes[1..].partition_point(|&c| c - base <= target);
                let mut index = target - (table.cumulative_sizes[segment] - base);
                if segment == 0 {
                    index -= table.begin_in_first as i64;
                }
                SegmentPosition::new(segment, index as usize)
            }
        }
    }

    /// Converts a segment position back to a flat position.
    pub fn position_of(&self, sp: SegmentPosition) -> i64 {
        match self.layout {
            Layout::Range { .. } => sp.segment as i64 * N + sp.index_in_segment as i64,
            Layout::Segmented(table) => {
                table.position_of_segment(sp.segment) + sp.index_in_segment as i64
            }
        }
    }

    /// Number of leading segments for which `pred` holds. `pred` must be
    /// monotone: true for a prefix of the segments, false afterwards.
    fn partition_segments(&self, pred: impl Fn(&Segment<'a>) -> bool) -> usize {
        let (mut lo, mut hi) = (0, self.segments_num());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if pred(&self.segment(mid)) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Segment position of `index`, if it is a member.
    pub fn find(&self, index: i64) -> Option<SegmentPosition> {
        match self.layout {
            Layout::Range { start, size } => {
                let pos = index - start;
                (0..size)
                    .contains(&pos)
                    .then(|| SegmentPosition::new((pos / N) as usize, (pos % N) as usize))
            }
            Layout::Segmented(_) => {
                let i = self.partition_segments(|s| s.last() < index);
                if i == self.segments_num() {
                    return None;
                }
                self.segment(i)
                    .find(index)
                    .map(|p| SegmentPosition::new(i, p))
            }
        }
    }

    /// Segment position of the smallest member `>= index`.
    pub fn find_first_at_or_after(&self, index: i64) -> Option<SegmentPosition> {
        if self.is_empty() {
            return None;
        }
        let i = self.partition_segments(|s| s.last() < index);
        if i == self.segments_num() {
            return None;
        }
        self.segment(i)
            .find_first_at_or_after(index)
            .map(|p| SegmentPosition::new(i, p))
    }

    /// Segment position of the largest member `<= index`.
    pub fn find_last_at_or_before(&self, index: i64) -> Option<SegmentPosition> {
        if self.is_empty() {
            return None;
        }
        let count = self.partition_segments(|s| s.first() <= index);
        let i = count.checked_sub(1)?;
        self.segment(i)
            .find_last_at_or_before(index)
            .map(|p| SegmentPosition::new(i, p))
    }

    #[inline]
    pub fn contains(&self, index: i64) -> bool {
        self.find(index).is_some()
    }

    /// The elements at positions `[start, start + len)`, sharing storage with
    /// `self`.
    ///
    /// # Panics
    ///
    /// Panics if the position range is outside `[0, size()]`.
    pub fn slice(&self, start: i64, len: i64) -> IndexSet<'a> {
        assert!(
            start >= 0 && len >= 0 && start + len <= self.size(),
            "slice [{start}, {}) out of bounds (size: {})",
            start + len,
            self.size()
        );
        if len == 0 {
            return IndexSet::empty();
        }
        match self.layout {
            Layout::Range { start: first, .. } => IndexSet {
                layout: Layout::Range {
                    start: first + start,
                    size: len,
                },
            },
            Layout::Segmented(_) => {
                let first = self.segment_position(start);
                let last = self.segment_position(start + len - 1);
                self.slice_by_position(first, last, len)
            }
        }
    }

    /// The elements from `first` through `last` inclusive. `len` must be the
    /// number of elements between them, which the caller usually knows
    /// already.
    pub fn slice_by_position(
        &self,
        first: SegmentPosition,
        last: SegmentPosition,
        len: i64,
    ) -> IndexSet<'a> {
        debug_assert_eq!(self.position_of(last) - self.position_of(first) + 1, len);
        match self.layout {
            Layout::Range { .. } => self.slice(self.position_of(first), len),
            Layout::Segmented(table) => {
                let lead = if first.segment == 0 {
                    table.begin_in_first
                } else {
                    0
                };
                let trail = if last.segment == 0 {
                    table.begin_in_first
                } else {
                    0
                };
                IndexSet {
                    layout: Layout::Segmented(SegmentTable {
                        segments: &table.segments[first.segment..=last.segment],
                        cumulative_sizes: &table.cumulative_sizes
                            [first.segment..=last.segment + 1],
                        begin_in_first: lead + first.index_in_segment,
                        end_in_last: trail + last.index_in_segment + 1,
                        size: len,
                    }),
                }
            }
        }
    }

    /// The members that fall inside `range`, sharing storage with `self`.
    pub fn slice_content(&self, range: Range<i64>) -> IndexSet<'a> {
        if range.is_empty() || self.is_empty() {
            return IndexSet::empty();
        }
        if let Layout::Range { start, size } = self.layout {
            let lo = range.start.max(start);
            let hi = range.end.min(start + size);
            return if lo < hi {
                IndexSet::from_range(lo..hi)
            } else {
                IndexSet::empty()
            };
        }
        let (Some(first), Some(last)) = (
            self.find_first_at_or_after(range.start),
            self.find_last_at_or_before(range.end - 1),
        ) else {
            return IndexSet::empty();
        };
        let (lo, hi) = (self.position_of(first), self.position_of(last));
        if lo > hi {
            return IndexSet::empty();
        }
        self.slice_by_position(first, last, hi - lo + 1)
    }

    /// The same set with every index moved by `offset`.
    ///
    /// Local offset arrays are shared; only a new segment table is allocated.
    ///
    /// # Panics
    ///
    /// Panics if the smallest shifted index would be negative.
    pub fn shift<'b>(&self, offset: i64, arena: &'b IndexArena) -> IndexSet<'b>
    where
        'a: 'b,
    {
        if let Some(first) = self.first() {
            assert!(first + offset >= 0, "shift by {offset} yields negative indices");
        }
        match self.layout {
            Layout::Range { start, size } => IndexSet {
                layout: Layout::Range {
                    start: start + offset,
                    size,
                },
            },
            Layout::Segmented(_) => {
                let segments = self.segments().map(|s| s.shift(offset)).collect();
                IndexSet::from_segments(segments, arena)
            }
        }
    }

    /// `slice(start, len)` followed by `shift(offset)`.
    pub fn slice_and_shift<'b>(
        &self,
        start: i64,
        len: i64,
        offset: i64,
        arena: &'b IndexArena,
    ) -> IndexSet<'b>
    where
        'a: 'b,
    {
        self.slice(start, len).shift(offset, arena)
    }

    /// Iterator over the indices, ascending.
    pub fn indices(&self) -> Indices<'a> {
        Indices::new(*self, SegmentPosition::default())
    }

    /// Iterator over the indices starting at segment position `from`.
    pub fn indices_from(&self, from: SegmentPosition) -> Indices<'a> {
        Indices::new(*self, from)
    }

    /// Iterator over the maximal runs of consecutive indices.
    pub fn ranges(&self) -> Ranges<'a> {
        Ranges::new(*self)
    }

    /// Calls `f(segment, position)` for every segment, where `position` is the
    /// flat position of the segment's first element.
    pub fn foreach_segment(&self, mut f: impl FnMut(Segment<'a>, i64)) {
        let mut pos = 0i64;
        for segment in self.segments() {
            f(segment, pos);
            pos += segment.len() as i64;
        }
    }

    pub fn foreach_index(&self, mut f: impl FnMut(i64)) {
        if let Layout::Range { start, size } = self.layout {
            (start..start + size).for_each(f);
            return;
        }
        for segment in self.segments() {
            segment.foreach_index(&mut f);
        }
    }

    /// Calls `f(index, position)` for every member.
    pub fn foreach_index_with_pos(&self, mut f: impl FnMut(i64, i64)) {
        let mut pos = 0i64;
        self.foreach_index(|index| {
            f(index, pos);
            pos += 1;
        });
    }

    /// Calls `f` for every maximal run of consecutive indices.
    pub fn foreach_range(&self, f: impl FnMut(Range<i64>)) {
        self.ranges().for_each(f);
    }

    /// Parallel `foreach_index`. Order of calls across chunks is unspecified.
    pub fn par_foreach_index<F>(&self, config: ExecutionConfig, f: F)
    where
        F: Fn(i64) + Sync + Send,
    {
        self.par_foreach_slice(config, |slice, _| slice.foreach_index(&f));
    }

    /// Parallel `foreach_segment`. Segments may be split at chunk borders;
    /// the reported position is always the flat position of the piece's first
    /// element.
    pub fn par_foreach_segment<F>(&self, config: ExecutionConfig, f: F)
    where
        F: Fn(Segment<'a>, i64) + Sync + Send,
    {
        self.par_foreach_slice(config, |slice, start| {
            slice.foreach_segment(|segment, pos| f(segment, start + pos))
        });
    }

    /// Splits the view into position chunks and runs `f(chunk, start)` on
    /// each, in parallel when `config` allows it.
    pub(crate) fn par_foreach_slice<F>(&self, config: ExecutionConfig, f: F)
    where
        F: Fn(IndexSet<'a>, i64) + Sync + Send,
    {
        let size = self.size() as usize;
        if !config.is_parallel_for(size) {
            f(*self, 0);
            return;
        }
        let chunks = self.position_chunks(config.chunk_len(size));
        log::debug!(
            "par_foreach: {size} indices in {} chunks",
            chunks.len()
        );
        chunks
            .into_par_iter()
            .for_each(|(slice, start)| f(slice, start));
    }

    /// Splits the view into consecutive slices of at most `chunk_len`
    /// elements, paired with their start positions.
    pub(crate) fn position_chunks(&self, chunk_len: usize) -> Vec<(IndexSet<'a>, i64)> {
        let size = self.size();
        let chunk_len = chunk_len.max(1) as i64;
        (0..size)
            .step_by(chunk_len as usize)
            .map(|start| (self.slice(start, chunk_len.min(size - start)), start))
            .collect()
    }

    /// The indices as a vector.
    pub fn to_indices<T: IndexValue>(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.size() as usize);
        self.foreach_index(|index| out.push(T::from_i64(index)));
        out
    }

    /// Writes the indices to the front of `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than `size()`.
    pub fn to_indices_into<T: IndexValue>(&self, out: &mut [T]) {
        let size = self.size() as usize;
        assert!(
            out.len() >= size,
            "output of length {} cannot hold {size} indices",
            out.len()
        );
        let mut slots = out[..size].iter_mut();
        self.foreach_index(|index| {
            if let Some(slot) = slots.next() {
                *slot = T::from_i64(index);
            }
        });
    }

    /// A boolean mask of length `len` with `true` at every member.
    ///
    /// # Panics
    ///
    /// Panics if `len < min_array_size()`.
    pub fn to_bools(&self, len: usize) -> Vec<bool> {
        let mut bools = vec![false; len];
        self.set_bools(&mut bools);
        bools
    }

    /// Sets `bools[i] = true` for every member `i`, leaving other entries
    /// untouched.
    ///
    /// # Panics
    ///
    /// Panics if `bools` is shorter than `min_array_size()`.
    pub fn set_bools(&self, bools: &mut [bool]) {
        assert!(
            bools.len() as i64 >= self.min_array_size(),
            "mask of length {} cannot hold index {}",
            bools.len(),
            self.min_array_size() - 1
        );
        self.foreach_range(|range| bools[range.start as usize..range.end as usize].fill(true));
    }

    /// A bit mask of length `len` with the bits of the members set.
    ///
    /// # Panics
    ///
    /// Panics if `len < min_array_size()`.
    pub fn to_bits(&self, len: usize) -> BitArray {
        let mut bits = BitArray::empty(len);
        self.foreach_range(|range| bits.set_range(range.start as usize..range.end as usize));
        bits
    }

    /// The maximal runs of consecutive indices.
    pub fn to_ranges(&self) -> Vec<Range<i64>> {
        self.ranges().collect()
    }

    /// The maximal runs of `universe` that are not members.
    pub fn to_ranges_invert(&self, universe: Range<i64>) -> Vec<Range<i64>> {
        complement_ranges(universe, self.ranges()).collect()
    }

    /// The maximal runs, split so that none is longer than `max_len`.
    pub fn to_ranges_chunked(&self, max_len: i64) -> Vec<Range<i64>> {
        self.ranges().chunk_ranges(max_len).collect()
    }
}

impl Default for IndexSet<'_> {
    fn default() -> Self {
        IndexSet::empty()
    }
}

impl From<Range<i64>> for IndexSet<'_> {
    fn from(range: Range<i64>) -> Self {
        IndexSet::from_range(range)
    }
}

impl std::fmt::Debug for IndexSet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const MAX_RUNS: usize = 16;
        write!(f, "IndexSet(size: {}, ", self.size())?;
        let mut list = f.debug_list();
        let mut runs = self.ranges();
        for run in runs.by_ref().take(MAX_RUNS) {
            if run.end - run.start == 1 {
                list.entry(&run.start);
            } else {
                list.entry(&run);
            }
        }
        if runs.next().is_some() {
            list.entry(&format_args!(".."));
        }
        list.finish()?;
        write!(f, ")")
    }
}
