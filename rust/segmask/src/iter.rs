//! Iterators over the members of an [`IndexSet`].

use std::ops::Range;

use segmask_ranges::Coalesced;

use crate::index_set::{IndexSet, SegmentPosition};
use crate::segment::{Segment, SegmentIndices, SegmentRuns};

/// Ascending iterator over the indices of an [`IndexSet`].
///
/// The iterator can report where it stands via [`Indices::position`]; passing
/// that to [`IndexSet::indices_from`] resumes the iteration later.
#[derive(Clone)]
pub struct Indices<'a> {
    set: IndexSet<'a>,
    segment: usize,
    index_in_segment: usize,
    current: SegmentIndices<'a>,
    remaining: usize,
}

impl<'a> Indices<'a> {
    pub(crate) fn new(set: IndexSet<'a>, from: SegmentPosition) -> Indices<'a> {
        if from.segment >= set.segments_num() {
            return Indices {
                set,
                segment: set.segments_num(),
                index_in_segment: 0,
                current: Segment::range(0, 0).indices(),
                remaining: 0,
            };
        }
        let segment = set.segment(from.segment);
        let index_in_segment = from.index_in_segment.min(segment.len());
        Indices {
            set,
            segment: from.segment,
            index_in_segment,
            current: segment.slice(index_in_segment..segment.len()).indices(),
            remaining: (set.size()
                - set.position_of(SegmentPosition::new(from.segment, index_in_segment)))
                as usize,
        }
    }

    /// Segment position of the next index to be returned.
    pub fn position(&self) -> SegmentPosition {
        SegmentPosition::new(self.segment, self.index_in_segment)
    }
}

impl Iterator for Indices<'_> {
    type Item = i64;

    #[inline]
    fn next(&mut self) -> Option<i64> {
        loop {
            if let Some(index) = self.current.next() {
                self.index_in_segment += 1;
                self.remaining -= 1;
                return Some(index);
            }
            if self.segment + 1 >= self.set.segments_num() {
                return None;
            }
            self.segment += 1;
            self.index_in_segment = 0;
            self.current = self.set.segment(self.segment).indices();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Indices<'_> {}

/// Iterator over the maximal runs of consecutive indices of an
/// [`IndexSet`]. Runs spanning segment borders are merged.
#[derive(Clone)]
pub struct Ranges<'a> {
    inner: Coalesced<SegmentRunStream<'a>>,
}

impl<'a> Ranges<'a> {
    pub(crate) fn new(set: IndexSet<'a>) -> Ranges<'a> {
        Ranges {
            inner: Coalesced::new(SegmentRunStream {
                set,
                next_segment: 0,
                current: None,
            }),
        }
    }
}

impl Iterator for Ranges<'_> {
    type Item = Range<i64>;

    #[inline]
    fn next(&mut self) -> Option<Range<i64>> {
        self.inner.next()
    }
}

/// Per-segment runs, not merged across segment borders.
#[derive(Clone)]
struct SegmentRunStream<'a> {
    set: IndexSet<'a>,
    next_segment: usize,
    current: Option<SegmentRuns<'a>>,
}

impl Iterator for SegmentRunStream<'_> {
    type Item = Range<i64>;

    fn next(&mut self) -> Option<Range<i64>> {
        loop {
            if let Some(run) = self.current.as_mut().and_then(Iterator::next) {
                return Some(run);
            }
            if self.next_segment >= self.set.segments_num() {
                return None;
            }
            self.current = Some(self.set.segment(self.next_segment).runs());
            self.next_segment += 1;
        }
    }
}
