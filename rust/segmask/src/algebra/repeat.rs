//! Periodic tiling of an index set.

use crate::arena::IndexArena;
use crate::build::{LocalSegments, finish};
use crate::index_set::IndexSet;
use crate::segment::Segment;
use crate::static_offsets::MAX_SEGMENT_SIZE;

impl<'a> IndexSet<'a> {
    /// The union of `base` shifted by `initial_offset + k * stride` for
    /// `k` in `0..repetitions`.
    ///
    /// `stride` must be at least the span of `base` (`last - first + 1`)
    /// whenever `repetitions > 1`, so that the copies do not interleave.
    ///
    /// When several copies fit into one segment, their offsets are laid out
    /// once in the arena and every segment of the result shares that array.
    pub fn from_repeating(
        base: &IndexSet<'a>,
        repetitions: usize,
        stride: i64,
        initial_offset: i64,
        arena: &'a IndexArena,
    ) -> IndexSet<'a> {
        if base.is_empty() || repetitions == 0 {
            return IndexSet::empty();
        }
        if repetitions == 1 && initial_offset == 0 {
            return *base;
        }
        let bounds = base.bounds();
        let span = bounds.end - bounds.start;
        assert!(
            repetitions == 1 || stride >= span,
            "stride {stride} is shorter than the span {span} of the repeated set"
        );
        assert!(
            bounds.start + initial_offset >= 0,
            "offset {initial_offset} yields negative indices"
        );

        let mut local = LocalSegments::new();
        if let Some(range) = base.to_range() {
            let start = range.start + initial_offset;
            if span == stride {
                return IndexSet::from_range(start..start + stride * repetitions as i64);
            }
            for k in 0..repetitions as i64 {
                local.push_range(start + k * stride, span);
            }
            return finish(vec![local], arena);
        }

        let copies_per_segment = if span as usize <= MAX_SEGMENT_SIZE && stride > 0 {
            (MAX_SEGMENT_SIZE as i64 - span) / stride + 1
        } else {
            1
        };
        if copies_per_segment >= 2 && repetitions > 1 {
            let copies = (copies_per_segment as usize).min(repetitions);
            let offsets = tile_offsets(base, copies, stride, arena);
            let per_copy = base.size() as usize;
            let group_stride = stride * copies as i64;
            let first = bounds.start + initial_offset;
            for group in 0..repetitions / copies {
                local.push_shared(Segment::explicit(first + group as i64 * group_stride, offsets));
            }
            let rest = repetitions % copies;
            if rest > 0 {
                let group = (repetitions / copies) as i64;
                local.push_shared(Segment::explicit(
                    first + group * group_stride,
                    &offsets[..rest * per_copy],
                ));
            }
            return finish(vec![local], arena);
        }

        for k in 0..repetitions as i64 {
            let shift = initial_offset + k * stride;
            for segment in base.segments() {
                local.push_shared(segment.shift(shift));
            }
        }
        finish(vec![local], arena)
    }
}

/// Lays out `copies` consecutive copies of `base`, `stride` apart, as local
/// offsets relative to the first index of `base`.
fn tile_offsets<'a>(
    base: &IndexSet<'_>,
    copies: usize,
    stride: i64,
    arena: &'a IndexArena,
) -> &'a [u16] {
    let first = base.bounds().start;
    let mut offsets = Vec::with_capacity(copies * base.size() as usize);
    for copy in 0..copies as i64 {
        base.foreach_index(|index| offsets.push((index - first + copy * stride) as u16));
    }
    arena.adopt_offsets(offsets)
}
