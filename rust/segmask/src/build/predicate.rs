//! Construction by filtering a universe: predicates, boolean masks and bit
//! masks.

use std::ops::Range;

use crate::arena::IndexArena;
use crate::bit_array::BitArray;
use crate::build::{LocalSegments, build_parts, finish, segment_tasks};
use crate::config::ExecutionConfig;
use crate::index_set::IndexSet;
use crate::segment::{Segment, SegmentOffsets};
use crate::static_offsets::MAX_SEGMENT_SIZE;

impl<'a> IndexSet<'a> {
    /// Selects the members of `universe` for which `predicate` holds.
    ///
    /// Segments of the universe that are selected whole are reused as is,
    /// without copying their offsets.
    pub fn from_predicate<F>(
        universe: &IndexSet<'a>,
        config: ExecutionConfig,
        arena: &'a IndexArena,
        predicate: F,
    ) -> IndexSet<'a>
    where
        F: Fn(i64) -> bool + Sync,
    {
        IndexSet::from_segment_predicate(universe, config, arena, |segment, selected| {
            let base = segment.base();
            selected.extend(
                segment
                    .local_offsets()
                    .iter()
                    .copied()
                    .filter(|&offset| predicate(base + offset as i64)),
            );
        })
    }

    /// Selects members of `universe` one segment at a time.
    ///
    /// `select(segment, out)` receives each segment of the universe and must
    /// append to `out` the local offsets (relative to `segment.base()`) of the
    /// indices to keep, in ascending order and drawn from the segment's own
    /// offsets. `out` is empty on entry.
    pub fn from_segment_predicate<F>(
        universe: &IndexSet<'a>,
        config: ExecutionConfig,
        arena: &'a IndexArena,
        select: F,
    ) -> IndexSet<'a>
    where
        F: Fn(Segment<'_>, &mut Vec<u16>) + Sync,
    {
        if universe.is_empty() {
            return IndexSet::empty();
        }
        let tasks = segment_tasks(universe, config);
        let parts = build_parts(config, tasks, |segments| {
            filter_segments(universe, segments, &select)
        });
        finish(parts, arena)
    }

    /// The positions `i` with `bools[i] == true`.
    pub fn from_bools(bools: &[bool], arena: &'a IndexArena) -> IndexSet<'a> {
        IndexSet::from_bools_with(bools, ExecutionConfig::default(), arena)
    }

    /// [`IndexSet::from_bools`] with explicit execution settings.
    pub fn from_bools_with(
        bools: &[bool],
        config: ExecutionConfig,
        arena: &'a IndexArena,
    ) -> IndexSet<'a> {
        let universe = IndexSet::from_range(0..bools.len() as i64);
        IndexSet::from_bools_in(&universe, bools, config, arena)
    }

    /// The members `i` of `universe` with `bools[i] == true`.
    ///
    /// # Panics
    ///
    /// Panics if `bools` is shorter than `universe.min_array_size()`.
    pub fn from_bools_in(
        universe: &IndexSet<'a>,
        bools: &[bool],
        config: ExecutionConfig,
        arena: &'a IndexArena,
    ) -> IndexSet<'a> {
        assert!(
            bools.len() as i64 >= universe.min_array_size(),
            "mask of length {} does not cover the universe",
            bools.len()
        );
        IndexSet::from_segment_predicate(universe, config, arena, |segment, selected| {
            let base = segment.base();
            match segment.offsets() {
                SegmentOffsets::Range { len } => {
                    let start = segment.first() as usize;
                    let window = &bools[start..start + len as usize];
                    selected.extend(
                        window
                            .iter()
                            .enumerate()
                            .filter(|&(_, &b)| b)
                            .map(|(offset, _)| offset as u16),
                    );
                }
                SegmentOffsets::Explicit(offsets) => selected.extend(
                    offsets
                        .iter()
                        .copied()
                        .filter(|&offset| bools[(base + offset as i64) as usize]),
                ),
            }
        })
    }

    /// The positions of the set bits of `bits`.
    pub fn from_bits(bits: &BitArray, arena: &'a IndexArena) -> IndexSet<'a> {
        IndexSet::from_bits_with(bits, ExecutionConfig::default(), arena)
    }

    /// [`IndexSet::from_bits`] with explicit execution settings.
    pub fn from_bits_with(
        bits: &BitArray,
        config: ExecutionConfig,
        arena: &'a IndexArena,
    ) -> IndexSet<'a> {
        let ones = bits.count_ones();
        if ones == 0 {
            return IndexSet::empty();
        }
        if ones == bits.len() {
            return IndexSet::from_range(0..bits.len() as i64);
        }
        let universe = IndexSet::from_range(0..bits.len() as i64);
        IndexSet::from_segment_predicate(&universe, config, arena, |segment, selected| {
            let bounds = segment.bounds();
            let base = segment.base();
            selected.extend(
                bits.iter_within(bounds.start as usize..bounds.end as usize)
                    .map(|pos| (pos as i64 - base) as u16),
            );
        })
    }
}

/// Runs `select` over the segments `segments` of `universe`, collecting the
/// selection.
fn filter_segments<'a, F>(
    universe: &IndexSet<'a>,
    segments: Range<usize>,
    select: &F,
) -> LocalSegments<'a>
where
    F: Fn(Segment<'_>, &mut Vec<u16>),
{
    let mut local = LocalSegments::new();
    let mut selected = Vec::with_capacity(MAX_SEGMENT_SIZE.min(universe.size() as usize));
    for i in segments {
        let segment = universe.segment(i);
        selected.clear();
        select(segment, &mut selected);
        debug_assert!(selected.len() <= segment.len());
        if selected.len() == segment.len() {
            local.push_shared(segment);
        } else {
            local.push_local_offsets(segment.base(), &selected);
        }
    }
    local
}
