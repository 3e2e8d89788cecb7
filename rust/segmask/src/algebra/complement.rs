//! Complement of an index set within a universe range.

use std::ops::Range;

use crate::arena::IndexArena;
use crate::build::{LocalSegments, MIN_RANGE_RUN, build_parts, finish, segment_tasks};
use crate::config::ExecutionConfig;
use crate::index_set::IndexSet;
use crate::segment::{Segment, SegmentOffsets, contiguous_run_len};

impl<'a> IndexSet<'a> {
    /// The indices of `universe` that are not members of `self`.
    ///
    /// Members outside `universe` are ignored.
    pub fn complement(&self, universe: Range<i64>, arena: &'a IndexArena) -> IndexSet<'a> {
        self.complement_with(universe, ExecutionConfig::default(), arena)
    }

    /// [`IndexSet::complement`] with explicit execution settings.
    pub fn complement_with(
        &self,
        universe: Range<i64>,
        config: ExecutionConfig,
        arena: &'a IndexArena,
    ) -> IndexSet<'a> {
        if universe.is_empty() {
            return IndexSet::empty();
        }
        let set = self.slice_content(universe.clone());
        if set.is_empty() {
            return IndexSet::from_range(universe);
        }
        if let Some(range) = set.to_range() {
            if range.start == universe.start {
                return IndexSet::from_range(range.end..universe.end);
            }
            if range.end == universe.end {
                return IndexSet::from_range(universe.start..range.start);
            }
            let mut local = LocalSegments::new();
            local.push_range(universe.start, range.start - universe.start);
            local.push_range(range.end, universe.end - range.end);
            return finish(vec![local], arena);
        }

        let tasks = segment_tasks(&set, config);
        let parts = build_parts(config, tasks, |segments| {
            complement_segments(&set, segments, &universe)
        });
        finish(parts, arena)
    }
}

/// Complement of the segments `segments` of `set`, covering the gap before
/// the first of them and, for the final task, the gap after the last one.
fn complement_segments<'a>(
    set: &IndexSet<'_>,
    segments: Range<usize>,
    universe: &Range<i64>,
) -> LocalSegments<'a> {
    let mut local = LocalSegments::new();
    let mut scratch = Vec::new();
    let mut cursor = match segments.start {
        0 => universe.start,
        i => set.segment(i - 1).last() + 1,
    };
    let is_tail = segments.end == set.segments_num();
    for i in segments {
        let segment = set.segment(i);
        local.push_range(cursor, segment.first() - cursor);
        complement_interior(segment, &mut local, &mut scratch);
        cursor = segment.last() + 1;
    }
    if is_tail {
        local.push_range(cursor, universe.end - cursor);
    }
    local
}

/// Pushes the gaps between the first and last index of `segment`.
///
/// Gaps are located by measuring selected runs, so a segment with few long
/// runs costs little. Gaps of at least `MIN_RANGE_RUN` indices become range
/// segments; shorter ones are gathered into explicit offsets.
fn complement_interior(segment: Segment<'_>, local: &mut LocalSegments<'_>, scratch: &mut Vec<u16>) {
    let SegmentOffsets::Explicit(offsets) = segment.offsets() else {
        return;
    };
    let base = segment.base();
    scratch.clear();
    let mut i = 0;
    while i < offsets.len() {
        let next = i + contiguous_run_len(&offsets[i..]);
        if next == offsets.len() {
            break;
        }
        let gap = offsets[next - 1] + 1..offsets[next];
        if gap.len() >= MIN_RANGE_RUN {
            local.push_local_offsets(base, scratch);
            scratch.clear();
            local.push_range(base + gap.start as i64, gap.len() as i64);
        } else {
            scratch.extend(gap);
        }
        i = next;
    }
    local.push_local_offsets(base, scratch);
}
