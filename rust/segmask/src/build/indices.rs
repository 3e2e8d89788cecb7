//! Construction from sorted index lists and from ranges.

use std::ops::Range;

use crate::arena::IndexArena;
use crate::build::{LocalSegments, build_parts, finish};
use crate::config::ExecutionConfig;
use crate::error::{Error, Result};
use crate::index_set::IndexSet;
use crate::index_value::IndexValue;
use crate::static_offsets::MAX_SEGMENT_SIZE;

impl<'a> IndexSet<'a> {
    /// Builds a set from strictly increasing, non-negative indices.
    ///
    /// The input is not validated in release builds; see
    /// [`IndexSet::try_from_indices`] for a checked variant.
    pub fn from_indices<T: IndexValue>(indices: &[T], arena: &'a IndexArena) -> IndexSet<'a> {
        IndexSet::from_indices_with(indices, ExecutionConfig::default(), arena)
    }

    /// [`IndexSet::from_indices`] with explicit execution settings.
    pub fn from_indices_with<T: IndexValue>(
        indices: &[T],
        config: ExecutionConfig,
        arena: &'a IndexArena,
    ) -> IndexSet<'a> {
        let (Some(first), Some(last)) = (indices.first(), indices.last()) else {
            return IndexSet::empty();
        };
        debug_assert!(
            indices.is_sorted_by(|a, b| a < b),
            "indices must be strictly increasing"
        );
        let (first, last) = (first.to_i64(), last.to_i64());
        debug_assert!(first >= 0, "negative index {first}");
        if last - first + 1 == indices.len() as i64 {
            return IndexSet::from_range(first..last + 1);
        }

        let tasks = window_tasks(indices, config);
        let parts = build_parts(config, tasks, |chunk| segments_from_sorted(chunk));
        finish(parts, arena)
    }

    /// Like [`IndexSet::from_indices`], but rejects input that is unsorted,
    /// contains duplicates or holds negative indices.
    pub fn try_from_indices<T: IndexValue>(
        indices: &[T],
        arena: &'a IndexArena,
    ) -> Result<IndexSet<'a>> {
        if let Some(first) = indices.first() {
            if first.to_i64() < 0 {
                return Err(Error::invalid_arg(
                    "indices",
                    format!("negative index {first:?}"),
                ));
            }
        }
        if let Some(pos) = indices.windows(2).position(|w| w[0] >= w[1]) {
            return Err(Error::invalid_arg(
                "indices",
                format!(
                    "not strictly increasing at position {}: {:?} followed by {:?}",
                    pos + 1,
                    indices[pos],
                    indices[pos + 1]
                ),
            ));
        }
        Ok(IndexSet::from_indices(indices, arena))
    }

    /// Builds a set from ascending, non-overlapping ranges. Empty ranges are
    /// ignored; touching ranges are merged.
    pub fn from_ranges(ranges: &[Range<i64>], arena: &'a IndexArena) -> IndexSet<'a> {
        let mut local = LocalSegments::new();
        for range in ranges.iter().filter(|r| !r.is_empty()) {
            debug_assert!(range.start >= 0, "negative index {}", range.start);
            local.push_range(range.start, range.end - range.start);
        }
        finish(vec![local], arena)
    }
}

/// Number of leading indices that share a segment with `indices[0]`: every
/// index within `MAX_SEGMENT_SIZE` of it, at most `MAX_SEGMENT_SIZE` of them.
fn window_len<T: IndexValue>(indices: &[T]) -> usize {
    let base = indices[0].to_i64();
    let window = &indices[..indices.len().min(MAX_SEGMENT_SIZE)];
    window.partition_point(|v| v.to_i64() - base < MAX_SEGMENT_SIZE as i64)
}

/// Splits `indices` into tasks of whole segment windows.
///
/// A task boundary always falls where the sequential walk would start a new
/// segment, so the segment table does not depend on `config`.
fn window_tasks<T: IndexValue>(indices: &[T], config: ExecutionConfig) -> Vec<&[T]> {
    if !config.is_parallel_for(indices.len()) {
        return vec![indices];
    }
    let chunk_len = config.chunk_len(indices.len());
    let mut tasks = Vec::new();
    let mut rest = indices;
    while !rest.is_empty() {
        let mut cut = 0;
        while cut < rest.len() && cut < chunk_len {
            cut += window_len(&rest[cut..]);
        }
        let (task, tail) = rest.split_at(cut);
        tasks.push(task);
        rest = tail;
    }
    tasks
}

/// Cuts a sorted run of indices into segments, one per window.
fn segments_from_sorted<'a, T: IndexValue>(indices: &[T]) -> LocalSegments<'a> {
    let mut local = LocalSegments::new();
    let mut offsets = Vec::with_capacity(indices.len().min(MAX_SEGMENT_SIZE));
    let mut rest = indices;
    while let Some(first) = rest.first() {
        let base = first.to_i64();
        let count = window_len(rest);
        let (chunk, tail) = rest.split_at(count);
        if chunk[count - 1].to_i64() - base + 1 == count as i64 {
            local.push_range(base, count as i64);
        } else {
            offsets.clear();
            offsets.extend(chunk.iter().map(|v| (v.to_i64() - base) as u16));
            local.push_local_offsets(base, &offsets);
        }
        rest = tail;
    }
    local
}
