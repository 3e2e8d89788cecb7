//! Union, intersection and difference of two index sets.
//!
//! The inputs are painted onto a boolean mask (in parallel, one chunk of the
//! mask per task) and the result is rebuilt from the mask.

use rayon::iter::{IndexedParallelIterator, ParallelIterator};
use rayon::slice::ParallelSliceMut;

use crate::arena::IndexArena;
use crate::config::ExecutionConfig;
use crate::index_set::IndexSet;

impl<'a> IndexSet<'a> {
    /// The indices that are members of `a` or `b`.
    pub fn from_union(
        a: &IndexSet<'a>,
        b: &IndexSet<'a>,
        config: ExecutionConfig,
        arena: &'a IndexArena,
    ) -> IndexSet<'a> {
        if a.is_empty() {
            return *b;
        }
        if b.is_empty() {
            return *a;
        }
        if let (Some(ra), Some(rb)) = (a.to_range(), b.to_range()) {
            if ra.start <= rb.end && rb.start <= ra.end {
                return IndexSet::from_range(ra.start.min(rb.start)..ra.end.max(rb.end));
            }
        }
        let start = a.bounds().start.min(b.bounds().start);
        let len = a.min_array_size().max(b.min_array_size()) as usize;
        let mut mask = vec![false; len];
        paint(&mut mask, a, config);
        paint(&mut mask, b, config);
        let universe = IndexSet::from_range(start..len as i64);
        IndexSet::from_bools_in(&universe, &mask, config, arena)
    }

    /// The indices that are members of both `a` and `b`.
    pub fn from_intersection(
        a: &IndexSet<'a>,
        b: &IndexSet<'a>,
        config: ExecutionConfig,
        arena: &'a IndexArena,
    ) -> IndexSet<'a> {
        if a.is_empty() || b.is_empty() {
            return IndexSet::empty();
        }
        if let Some(rb) = b.to_range() {
            return a.slice_content(rb);
        }
        if let Some(ra) = a.to_range() {
            return b.slice_content(ra);
        }
        let a = a.slice_content(b.bounds());
        if a.is_empty() {
            return IndexSet::empty();
        }
        let mask = painted(b, config);
        IndexSet::from_segment_predicate(&a, config, arena, |segment, selected| {
            let base = segment.base();
            selected.extend(
                segment
                    .local_offsets()
                    .iter()
                    .copied()
                    .filter(|&offset| mask[(base + offset as i64) as usize]),
            );
        })
    }

    /// The members of `a` that are not members of `b`.
    pub fn from_difference(
        a: &IndexSet<'a>,
        b: &IndexSet<'a>,
        config: ExecutionConfig,
        arena: &'a IndexArena,
    ) -> IndexSet<'a> {
        if a.is_empty() || b.is_empty() {
            return *a;
        }
        let overlap = a.slice_content(b.bounds());
        if overlap.is_empty() {
            return *a;
        }
        let mask = painted(b, config);
        let len = mask.len() as i64;
        IndexSet::from_segment_predicate(a, config, arena, |segment, selected| {
            let base = segment.base();
            selected.extend(segment.local_offsets().iter().copied().filter(|&offset| {
                let index = base + offset as i64;
                index >= len || !mask[index as usize]
            }));
        })
    }
}

/// A mask of length `set.min_array_size()` with the members of `set` set.
fn painted(set: &IndexSet<'_>, config: ExecutionConfig) -> Vec<bool> {
    let mut mask = vec![false; set.min_array_size() as usize];
    paint(&mut mask, set, config);
    mask
}

/// Sets `mask[i] = true` for every member `i` of `set`.
fn paint(mask: &mut [bool], set: &IndexSet<'_>, config: ExecutionConfig) {
    if !config.is_parallel_for(mask.len()) {
        set.set_bools(mask);
        return;
    }
    let chunk_len = config.chunk_len(mask.len());
    mask.par_chunks_mut(chunk_len)
        .enumerate()
        .for_each(|(i, chunk)| {
            let start = (i * chunk_len) as i64;
            set.slice_content(start..start + chunk.len() as i64)
                .foreach_range(|run| {
                    chunk[(run.start - start) as usize..(run.end - start) as usize].fill(true)
                });
        });
}
