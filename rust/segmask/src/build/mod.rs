//! Construction of index sets.
//!
//! Every builder follows the same shape: the input is split into ordered
//! chunks that start and end at segment borders, each chunk is turned into a
//! [`LocalSegments`] accumulator (on a rayon worker when the input is large
//! enough), and [`finish`] merges the accumulators in input order into the
//! arena.
//!
//! Accumulators own their offset buffers, so no worker ever borrows another
//! worker's memory. The reduction adopts those buffers into the arena without
//! copying and rewrites the segments to point at them.

mod indices;
mod predicate;

use std::ops::Range;

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::arena::IndexArena;
use crate::config::ExecutionConfig;
use crate::index_set::IndexSet;
use crate::segment::{Segment, contiguous_run_len};
use crate::static_offsets::MAX_SEGMENT_SIZE;

/// Runs of at least this many consecutive offsets are stored as range
/// segments instead of explicit offsets.
pub(crate) const MIN_RANGE_RUN: usize = 64;

/// Segments collected by one task, in ascending index order.
#[derive(Default)]
pub(crate) struct LocalSegments<'a> {
    offsets: Vec<u16>,
    segments: Vec<LocalSegment<'a>>,
    size: i64,
}

#[derive(Clone, Copy)]
struct LocalSegment<'a> {
    base: i64,
    storage: LocalStorage<'a>,
}

#[derive(Clone, Copy)]
enum LocalStorage<'a> {
    Range { len: usize },
    /// `offsets[start..start + len]` of the owning accumulator.
    Owned { start: usize, len: usize },
    /// Offsets that already live in an arena or in the static table.
    Shared(&'a [u16]),
}

impl LocalSegment<'_> {
    fn len(&self) -> usize {
        match self.storage {
            LocalStorage::Range { len } | LocalStorage::Owned { len, .. } => len,
            LocalStorage::Shared(offsets) => offsets.len(),
        }
    }

    fn first(&self, owned: &[u16]) -> i64 {
        match self.storage {
            LocalStorage::Range { .. } => self.base,
            LocalStorage::Owned { start, .. } => self.base + owned[start] as i64,
            LocalStorage::Shared(offsets) => self.base + offsets[0] as i64,
        }
    }

    fn last(&self, owned: &[u16]) -> i64 {
        match self.storage {
            LocalStorage::Range { len } => self.base + len as i64 - 1,
            LocalStorage::Owned { start, len } => self.base + owned[start + len - 1] as i64,
            LocalStorage::Shared(offsets) => self.base + offsets[offsets.len() - 1] as i64,
        }
    }
}

impl<'a> LocalSegments<'a> {
    pub(crate) fn new() -> LocalSegments<'a> {
        LocalSegments::default()
    }

    pub(crate) fn size(&self) -> i64 {
        self.size
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub(crate) fn first_index(&self) -> Option<i64> {
        self.segments.first().map(|s| s.first(&self.offsets))
    }

    pub(crate) fn last_index(&self) -> Option<i64> {
        self.segments.last().map(|s| s.last(&self.offsets))
    }

    fn push(&mut self, segment: LocalSegment<'a>) {
        debug_assert!(
            self.last_index()
                .is_none_or(|last| last < segment.first(&self.offsets)),
            "segments must be pushed in ascending order"
        );
        self.size += segment.len() as i64;
        self.segments.push(segment);
    }

    /// Appends `[start, start + len)` as full-size range segments.
    ///
    /// Touching ranges are left apart here; [`finish`] merges them, so the
    /// result does not depend on how the input was cut into tasks.
    pub(crate) fn push_range(&mut self, mut start: i64, mut len: i64) {
        while len > 0 {
            let take = len.min(MAX_SEGMENT_SIZE as i64);
            self.push(LocalSegment {
                base: start,
                storage: LocalStorage::Range {
                    len: take as usize,
                },
            });
            start += take;
            len -= take;
        }
    }

    /// Appends a segment whose offsets are already stored elsewhere.
    pub(crate) fn push_shared(&mut self, segment: Segment<'a>) {
        if segment.is_empty() {
            return;
        }
        if let Some(range) = segment.to_range() {
            self.push_range(range.start, range.end - range.start);
            return;
        }
        self.push(LocalSegment {
            base: segment.base(),
            storage: LocalStorage::Shared(segment.local_offsets()),
        });
    }

    /// Appends `offsets` as one segment, explicit unless they are consecutive.
    fn push_owned(&mut self, base: i64, offsets: &[u16]) {
        let (first, last) = (offsets[0] as usize, offsets[offsets.len() - 1] as usize);
        if last - first + 1 == offsets.len() {
            self.push_range(base + first as i64, offsets.len() as i64);
            return;
        }
        let start = self.offsets.len();
        self.offsets.extend_from_slice(offsets);
        self.push(LocalSegment {
            base,
            storage: LocalStorage::Owned {
                start,
                len: offsets.len(),
            },
        });
    }

    /// Appends the indices `base + offsets[i]`.
    ///
    /// Runs of at least [`MIN_RANGE_RUN`] consecutive offsets become range
    /// segments; the scattered offsets between them are stored explicitly.
    pub(crate) fn push_local_offsets(&mut self, base: i64, offsets: &[u16]) {
        if offsets.is_empty() {
            return;
        }
        if contiguous_run_len(offsets) == offsets.len() {
            self.push_range(base + offsets[0] as i64, offsets.len() as i64);
            return;
        }
        let mut pending = 0;
        let mut i = 0;
        while i < offsets.len() {
            let run = contiguous_run_len(&offsets[i..]);
            if run >= MIN_RANGE_RUN {
                if pending < i {
                    self.push_owned(base, &offsets[pending..i]);
                }
                self.push_range(base + offsets[i] as i64, run as i64);
                pending = i + run;
            }
            i += run;
        }
        if pending < offsets.len() {
            self.push_owned(base, &offsets[pending..]);
        }
    }
}

/// Runs `build` on every task and collects the accumulators in task order,
/// in parallel when there is more than one task and `config` allows it.
pub(crate) fn build_parts<'a, T, F>(
    config: ExecutionConfig,
    tasks: Vec<T>,
    build: F,
) -> Vec<LocalSegments<'a>>
where
    T: Send,
    F: Fn(T) -> LocalSegments<'a> + Sync + Send,
{
    if tasks.len() > 1 && config.max_threads.is_none_or(|n| n > 1) {
        log::debug!("building index set from {} parallel tasks", tasks.len());
        tasks.into_par_iter().map(build).collect()
    } else {
        tasks.into_iter().map(build).collect()
    }
}

/// Groups consecutive segments of `set` into tasks holding at least one chunk
/// of elements each.
///
/// Tasks start and end at segment borders, so every task sees whole segments
/// and the output segmentation is the same for any `config`.
pub(crate) fn segment_tasks(set: &IndexSet<'_>, config: ExecutionConfig) -> Vec<Range<usize>> {
    let segments_num = set.segments_num();
    let size = set.size() as usize;
    if !config.is_parallel_for(size) {
        return vec![0..segments_num];
    }
    let chunk_len = config.chunk_len(size);
    let mut tasks = Vec::new();
    let (mut start, mut taken) = (0, 0);
    for (i, segment) in set.segments().enumerate() {
        taken += segment.len();
        if taken >= chunk_len {
            tasks.push(start..i + 1);
            start = i + 1;
            taken = 0;
        }
    }
    if start < segments_num {
        tasks.push(start..segments_num);
    }
    tasks
}

/// Merges ordered accumulators into a single index set stored in `arena`.
///
/// Parts are ordered by their first index (they normally arrive that way),
/// empty parts are dropped, owned offset buffers are adopted by the arena,
/// and touching contiguous segments are consolidated.
pub(crate) fn finish<'a>(parts: Vec<LocalSegments<'a>>, arena: &'a IndexArena) -> IndexSet<'a> {
    let mut parts: Vec<_> = parts.into_iter().filter(|p| !p.is_empty()).collect();
    parts.sort_by_key(LocalSegments::first_index);
    debug_assert!(
        parts
            .windows(2)
            .all(|w| w[0].last_index() < w[1].first_index()),
        "parts must cover disjoint ascending index ranges"
    );
    let size: i64 = parts.iter().map(LocalSegments::size).sum();
    let (Some(first), Some(last)) = (
        parts.first().and_then(LocalSegments::first_index),
        parts.last().and_then(LocalSegments::last_index),
    ) else {
        return IndexSet::empty();
    };
    if last - first + 1 == size {
        return IndexSet::from_range(first..last + 1);
    }

    let count = parts.iter().map(|p| p.segments.len()).sum();
    let mut segments = Vec::with_capacity(count);
    for part in parts {
        let LocalSegments {
            offsets,
            segments: local,
            ..
        } = part;
        let owned = arena.adopt_offsets(offsets);
        segments.extend(local.into_iter().map(|s| match s.storage {
            LocalStorage::Range { len } => Segment::range(s.base, len),
            LocalStorage::Owned { start, len } => {
                Segment::explicit(s.base, &owned[start..start + len])
            }
            LocalStorage::Shared(offsets) => Segment::explicit(s.base, offsets),
        }));
    }
    consolidate(&mut segments);
    log::trace!(
        "finished index set: {size} indices in {} segments (from {count})",
        segments.len()
    );
    IndexSet::from_segments(segments, arena)
}

/// Merges adjacent contiguous segments while the merged segment fits.
fn consolidate(segments: &mut Vec<Segment<'_>>) {
    let mut out = 0;
    for i in 0..segments.len() {
        let segment = segments[i];
        if out > 0 {
            if let (Some(prev), Some(next)) = (segments[out - 1].to_range(), segment.to_range()) {
                let len = (next.end - prev.start) as usize;
                if prev.end == next.start && len <= MAX_SEGMENT_SIZE {
                    segments[out - 1] = Segment::range(prev.start, len);
                    continue;
                }
            }
        }
        segments[out] = segment;
        out += 1;
    }
    segments.truncate(out);
}
