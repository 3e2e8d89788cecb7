//! Iterator adapters over ordered streams of `Range<i64>`.
//!
//! The index-set engine describes its contents as runs of consecutive indices.
//! The adapters in this crate work on such run streams without materializing
//! the individual indices:
//!
//! - [`Coalesced`] merges runs that touch (`prev.end == next.start`) into one.
//! - [`ChunkedRanges`] splits runs so that none is longer than a given limit.
//! - [`ComplementRanges`] yields the gaps of a run stream within a universe range.
//!
//! All adapters expect their input ordered by `start` and non-overlapping.

use std::ops::Range;

pub mod chunk;
pub mod coalesce;
pub mod complement;

pub use chunk::ChunkedRanges;
pub use coalesce::Coalesced;
pub use complement::{ComplementRanges, complement_ranges};

/// Extension trait adding the run adapters to any iterator of `Range<i64>`.
pub trait RangeIteratorsExt: Iterator<Item = Range<i64>> + Sized {
    /// Merges adjacent runs into maximal runs.
    fn coalesce_runs(self) -> Coalesced<Self> {
        Coalesced::new(self)
    }

    /// Splits runs longer than `max_len` into consecutive pieces of at most
    /// `max_len` indices.
    ///
    /// # Panics
    ///
    /// Panics if `max_len` is not positive.
    fn chunk_ranges(self, max_len: i64) -> ChunkedRanges<Self> {
        ChunkedRanges::new(self, max_len)
    }

    /// Yields the parts of `universe` not covered by any run of `self`.
    fn complement_within(self, universe: Range<i64>) -> ComplementRanges<Self> {
        ComplementRanges::new(universe, self)
    }
}

impl<I: Iterator<Item = Range<i64>>> RangeIteratorsExt for I {}
