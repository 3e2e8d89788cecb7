//! Segmented sparse index sets.
//!
//! An [`IndexSet`] selects a sorted subset of the positions `0..n` of some
//! large array. Indices are grouped into [`Segment`]s that pair a base index
//! with `u16` local offsets, which keeps sparse selections compact and turns
//! dense runs into ranges that need no storage at all. Sets are cheap `Copy`
//! views over memory owned by an [`IndexArena`], so slicing a set or handing
//! it to worker threads never copies its contents.
//!
//! Construction ([`IndexSet::from_indices`], [`IndexSet::from_bools`],
//! [`IndexSet::from_predicate`], ...) and set algebra
//! ([`IndexSet::complement`], [`IndexSet::from_union`], ...) split their
//! input across rayon workers according to an [`ExecutionConfig`] and merge
//! the per-thread results in input order.

pub mod arena;
pub mod bit_array;
pub mod config;
pub mod error;
pub mod index_set;
pub mod index_value;
pub mod iter;
pub mod segment;
pub mod static_offsets;

mod algebra;
mod build;

#[cfg(test)]
mod tests;

pub use algebra::{GroupedIndexSets, ZipSegments};
pub use arena::IndexArena;
pub use bit_array::BitArray;
pub use config::{ExecutionConfig, GrainSize};
pub use error::{Error, ErrorKind, Result};
pub use index_set::{IndexSet, SegmentPosition};
pub use index_value::IndexValue;
pub use segment::{Segment, SegmentOffsets};
pub use static_offsets::{MAX_SEGMENT_SIZE, static_offsets};
