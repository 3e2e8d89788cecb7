//! Set algebra over index sets: complement, union, intersection, difference,
//! grouping, periodic repetition and content equality.

mod combine;
mod compare;
mod complement;
mod group;
mod repeat;

pub use compare::ZipSegments;
pub use group::GroupedIndexSets;
