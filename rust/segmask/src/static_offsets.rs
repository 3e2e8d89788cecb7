//! The process-wide identity table of local offsets.

use std::sync::LazyLock;

/// Maximum number of indices in one segment. Every local offset is below this.
pub const MAX_SEGMENT_SIZE: usize = 1 << 14;

static STATIC_OFFSETS: LazyLock<Box<[u16; MAX_SEGMENT_SIZE]>> = LazyLock::new(|| {
    let mut table = Box::new([0u16; MAX_SEGMENT_SIZE]);
    for (i, offset) in table.iter_mut().enumerate() {
        *offset = i as u16;
    }
    table
});

/// Returns the read-only table `[0, 1, 2, ..., MAX_SEGMENT_SIZE - 1]`.
///
/// The table is built once on first access and shared by every range segment
/// that needs to present its offsets as a slice.
#[inline]
pub fn static_offsets() -> &'static [u16; MAX_SEGMENT_SIZE] {
    &STATIC_OFFSETS
}

/// Returns the prefix `[0, len)` of the identity table.
///
/// # Panics
///
/// Panics if `len > MAX_SEGMENT_SIZE`.
#[inline]
pub fn static_offsets_prefix(len: usize) -> &'static [u16] {
    &static_offsets()[..len]
}
