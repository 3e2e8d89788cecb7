//! Content equality and lock-step traversal of two index sets.

use crate::index_set::IndexSet;
use crate::segment::Segment;

/// Walks two sets of equal size by position, yielding pairs of equally long
/// segment pieces. Piece `k` of both sides holds the same positions.
#[derive(Clone)]
pub struct ZipSegments<'x, 'y> {
    left: IndexSet<'x>,
    right: IndexSet<'y>,
    left_segment: usize,
    left_pos: usize,
    right_segment: usize,
    right_pos: usize,
}

impl<'x, 'y> Iterator for ZipSegments<'x, 'y> {
    type Item = (Segment<'x>, Segment<'y>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.left_segment >= self.left.segments_num()
            || self.right_segment >= self.right.segments_num()
        {
            return None;
        }
        let left = self.left.segment(self.left_segment);
        let right = self.right.segment(self.right_segment);
        let len = (left.len() - self.left_pos).min(right.len() - self.right_pos);
        let pair = (
            left.slice(self.left_pos..self.left_pos + len),
            right.slice(self.right_pos..self.right_pos + len),
        );
        self.left_pos += len;
        if self.left_pos == left.len() {
            self.left_segment += 1;
            self.left_pos = 0;
        }
        self.right_pos += len;
        if self.right_pos == right.len() {
            self.right_segment += 1;
            self.right_pos = 0;
        }
        Some(pair)
    }
}

impl<'a> IndexSet<'a> {
    /// Lock-step traversal of `self` and `other` by position.
    ///
    /// # Panics
    ///
    /// Panics if the sets differ in size.
    pub fn zip_segments<'b>(&self, other: &IndexSet<'b>) -> ZipSegments<'a, 'b> {
        assert_eq!(
            self.size(),
            other.size(),
            "cannot zip index sets of different sizes"
        );
        ZipSegments {
            left: *self,
            right: *other,
            left_segment: 0,
            left_pos: 0,
            right_segment: 0,
            right_pos: 0,
        }
    }

    /// Returns `true` if both sets hold the same indices, regardless of how
    /// they are segmented.
    pub fn equals(&self, other: &IndexSet<'_>) -> bool {
        if self.size() != other.size() {
            return false;
        }
        if self.is_empty() {
            return true;
        }
        if self.first() != other.first() || self.last() != other.last() {
            return false;
        }
        if let (Some(a), Some(b)) = (self.to_range(), other.to_range()) {
            return a == b;
        }
        self.zip_segments(other)
            .all(|(left, right)| segments_equal(left, right))
    }
}

/// Element-wise comparison of two segments of equal length.
fn segments_equal(left: Segment<'_>, right: Segment<'_>) -> bool {
    if let (Some(a), Some(b)) = (left.to_range(), right.to_range()) {
        return a == b;
    }
    if left.first() != right.first() || left.last() != right.last() {
        return false;
    }
    if left.base() == right.base() {
        return left.local_offsets() == right.local_offsets();
    }
    left.indices().eq(right.indices())
}

impl<'b> PartialEq<IndexSet<'b>> for IndexSet<'_> {
    fn eq(&self, other: &IndexSet<'b>) -> bool {
        self.equals(other)
    }
}

impl Eq for IndexSet<'_> {}
