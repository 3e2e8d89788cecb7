//! Gaps of an ordered run stream within a universe range.

use std::{iter::Peekable, ops::Range};

/// Yields the parts of `universe` that are not covered by `runs`.
///
/// Assumptions on the input:
/// - Runs are ordered by `start` and do not overlap (touching is fine).
/// - Runs may extend beyond `universe`; the uncovered output is clipped to it.
///
/// Complexity: O(n) over the input runs, constant extra memory.
pub fn complement_ranges<I>(universe: Range<i64>, runs: I) -> ComplementRanges<I::IntoIter>
where
    I: IntoIterator<Item = Range<i64>>,
{
    ComplementRanges::new(universe, runs.into_iter())
}

/// Iterator adapter implementing [`complement_ranges`].
pub struct ComplementRanges<I>
where
    I: Iterator<Item = Range<i64>>,
{
    runs: Peekable<I>,
    cursor: i64,
    end: i64,
}

impl<I> ComplementRanges<I>
where
    I: Iterator<Item = Range<i64>>,
{
    pub fn new(universe: Range<i64>, runs: I) -> Self {
        ComplementRanges {
            runs: runs.peekable(),
            cursor: universe.start,
            end: universe.end,
        }
    }
}

impl<I> Iterator for ComplementRanges<I>
where
    I: Iterator<Item = Range<i64>>,
{
    type Item = Range<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.end {
            let Some(run) = self.runs.peek() else {
                let gap = self.cursor..self.end;
                self.cursor = self.end;
                return Some(gap);
            };
            if run.is_empty() || run.end <= self.cursor {
                self.runs.next();
                continue;
            }
            if run.start > self.cursor {
                let gap = self.cursor..run.start.min(self.end);
                self.cursor = gap.end;
                return Some(gap);
            }
            // The run covers the cursor.
            self.cursor = run.end.min(self.end);
            self.runs.next();
        }
        None
    }
}
