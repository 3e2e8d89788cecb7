//! Splitting of long runs into bounded pieces.

use std::ops::Range;

/// Iterator adapter that splits every input run into consecutive pieces of at
/// most `max_len` indices.
///
/// Runs that already fit are passed through unchanged; empty runs are dropped.
#[derive(Debug, Clone)]
pub struct ChunkedRanges<I>
where
    I: Iterator<Item = Range<i64>>,
{
    inner: I,
    max_len: i64,
    remainder: Range<i64>,
}

impl<I> ChunkedRanges<I>
where
    I: Iterator<Item = Range<i64>>,
{
    /// Creates a new `ChunkedRanges` adapter.
    ///
    /// # Panics
    ///
    /// Panics if `max_len` is not positive.
    pub fn new(inner: I, max_len: i64) -> Self {
        assert!(max_len > 0, "max_len must be greater than 0");
        ChunkedRanges {
            inner,
            max_len,
            remainder: 0..0,
        }
    }
}

impl<I> Iterator for ChunkedRanges<I>
where
    I: Iterator<Item = Range<i64>>,
{
    type Item = Range<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.remainder.is_empty() {
            self.remainder = self.inner.next()?;
        }
        let current = std::mem::replace(&mut self.remainder, 0..0);
        if current.end - current.start <= self.max_len {
            Some(current)
        } else {
            let split = current.start + self.max_len;
            self.remainder = split..current.end;
            Some(current.start..split)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::RangeIteratorsExt;

    #[test]
    fn test_basic_chunking() {
        let runs = vec![10..20, 40..60, 100..105];
        let chunked = runs.into_iter().chunk_ranges(10).collect::<Vec<_>>();
        assert_eq!(chunked, vec![10..20, 40..50, 50..60, 100..105]);
    }

    #[test]
    fn test_uneven_tail() {
        let chunked = vec![0..10].into_iter().chunk_ranges(3).collect::<Vec<_>>();
        assert_eq!(chunked, vec![0..3, 3..6, 6..9, 9..10]);
    }

    #[test]
    fn test_drops_empty_runs() {
        let chunked = vec![0..0, 5..7, 9..9]
            .into_iter()
            .chunk_ranges(4)
            .collect::<Vec<_>>();
        assert_eq!(chunked, vec![5..7]);
    }

    #[test]
    #[should_panic]
    fn test_zero_max_len_panics() {
        let _ = vec![0..1].into_iter().chunk_ranges(0);
    }

    #[test]
    fn test_total_length_preserved() {
        let mut rng = fastrand::Rng::with_seed(17);
        let mut start = 0i64;
        let mut runs = Vec::new();
        for _ in 0..200 {
            start += rng.i64(1..50);
            let len = rng.i64(1..500);
            runs.push(start..start + len);
            start += len;
        }
        let total = runs.iter().map(|r| r.end - r.start).sum::<i64>();
        let chunked = runs.into_iter().chunk_ranges(37).collect::<Vec<_>>();
        assert!(chunked.iter().all(|r| r.end - r.start <= 37));
        assert_eq!(chunked.iter().map(|r| r.end - r.start).sum::<i64>(), total);
    }
}
