//! Merging of touching runs.

use std::ops::Range;

/// Iterator adapter that merges consecutive runs where one ends exactly where
/// the next begins.
///
/// Empty input runs are skipped. The output is the minimal run list describing
/// the same indices, provided the input is ordered and non-overlapping.
#[derive(Debug, Clone)]
pub struct Coalesced<I>
where
    I: Iterator<Item = Range<i64>>,
{
    inner: I,
    pending: Option<Range<i64>>,
}

impl<I> Coalesced<I>
where
    I: Iterator<Item = Range<i64>>,
{
    pub fn new(inner: I) -> Self {
        Coalesced {
            inner,
            pending: None,
        }
    }
}

impl<I> Iterator for Coalesced<I>
where
    I: Iterator<Item = Range<i64>>,
{
    type Item = Range<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(next) = self.inner.next() else {
                return self.pending.take();
            };
            if next.is_empty() {
                continue;
            }
            match &mut self.pending {
                Some(pending) if pending.end == next.start => pending.end = next.end,
                Some(_) => return self.pending.replace(next),
                None => self.pending = Some(next),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (_, upper) = self.inner.size_hint();
        let extra = self.pending.is_some() as usize;
        (extra, upper.and_then(|n| n.checked_add(extra)))
    }
}
