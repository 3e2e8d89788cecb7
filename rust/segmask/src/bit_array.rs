//! A fixed-size array of bits, used as a dense selection mask.

use std::ops::Range;

/// A fixed-size bit mask with `u64` word storage.
///
/// Bit `i` is bit `i % 64` (counting from the least significant bit) of word
/// `i / 64`. Bits past `len` in the final word are always zero.
#[derive(Clone, PartialEq, Eq)]
pub struct BitArray {
    len: usize,
    words: Box<[u64]>,
}

impl BitArray {
    /// All-zero bit array of `len` bits.
    pub fn empty(len: usize) -> BitArray {
        BitArray {
            len,
            words: vec![0u64; len.div_ceil(64)].into_boxed_slice(),
        }
    }

    /// All-one bit array of `len` bits.
    pub fn full(len: usize) -> BitArray {
        let mut bits = BitArray {
            len,
            words: vec![u64::MAX; len.div_ceil(64)].into_boxed_slice(),
        };
        bits.mask_tail();
        bits
    }

    /// Bit array with the bits at `positions` set.
    ///
    /// # Panics
    ///
    /// Panics if a position is `>= len`.
    pub fn from_positions(positions: impl IntoIterator<Item = usize>, len: usize) -> BitArray {
        let mut bits = BitArray::empty(len);
        for pos in positions {
            bits.set(pos);
        }
        bits
    }

    /// Bit array with every bit inside one of `ranges` set.
    pub fn from_ranges(ranges: impl IntoIterator<Item = Range<usize>>, len: usize) -> BitArray {
        let mut bits = BitArray::empty(len);
        for range in ranges {
            bits.set_range(range);
        }
        bits
    }

    /// Wraps a copy of LSB-ordered words. Bits past `len` are cleared.
    ///
    /// # Panics
    ///
    /// Panics if `words` holds fewer than `len` bits.
    pub fn from_lsb_words(words: &[u64], len: usize) -> BitArray {
        let count = len.div_ceil(64);
        assert!(
            words.len() >= count,
            "{} words cannot hold {len} bits",
            words.len()
        );
        let mut bits = BitArray {
            len,
            words: words[..count].into(),
        };
        bits.mask_tail();
        bits
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn storage(&self) -> &[u64] {
        &self.words
    }

    #[inline]
    pub fn set(&mut self, pos: usize) {
        assert!(pos < self.len, "bit {pos} out of bounds (len: {})", self.len);
        self.words[pos / 64] |= 1u64 << (pos % 64);
    }

    #[inline]
    pub fn reset(&mut self, pos: usize) {
        assert!(pos < self.len, "bit {pos} out of bounds (len: {})", self.len);
        self.words[pos / 64] &= !(1u64 << (pos % 64));
    }

    #[inline]
    pub fn set_value(&mut self, pos: usize, value: bool) {
        if value {
            self.set(pos);
        } else {
            self.reset(pos);
        }
    }

    /// Sets every bit in `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range.end > len` for a non-empty range.
    pub fn set_range(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        assert!(
            range.end <= self.len,
            "range end {} out of bounds (len: {})",
            range.end,
            self.len
        );
        let first_word = range.start / 64;
        let last_word = (range.end - 1) / 64;
        let head = u64::MAX << (range.start % 64);
        let tail = u64::MAX >> (63 - (range.end - 1) % 64);
        if first_word == last_word {
            self.words[first_word] |= head & tail;
            return;
        }
        self.words[first_word] |= head;
        self.words[first_word + 1..last_word].fill(u64::MAX);
        self.words[last_word] |= tail;
    }

    #[inline]
    pub fn contains(&self, pos: usize) -> bool {
        pos < self.len && self.words[pos / 64] & (1u64 << (pos % 64)) != 0
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Positions of the set bits, ascending.
    pub fn iter(&self) -> SetBits<'_> {
        self.iter_within(0..self.len)
    }

    /// Positions of the set bits inside `range`, ascending.
    ///
    /// Starts at the word holding `range.start` instead of filtering a full
    /// scan.
    ///
    /// # Panics
    ///
    /// Panics if `range.end > len`.
    pub fn iter_within(&self, range: Range<usize>) -> SetBits<'_> {
        assert!(
            range.end <= self.len,
            "range end {} out of bounds (len: {})",
            range.end,
            self.len
        );
        if range.start >= range.end {
            return SetBits {
                words: &[],
                word_index: 0,
                current: 0,
                end: 0,
            };
        }
        let word_index = range.start / 64;
        SetBits {
            words: &self.words[..range.end.div_ceil(64)],
            word_index,
            current: self.words[word_index] & (u64::MAX << (range.start % 64)),
            end: range.end,
        }
    }

    /// Maximal runs of set bits, ascending.
    pub fn ranges_iter(&self) -> SetRuns<'_> {
        SetRuns {
            bits: self,
            pos: 0,
        }
    }

    fn mask_tail(&mut self) {
        let rem = self.len % 64;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }

    /// Position of the first bit at or after `pos` whose value is `value`.
    /// Returns `len` if there is none.
    fn next_with_value(&self, pos: usize, value: bool) -> usize {
        if pos >= self.len {
            return self.len;
        }
        let mut word_index = pos / 64;
        let flip = if value { 0 } else { u64::MAX };
        let mut word = (self.words[word_index] ^ flip) & (u64::MAX << (pos % 64));
        loop {
            if word != 0 {
                let found = word_index * 64 + word.trailing_zeros() as usize;
                return found.min(self.len);
            }
            word_index += 1;
            if word_index == self.words.len() {
                return self.len;
            }
            word = self.words[word_index] ^ flip;
        }
    }
}

impl std::fmt::Debug for BitArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitArray")
            .field("len", &self.len)
            .field("ones", &self.count_ones())
            .finish()
    }
}

/// Iterator over the set bits of a [`BitArray`].
#[derive(Clone)]
pub struct SetBits<'a> {
    words: &'a [u64],
    word_index: usize,
    current: u64,
    end: usize,
}

impl Iterator for SetBits<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let pos = self.word_index * 64 + self.current.trailing_zeros() as usize;
                if pos >= self.end {
                    self.current = 0;
                    self.word_index = self.words.len();
                    return None;
                }
                self.current &= self.current - 1;
                return Some(pos);
            }
            self.word_index += 1;
            if self.word_index >= self.words.len() {
                return None;
            }
            self.current = self.words[self.word_index];
        }
    }
}

/// Iterator over the runs of set bits of a [`BitArray`].
#[derive(Clone)]
pub struct SetRuns<'a> {
    bits: &'a BitArray,
    pos: usize,
}

impl Iterator for SetRuns<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        let start = self.bits.next_with_value(self.pos, true);
        if start >= self.bits.len {
            self.pos = self.bits.len;
            return None;
        }
        let end = self.bits.next_with_value(start, false);
        self.pos = end;
        Some(start..end)
    }
}
