//! Per-lane multi-word counters.
//!
//! Word 0 of a block is the least significant word of the lane's counter.
//! [`CounterBank::advance`] adds the shared stride to word 0 of every lane
//! and carries upward within the same lane only, so each lane counts modulo
//! `2^(bits * W)` and wraparound is silent.

use ks_cipher::{Word, WordBlock};

use crate::config::CounterLayout;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterBank<B: WordBlock> {
    counters: Vec<B>,
    stride: B::Word,
}

impl<B: WordBlock> CounterBank<B> {
    /// Counters for `lanes` lanes in the given layout.
    ///
    /// `lanes` must already be validated against [`crate::MAX_LANES`].
    #[must_use]
    pub fn new(lanes: usize, layout: CounterLayout) -> Self {
        let counters = (0..lanes)
            .map(|lane| lane_origin::<B>(layout, lanes, lane))
            .collect();
        Self {
            counters,
            stride: layout_stride::<B::Word>(layout, lanes),
        }
    }

    /// Counters starting at caller-supplied offsets.
    #[must_use]
    pub fn with_offsets(offsets: Vec<B>, stride: B::Word) -> Self {
        Self {
            counters: offsets,
            stride,
        }
    }

    #[inline]
    #[must_use]
    pub fn lanes(&self) -> usize {
        self.counters.len()
    }

    #[inline]
    #[must_use]
    pub fn stride(&self) -> B::Word {
        self.stride
    }

    #[inline]
    #[must_use]
    pub fn counters(&self) -> &[B] {
        &self.counters
    }

    /// Move every lane forward by one stride.
    #[inline]
    pub fn advance(&mut self) {
        for counter in &mut self.counters {
            let words = counter.as_mut();
            let (low, mut carry) = words[0].overflowing_add(self.stride);
            words[0] = low;
            for w in &mut words[1..] {
                if !carry {
                    break;
                }
                (*w, carry) = w.overflowing_add(B::Word::ONE);
            }
        }
    }
}

/// Starting counter of `lane` under `layout`.
///
/// Partitioned blocks of two or more words put the lane index in the top
/// word. A single-word block has no separate top word, so the index goes
/// into its highest bits instead.
fn lane_origin<B: WordBlock>(layout: CounterLayout, lanes: usize, lane: usize) -> B {
    let mut block = B::zeroed();
    let words = block.as_mut();
    match layout {
        CounterLayout::Interleaved => words[0] = B::Word::truncate(lane as u64),
        CounterLayout::Partitioned if B::LEN > 1 => {
            words[B::LEN - 1] = B::Word::truncate(lane as u64);
        }
        CounterLayout::Partitioned => {
            let index_bits = usize::BITS - (lanes - 1).leading_zeros();
            if index_bits > 0 {
                let shift = B::Word::BITS - index_bits;
                words[0] = B::Word::truncate((lane as u64) << shift);
            }
        }
    }
    block
}

fn layout_stride<W: Word>(layout: CounterLayout, lanes: usize) -> W {
    match layout {
        CounterLayout::Interleaved => W::truncate(lanes as u64),
        CounterLayout::Partitioned => W::ONE,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn interleaved_origins_and_stride() {
        let bank = CounterBank::<[u64; 2]>::new(4, CounterLayout::Interleaved);
        assert_eq!(bank.counters(), &[[0, 0], [1, 0], [2, 0], [3, 0]]);
        assert_eq!(bank.stride(), 4);
    }

    #[test]
    fn advance_adds_stride_to_low_word() {
        let mut bank = CounterBank::<[u32; 4]>::new(3, CounterLayout::Interleaved);
        bank.advance();
        bank.advance();
        assert_eq!(bank.counters(), &[[6, 0, 0, 0], [7, 0, 0, 0], [8, 0, 0, 0]]);
    }

    #[test]
    fn partitioned_uses_top_word() {
        let bank = CounterBank::<[u64; 4]>::new(3, CounterLayout::Partitioned);
        assert_eq!(bank.counters()[2], [0, 0, 0, 2]);
        assert_eq!(bank.stride(), 1);
    }

    #[test]
    fn partitioned_single_word_uses_top_bits() {
        let bank = CounterBank::<[u64; 1]>::new(5, CounterLayout::Partitioned);
        // 5 lanes need 3 index bits.
        assert_eq!(bank.counters()[1], [1 << 61]);
        assert_eq!(bank.counters()[4], [4 << 61]);

        let single = CounterBank::<[u64; 1]>::new(1, CounterLayout::Partitioned);
        assert_eq!(single.counters(), &[[0]]);
    }

    #[test]
    fn carry_stays_within_lane() {
        let mut bank = CounterBank::with_offsets(
            vec![[u32::MAX - 1, u32::MAX, 7, 0], [5, 0, 0, 0]],
            3u32,
        );
        bank.advance();
        assert_eq!(bank.counters()[0], [1, 0, 8, 0]);
        assert_eq!(bank.counters()[1], [8, 0, 0, 0]);
    }

    #[test]
    fn full_range_wraps_to_zero() {
        let mut bank = CounterBank::with_offsets(vec![[u64::MAX, u64::MAX]], 1u64);
        bank.advance();
        assert_eq!(bank.counters(), &[[0, 0]]);
    }

    #[test]
    fn lanes_never_collide() {
        for layout in [CounterLayout::Interleaved, CounterLayout::Partitioned] {
            for lanes in [1, 2, 7, 8, 64] {
                let mut bank = CounterBank::<[u32; 1]>::new(lanes, layout);
                let mut seen = HashSet::new();
                for _ in 0..50 {
                    for c in bank.counters() {
                        assert!(seen.insert(*c), "{layout} x{lanes}: repeated {c:?}");
                    }
                    bank.advance();
                }
            }
        }
    }
}
