//! Output buffer and the refill step.

use ks_cipher::{BlockTransform, WordBlock};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{config::Strategy, counter::CounterBank, mode::ModeController};

/// One output block per lane, read word by word in lane-major order.
///
/// `pos == len()` means a refill is due; a fresh buffer starts there.
#[derive(Clone, Debug, Zeroize, ZeroizeOnDrop)]
pub struct OutputBuffer<B: WordBlock> {
    blocks: Vec<B>,
    pos: usize,
}

impl<B: WordBlock> OutputBuffer<B> {
    #[must_use]
    pub fn new(lanes: usize) -> Self {
        Self {
            blocks: vec![B::zeroed(); lanes],
            pos: lanes * B::LEN,
        }
    }

    /// Capacity in words.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len() * B::LEN
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Words already handed out since the last refill.
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.len()
    }

    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &[B] {
        &self.blocks
    }

    /// Next unread word, or `None` when a refill is due.
    #[inline]
    pub fn read(&mut self) -> Option<B::Word> {
        let word = *self
            .blocks
            .get(self.pos / B::LEN)?
            .as_ref()
            .get(self.pos % B::LEN)?;
        self.pos += 1;
        Some(word)
    }

    /// Produce the next block of every lane.
    ///
    /// Forms the inputs, runs the transform in place, records the outputs
    /// for chaining, advances the counters and rewinds the cursor, in that
    /// order.
    pub fn refill<T>(
        &mut self, transform: &T, strategy: Strategy, bank: &mut CounterBank<B>,
        mode: &mut ModeController<B>,
    ) where
        T: BlockTransform<Block = B>, {
        mode.load_inputs(bank.counters(), &mut self.blocks);
        match strategy {
            Strategy::Scalar => {
                for block in &mut self.blocks {
                    transform.encrypt_in_place(block);
                }
            }
            Strategy::Batched(width) => transform.encrypt_batch(&mut self.blocks, width),
        }
        mode.record_outputs(&self.blocks);
        bank.advance();
        self.pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use ks_cipher::LaneWidth;

    use super::*;
    use crate::{
        config::{CounterLayout, Mode},
        testing::Identity,
    };

    fn parts(lanes: usize, mode: Mode) -> (CounterBank<[u32; 2]>, ModeController<[u32; 2]>) {
        (
            CounterBank::new(lanes, CounterLayout::Interleaved),
            ModeController::new(mode, lanes, None),
        )
    }

    #[test]
    fn starts_exhausted() {
        let mut buf = OutputBuffer::<[u32; 2]>::new(3);
        assert_eq!(buf.len(), 6);
        assert!(buf.is_exhausted());
        assert_eq!(buf.read(), None);
    }

    #[test]
    fn refill_rewinds_and_reads_lane_major() {
        let (mut bank, mut mode) = parts(3, Mode::Ctr);
        let mut buf = OutputBuffer::new(3);
        buf.refill(&Identity::<2>, Strategy::Scalar, &mut bank, &mut mode);
        assert_eq!(buf.position(), 0);
        let words: Vec<u32> = core::iter::from_fn(|| buf.read()).collect();
        assert_eq!(words, [0, 0, 1, 0, 2, 0]);
        assert!(buf.is_exhausted());
        // Counters advanced after the outputs were taken.
        assert_eq!(bank.counters()[0], [3, 0]);
    }

    #[test]
    fn strategies_agree() {
        for width in LaneWidth::ALL {
            let (mut b1, mut m1) = parts(11, Mode::Cbc);
            let (mut b2, mut m2) = parts(11, Mode::Cbc);
            let mut scalar = OutputBuffer::new(11);
            let mut batched = OutputBuffer::new(11);
            for _ in 0..3 {
                scalar.refill(&Identity::<2>, Strategy::Scalar, &mut b1, &mut m1);
                batched.refill(&Identity::<2>, Strategy::Batched(width), &mut b2, &mut m2);
                assert_eq!(scalar.blocks(), batched.blocks());
            }
        }
    }

    #[test]
    fn cbc_chains_previous_output() {
        let (mut bank, mut mode) = parts(2, Mode::Cbc);
        let mut buf = OutputBuffer::new(2);
        buf.refill(&Identity::<2>, Strategy::Scalar, &mut bank, &mut mode);
        assert_eq!(buf.blocks(), &[[0, 0], [1, 0]]);
        buf.refill(&Identity::<2>, Strategy::Scalar, &mut bank, &mut mode);
        // counter ^ previous output: 2 ^ 0, 3 ^ 1
        assert_eq!(buf.blocks(), &[[2, 0], [2, 0]]);
        assert_eq!(mode.previous(), buf.blocks());
    }
}
