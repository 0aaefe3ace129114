//! Input formation for the two chaining modes.

use ks_cipher::WordBlock;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::Mode;

/// Forms each lane's input block and, in [`Mode::Cbc`], keeps each lane's
/// previous output.
///
/// The chained input is `counter ^ previous_output`. No lane ever reads
/// another lane's state.
#[derive(Clone, Debug, Zeroize, ZeroizeOnDrop)]
pub struct ModeController<B: WordBlock> {
    #[zeroize(skip)]
    mode: Mode,
    chain: Vec<B>,
}

impl<B: WordBlock> ModeController<B> {
    /// `iv` seeds every lane's previous output in CBC mode; all-zero when
    /// absent. Ignored in CTR mode.
    #[must_use]
    pub fn new(mode: Mode, lanes: usize, iv: Option<B>) -> Self {
        let chain = match mode {
            Mode::Ctr => Vec::new(),
            Mode::Cbc => vec![iv.unwrap_or_else(B::zeroed); lanes],
        };
        Self { mode, chain }
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Previous output of every lane; empty in CTR mode.
    #[inline]
    #[must_use]
    pub fn previous(&self) -> &[B] {
        &self.chain
    }

    /// Write the next input block of every lane into `inputs`.
    #[inline]
    pub fn load_inputs(&self, counters: &[B], inputs: &mut [B]) {
        inputs.copy_from_slice(counters);
        if self.mode == Mode::Cbc {
            for (input, prev) in inputs.iter_mut().zip(&self.chain) {
                input.xor_assign(prev);
            }
        }
    }

    /// Remember this refill's outputs for the next CBC refill.
    #[inline]
    pub fn record_outputs(&mut self, outputs: &[B]) {
        if self.mode == Mode::Cbc {
            self.chain.copy_from_slice(outputs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctr_input_is_the_counter() {
        let mut ctl = ModeController::<[u32; 2]>::new(Mode::Ctr, 2, None);
        let counters = [[1, 2], [3, 4]];
        let mut inputs = [[0; 2]; 2];
        ctl.load_inputs(&counters, &mut inputs);
        assert_eq!(inputs, counters);
        ctl.record_outputs(&[[9, 9], [9, 9]]);
        ctl.load_inputs(&counters, &mut inputs);
        assert_eq!(inputs, counters);
        assert!(ctl.previous().is_empty());
    }

    #[test]
    fn cbc_xors_previous_output_per_lane() {
        let mut ctl = ModeController::<[u32; 2]>::new(Mode::Cbc, 2, None);
        let counters = [[1, 2], [3, 4]];
        let mut inputs = [[0; 2]; 2];
        ctl.load_inputs(&counters, &mut inputs);
        assert_eq!(inputs, counters);

        ctl.record_outputs(&[[0xF0, 0], [0, 0x0F]]);
        ctl.load_inputs(&counters, &mut inputs);
        assert_eq!(inputs, [[0xF1, 2], [3, 0x0B]]);
    }

    #[test]
    fn iv_seeds_every_lane() {
        let ctl = ModeController::<[u64; 1]>::new(Mode::Cbc, 3, Some([0xAA]));
        let mut inputs = [[0; 1]; 3];
        ctl.load_inputs(&[[1], [2], [3]], &mut inputs);
        assert_eq!(inputs, [[0xAB], [0xA8], [0xA9]]);
    }
}
