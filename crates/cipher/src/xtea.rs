//! XTEA, 64-bit block Feistel cipher with a 128-bit key.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    BlockTransform, KatVector, KnownAnswers, LaneWidth,
    simd::{self, Lanes, dispatch_lanes},
};

const DELTA: u32 = 0x9e37_79b9;
const CYCLES: usize = 32;

#[inline(always)]
fn mix(v: u32) -> u32 {
    ((v << 4) ^ (v >> 5)).wrapping_add(v)
}

#[inline(always)]
fn mix_lanes<const L: usize>(v: Lanes<u32, L>) -> Lanes<u32, L> {
    ((v << 4) ^ (v >> 5)) + v
}

/// XTEA with 32 cycles (64 Feistel rounds). Block is one `u64` with `y` in
/// the low half and `z` in the high half.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Xtea {
    /// `sum + key[..]` for the `y` and `z` half-rounds of every cycle.
    rk: [[u32; 2]; CYCLES],
}

impl Xtea {
    #[inline]
    fn encrypt_lanes<const L: usize>(&self, blocks: &mut [[u64; 1]]) {
        simd::for_each_batch::<_, L>(
            blocks,
            |chunk| {
                let [v] = simd::gather(chunk);
                let mut y = v.map(|w| w as u32);
                let mut z = (v >> 32).map(|w| w as u32);
                for &[ka, kb] in &self.rk {
                    y += mix_lanes(z) ^ Lanes::splat(ka);
                    z += mix_lanes(y) ^ Lanes::splat(kb);
                }
                let out = Lanes::from_fn(|l| {
                    (u64::from(z.as_array()[l]) << 32) | u64::from(y.as_array()[l])
                });
                simd::scatter(&[out], chunk);
            },
            |block| self.encrypt_in_place(block),
        );
    }
}

impl BlockTransform for Xtea {
    type Block = [u64; 1];
    type Key = [u32; 4];

    const NAME: &'static str = "XTEA";
    const ROUNDS: usize = CYCLES;

    fn new(key: &[u32; 4]) -> Self {
        let mut rk = [[0; 2]; CYCLES];
        let mut sum = 0u32;
        for pair in &mut rk {
            pair[0] = sum.wrapping_add(key[(sum & 3) as usize]);
            sum = sum.wrapping_add(DELTA);
            pair[1] = sum.wrapping_add(key[((sum >> 11) & 3) as usize]);
        }
        Self { rk }
    }

    #[inline]
    fn encrypt(&self, block: &[u64; 1]) -> [u64; 1] {
        let mut y = block[0] as u32;
        let mut z = (block[0] >> 32) as u32;
        for &[ka, kb] in &self.rk {
            y = y.wrapping_add(mix(z) ^ ka);
            z = z.wrapping_add(mix(y) ^ kb);
        }
        [(u64::from(z) << 32) | u64::from(y)]
    }

    fn encrypt_batch(&self, blocks: &mut [[u64; 1]], width: LaneWidth) {
        dispatch_lanes!(width, self.encrypt_lanes(blocks));
    }
}

impl KnownAnswers for Xtea {
    const VECTORS: &'static [KatVector<Self>] = &[KatVector {
        label: "XTEA reference vector",
        key: [0x27F9_17B1, 0xC1DA_8993, 0x60E2_ACAA, 0xA6EB_923D],
        input: [0x5475_71AA_AF20_A390],
        output: [0x0A20_2283_D264_28AF],
    }];
}
