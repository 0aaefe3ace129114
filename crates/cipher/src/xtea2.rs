//! XTEA2: the 128-bit block extension of XTEA with key-dependent rotations.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    BlockTransform, KatVector, KnownAnswers, LaneWidth,
    simd::{self, Lanes, dispatch_lanes},
};

const DELTA: u32 = 0x9E37_79B9;
const N_ROUNDS: usize = 32;

#[inline(always)]
fn mix(v: u32, s: u32, rk: u32) -> u32 {
    ((v << 4) ^ (v >> 5))
        .wrapping_add(s)
        .wrapping_add(rk.rotate_left(v & 0x1F))
}

#[inline(always)]
fn mix_lanes<const L: usize>(v: Lanes<u32, L>, s: Lanes<u32, L>, rk: u32) -> Lanes<u32, L> {
    ((v << 4) ^ (v >> 5)) + s + Lanes::splat(rk).rotate_left_var(v)
}

/// XTEA2 on a block of four `u32` words. Pre-whitening with key words 0 and
/// 1, post-whitening with key words 2 and 3.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Xtea2 {
    key: [u32; 4],
}

/// `(sum before, sum after)` the delta step of each round.
const SUMS: [(u32, u32); N_ROUNDS] = {
    let mut sums = [(0, 0); N_ROUNDS];
    let mut sum = 0u32;
    let mut i = 0;
    while i < N_ROUNDS {
        let next = sum.wrapping_add(DELTA);
        sums[i] = (sum, next);
        sum = next;
        i += 1;
    }
    sums
};

impl Xtea2 {
    #[inline]
    fn encrypt_lanes<const L: usize>(&self, blocks: &mut [[u32; 4]]) {
        let k = &self.key;
        simd::for_each_batch::<_, L>(
            blocks,
            |chunk| {
                let [mut a, mut b, mut c, mut d] = simd::gather(chunk);
                b += Lanes::splat(k[0]);
                d += Lanes::splat(k[1]);
                for &(s0, s1) in &SUMS {
                    a += mix_lanes(b, d ^ Lanes::splat(s0), k[(s0 & 3) as usize]);
                    c += mix_lanes(d, b ^ Lanes::splat(s1), k[((s1 >> 11) & 3) as usize]);
                    (a, b, c, d) = (b, c, d, a);
                }
                a ^= Lanes::splat(k[2]);
                c ^= Lanes::splat(k[3]);
                simd::scatter(&[a, b, c, d], chunk);
            },
            |block| self.encrypt_in_place(block),
        );
    }
}

impl BlockTransform for Xtea2 {
    type Block = [u32; 4];
    type Key = [u32; 4];

    const NAME: &'static str = "XTEA2";
    const ROUNDS: usize = N_ROUNDS;

    fn new(key: &[u32; 4]) -> Self {
        Self { key: *key }
    }

    #[inline]
    fn encrypt(&self, block: &[u32; 4]) -> [u32; 4] {
        let k = &self.key;
        let [mut a, mut b, mut c, mut d] = *block;
        b = b.wrapping_add(k[0]);
        d = d.wrapping_add(k[1]);
        for &(s0, s1) in &SUMS {
            a = a.wrapping_add(mix(b, d ^ s0, k[(s0 & 3) as usize]));
            c = c.wrapping_add(mix(d, b ^ s1, k[((s1 >> 11) & 3) as usize]));
            (a, b, c, d) = (b, c, d, a);
        }
        [a ^ k[2], b, c ^ k[3], d]
    }

    fn encrypt_batch(&self, blocks: &mut [[u32; 4]], width: LaneWidth) {
        dispatch_lanes!(width, self.encrypt_lanes(blocks));
    }
}

impl KnownAnswers for Xtea2 {
    const VECTORS: &'static [KatVector<Self>] = &[KatVector {
        label: "XTEA2 reference vector",
        key: [0x243F_6A88, 0x85A3_08D3, 0x1319_8A2E, 0x0370_7344],
        input: [0x1234_5678, 0x8765_4321, 0x9ABC_DEF0, 0x0FED_CBA9],
        output: [0xE78E_47E4, 0x8EBE_5C3B, 0xDA8E_629B, 0x9A84_D7F9],
    }];
}
