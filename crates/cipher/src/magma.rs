//! Magma (GOST R 34.12-2015), 64-bit block Feistel cipher.
//!
//! The eight 4-bit S-boxes are merged pairwise into four 8-bit tables with
//! the 11-bit rotation folded in, so the round function `g` is four lookups
//! and three ORs.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    BlockTransform, KatVector, KnownAnswers, LaneWidth,
    simd::{self, Lanes, dispatch_lanes},
};

/// `pi_0 .. pi_7` from RFC 8891, section 4.1.
const PI: [[u8; 16]; 8] = [
    [12, 4, 6, 2, 10, 5, 11, 9, 14, 8, 13, 7, 0, 3, 15, 1],
    [6, 8, 2, 3, 9, 10, 5, 12, 1, 14, 4, 7, 11, 13, 0, 15],
    [11, 3, 5, 8, 2, 15, 10, 13, 14, 1, 7, 4, 12, 9, 6, 0],
    [12, 8, 2, 1, 13, 4, 15, 6, 7, 0, 10, 5, 3, 14, 9, 11],
    [7, 15, 5, 10, 8, 1, 6, 13, 0, 9, 3, 14, 11, 4, 2, 12],
    [5, 13, 15, 6, 9, 2, 12, 10, 11, 7, 8, 1, 4, 3, 14, 0],
    [8, 14, 2, 5, 6, 9, 1, 12, 15, 4, 11, 0, 13, 10, 3, 7],
    [1, 7, 14, 13, 0, 5, 8, 3, 4, 15, 10, 6, 9, 12, 11, 2],
];

/// `SBOX8[i][b]`: byte `i` of the `g` input equal to `b`, substituted,
/// shifted into place and rotated left by 11.
static SBOX8: [[u32; 256]; 4] = {
    let mut t = [[0u32; 256]; 4];
    let mut i = 0;
    while i < 4 {
        let mut b = 0;
        while b < 256 {
            let s = ((PI[2 * i + 1][b >> 4] as u32) << 4) | PI[2 * i][b & 0xF] as u32;
            t[i][b] = (s << (8 * i)).rotate_left(11);
            b += 1;
        }
        i += 1;
    }
    t
};

/// Round key index for each of the 32 rounds.
const KEY_ORDER: [usize; 32] = {
    let mut order = [0; 32];
    let mut r = 0;
    while r < 32 {
        order[r] = if r < 24 { r % 8 } else { 31 - r };
        r += 1;
    }
    order
};

#[inline(always)]
fn g(k: u32, x: u32) -> u32 {
    let x = x.wrapping_add(k);
    SBOX8[0][(x & 0xFF) as usize]
        | SBOX8[1][((x >> 8) & 0xFF) as usize]
        | SBOX8[2][((x >> 16) & 0xFF) as usize]
        | SBOX8[3][(x >> 24) as usize]
}

#[inline(always)]
fn g_lanes<const L: usize>(k: u32, x: Lanes<u32, L>) -> Lanes<u32, L> {
    (x + Lanes::splat(k)).map(|x| g(0, x))
}

/// Magma with a 256-bit key given as eight 32-bit words `K1 .. K8`.
///
/// The block is one `u64`; its high half is `a1`, its low half `a0`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Magma {
    key: [u32; 8],
}

impl Magma {
    /// The round function `g[k](a)` of GOST R 34.12-2015.
    #[inline]
    #[must_use]
    pub fn g(k: u32, a: u32) -> u32 {
        g(k, a)
    }

    #[inline]
    fn encrypt_lanes<const L: usize>(&self, blocks: &mut [[u64; 1]]) {
        simd::for_each_batch::<_, L>(
            blocks,
            |chunk| {
                let [v] = simd::gather(chunk);
                let mut a1 = (v >> 32).map(|w| w as u32);
                let mut a0 = v.map(|w| w as u32);
                for &i in &KEY_ORDER {
                    let t = a1 ^ g_lanes(self.key[i], a0);
                    a1 = a0;
                    a0 = t;
                }
                let out = Lanes::from_fn(|l| {
                    (u64::from(a0.as_array()[l]) << 32) | u64::from(a1.as_array()[l])
                });
                simd::scatter(&[out], chunk);
            },
            |block| self.encrypt_in_place(block),
        );
    }
}

impl BlockTransform for Magma {
    type Block = [u64; 1];
    type Key = [u32; 8];

    const NAME: &'static str = "Magma";
    const ROUNDS: usize = 32;

    fn new(key: &[u32; 8]) -> Self {
        Self { key: *key }
    }

    #[inline]
    fn encrypt(&self, block: &[u64; 1]) -> [u64; 1] {
        let mut a1 = (block[0] >> 32) as u32;
        let mut a0 = block[0] as u32;
        for &i in &KEY_ORDER {
            let t = a1 ^ g(self.key[i], a0);
            a1 = a0;
            a0 = t;
        }
        [(u64::from(a0) << 32) | u64::from(a1)]
    }

    fn encrypt_batch(&self, blocks: &mut [[u64; 1]], width: LaneWidth) {
        dispatch_lanes!(width, self.encrypt_lanes(blocks));
    }
}

impl KnownAnswers for Magma {
    const VECTORS: &'static [KatVector<Self>] = &[KatVector {
        label: "GOST R 34.12-2015 A.2",
        key: [
            0xffee_ddcc,
            0xbbaa_9988,
            0x7766_5544,
            0x3322_1100,
            0xf0f1_f2f3,
            0xf4f5_f6f7,
            0xf8f9_fafb,
            0xfcfd_feff,
        ],
        input: [0xfedc_ba98_7654_3210],
        output: [0x4ee9_01e5_c2d8_ca3d],
    }];
}
