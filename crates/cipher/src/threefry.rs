//! Threefry4x64: the Threefish-256 round network with a zero tweak and the
//! counter as plaintext.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    BlockTransform, KatVector, KnownAnswers, LaneWidth,
    simd::{self, Lanes, dispatch_lanes},
};

/// Key schedule parity constant (`C240`).
const PARITY: u64 = 0x1BD1_1BDA_A9FC_1A22;

/// Rotation distances, indexed by `(group % 2) * 4 + round`.
const ROT_0: [u32; 8] = [14, 52, 23, 5, 25, 46, 58, 32];
const ROT_1: [u32; 8] = [16, 57, 40, 37, 33, 12, 22, 32];

/// Threefry4x64 with `R` rounds, either 20 or 72. A subkey is injected
/// every four rounds.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Threefry4x64<const R: usize> {
    ks: [u64; 5],
}

/// 20 rounds, the usual Threefry PRNG setting.
pub type Threefry4x64R20 = Threefry4x64<20>;
/// 72 rounds, the Threefish-256 round count.
pub type Threefry4x64R72 = Threefry4x64<72>;

#[inline(always)]
fn inject(x: &mut [u64; 4], ks: &[u64; 5], s: usize) {
    for (i, w) in x.iter_mut().enumerate() {
        *w = w.wrapping_add(ks[(s + i) % 5]);
    }
    x[3] = x[3].wrapping_add(s as u64);
}

#[inline(always)]
fn mix4(x: &mut [u64; 4], d1: u32, d2: u32) {
    x[0] = x[0].wrapping_add(x[1]);
    x[2] = x[2].wrapping_add(x[3]);
    let (x1, x3) = (x[1], x[3]);
    x[3] = x1.rotate_left(d1) ^ x[0];
    x[1] = x3.rotate_left(d2) ^ x[2];
}

impl<const R: usize> Threefry4x64<R> {
    #[inline]
    fn encrypt_lanes<const L: usize>(&self, blocks: &mut [[u64; 4]]) {
        let inject = |x: &mut [Lanes<u64, L>; 4], s: usize| {
            for (i, w) in x.iter_mut().enumerate() {
                *w += Lanes::splat(self.ks[(s + i) % 5]);
            }
            x[3] += Lanes::splat(s as u64);
        };
        simd::for_each_batch::<_, L>(
            blocks,
            |chunk| {
                let mut x = simd::gather(chunk);
                for g in 0..R / 4 {
                    inject(&mut x, g);
                    for r in (g % 2) * 4..(g % 2) * 4 + 4 {
                        x[0] += x[1];
                        x[2] += x[3];
                        let (x1, x3) = (x[1], x[3]);
                        x[3] = x1.rotate_left(ROT_0[r]) ^ x[0];
                        x[1] = x3.rotate_left(ROT_1[r]) ^ x[2];
                    }
                }
                inject(&mut x, R / 4);
                simd::scatter(&x, chunk);
            },
            |block| self.encrypt_in_place(block),
        );
    }
}

impl<const R: usize> BlockTransform for Threefry4x64<R> {
    type Block = [u64; 4];
    type Key = [u64; 4];

    const NAME: &'static str = match R {
        20 => "Threefry4x64x20",
        72 => "Threefry4x64x72",
        _ => panic!("Threefry4x64 supports 20 or 72 rounds"),
    };
    const ROUNDS: usize = R;

    fn new(key: &[u64; 4]) -> Self {
        const { assert!(R == 20 || R == 72) };
        let mut ks = [0, 0, 0, 0, PARITY];
        for (i, &k) in key.iter().enumerate() {
            ks[i] = k;
            ks[4] ^= k;
        }
        Self { ks }
    }

    #[inline]
    fn encrypt(&self, block: &[u64; 4]) -> [u64; 4] {
        let mut x = *block;
        for g in 0..R / 4 {
            inject(&mut x, &self.ks, g);
            let base = (g % 2) * 4;
            for r in base..base + 4 {
                mix4(&mut x, ROT_0[r], ROT_1[r]);
            }
        }
        inject(&mut x, &self.ks, R / 4);
        x
    }

    fn encrypt_batch(&self, blocks: &mut [[u64; 4]], width: LaneWidth) {
        dispatch_lanes!(width, self.encrypt_lanes(blocks));
    }
}

const ALL_ONES: [u64; 4] = [u64::MAX; 4];
const PI_KEY: [u64; 4] = [
    0x4528_21e6_38d0_1377,
    0xbe54_66cf_34e9_0c6c,
    0xbe54_66cf_34e9_0c6c,
    0xc0ac_29b7_c97c_50dd,
];
const PI_CTR: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

impl KnownAnswers for Threefry4x64<20> {
    const VECTORS: &'static [KatVector<Self>] = &[
        KatVector {
            label: "Threefry4x64x20 (all ones)",
            key: ALL_ONES,
            input: ALL_ONES,
            output: [
                0x29c2_4097_942b_ba1b,
                0x0371_bbfb_0f6f_4e11,
                0x3c23_1ffa_33f8_3a1c,
                0xcd29_113f_de32_d168,
            ],
        },
        KatVector {
            label: "Threefry4x64x20 (pi)",
            key: PI_KEY,
            input: PI_CTR,
            output: [
                0xa7e8_fde5_9165_1bd9,
                0xbaaf_d0c3_0138_319b,
                0x84a5_c1a7_29e6_85b9,
                0x901d_406c_cebc_1ba4,
            ],
        },
    ];
}

impl KnownAnswers for Threefry4x64<72> {
    const VECTORS: &'static [KatVector<Self>] = &[
        KatVector {
            label: "Threefry4x64x72 (all ones)",
            key: ALL_ONES,
            input: ALL_ONES,
            output: [
                0x1151_8c03_4bc1_ff4c,
                0x193f_10b8_bcdc_c9f7,
                0xd024_229c_b58f_20d8,
                0x563e_d6e4_8e05_183f,
            ],
        },
        KatVector {
            label: "Threefry4x64x72 (pi)",
            key: PI_KEY,
            input: PI_CTR,
            output: [
                0xacf4_12cc_aa3b_2270,
                0xc9e9_9bd5_3f2e_9173,
                0x43da_d469_dc82_5948,
                0xfbb1_9d06_c8a2_b4dc,
            ],
        },
    ];
}
