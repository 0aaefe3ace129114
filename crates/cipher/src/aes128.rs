//! Table-driven software AES-128 (FIPS-197).
//!
//! State columns are big-endian `u32`s; each middle round is sixteen
//! T-table lookups. The engine-facing block is `[u64; 2]` holding the 16
//! state bytes little-endian, so `block[0]` covers bytes `0..8`.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    BlockTransform, KatVector, KnownAnswers, LaneWidth,
    simd::{self, Lanes, dispatch_lanes},
};

const NR: usize = 10;
const RK_WORDS: usize = 4 * (NR + 1);

#[rustfmt::skip]
const SBOX: [u8; 256] = [
    0x63, 0x7c, 0x77, 0x7b, 0xf2, 0x6b, 0x6f, 0xc5, 0x30, 0x01, 0x67, 0x2b, 0xfe, 0xd7, 0xab, 0x76,
    0xca, 0x82, 0xc9, 0x7d, 0xfa, 0x59, 0x47, 0xf0, 0xad, 0xd4, 0xa2, 0xaf, 0x9c, 0xa4, 0x72, 0xc0,
    0xb7, 0xfd, 0x93, 0x26, 0x36, 0x3f, 0xf7, 0xcc, 0x34, 0xa5, 0xe5, 0xf1, 0x71, 0xd8, 0x31, 0x15,
    0x04, 0xc7, 0x23, 0xc3, 0x18, 0x96, 0x05, 0x9a, 0x07, 0x12, 0x80, 0xe2, 0xeb, 0x27, 0xb2, 0x75,
    0x09, 0x83, 0x2c, 0x1a, 0x1b, 0x6e, 0x5a, 0xa0, 0x52, 0x3b, 0xd6, 0xb3, 0x29, 0xe3, 0x2f, 0x84,
    0x53, 0xd1, 0x00, 0xed, 0x20, 0xfc, 0xb1, 0x5b, 0x6a, 0xcb, 0xbe, 0x39, 0x4a, 0x4c, 0x58, 0xcf,
    0xd0, 0xef, 0xaa, 0xfb, 0x43, 0x4d, 0x33, 0x85, 0x45, 0xf9, 0x02, 0x7f, 0x50, 0x3c, 0x9f, 0xa8,
    0x51, 0xa3, 0x40, 0x8f, 0x92, 0x9d, 0x38, 0xf5, 0xbc, 0xb6, 0xda, 0x21, 0x10, 0xff, 0xf3, 0xd2,
    0xcd, 0x0c, 0x13, 0xec, 0x5f, 0x97, 0x44, 0x17, 0xc4, 0xa7, 0x7e, 0x3d, 0x64, 0x5d, 0x19, 0x73,
    0x60, 0x81, 0x4f, 0xdc, 0x22, 0x2a, 0x90, 0x88, 0x46, 0xee, 0xb8, 0x14, 0xde, 0x5e, 0x0b, 0xdb,
    0xe0, 0x32, 0x3a, 0x0a, 0x49, 0x06, 0x24, 0x5c, 0xc2, 0xd3, 0xac, 0x62, 0x91, 0x95, 0xe4, 0x79,
    0xe7, 0xc8, 0x37, 0x6d, 0x8d, 0xd5, 0x4e, 0xa9, 0x6c, 0x56, 0xf4, 0xea, 0x65, 0x7a, 0xae, 0x08,
    0xba, 0x78, 0x25, 0x2e, 0x1c, 0xa6, 0xb4, 0xc6, 0xe8, 0xdd, 0x74, 0x1f, 0x4b, 0xbd, 0x8b, 0x8a,
    0x70, 0x3e, 0xb5, 0x66, 0x48, 0x03, 0xf6, 0x0e, 0x61, 0x35, 0x57, 0xb9, 0x86, 0xc1, 0x1d, 0x9e,
    0xe1, 0xf8, 0x98, 0x11, 0x69, 0xd9, 0x8e, 0x94, 0x9b, 0x1e, 0x87, 0xe9, 0xce, 0x55, 0x28, 0xdf,
    0x8c, 0xa1, 0x89, 0x0d, 0xbf, 0xe6, 0x42, 0x68, 0x41, 0x99, 0x2d, 0x0f, 0xb0, 0x54, 0xbb, 0x16,
];

/// Multiplication by `x` in GF(2^8) mod `x^8 + x^4 + x^3 + x + 1`.
const fn xtime(a: u8) -> u8 {
    (a << 1) ^ if a & 0x80 != 0 { 0x1b } else { 0 }
}

/// `TE[j][a]`: `TE[0][a] = (2·S[a], S[a], S[a], 3·S[a])`, rotated right by
/// `8j` bits for `TE[j]`.
static TE: [[u32; 256]; 4] = {
    let mut te = [[0u32; 256]; 4];
    let mut a = 0;
    while a < 256 {
        let s = SBOX[a];
        let s2 = xtime(s);
        let t0 = u32::from_be_bytes([s2, s, s, s2 ^ s]);
        te[0][a] = t0;
        te[1][a] = t0.rotate_right(8);
        te[2][a] = t0.rotate_right(16);
        te[3][a] = t0.rotate_right(24);
        a += 1;
    }
    te
};

#[inline(always)]
const fn byte(w: u32, n: u32) -> usize {
    ((w >> (8 * n)) & 0xFF) as usize
}

#[inline(always)]
const fn sub_word(w: u32) -> u32 {
    u32::from_be_bytes([
        SBOX[byte(w, 3)],
        SBOX[byte(w, 2)],
        SBOX[byte(w, 1)],
        SBOX[byte(w, 0)],
    ])
}

#[inline(always)]
fn to_state(block: &[u64; 2]) -> [u32; 4] {
    [
        (block[0] as u32).swap_bytes(),
        ((block[0] >> 32) as u32).swap_bytes(),
        (block[1] as u32).swap_bytes(),
        ((block[1] >> 32) as u32).swap_bytes(),
    ]
}

#[inline(always)]
fn from_state(s: [u32; 4]) -> [u64; 2] {
    [
        u64::from(s[0].swap_bytes()) | (u64::from(s[1].swap_bytes()) << 32),
        u64::from(s[2].swap_bytes()) | (u64::from(s[3].swap_bytes()) << 32),
    ]
}

/// AES-128 with an expanded encryption key schedule.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Aes128 {
    rk: [u32; RK_WORDS],
}

impl Aes128 {
    /// Encrypt one block given as raw bytes.
    #[must_use]
    pub fn encrypt_bytes(&self, block: &[u8; 16]) -> [u8; 16] {
        let (halves, _) = block.as_chunks::<8>();
        let out = self.encrypt(&[
            u64::from_le_bytes(halves[0]),
            u64::from_le_bytes(halves[1]),
        ]);
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&out[0].to_le_bytes());
        bytes[8..].copy_from_slice(&out[1].to_le_bytes());
        bytes
    }

    #[inline]
    fn encrypt_lanes<const L: usize>(&self, blocks: &mut [[u64; 2]]) {
        let rk = &self.rk;
        let te = |j: usize, v: Lanes<u32, L>, n: u32| v.map(|w| TE[j][byte(w, n)]);
        let sb = |v: Lanes<u32, L>, n: u32| v.map(|w| u32::from(SBOX[byte(w, n)]) << (8 * n));
        simd::for_each_batch::<_, L>(
            blocks,
            |chunk| {
                let [lo, hi] = simd::gather(chunk);
                let half =
                    |v: Lanes<u64, L>, shift: u32| v.map(|w| ((w >> shift) as u32).swap_bytes());
                let mut s = [half(lo, 0), half(lo, 32), half(hi, 0), half(hi, 32)];
                for (i, w) in s.iter_mut().enumerate() {
                    *w ^= Lanes::splat(rk[i]);
                }
                for r in 1..NR {
                    s = core::array::from_fn(|i| {
                        te(0, s[i], 3)
                            ^ te(1, s[(i + 1) % 4], 2)
                            ^ te(2, s[(i + 2) % 4], 1)
                            ^ te(3, s[(i + 3) % 4], 0)
                            ^ Lanes::splat(rk[4 * r + i])
                    });
                }
                let s: [Lanes<u32, L>; 4] = core::array::from_fn(|i| {
                    (sb(s[i], 3)
                        | sb(s[(i + 1) % 4], 2)
                        | sb(s[(i + 2) % 4], 1)
                        | sb(s[(i + 3) % 4], 0))
                        ^ Lanes::splat(rk[4 * NR + i])
                });
                let join = |a: Lanes<u32, L>, b: Lanes<u32, L>| {
                    Lanes::from_fn(|l| {
                        u64::from(a.as_array()[l].swap_bytes())
                            | (u64::from(b.as_array()[l].swap_bytes()) << 32)
                    })
                };
                simd::scatter(&[join(s[0], s[1]), join(s[2], s[3])], chunk);
            },
            |block| self.encrypt_in_place(block),
        );
    }
}

impl BlockTransform for Aes128 {
    type Block = [u64; 2];
    type Key = [u8; 16];

    const NAME: &'static str = "AES-128";
    const ROUNDS: usize = NR;

    fn new(key: &[u8; 16]) -> Self {
        let mut rk = [0u32; RK_WORDS];
        let (words, _) = key.as_chunks::<4>();
        for (dst, w) in rk.iter_mut().zip(words) {
            *dst = u32::from_be_bytes(*w);
        }
        let mut rcon = 1u8;
        for i in 4..RK_WORDS {
            let mut t = rk[i - 1];
            if i % 4 == 0 {
                t = sub_word(t.rotate_left(8)) ^ (u32::from(rcon) << 24);
                rcon = xtime(rcon);
            }
            rk[i] = rk[i - 4] ^ t;
        }
        Self { rk }
    }

    fn encrypt(&self, block: &[u64; 2]) -> [u64; 2] {
        let rk = &self.rk;
        let mut s = to_state(block);
        for (i, w) in s.iter_mut().enumerate() {
            *w ^= rk[i];
        }
        for r in 1..NR {
            s = core::array::from_fn(|i| {
                TE[0][byte(s[i], 3)]
                    ^ TE[1][byte(s[(i + 1) % 4], 2)]
                    ^ TE[2][byte(s[(i + 2) % 4], 1)]
                    ^ TE[3][byte(s[(i + 3) % 4], 0)]
                    ^ rk[4 * r + i]
            });
        }
        from_state(core::array::from_fn(|i| {
            u32::from_be_bytes([
                SBOX[byte(s[i], 3)],
                SBOX[byte(s[(i + 1) % 4], 2)],
                SBOX[byte(s[(i + 2) % 4], 1)],
                SBOX[byte(s[(i + 3) % 4], 0)],
            ]) ^ rk[4 * NR + i]
        }))
    }

    fn encrypt_batch(&self, blocks: &mut [[u64; 2]], width: LaneWidth) {
        dispatch_lanes!(width, self.encrypt_lanes(blocks));
    }
}

impl KnownAnswers for Aes128 {
    const VECTORS: &'static [KatVector<Self>] = &[KatVector {
        label: "SP 800-38A F.5.1 block #1",
        key: [
            0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf,
            0x4f, 0x3c,
        ],
        input: [0xf7f6_f5f4_f3f2_f1f0, 0xfffe_fdfc_fbfa_f9f8],
        output: [0xb07c_6098_73df_8cec, 0xe4a1_9eea_7516_d2f2],
    }];
}
