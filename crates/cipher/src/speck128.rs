//! Speck128/128 ARX block cipher, full and reduced-round.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    BlockTransform, KatVector, KnownAnswers, LaneWidth,
    simd::{self, Lanes, dispatch_lanes},
};

const FULL_ROUNDS: usize = 32;

/// Speck128/128 with `R` rounds. Block is `[y, x]`.
///
/// `R` is 32 (the full cipher) or 16, which takes the first 16 round keys of
/// the full schedule. Any other round count fails to compile.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Speck128<const R: usize> {
    keys: [u64; FULL_ROUNDS],
}

pub type Speck128Full = Speck128<32>;
pub type Speck128R16 = Speck128<16>;

#[inline(always)]
fn round(x: &mut u64, y: &mut u64, k: u64) {
    *x = (x.rotate_right(8).wrapping_add(*y)) ^ k;
    *y = y.rotate_left(3) ^ *x;
}

impl<const R: usize> Speck128<R> {
    #[inline]
    fn encrypt_lanes<const L: usize>(&self, blocks: &mut [[u64; 2]]) {
        simd::for_each_batch::<_, L>(
            blocks,
            |chunk| {
                let [mut y, mut x] = simd::gather(chunk);
                for &k in &self.keys[..R] {
                    x = (x.rotate_right(8) + y) ^ Lanes::splat(k);
                    y = y.rotate_left(3) ^ x;
                }
                simd::scatter(&[y, x], chunk);
            },
            |block| self.encrypt_in_place(block),
        );
    }
}

impl<const R: usize> BlockTransform for Speck128<R> {
    type Block = [u64; 2];
    type Key = [u64; 2];

    const NAME: &'static str = match R {
        FULL_ROUNDS => "Speck128/128",
        16 => "Speck128/128-R16",
        _ => panic!("Speck128 supports 16 or 32 rounds"),
    };
    const ROUNDS: usize = R;

    fn new(key: &[u64; 2]) -> Self {
        const { assert!(R == 16 || R == FULL_ROUNDS) };
        let mut keys = [0u64; FULL_ROUNDS];
        keys[0] = key[0];
        let (mut a, mut b) = (key[0], key[1]);
        for i in 0..FULL_ROUNDS - 1 {
            round(&mut b, &mut a, i as u64);
            keys[i + 1] = a;
        }
        Self { keys }
    }

    #[inline]
    fn encrypt(&self, block: &[u64; 2]) -> [u64; 2] {
        let [mut y, mut x] = *block;
        for &k in &self.keys[..R] {
            round(&mut x, &mut y, k);
        }
        [y, x]
    }

    fn encrypt_batch(&self, blocks: &mut [[u64; 2]], width: LaneWidth) {
        dispatch_lanes!(width, self.encrypt_lanes(blocks));
    }
}

const KEY: [u64; 2] = [0x0706_0504_0302_0100, 0x0f0e_0d0c_0b0a_0908];
const PLAINTEXT: [u64; 2] = [0x7469_2065_6461_6d20, 0x6c61_7669_7571_6520];

impl KnownAnswers for Speck128<32> {
    const VECTORS: &'static [KatVector<Self>] = &[KatVector {
        label: "Speck128/128 reference vector",
        key: KEY,
        input: PLAINTEXT,
        output: [0x7860_fedf_5c57_0d18, 0xa65d_9851_7978_3265],
    }];
}

impl KnownAnswers for Speck128<16> {
    const VECTORS: &'static [KatVector<Self>] = &[KatVector {
        label: "Speck128/128 reference key, 16 rounds",
        key: KEY,
        input: PLAINTEXT,
        output: [0xa897_d865_8ba5_a800, 0xcf86_0764_faa9_b037],
    }];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_round_counts() {
        assert_eq!(
            (Speck128Full::NAME, Speck128Full::ROUNDS),
            ("Speck128/128", 32)
        );
        assert_eq!(
            (Speck128R16::NAME, Speck128R16::ROUNDS),
            ("Speck128/128-R16", 16)
        );
    }

    #[test]
    fn full_rounds_reference_vector() {
        let v = &Speck128Full::VECTORS[0];
        assert_eq!(Speck128Full::new(&v.key).encrypt(&v.input), v.output);
    }

    #[test]
    fn reduced_rounds_are_a_prefix_of_the_full_cipher() {
        let full = Speck128Full::new(&KEY);
        let half = Speck128R16::new(&KEY);
        let mut mid = half.encrypt(&PLAINTEXT);
        let [y, x] = &mut mid;
        for &k in &full.keys[16..] {
            round(x, y, k);
        }
        assert_eq!(mid, full.encrypt(&PLAINTEXT));
        assert_eq!(half.encrypt(&PLAINTEXT), Speck128R16::VECTORS[0].output);
    }

    #[test]
    fn batched_matches_scalar() {
        let speck = Speck128Full::new(&KEY);
        let input: [[u64; 2]; 21] = core::array::from_fn(|i| [i as u64, !(i as u64)]);
        let expected = input.map(|b| speck.encrypt(&b));
        for w in LaneWidth::ALL {
            let mut blocks = input;
            speck.encrypt_batch(&mut blocks, w);
            assert_eq!(blocks, expected, "width {w}");
        }
    }
}
