//! Word, block and key-material abstractions shared by every transform.

use core::{fmt, ops};

use zeroize::Zeroize;

/// Unsigned machine word a block is made of (`u32` or `u64`).
pub trait Word:
    Copy
    + Default
    + Eq
    + Ord
    + core::hash::Hash
    + fmt::Debug
    + fmt::LowerHex
    + ops::BitXor<Output = Self>
    + ops::BitXorAssign
    + Zeroize
    + Send
    + Sync
    + 'static {
    const BITS: u32;
    const ZERO: Self;
    const ONE: Self;
    const MAX: Self;

    fn overflowing_add(self, rhs: Self) -> (Self, bool);

    /// Keep the low `BITS` bits of `value`.
    fn truncate(value: u64) -> Self;

    fn widen(self) -> u64;

    /// Little-endian load of exactly `BITS / 8` bytes.
    fn from_le_slice(bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len() * 8, Self::BITS as usize);
        Self::truncate(
            bytes
                .iter()
                .rev()
                .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
        )
    }
}

macro_rules! impl_word {
    ($($t:ty),*) => {
        $(
            impl Word for $t {
                const BITS: u32 = <$t>::BITS;
                const ZERO: Self = 0;
                const ONE: Self = 1;
                const MAX: Self = <$t>::MAX;

                #[inline]
                fn overflowing_add(self, rhs: Self) -> (Self, bool) {
                    <$t>::overflowing_add(self, rhs)
                }

                #[inline]
                fn truncate(value: u64) -> Self {
                    value as $t
                }

                #[inline]
                fn widen(self) -> u64 {
                    u64::from(self)
                }
            }
        )*
    };
}

impl_word!(u32, u64);

/// Fixed-width block of [`Word`]s, implemented by `[W; N]`.
pub trait WordBlock:
    AsRef<[Self::Word]>
    + AsMut<[Self::Word]>
    + Copy
    + Eq
    + core::hash::Hash
    + fmt::Debug
    + Zeroize
    + Send
    + Sync
    + 'static {
    type Word: Word;

    /// Words per block.
    const LEN: usize;

    fn zeroed() -> Self;

    /// Word-wise `self ^= other`.
    #[inline]
    fn xor_assign(&mut self, other: &Self) {
        for (a, &b) in self.as_mut().iter_mut().zip(other.as_ref()) {
            *a ^= b;
        }
    }
}

impl<W: Word, const N: usize> WordBlock for [W; N] {
    type Word = W;

    const LEN: usize = N;

    #[inline]
    fn zeroed() -> Self {
        [W::ZERO; N]
    }
}

/// Key material was not exactly the length the transform requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidKeyLength {
    /// Required byte count.
    pub expected: usize,
    /// Byte count received.
    pub actual: usize,
}

impl fmt::Display for InvalidKeyLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid key length: expected {} bytes, got {}",
            self.expected, self.actual
        )
    }
}

impl core::error::Error for InvalidKeyLength {}

/// Typed key accepted by a transform. Byte conversion is little-endian per
/// word.
pub trait KeyMaterial: Copy + Default + Zeroize + fmt::Debug + Send + Sync + 'static {
    /// Key length in bytes.
    const BYTES: usize;

    /// Parse exactly [`Self::BYTES`] bytes.
    ///
    /// # Errors
    ///
    /// [`InvalidKeyLength`] when `bytes.len() != Self::BYTES`.
    fn from_slice(bytes: &[u8]) -> Result<Self, InvalidKeyLength>;
}

fn check_len(bytes: &[u8], expected: usize) -> Result<(), InvalidKeyLength> {
    if bytes.len() == expected {
        Ok(())
    } else {
        Err(InvalidKeyLength {
            expected,
            actual: bytes.len(),
        })
    }
}

impl<const N: usize> KeyMaterial for [u8; N]
where [u8; N]: Default
{
    const BYTES: usize = N;

    fn from_slice(bytes: &[u8]) -> Result<Self, InvalidKeyLength> {
        check_len(bytes, N)?;
        Ok(core::array::from_fn(|i| bytes[i]))
    }
}

macro_rules! impl_word_key {
    ($($t:ty),*) => {
        $(
            impl<const N: usize> KeyMaterial for [$t; N]
            where [$t; N]: Default
            {
                const BYTES: usize = N * size_of::<$t>();

                fn from_slice(bytes: &[u8]) -> Result<Self, InvalidKeyLength> {
                    check_len(bytes, Self::BYTES)?;
                    let (chunks, _) = bytes.as_chunks::<{ size_of::<$t>() }>();
                    Ok(core::array::from_fn(|i| <$t>::from_le_bytes(chunks[i])))
                }
            }
        )*
    };
}

impl_word_key!(u32, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_from_le_slice() {
        assert_eq!(u32::from_le_slice(&[0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
        assert_eq!(
            u64::from_le_slice(&[1, 2, 3, 4, 5, 6, 7, 8]),
            0x0807_0605_0403_0201
        );
    }

    #[test]
    fn block_xor_assign() {
        let mut a = [0xF0u32, 0x0F];
        a.xor_assign(&[0xFF, 0xFF]);
        assert_eq!(a, [0x0F, 0xF0]);
    }

    #[test]
    fn word_keys_are_little_endian() {
        let bytes: [u8; 16] = core::array::from_fn(|i| i as u8);
        let key = <[u64; 2]>::from_slice(&bytes).unwrap();
        assert_eq!(key, [0x0706_0504_0302_0100, 0x0f0e_0d0c_0b0a_0908]);
        let key = <[u32; 4]>::from_slice(&bytes).unwrap();
        assert_eq!(key[3], 0x0f0e_0d0c);
    }

    #[test]
    fn wrong_key_length_is_reported() {
        let err = <[u32; 8]>::from_slice(&[0u8; 31]).unwrap_err();
        assert_eq!(
            err,
            InvalidKeyLength {
                expected: 32,
                actual: 31
            }
        );
        assert!(<[u8; 16]>::from_slice(&[0u8; 17]).is_err());
    }
}
