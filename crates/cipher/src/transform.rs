use zeroize::Zeroize;

use crate::{InvalidKeyLength, KeyMaterial, LaneWidth, WordBlock};

/// Output word type of a transform.
pub type WordOf<T> = <<T as BlockTransform>::Block as WordBlock>::Word;

/// Deterministic keyed function on a fixed-width block.
///
/// The engine treats implementors as opaque: it only forms input blocks,
/// calls [`encrypt`](Self::encrypt) or [`encrypt_batch`](Self::encrypt_batch)
/// and reads the output words.
pub trait BlockTransform: Clone + Send + Sync + Sized + 'static {
    type Block: WordBlock;
    type Key: KeyMaterial;

    /// Short display name used in diagnostics.
    const NAME: &'static str;
    const ROUNDS: usize;

    /// Run the key schedule.
    #[must_use]
    fn new(key: &Self::Key) -> Self;

    /// Key from little-endian bytes; the intermediate key is wiped.
    ///
    /// # Errors
    ///
    /// [`InvalidKeyLength`] when `bytes` is not exactly
    /// [`KeyMaterial::BYTES`] long.
    fn new_from_slice(bytes: &[u8]) -> Result<Self, InvalidKeyLength> {
        let mut key = Self::Key::from_slice(bytes)?;
        let transform = Self::new(&key);
        key.zeroize();
        Ok(transform)
    }

    #[must_use]
    fn encrypt(&self, block: &Self::Block) -> Self::Block;

    #[inline]
    fn encrypt_in_place(&self, block: &mut Self::Block) {
        *block = self.encrypt(block);
    }

    /// Encrypt every block in place, `width` blocks per step.
    ///
    /// Must equal calling [`encrypt_in_place`](Self::encrypt_in_place) on
    /// each block. The default ignores `width`.
    fn encrypt_batch(&self, blocks: &mut [Self::Block], width: LaneWidth) {
        let _ = width;
        for block in blocks {
            self.encrypt_in_place(block);
        }
    }
}

/// One published known-answer vector.
#[derive(Debug)]
pub struct KatVector<T: BlockTransform> {
    pub label: &'static str,
    pub key: T::Key,
    pub input: T::Block,
    pub output: T::Block,
}

impl<T: BlockTransform> Clone for KatVector<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: BlockTransform> Copy for KatVector<T> {}

/// Transform with published vectors for self-testing.
pub trait KnownAnswers: BlockTransform {
    const VECTORS: &'static [KatVector<Self>];
}
