//! The keystream engine: one keyed transform, one counter bank, one buffer.

use core::fmt;

use ks_cipher::{BlockTransform, KeyMaterial, KnownAnswers, Word, WordBlock, WordOf};
use rand_core::RngCore;
use tracing::debug;
use zeroize::Zeroizing;

use crate::{
    Error,
    buffer::OutputBuffer,
    config::{CounterLayout, EngineConfig, Mode, Strategy},
    counter::CounterBank,
    mode::ModeController,
    selftest::{self, SelfTestReport},
};

/// Word-addressable keystream over a keyed block transform.
///
/// Each lane encrypts its own counter (CTR) or its counter XOR its previous
/// output (CBC). Words come out lane-major: every word of lane 0's block,
/// then lane 1's, and so on; then the next refill. The sequence does not
/// depend on [`Strategy`].
pub struct Engine<T: BlockTransform> {
    transform: T,
    config: EngineConfig,
    bank: CounterBank<T::Block>,
    mode: ModeController<T::Block>,
    buffer: OutputBuffer<T::Block>,
    refills: u64,
}

impl<T: BlockTransform> Engine<T> {
    /// # Errors
    ///
    /// [`Error::UnsupportedLaneCount`] for an out-of-range lane count.
    pub fn new(transform: T, config: EngineConfig) -> Result<Self, Error> {
        Self::builder(transform).config(config).build()
    }

    #[must_use]
    pub fn builder(transform: T) -> EngineBuilder<T> {
        EngineBuilder {
            transform,
            config: EngineConfig::default(),
            iv: None,
            offsets: None,
        }
    }

    /// # Errors
    ///
    /// See [`Engine::new`].
    pub fn from_key(key: &T::Key, config: EngineConfig) -> Result<Self, Error> {
        Self::new(T::new(key), config)
    }

    /// # Errors
    ///
    /// [`Error::InvalidKeyLength`] when `key` is not exactly
    /// [`KeyMaterial::BYTES`] long, otherwise see [`Engine::new`].
    pub fn from_key_slice(key: &[u8], config: EngineConfig) -> Result<Self, Error> {
        Self::new(T::new_from_slice(key)?, config)
    }

    /// Key drawn from `rng`.
    ///
    /// # Errors
    ///
    /// See [`Engine::new`].
    pub fn from_rng<R: RngCore + ?Sized>(rng: &mut R, config: EngineConfig) -> Result<Self, Error> {
        let mut key = Zeroizing::new(vec![0u8; <T::Key as KeyMaterial>::BYTES]);
        rng.fill_bytes(&mut key);
        Self::from_key_slice(&key, config)
    }

    /// Next word of the stream. Refills when the buffer is exhausted.
    #[inline]
    pub fn next_word(&mut self) -> WordOf<T> {
        loop {
            if let Some(word) = self.buffer.read() {
                return word;
            }
            self.refill();
        }
    }

    pub fn fill_words(&mut self, dst: &mut [WordOf<T>]) {
        for w in dst {
            *w = self.next_word();
        }
    }

    fn refill(&mut self) {
        self.buffer.refill(
            &self.transform,
            self.config.strategy,
            &mut self.bank,
            &mut self.mode,
        );
        self.refills = self.refills.wrapping_add(1);
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Counters the next refill will consume.
    #[inline]
    #[must_use]
    pub fn counters(&self) -> &[T::Block] {
        self.bank.counters()
    }

    /// Cursor within the current buffer, in words.
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.buffer.position()
    }

    /// Words produced per refill.
    #[inline]
    #[must_use]
    pub fn words_per_refill(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    #[must_use]
    pub fn refills(&self) -> u64 {
        self.refills
    }

    /// Run the transform's self-test under this engine's configuration.
    #[must_use]
    pub fn self_test(&self) -> SelfTestReport
    where T: KnownAnswers {
        selftest::run_validated::<T>(&self.config)
    }

    /// Engine from parts that are already consistent with `config`.
    pub(crate) fn assemble(
        transform: T, config: EngineConfig, iv: Option<T::Block>, bank: CounterBank<T::Block>,
    ) -> Self {
        let lanes = config.lanes;
        Self {
            mode: ModeController::new(config.mode, lanes, iv),
            buffer: OutputBuffer::new(lanes),
            transform,
            config,
            bank,
            refills: 0,
        }
    }
}

impl<T: BlockTransform> fmt::Debug for Engine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("transform", &T::NAME)
            .field("config", &self.config)
            .field("position", &self.buffer.position())
            .field("refills", &self.refills)
            .finish_non_exhaustive()
    }
}

impl<T: BlockTransform> RngCore for Engine<T> {
    /// One word, truncated to its low 32 bits for 64-bit transforms.
    fn next_u32(&mut self) -> u32 {
        self.next_word().widen() as u32
    }

    /// One 64-bit word, or two 32-bit words with the first in the low half.
    fn next_u64(&mut self) -> u64 {
        if <WordOf<T> as Word>::BITS == 64 {
            self.next_word().widen()
        } else {
            let lo = self.next_word().widen();
            let hi = self.next_word().widen();
            lo | (hi << 32)
        }
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dst);
    }
}

/// Builder for engines that need more than an [`EngineConfig`]: a CBC
/// initialization value or explicit counter offsets.
pub struct EngineBuilder<T: BlockTransform> {
    transform: T,
    config: EngineConfig,
    iv: Option<T::Block>,
    offsets: Option<(Vec<T::Block>, WordOf<T>)>,
}

impl<T: BlockTransform> EngineBuilder<T> {
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn lanes(mut self, lanes: usize) -> Self {
        self.config.lanes = lanes;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    #[must_use]
    pub fn layout(mut self, layout: CounterLayout) -> Self {
        self.config.layout = layout;
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Previous output assumed by every lane's first CBC refill.
    #[must_use]
    pub fn iv(mut self, iv: T::Block) -> Self {
        self.iv = Some(iv);
        self
    }

    /// Start lane `i` at `offsets[i]` and advance every lane by `stride`,
    /// replacing the configured layout.
    #[must_use]
    pub fn start_offsets(mut self, offsets: Vec<T::Block>, stride: WordOf<T>) -> Self {
        self.offsets = Some((offsets, stride));
        self
    }

    /// # Errors
    ///
    /// - [`Error::UnsupportedLaneCount`] for a lane count outside
    ///   `1..=MAX_LANES`.
    /// - [`Error::IvWithoutChaining`] for an IV in CTR mode.
    /// - [`Error::OffsetCountMismatch`], [`Error::DuplicateOffsets`] or
    ///   [`Error::ZeroStride`] for unusable explicit offsets.
    pub fn build(self) -> Result<Engine<T>, Error> {
        let Self {
            transform,
            config,
            iv,
            offsets,
        } = self;
        config.validate()?;
        if iv.is_some() && config.mode != Mode::Cbc {
            return Err(Error::IvWithoutChaining);
        }

        let lanes = config.lanes;
        let bank = match offsets {
            None => CounterBank::new(lanes, config.layout),
            Some((offsets, stride)) => {
                check_offsets(&offsets, lanes, stride)?;
                CounterBank::with_offsets(offsets, stride)
            }
        };

        debug!(
            transform = T::NAME,
            rounds = T::ROUNDS,
            lanes,
            mode = %config.mode,
            layout = %config.layout,
            strategy = %config.strategy,
            "keystream engine ready"
        );

        Ok(Engine::assemble(transform, config, iv, bank))
    }
}

fn check_offsets<B: WordBlock>(offsets: &[B], lanes: usize, stride: B::Word) -> Result<(), Error> {
    if offsets.len() != lanes {
        return Err(Error::OffsetCountMismatch {
            expected: lanes,
            actual: offsets.len(),
        });
    }
    if stride == <B::Word as Word>::ZERO {
        return Err(Error::ZeroStride);
    }
    for (first, a) in offsets.iter().enumerate() {
        if let Some(second) = offsets[first + 1..].iter().position(|b| b == a) {
            return Err(Error::DuplicateOffsets {
                first,
                second: first + 1 + second,
            });
        }
    }
    Ok(())
}
