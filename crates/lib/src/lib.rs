//! `ks-rs`: lane-batched keystream engine over keyed block transforms.
//!
//! An [`Engine`] turns a [`BlockTransform`] into an endless stream of words:
//! `L` independent lanes each hold a multi-word counter, every refill
//! encrypts one block per lane (counter mode, or chained with the lane's
//! previous output) and the caller drains the buffer with
//! [`Engine::next_word`]. Batched refills run the transform's lane kernels
//! and produce exactly the scalar word sequence.
//!
//! [`catalog::Generator`] names the concrete generators built on the
//! transforms of [`cipher`], and [`selftest`] checks each against published
//! vectors and an independently computed reference keystream.

#![deny(unsafe_code)]

pub mod buffer;
pub mod catalog;
pub mod config;
pub mod counter;
pub mod engine;
pub mod mode;
pub mod selftest;

pub use catalog::{Generator, self_test_all};
pub use config::{CounterLayout, EngineConfig, MAX_LANES, Mode, Strategy};
pub use engine::{Engine, EngineBuilder};
pub use ks_cipher::{self as cipher, BlockTransform, KnownAnswers, LaneWidth, WordOf};
pub use selftest::SelfTestReport;

/// Configuration errors reported while building an engine.
///
/// Reading words never fails; only construction does.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Lane count outside `1..=MAX_LANES`.
    #[error("unsupported lane count {requested} (supported: 1..={max})")]
    UnsupportedLaneCount {
        /// Lane count asked for.
        requested: usize,
        /// Largest supported lane count.
        max: usize,
    },

    /// Key byte slice has the wrong length for the transform.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Key size of the transform in bytes.
        expected: usize,
        /// Byte count received.
        actual: usize,
    },

    /// Mode name other than `ctr` or `cbc`.
    #[error("unknown mode `{0}` (expected `ctr` or `cbc`)")]
    UnknownMode(String),

    /// Counter layout name other than `interleaved` or `partitioned`.
    #[error("unknown counter layout `{0}` (expected `interleaved` or `partitioned`)")]
    UnknownLayout(String),

    /// Strategy name that is neither `scalar` nor a supported batch width.
    #[error("unknown strategy `{0}` (expected `scalar` or `batched-{{2,4,8,16}}`)")]
    UnknownStrategy(String),

    /// Name that matches no [`Generator`].
    #[error("unknown generator `{0}`")]
    UnknownGenerator(String),

    /// An initialization value only has meaning for the chained mode.
    #[error("an initialization value was given but the mode is not cbc")]
    IvWithoutChaining,

    /// Explicit start offsets do not give one counter per lane.
    #[error("expected {expected} start offsets, got {actual}")]
    OffsetCountMismatch {
        /// Configured lane count.
        expected: usize,
        /// Number of offsets supplied.
        actual: usize,
    },

    /// Two lanes would produce the same counter sequence.
    #[error("lanes {first} and {second} have the same start offset")]
    DuplicateOffsets {
        /// Lower lane index.
        first: usize,
        /// Higher lane index sharing its offset.
        second: usize,
    },

    /// Explicit offsets with a stride of zero never advance.
    #[error("counter stride must be non-zero")]
    ZeroStride,
}

impl From<ks_cipher::InvalidKeyLength> for Error {
    fn from(e: ks_cipher::InvalidKeyLength) -> Self {
        Self::InvalidKeyLength {
            expected: e.expected,
            actual: e.actual,
        }
    }
}
