//! Known-answer and keystream self-tests.
//!
//! A run checks three things and reports every result instead of stopping
//! at the first mismatch:
//!
//! 1. each published vector against a single [`BlockTransform::encrypt`];
//! 2. the engine's first refills against a keystream computed block by
//!    block from each lane's origin and the refill index;
//! 3. every batched lane width against the scalar strategy.

use core::fmt;

use ks_cipher::{BlockTransform, KnownAnswers, LaneWidth, Word, WordBlock, WordOf};
use tracing::{info, warn};

use crate::{
    Engine, Error,
    config::{CounterLayout, EngineConfig, Mode, Strategy},
    counter::CounterBank,
};

/// Refills compared per keystream check.
const REFILLS: usize = 3;

/// Outcome of one comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Check {
    pub generator: &'static str,
    pub name: String,
    /// First lane that differed; `None` for a passing multi-lane check or a
    /// single-block vector.
    pub lane: Option<usize>,
    /// Word width used when printing.
    pub bits: u32,
    pub actual: Vec<u64>,
    pub expected: Vec<u64>,
}

impl Check {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.actual == self.expected
    }
}

struct HexWords<'a>(&'a [u64], u32);

impl fmt::Display for HexWords<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.1 / 4) as usize;
        for (i, w) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{w:0width$x}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.generator, self.name)?;
        if let Some(lane) = self.lane {
            write!(f, " (lane {lane})")?;
        }
        writeln!(f, " ... {}", if self.passed() { "ok" } else { "FAILED" })?;
        writeln!(f, "OUT: {}", HexWords(&self.actual, self.bits))?;
        write!(f, "REF: {}", HexWords(&self.expected, self.bits))
    }
}

/// All checks of one or more self-test runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelfTestReport {
    checks: Vec<Check>,
}

impl SelfTestReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }

    #[must_use]
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed())
    }

    pub fn merge(&mut self, other: Self) {
        self.checks.extend(other.checks);
    }

    fn record(&mut self, check: Check) {
        if check.passed() {
            info!(
                generator = check.generator,
                check = %check.name,
                "self-test check passed"
            );
        } else {
            warn!(
                generator = check.generator,
                check = %check.name,
                lane = ?check.lane,
                expected = %HexWords(&check.expected, check.bits),
                actual = %HexWords(&check.actual, check.bits),
                "self-test mismatch"
            );
        }
        self.checks.push(check);
    }
}

impl fmt::Display for SelfTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            writeln!(f, "{check}")?;
        }
        write!(
            f,
            "{} checks, {} failed",
            self.checks.len(),
            self.failures().count()
        )
    }
}

fn widen<W: Word>(words: &[W]) -> Vec<u64> {
    words.iter().map(|w| w.widen()).collect()
}

/// Encrypt `input` under `key` once and compare with `expected`.
#[must_use]
pub fn check_vector<T: BlockTransform>(
    label: &str, key: &T::Key, input: &T::Block, expected: &T::Block,
) -> Check {
    let actual = T::new(key).encrypt(input);
    Check {
        generator: T::NAME,
        name: label.to_owned(),
        lane: None,
        bits: <WordOf<T> as Word>::BITS,
        actual: widen(actual.as_ref()),
        expected: widen(expected.as_ref()),
    }
}

/// `base + delta` over the whole block, modulo `2^(bits * W)`.
pub(crate) fn offset_by<B: WordBlock>(base: &B, delta: u128) -> B {
    let bits = <B::Word as Word>::BITS;
    let mask = (1u128 << bits) - 1;
    let mut block = *base;
    let mut carry = delta;
    for w in block.as_mut() {
        let sum = u128::from(w.widen()) + (carry & mask);
        *w = <B::Word as Word>::truncate(sum as u64);
        carry = (carry >> bits) + (sum >> bits);
    }
    block
}

/// Starting counter and stride of `lane`, derived from the layout rules
/// directly rather than from the engine's counter bank.
fn reference_origin<B: WordBlock>(
    layout: CounterLayout, lanes: usize, lane: usize,
) -> (B, u128) {
    let zero = B::zeroed();
    match layout {
        CounterLayout::Interleaved => (offset_by(&zero, lane as u128), lanes as u128),
        CounterLayout::Partitioned if B::LEN > 1 => {
            let mut origin = zero;
            origin.as_mut()[B::LEN - 1] = <B::Word as Word>::truncate(lane as u64);
            (origin, 1)
        }
        CounterLayout::Partitioned => {
            // Index in the top ceil(log2 L) bits.
            let index_bits = lanes.next_power_of_two().trailing_zeros();
            let delta = if index_bits == 0 {
                0
            } else {
                (lane as u128) << (<B::Word as Word>::BITS - index_bits)
            };
            (offset_by(&zero, delta), 1)
        }
    }
}

/// The first `refills` buffers of an engine with `config` (and `iv`, in CBC
/// mode), computed one block at a time: lane `i` in refill `r` encrypts
/// `origin(i) + r * stride`, chained with its own previous output in CBC.
#[must_use]
pub fn reference_keystream<T: BlockTransform>(
    transform: &T, config: &EngineConfig, iv: Option<&T::Block>, refills: usize,
) -> Vec<WordOf<T>> {
    let lanes = config.lanes;
    let origins: Vec<(T::Block, u128)> = (0..lanes)
        .map(|lane| reference_origin(config.layout, lanes, lane))
        .collect();
    let mut prev = vec![iv.copied().unwrap_or_else(T::Block::zeroed); lanes];
    let mut out = Vec::with_capacity(refills * lanes * T::Block::LEN);
    for r in 0..refills {
        for ((origin, stride), prev) in origins.iter().zip(&mut prev) {
            let mut input = offset_by(origin, stride * r as u128);
            if config.mode == Mode::Cbc {
                input.xor_assign(prev);
            }
            let block = transform.encrypt(&input);
            *prev = block;
            out.extend_from_slice(block.as_ref());
        }
    }
    out
}

/// Words of `lane` across all refills of a lane-major stream.
fn lane_words<W: Word>(stream: &[W], lanes: usize, len: usize, lane: usize) -> Vec<u64> {
    stream
        .chunks_exact(lanes * len)
        .flat_map(|refill| &refill[lane * len..(lane + 1) * len])
        .map(|w| w.widen())
        .collect()
}

fn compare_lanes<T: BlockTransform>(
    name: String, lanes: usize, actual: &[WordOf<T>], expected: &[WordOf<T>],
) -> Check {
    let len = T::Block::LEN;
    let bad = (0..lanes).find(|&lane| {
        lane_words(actual, lanes, len, lane) != lane_words(expected, lanes, len, lane)
    });
    let shown = bad.unwrap_or(0);
    Check {
        generator: T::NAME,
        name,
        lane: bad,
        bits: <WordOf<T> as Word>::BITS,
        actual: lane_words(actual, lanes, len, shown),
        expected: lane_words(expected, lanes, len, shown),
    }
}

fn stream<T: BlockTransform>(
    transform: &T, config: EngineConfig, bank: CounterBank<T::Block>, words: usize,
) -> Vec<WordOf<T>> {
    let mut engine = Engine::assemble(transform.clone(), config, None, bank);
    let mut out = vec![<WordOf<T> as Word>::ZERO; words];
    engine.fill_words(&mut out);
    out
}

fn layout_stream<T: BlockTransform>(
    transform: &T, config: EngineConfig, words: usize,
) -> Vec<WordOf<T>> {
    stream(
        transform,
        config,
        CounterBank::new(config.lanes, config.layout),
        words,
    )
}

/// Compare an engine over `bank` with the reference keystream of `config`.
fn check_keystream<T: BlockTransform>(
    transform: &T, config: EngineConfig, bank: CounterBank<T::Block>,
) -> Check {
    let expected = reference_keystream(transform, &config, None, REFILLS);
    let actual = stream(transform, config, bank, expected.len());
    compare_lanes::<T>(
        format!("{} keystream, {}", config.mode, config.strategy),
        config.lanes,
        &actual,
        &expected,
    )
}

/// Full self-test of `T` under `config`.
///
/// # Errors
///
/// [`Error::UnsupportedLaneCount`] when `config` is invalid; mismatches are
/// reported inside the [`SelfTestReport`].
pub fn run<T: KnownAnswers>(config: &EngineConfig) -> Result<SelfTestReport, Error> {
    config.validate()?;
    Ok(run_validated::<T>(config))
}

pub(crate) fn run_validated<T: KnownAnswers>(config: &EngineConfig) -> SelfTestReport {
    let mut report = SelfTestReport::default();
    for v in T::VECTORS {
        report.record(check_vector::<T>(v.label, &v.key, &v.input, &v.output));
    }

    let key = T::VECTORS.first().map(|v| v.key).unwrap_or_default();
    let transform = T::new(&key);
    let lanes = config.lanes;

    let scalar_config = config.with_strategy(Strategy::Scalar);
    let mut strategies = vec![scalar_config];
    if config.strategy != Strategy::Scalar {
        strategies.push(*config);
    }
    for config in strategies {
        let bank = CounterBank::new(lanes, config.layout);
        report.record(check_keystream(&transform, config, bank));
    }

    let words = REFILLS * lanes * T::Block::LEN;
    let scalar = layout_stream(&transform, scalar_config, words);
    for width in LaneWidth::ALL {
        let batched = layout_stream(
            &transform,
            config.with_strategy(Strategy::Batched(width)),
            words,
        );
        report.record(compare_lanes::<T>(
            format!("batched-{width} vs scalar"),
            lanes,
            &batched,
            &scalar,
        ));
    }
    report
}
