//! Named generators.
//!
//! Each [`Generator`] is one [`BlockTransform`] driven by an [`Engine`] and
//! exposed as a boxed [`RngCore`], so callers can pick a generator by name at
//! run time.

use core::{fmt, str::FromStr};

use ks_cipher::{
    Aes128, BlockTransform, KeyMaterial, Magma, Speck128Full, Speck128R16, Threefry4x64R20,
    Threefry4x64R72, Xtea, Xtea2,
};
use rand_core::RngCore;

use crate::{
    Engine, Error,
    config::EngineConfig,
    selftest::{self, SelfTestReport},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Generator {
    Aes128,
    Speck128,
    Speck128R16,
    /// Threefry4x64, 20 rounds.
    Threefry,
    /// Threefry4x64, 72 rounds (the Threefish-256 round count).
    Threefish,
    Magma,
    Xtea,
    Xtea2,
}

/// Expand `$body` with `$T` bound to the transform behind `$gen`.
macro_rules! with_transform {
    ($gen:expr, $T:ident => $body:expr) => {
        match $gen {
            Generator::Aes128 => {
                type $T = Aes128;
                $body
            }
            Generator::Speck128 => {
                type $T = Speck128Full;
                $body
            }
            Generator::Speck128R16 => {
                type $T = Speck128R16;
                $body
            }
            Generator::Threefry => {
                type $T = Threefry4x64R20;
                $body
            }
            Generator::Threefish => {
                type $T = Threefry4x64R72;
                $body
            }
            Generator::Magma => {
                type $T = Magma;
                $body
            }
            Generator::Xtea => {
                type $T = Xtea;
                $body
            }
            Generator::Xtea2 => {
                type $T = Xtea2;
                $body
            }
        }
    };
}

impl Generator {
    pub const ALL: [Self; 8] = [
        Self::Aes128,
        Self::Speck128,
        Self::Speck128R16,
        Self::Threefry,
        Self::Threefish,
        Self::Magma,
        Self::Xtea,
        Self::Xtea2,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Aes128 => "aes128",
            Self::Speck128 => "speck128",
            Self::Speck128R16 => "speck128-r16",
            Self::Threefry => "threefry",
            Self::Threefish => "threefish",
            Self::Magma => "magma",
            Self::Xtea => "xtea",
            Self::Xtea2 => "xtea2",
        }
    }

    /// Key length in bytes.
    #[must_use]
    pub fn key_bytes(self) -> usize {
        with_transform!(self, T => <<T as BlockTransform>::Key as KeyMaterial>::BYTES)
    }

    /// Keystream under `key`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKeyLength`] unless `key.len() == self.key_bytes()`,
    /// or any configuration error of [`Engine::new`].
    pub fn build(self, key: &[u8], config: EngineConfig) -> Result<Box<dyn RngCore + Send>, Error> {
        with_transform!(self, T => {
            let engine = Engine::<T>::from_key_slice(key, config)?;
            Ok(Box::new(engine) as Box<dyn RngCore + Send>)
        })
    }

    /// Keystream under a key drawn from `rng`.
    ///
    /// # Errors
    ///
    /// See [`Engine::new`].
    pub fn build_from_rng<R: RngCore + ?Sized>(
        self, rng: &mut R, config: EngineConfig,
    ) -> Result<Box<dyn RngCore + Send>, Error> {
        with_transform!(self, T => {
            let engine = Engine::<T>::from_rng(rng, config)?;
            Ok(Box::new(engine) as Box<dyn RngCore + Send>)
        })
    }

    /// # Errors
    ///
    /// [`Error::UnsupportedLaneCount`] for an invalid `config`.
    pub fn self_test(self, config: &EngineConfig) -> Result<SelfTestReport, Error> {
        with_transform!(self, T => selftest::run::<T>(config))
    }
}

/// Self-test every generator under `config` and concatenate the reports.
///
/// # Errors
///
/// [`Error::UnsupportedLaneCount`] for an invalid `config`.
pub fn self_test_all(config: &EngineConfig) -> Result<SelfTestReport, Error> {
    config.validate()?;
    let mut report = SelfTestReport::default();
    for generator in Generator::ALL {
        report.merge(generator.self_test(config)?);
    }
    Ok(report)
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Generator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownGenerator(s.to_owned()))
    }
}
