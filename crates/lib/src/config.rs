//! Engine configuration: lane count, chaining mode, counter layout and
//! refill strategy.
//!
//! All four knobs parse from short strings and deserialize with `serde`, so
//! a configuration can come from a file or a command line unchanged.

use core::{fmt, str::FromStr};

use ks_cipher::LaneWidth;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Largest supported lane count.
pub const MAX_LANES: usize = 64;

/// How each lane forms its next input block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Input is the lane's counter.
    #[default]
    Ctr,
    /// Input is the lane's counter XOR the lane's previous output block.
    Cbc,
}

/// Where each lane's counter starts and how far it moves per refill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterLayout {
    /// Lane `i` starts at `i`, stride `L`.
    #[default]
    Interleaved,
    /// Lane `i` owns a slice of the counter space selected by the top word,
    /// stride 1.
    Partitioned,
}

/// How a refill invokes the transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Strategy {
    /// One `encrypt` call per lane.
    Scalar,
    /// Lane kernels of the given width, scalar for the remainder.
    Batched(LaneWidth),
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Batched(LaneWidth::L8)
    }
}

/// Complete engine configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub lanes: usize,
    pub mode: Mode,
    pub layout: CounterLayout,
    pub strategy: Strategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lanes: 8,
            mode: Mode::Ctr,
            layout: CounterLayout::Interleaved,
            strategy: Strategy::default(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_lanes(self, lanes: usize) -> Self {
        Self { lanes, ..self }
    }

    #[must_use]
    pub fn with_mode(self, mode: Mode) -> Self {
        Self { mode, ..self }
    }

    #[must_use]
    pub fn with_layout(self, layout: CounterLayout) -> Self {
        Self { layout, ..self }
    }

    #[must_use]
    pub fn with_strategy(self, strategy: Strategy) -> Self {
        Self { strategy, ..self }
    }

    /// # Errors
    ///
    /// [`Error::UnsupportedLaneCount`] unless `1 <= lanes <= MAX_LANES`.
    pub fn validate(&self) -> Result<(), Error> {
        if (1..=MAX_LANES).contains(&self.lanes) {
            Ok(())
        } else {
            Err(Error::UnsupportedLaneCount {
                requested: self.lanes,
                max: MAX_LANES,
            })
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ctr => "ctr",
            Self::Cbc => "cbc",
        })
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ctr" => Ok(Self::Ctr),
            "cbc" => Ok(Self::Cbc),
            _ => Err(Error::UnknownMode(s.to_owned())),
        }
    }
}

impl fmt::Display for CounterLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interleaved => "interleaved",
            Self::Partitioned => "partitioned",
        })
    }
}

impl FromStr for CounterLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "interleaved" => Ok(Self::Interleaved),
            "partitioned" => Ok(Self::Partitioned),
            _ => Err(Error::UnknownLayout(s.to_owned())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("scalar"),
            Self::Batched(w) => write!(f, "batched-{w}"),
        }
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if lower == "scalar" {
            return Ok(Self::Scalar);
        }
        lower
            .strip_prefix("batched-")
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| LaneWidth::try_from(n).ok())
            .map(Self::Batched)
            .ok_or_else(|| Error::UnknownStrategy(s.to_owned()))
    }
}

impl TryFrom<String> for Strategy {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Strategy> for String {
    fn from(s: Strategy) -> Self {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.lanes, 8);
        assert_eq!(c.mode, Mode::Ctr);
        assert_eq!(c.layout, CounterLayout::Interleaved);
        assert_eq!(c.strategy, Strategy::Batched(LaneWidth::L8));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn lane_count_bounds() {
        assert!(EngineConfig::default().with_lanes(1).validate().is_ok());
        assert!(EngineConfig::default().with_lanes(64).validate().is_ok());
        assert_eq!(
            EngineConfig::default().with_lanes(0).validate(),
            Err(Error::UnsupportedLaneCount {
                requested: 0,
                max: 64
            })
        );
        assert!(EngineConfig::default().with_lanes(65).validate().is_err());
    }

    #[test]
    fn parse_names() {
        assert_eq!("CBC".parse::<Mode>(), Ok(Mode::Cbc));
        assert_eq!("ctr".parse::<Mode>(), Ok(Mode::Ctr));
        assert_eq!(
            "ofb".parse::<Mode>(),
            Err(Error::UnknownMode("ofb".to_owned()))
        );
        assert_eq!(
            "partitioned".parse::<CounterLayout>(),
            Ok(CounterLayout::Partitioned)
        );
        assert!("striped".parse::<CounterLayout>().is_err());
        assert_eq!("scalar".parse::<Strategy>(), Ok(Strategy::Scalar));
        assert_eq!(
            "batched-16".parse::<Strategy>(),
            Ok(Strategy::Batched(LaneWidth::L16))
        );
        assert!("batched-3".parse::<Strategy>().is_err());
        assert!("batched-".parse::<Strategy>().is_err());
    }

    #[test]
    fn display_parses_back() {
        for s in [
            Strategy::Scalar,
            Strategy::Batched(LaneWidth::L2),
            Strategy::Batched(LaneWidth::L4),
        ] {
            assert_eq!(s.to_string().parse::<Strategy>(), Ok(s));
        }
        assert_eq!(Mode::Cbc.to_string(), "cbc");
        assert_eq!(CounterLayout::Interleaved.to_string(), "interleaved");
    }

    #[test]
    fn deserialize_partial_config() {
        let c: EngineConfig =
            serde_json::from_str(r#"{"lanes": 16, "mode": "cbc", "strategy": "batched-4"}"#)
                .unwrap();
        assert_eq!(c.lanes, 16);
        assert_eq!(c.mode, Mode::Cbc);
        assert_eq!(c.layout, CounterLayout::Interleaved);
        assert_eq!(c.strategy, Strategy::Batched(LaneWidth::L4));

        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains(r#""strategy":"batched-4""#));
    }

    #[test]
    fn deserialize_rejects_unknown_values() {
        for json in [
            r#"{"strategy": "vector"}"#,
            r#"{"mode": "ecb"}"#,
            r#"{"lane": 4}"#,
        ] {
            assert!(serde_json::from_str::<EngineConfig>(json).is_err(), "{json}");
        }
    }
}
