//! Rounding and overflow mode selectors

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FixedPointError;

/// How discarded fractional bits are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundMode {
    /// Toward negative infinity (truncate the raw bits)
    #[default]
    Floor,
    /// Toward positive infinity
    Ceil,
    /// Toward zero
    Fix,
    /// To nearest. Real ties go away from zero; on re-quantization
    /// non-negative ties round up and negative ties round down
    Nearest,
    /// To nearest. Real ties go away from zero; on re-quantization every
    /// tie rounds toward positive infinity
    Round,
    /// To nearest, ties to even (convergent rounding)
    #[serde(alias = "convergent")]
    RoundEven,
}

impl RoundMode {
    pub const ALL: [RoundMode; 6] = [
        RoundMode::Floor,
        RoundMode::Ceil,
        RoundMode::Fix,
        RoundMode::Nearest,
        RoundMode::Round,
        RoundMode::RoundEven,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundMode::Floor => "floor",
            RoundMode::Ceil => "ceil",
            RoundMode::Fix => "fix",
            RoundMode::Nearest => "nearest",
            RoundMode::Round => "round",
            RoundMode::RoundEven => "round_even",
        }
    }
}

impl FromStr for RoundMode {
    type Err = FixedPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "floor" => Ok(RoundMode::Floor),
            "ceil" => Ok(RoundMode::Ceil),
            "fix" => Ok(RoundMode::Fix),
            "nearest" => Ok(RoundMode::Nearest),
            "round" => Ok(RoundMode::Round),
            "round_even" | "convergent" => Ok(RoundMode::RoundEven),
            other => Err(FixedPointError::InvalidRoundMode(other.to_string())),
        }
    }
}

impl fmt::Display for RoundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// How out-of-range results are brought back into range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowMode {
    /// Clamp to the nearest representable bound
    #[default]
    Saturate,
    /// Two's-complement wraparound
    #[serde(alias = "ring")]
    Wrap,
}

impl OverflowMode {
    pub const ALL: [OverflowMode; 2] = [OverflowMode::Saturate, OverflowMode::Wrap];

    pub fn as_str(&self) -> &'static str {
        match self {
            OverflowMode::Saturate => "saturate",
            OverflowMode::Wrap => "wrap",
        }
    }
}

impl FromStr for OverflowMode {
    type Err = FixedPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "saturate" => Ok(OverflowMode::Saturate),
            "wrap" | "ring" => Ok(OverflowMode::Wrap),
            other => Err(FixedPointError::InvalidOverflowMode(other.to_string())),
        }
    }
}

impl fmt::Display for OverflowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
