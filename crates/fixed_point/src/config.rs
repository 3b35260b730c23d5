//! Default mode configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mode::{OverflowMode, RoundMode};

/// Environment variable selecting the default round mode
pub const ROUND_MODE_ENV: &str = "FIXSIM_ROUND_MODE";

/// Environment variable selecting the default overflow mode
pub const OVERFLOW_MODE_ENV: &str = "FIXSIM_OVERFLOW_MODE";

/// Rounding and overflow modes attached to a value at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedConfig {
    /// Rounding applied when fractional bits are discarded
    pub round_mode: RoundMode,

    /// Overflow handling applied when a value leaves its range
    pub overflow_mode: OverflowMode,
}

impl FixedConfig {
    pub fn new(round_mode: RoundMode, overflow_mode: OverflowMode) -> Self {
        Self {
            round_mode,
            overflow_mode,
        }
    }

    /// Create config from environment variables.
    ///
    /// Unset variables keep the defaults; unknown mode names are an error.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(mode) = std::env::var(ROUND_MODE_ENV) {
            config.round_mode = mode.parse()?;
        }

        if let Ok(mode) = std::env::var(OVERFLOW_MODE_ENV) {
            config.overflow_mode = mode.parse()?;
        }

        Ok(config)
    }

    pub fn with_round_mode(mut self, round_mode: RoundMode) -> Self {
        self.round_mode = round_mode;
        self
    }

    pub fn with_overflow_mode(mut self, overflow_mode: OverflowMode) -> Self {
        self.overflow_mode = overflow_mode;
        self
    }
}
