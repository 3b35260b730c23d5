//! Fixsim Fixed-Point Values
//!
//! Signed fixed-point numbers for modelling hardware arithmetic in simulation.
//! A value pairs a raw two's-complement integer with a [`Format`]
//! `(total_width, integer_width, fractional_width)`; arithmetic grows the
//! format so results are exact, while conversions from reals and
//! re-quantization go through the rounding and overflow engines.

mod config;
mod error;
mod fixed;
mod format;
mod mode;
mod ops;
pub mod overflow;
pub mod round;

pub use config::{FixedConfig, OVERFLOW_MODE_ENV, ROUND_MODE_ENV};
pub use error::{FixedPointError, Result};
pub use fixed::{FixedBuilder, FixedValue};
pub use format::Format;
pub use mode::{OverflowMode, RoundMode};
pub use ops::SupportsFixedArithmetic;
