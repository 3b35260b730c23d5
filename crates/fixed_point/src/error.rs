//! Fixed-point error types

use fixsim_intbv::IntBvError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FixedPointError {
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid round mode: {0}")]
    InvalidRoundMode(String),

    #[error("Invalid overflow mode: {0}")]
    InvalidOverflowMode(String),

    #[error("Invalid exponent: {0} (must be a non-negative integer)")]
    InvalidExponent(i64),

    #[error("Unsupported operand type for {op}: {type_name}")]
    UnsupportedOperandType {
        op: &'static str,
        type_name: &'static str,
    },

    #[error("Width mismatch: total {total} != integer {integer} + fractional {fractional} + 1")]
    WidthMismatch {
        total: u32,
        integer: u32,
        fractional: u32,
    },

    #[error("Format too wide: integer {integer} + fractional {fractional} + 1 exceeds u32 bits")]
    WidthOverflow { integer: u64, fractional: u64 },

    #[error("Storage error: {0}")]
    Storage(#[from] IntBvError),
}

impl FixedPointError {
    /// True when the storage layer rejected a value outside its bounds
    pub fn is_bounds_violation(&self) -> bool {
        matches!(self, Self::Storage(IntBvError::BoundsViolation { .. }))
    }
}

pub type Result<T> = std::result::Result<T, FixedPointError>;
