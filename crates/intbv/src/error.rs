//! Bit-vector error types

use num_bigint::BigInt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntBvError {
    #[error("Bounds violation: value {value} outside [{min}, {max})")]
    BoundsViolation {
        value: BigInt,
        min: BigInt,
        max: BigInt,
    },

    #[error("Empty range: min {min} must be below max {max}")]
    EmptyRange { min: BigInt, max: BigInt },

    #[error("Bit index {index} out of range for width {width}")]
    BitIndex { index: u32, width: u32 },

    #[error("Invalid slice [{hi}:{lo}] for width {width}")]
    SliceRange { hi: u32, lo: u32, width: u32 },

    #[error("Slice value {value} does not fit in {bits} bits")]
    SliceOverflow { value: BigInt, bits: u32 },
}

pub type Result<T> = std::result::Result<T, IntBvError>;
