//! Fixsim bit-vector storage
//!
//! Bounded two's-complement integers with bit and bit-range access.
//! This is the raw storage layer underneath the fixed-point value type:
//! it knows nothing about binary points, only about bounds and bits.

mod error;
mod intbv;

pub use error::{IntBvError, Result};
pub use intbv::IntBv;
