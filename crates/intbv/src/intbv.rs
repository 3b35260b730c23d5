//! Bounded integer storage

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::error::{IntBvError, Result};

/// A signed integer constrained to the half-open range `[min, max)`.
///
/// The bit width is derived from the bounds. Bit access treats the value as
/// a two's-complement pattern of that width.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntBv {
    value: BigInt,
    min: BigInt,
    max: BigInt,
    width: u32,
}

/// `2^bits - 1`
fn mask(bits: u32) -> BigInt {
    (BigInt::one() << bits) - 1u32
}

/// Number of bits needed for the magnitude of a non-negative value
fn magnitude_bits(value: &BigInt) -> u32 {
    if value.is_positive() {
        value.bits() as u32
    } else {
        0
    }
}

impl IntBv {
    /// Create a bounded integer, rejecting values outside `[min, max)`
    pub fn new(value: BigInt, min: BigInt, max: BigInt) -> Result<Self> {
        if min >= max {
            return Err(IntBvError::EmptyRange { min, max });
        }

        let width = if min.is_negative() {
            let top_value: BigInt = &max - 1u32;
            let bottom_value: BigInt = -&min - 1u32;
            let top = magnitude_bits(&top_value);
            let bottom = magnitude_bits(&bottom_value);
            top.max(bottom) + 1
        } else {
            let top_value: BigInt = &max - 1u32;
            magnitude_bits(&top_value).max(1)
        };

        let bv = Self {
            value,
            min,
            max,
            width,
        };
        bv.handle_bounds()?;
        Ok(bv)
    }

    /// Create a signed integer of exactly `width` bits: `[-2^(w-1), 2^(w-1))`
    pub fn with_width(value: BigInt, width: u32) -> Result<Self> {
        if width == 0 {
            return Err(IntBvError::EmptyRange {
                min: BigInt::zero(),
                max: BigInt::zero(),
            });
        }
        let half = BigInt::one() << (width - 1);
        Self::new(value, -&half, half)
    }

    /// The stored integer
    pub fn value(&self) -> &BigInt {
        &self.value
    }

    /// Replace the stored integer and enforce the bounds.
    ///
    /// On failure the previous value is kept.
    pub fn set_value(&mut self, value: BigInt) -> Result<()> {
        let previous = std::mem::replace(&mut self.value, value);
        if let Err(e) = self.handle_bounds() {
            self.value = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Check the stored value against the bounds
    pub fn handle_bounds(&self) -> Result<()> {
        if self.value < self.min || self.value >= self.max {
            return Err(IntBvError::BoundsViolation {
                value: self.value.clone(),
                min: self.min.clone(),
                max: self.max.clone(),
            });
        }
        Ok(())
    }

    /// Inclusive lower bound
    pub fn min(&self) -> &BigInt {
        &self.min
    }

    /// Exclusive upper bound
    pub fn max(&self) -> &BigInt {
        &self.max
    }

    /// Bit width of the storage
    pub fn len(&self) -> u32 {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0
    }

    fn is_signed(&self) -> bool {
        self.min.is_negative()
    }

    /// The value as an unsigned `width`-bit pattern
    pub fn pattern(&self) -> BigInt {
        &self.value & mask(self.width)
    }

    /// Interpret a `width`-bit pattern back into the value domain
    fn from_pattern(&self, pattern: BigInt) -> BigInt {
        if self.is_signed() && pattern.bit(u64::from(self.width - 1)) {
            pattern - (BigInt::one() << self.width)
        } else {
            pattern
        }
    }

    /// Read a single bit
    pub fn bit(&self, index: u32) -> Result<bool> {
        if index >= self.width {
            return Err(IntBvError::BitIndex {
                index,
                width: self.width,
            });
        }
        Ok(self.value.bit(u64::from(index)))
    }

    /// Write a single bit, then enforce the bounds
    pub fn set_bit(&mut self, index: u32, bit: bool) -> Result<()> {
        if index >= self.width {
            return Err(IntBvError::BitIndex {
                index,
                width: self.width,
            });
        }
        let mut pattern = self.pattern();
        pattern.set_bit(u64::from(index), bit);
        let value = self.from_pattern(pattern);
        self.set_value(value)
    }

    fn check_slice(&self, hi: u32, lo: u32) -> Result<()> {
        if hi <= lo || hi > self.width {
            return Err(IntBvError::SliceRange {
                hi,
                lo,
                width: self.width,
            });
        }
        Ok(())
    }

    /// Read bits `[lo, hi)` as an unsigned integer
    pub fn slice(&self, hi: u32, lo: u32) -> Result<BigInt> {
        self.check_slice(hi, lo)?;
        Ok((&self.value >> lo) & mask(hi - lo))
    }

    /// Write bits `[lo, hi)` from an unsigned integer, then enforce the bounds
    pub fn set_slice(&mut self, hi: u32, lo: u32, value: &BigInt) -> Result<()> {
        self.check_slice(hi, lo)?;
        let bits = hi - lo;
        if value.is_negative() || magnitude_bits(value) > bits {
            return Err(IntBvError::SliceOverflow {
                value: value.clone(),
                bits,
            });
        }
        let cleared = self.pattern() & !(mask(bits) << lo) & mask(self.width);
        let pattern = cleared | (value << lo);
        let value = self.from_pattern(pattern);
        self.set_value(value)
    }
}
