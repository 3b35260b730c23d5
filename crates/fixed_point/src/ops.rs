//! Arithmetic and comparison operators
//!
//! Binary operators compute the result format first, allocate a zero of that
//! format and store the combined raw integers into it. Operands with
//! different fractional widths are aligned by shifting the narrower one left,
//! so no operator ever rounds.

use std::cmp::Ordering;

use num_bigint::BigInt;

use crate::error::{FixedPointError, Result};
use crate::fixed::FixedValue;
use crate::format::Format;

/// Right-hand operands that know how to combine with a [`FixedValue`].
///
/// Wrapper types (e.g. a simulation signal holding a value) implement the
/// operations they support; the rest fail with
/// [`FixedPointError::UnsupportedOperandType`].
pub trait SupportsFixedArithmetic {
    /// `lhs + self`
    fn reflected_add(&self, _lhs: &FixedValue) -> Result<FixedValue> {
        Err(unsupported::<Self>("+"))
    }

    /// `lhs - self`
    fn reflected_sub(&self, _lhs: &FixedValue) -> Result<FixedValue> {
        Err(unsupported::<Self>("-"))
    }

    /// `lhs * self`
    fn reflected_mul(&self, _lhs: &FixedValue) -> Result<FixedValue> {
        Err(unsupported::<Self>("*"))
    }

    /// Ordering of `lhs` relative to `self`
    fn reflected_cmp(&self, _lhs: &FixedValue) -> Result<Ordering> {
        Err(unsupported::<Self>("cmp"))
    }
}

fn unsupported<T: ?Sized>(op: &'static str) -> FixedPointError {
    FixedPointError::UnsupportedOperandType {
        op,
        type_name: std::any::type_name::<T>(),
    }
}

impl SupportsFixedArithmetic for FixedValue {
    fn reflected_add(&self, lhs: &FixedValue) -> Result<FixedValue> {
        lhs.add(self)
    }

    fn reflected_sub(&self, lhs: &FixedValue) -> Result<FixedValue> {
        lhs.sub(self)
    }

    fn reflected_mul(&self, lhs: &FixedValue) -> Result<FixedValue> {
        lhs.mul(self)
    }

    fn reflected_cmp(&self, lhs: &FixedValue) -> Result<Ordering> {
        Ok(lhs.cmp(self))
    }
}

impl FixedValue {
    /// Both raw values shifted onto the larger fractional width
    fn aligned(&self, other: &Self) -> (BigInt, BigInt) {
        let a_fwl = self.format().fractional_width();
        let b_fwl = other.format().fractional_width();
        if a_fwl < b_fwl {
            (self.raw() << (b_fwl - a_fwl), other.raw().clone())
        } else {
            (self.raw().clone(), other.raw() << (a_fwl - b_fwl))
        }
    }

    /// A result in `format` carrying this value's modes
    fn result(&self, format: Format, raw: BigInt) -> Result<Self> {
        let mut out = FixedValue::zero(format, self.config())?;
        out.set_raw(raw)?;
        Ok(out)
    }

    /// Exact sum; the result has one more integer bit than the wider operand
    pub fn add(&self, other: &Self) -> Result<Self> {
        let format = self.format().add_sub(&other.format())?;
        let (a, b) = self.aligned(other);
        self.result(format, a + b)
    }

    /// Exact difference; formats grow as for [`FixedValue::add`]
    pub fn sub(&self, other: &Self) -> Result<Self> {
        let format = self.format().add_sub(&other.format())?;
        let (a, b) = self.aligned(other);
        self.result(format, a - b)
    }

    /// Exact product; total and fractional widths add up
    pub fn mul(&self, other: &Self) -> Result<Self> {
        let format = self.format().mul_div(&other.format())?;
        self.result(format, self.raw() * other.raw())
    }

    /// Exact integer power.
    ///
    /// `exp == 0` yields 1.0 in the unit format, see [`Format::pow`].
    /// Negative exponents, and exponents whose result format would not fit
    /// in `u32` widths, fail with [`FixedPointError::InvalidExponent`].
    pub fn pow(&self, exp: i64) -> Result<Self> {
        let n = u32::try_from(exp).map_err(|_| FixedPointError::InvalidExponent(exp))?;
        let format = self
            .format()
            .pow(n)
            .map_err(|_| FixedPointError::InvalidExponent(exp))?;
        let raw = if n == 0 {
            BigInt::from(1) << format.fractional_width()
        } else {
            self.raw().pow(n)
        };
        self.result(format, raw)
    }

    /// `self + rhs` for any supported operand type
    pub fn add_operand<T: SupportsFixedArithmetic + ?Sized>(&self, rhs: &T) -> Result<Self> {
        rhs.reflected_add(self)
    }

    /// `self - rhs` for any supported operand type
    pub fn sub_operand<T: SupportsFixedArithmetic + ?Sized>(&self, rhs: &T) -> Result<Self> {
        rhs.reflected_sub(self)
    }

    /// `self * rhs` for any supported operand type
    pub fn mul_operand<T: SupportsFixedArithmetic + ?Sized>(&self, rhs: &T) -> Result<Self> {
        rhs.reflected_mul(self)
    }

    /// Compare against any supported operand type
    pub fn cmp_operand<T: SupportsFixedArithmetic + ?Sized>(&self, rhs: &T) -> Result<Ordering> {
        rhs.reflected_cmp(self)
    }
}

impl PartialEq for FixedValue {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = self.aligned(other);
        a == b
    }
}

impl Eq for FixedValue {}

impl PartialOrd for FixedValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FixedValue {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = self.aligned(other);
        a.cmp(&b)
    }
}
