//! Fixed-point format algebra

use std::fmt;
use std::ops::{Add, Div, Index, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::error::{FixedPointError, Result};

/// Bit layout of a fixed-point value: `total = integer + fractional + 1`.
///
/// The extra bit is the sign. Formats are plain values; every operation that
/// changes a width returns a new `Format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u32; 3]", into = "[u32; 3]")]
pub struct Format {
    total_width: u32,
    integer_width: u32,
    fractional_width: u32,
}

impl Format {
    /// Create a format, checking `total == integer + fractional + 1`
    pub fn new(total_width: u32, integer_width: u32, fractional_width: u32) -> Result<Self> {
        let expected = integer_width
            .checked_add(fractional_width)
            .and_then(|w| w.checked_add(1));
        if expected != Some(total_width) {
            return Err(FixedPointError::WidthMismatch {
                total: total_width,
                integer: integer_width,
                fractional: fractional_width,
            });
        }
        Ok(Self {
            total_width,
            integer_width,
            fractional_width,
        })
    }

    /// Create a format from total and integer widths, deriving the fractional width
    pub fn from_widths(total_width: u32, integer_width: u32) -> Result<Self> {
        let fractional_width = total_width
            .checked_sub(integer_width)
            .and_then(|w| w.checked_sub(1))
            .ok_or(FixedPointError::WidthMismatch {
                total: total_width,
                integer: integer_width,
                fractional: 0,
            })?;
        Self::new(total_width, integer_width, fractional_width)
    }

    /// Create a format from integer and fractional widths
    pub(crate) fn from_parts(integer_width: u32, fractional_width: u32) -> Result<Self> {
        let total_width = integer_width
            .checked_add(fractional_width)
            .and_then(|w| w.checked_add(1))
            .ok_or(FixedPointError::WidthOverflow {
                integer: u64::from(integer_width),
                fractional: u64::from(fractional_width),
            })?;
        Ok(Self {
            total_width,
            integer_width,
            fractional_width,
        })
    }

    pub fn total_width(&self) -> u32 {
        self.total_width
    }

    pub fn integer_width(&self) -> u32 {
        self.integer_width
    }

    pub fn fractional_width(&self) -> u32 {
        self.fractional_width
    }

    /// `[total, integer, fractional]`
    pub fn widths(&self) -> [u32; 3] {
        [self.total_width, self.integer_width, self.fractional_width]
    }

    /// Width by position: 0 = total, 1 = integer, 2 = fractional
    pub fn get(&self, index: usize) -> Option<u32> {
        self.widths().get(index).copied()
    }

    /// Real value of one raw unit, `2^-fractional`
    pub fn resolution(&self) -> f64 {
        2f64.powi(-(self.fractional_width as i32))
    }

    /// Result format of an addition or subtraction: one extra integer bit
    pub fn add_sub(&self, other: &Self) -> Result<Self> {
        let integer_width = self
            .integer_width
            .max(other.integer_width)
            .checked_add(1)
            .ok_or(FixedPointError::WidthOverflow {
                integer: u64::from(self.integer_width.max(other.integer_width)) + 1,
                fractional: 0,
            })?;
        let fractional_width = self.fractional_width.max(other.fractional_width);
        Self::from_parts(integer_width, fractional_width)
    }

    /// Result format of a multiplication or division: widths add up
    pub fn mul_div(&self, other: &Self) -> Result<Self> {
        Self::scaled(
            u64::from(self.total_width) + u64::from(other.total_width),
            u64::from(self.fractional_width) + u64::from(other.fractional_width),
        )
    }

    /// Result format of raising a value to the `n`th power.
    ///
    /// Same as applying `mul_div` `n - 1` times. `n == 1` keeps the format.
    /// `n == 0` gives the unit format `(F + 2, 1, F)`, which holds exactly
    /// 1.0 at the same resolution.
    pub fn pow(&self, n: u32) -> Result<Self> {
        match n {
            0 => Self::from_parts(1, self.fractional_width),
            1 => Ok(*self),
            _ => Self::scaled(
                u64::from(self.total_width) * u64::from(n),
                u64::from(self.fractional_width) * u64::from(n),
            ),
        }
    }

    /// Format with the given total and fractional widths, if both fit in a `u32`
    fn scaled(total_width: u64, fractional_width: u64) -> Result<Self> {
        let overflow = FixedPointError::WidthOverflow {
            integer: total_width.saturating_sub(fractional_width + 1),
            fractional: fractional_width,
        };
        let total = u32::try_from(total_width).map_err(|_| overflow.clone())?;
        let fractional = u32::try_from(fractional_width).map_err(|_| overflow)?;
        Ok(Self {
            total_width: total,
            integer_width: total - fractional - 1,
            fractional_width: fractional,
        })
    }
}

impl TryFrom<[u32; 3]> for Format {
    type Error = FixedPointError;

    fn try_from(widths: [u32; 3]) -> Result<Self> {
        Self::new(widths[0], widths[1], widths[2])
    }
}

impl From<Format> for [u32; 3] {
    fn from(format: Format) -> Self {
        format.widths()
    }
}

impl Index<usize> for Format {
    type Output = u32;

    fn index(&self, index: usize) -> &u32 {
        match index {
            0 => &self.total_width,
            1 => &self.integer_width,
            2 => &self.fractional_width,
            _ => panic!("format index {} out of range (0..3)", index),
        }
    }
}

impl Add for Format {
    type Output = Result<Format>;

    fn add(self, other: Self) -> Result<Format> {
        self.add_sub(&other)
    }
}

impl Sub for Format {
    type Output = Result<Format>;

    fn sub(self, other: Self) -> Result<Format> {
        self.add_sub(&other)
    }
}

impl Mul for Format {
    type Output = Result<Format>;

    fn mul(self, other: Self) -> Result<Format> {
        self.mul_div(&other)
    }
}

impl Div for Format {
    type Output = Result<Format>;

    fn div(self, other: Self) -> Result<Format> {
        self.mul_div(&other)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, [{}])",
            self.total_width, self.integer_width, self.fractional_width
        )
    }
}
