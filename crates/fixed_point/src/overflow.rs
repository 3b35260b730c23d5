//! Overflow engine
//!
//! Brings a value back into the range of a format. Raw integers use the
//! storage range `[-2^(W-1), 2^(W-1))`; reals use the integer range
//! `[-2^I, 2^I)`, before they are scaled onto the raw grid.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;

use crate::error::{FixedPointError, Result};
use crate::format::Format;
use crate::mode::OverflowMode;

/// Clamp or wrap a raw integer into `format`'s storage range
pub fn clamp_raw(raw: BigInt, format: &Format, mode: OverflowMode) -> BigInt {
    let mm = BigInt::one() << (format.total_width() - 1);
    let mmin = -&mm;

    let result: BigInt = match mode {
        OverflowMode::Saturate => {
            if raw >= mm {
                &mm - 1u32
            } else if raw <= mmin {
                mmin
            } else {
                return raw;
            }
        }
        OverflowMode::Wrap => {
            let span: BigInt = &mm << 1u32;
            let wrapped = (&raw - &mmin).mod_floor(&span) + &mmin;
            if wrapped == raw {
                return raw;
            }
            wrapped
        }
    };

    tracing::debug!(%raw, %result, %format, %mode, "raw value out of range");
    result
}

/// Clamp or wrap a real value into `format`'s integer range.
///
/// Saturation stops at the largest representable value, `2^I - 2^-F`.
/// Infinities saturate; they cannot wrap and are rejected.
pub fn clamp_real(value: f64, format: &Format, mode: OverflowMode) -> Result<f64> {
    if value.is_nan() {
        return Err(FixedPointError::InvalidRange("NaN has no fixed-point value".into()));
    }

    let mm = 2f64.powi(format.integer_width() as i32);
    let top = mm - format.resolution();

    let result: f64 = match mode {
        OverflowMode::Saturate => value.clamp(-mm, top),
        OverflowMode::Wrap => {
            if value.is_infinite() {
                return Err(FixedPointError::InvalidRange(format!(
                    "{} cannot wrap into {}",
                    value, format
                )));
            }
            if (-mm..mm).contains(&value) {
                value
            } else {
                (value + mm).rem_euclid(2.0 * mm) - mm
            }
        }
    };

    if result != value {
        tracing::debug!(value, result, %format, %mode, "real value out of range");
    }
    Ok(result)
}
