//! Rounding engine
//!
//! Two entry points: [`round_real`] quantizes a real number onto a format's
//! raw grid, and [`round_fixed`] re-quantizes a raw value from one format to
//! another by inspecting the discarded tail bits. Neither applies overflow
//! handling; see [`crate::overflow`].

use num_bigint::BigInt;
use num_traits::{Float, FromPrimitive, One, Signed, Zero};

use crate::error::{FixedPointError, Result};
use crate::format::Format;
use crate::mode::RoundMode;

/// Scale `value` by `2^F` of the target format and round it to a raw integer.
///
/// The scaling is exact for every finite input and fractional width: the
/// float is split into mantissa and exponent, and only the part of the
/// result below one raw unit is left to the rounding mode.
pub fn round_real(value: f64, target: &Format, mode: RoundMode) -> Result<BigInt> {
    if !value.is_finite() {
        return Err(FixedPointError::InvalidRange(format!(
            "{} cannot be scaled into {}",
            value, target
        )));
    }

    let (mantissa, exponent, sign) = Float::integer_decode(value);
    if mantissa == 0 {
        return Ok(BigInt::zero());
    }

    let shift = i64::from(exponent) + i64::from(target.fractional_width());
    if shift >= 0 {
        // Already a whole number of raw units
        let magnitude = BigInt::from(mantissa) << (shift as u64);
        return Ok(if sign < 0 { -magnitude } else { magnitude });
    }

    // Below 2^-64 the mantissa (< 2^53) scales under half a unit; any value
    // in (0, 0.5) rounds the same way in every mode
    let scaled = if shift < -64 {
        f64::from(sign) * 2f64.powi(-12)
    } else {
        f64::from(sign) * mantissa as f64 * 2f64.powi(shift as i32)
    };

    let rounded = match mode {
        RoundMode::Floor => scaled.floor(),
        RoundMode::Ceil => scaled.ceil(),
        RoundMode::Fix => scaled.trunc(),
        // Exact halves go away from zero for both
        RoundMode::Nearest | RoundMode::Round => scaled.round(),
        RoundMode::RoundEven => scaled.round_ties_even(),
    };

    BigInt::from_f64(rounded).ok_or_else(|| {
        FixedPointError::InvalidRange(format!("{} has no integer representation", rounded))
    })
}

/// Re-quantize a raw value from `source` to `target` fractional precision.
///
/// Growing precision is an exact left shift. Shrinking precision keeps the
/// upper bits and decides from the tail whether to add one unit:
///
/// ```text
///   raw   s iiii . ff | tt
///                   ^   ^-- tail (discarded, compared against the midpoint)
///                   '------ lsb of kept, breaks ties for round_even
/// ```
pub fn round_fixed(raw: &BigInt, source: &Format, target: &Format, mode: RoundMode) -> BigInt {
    let source_fwl = source.fractional_width();
    let target_fwl = target.fractional_width();
    if source_fwl <= target_fwl {
        return raw << (target_fwl - source_fwl);
    }

    let shift = source_fwl - target_fwl;
    let kept = raw >> shift;
    let tail: BigInt = raw & ((BigInt::one() << shift) - BigInt::one());
    let midpoint: BigInt = BigInt::one() << (shift - 1);
    let negative = raw.is_negative();
    let odd = raw.bit(u64::from(shift));

    let carry = match mode {
        RoundMode::Floor => false,
        RoundMode::Ceil => !tail.is_zero(),
        RoundMode::Fix => negative && !tail.is_zero(),
        RoundMode::Nearest => {
            if negative {
                tail > midpoint
            } else {
                tail >= midpoint
            }
        }
        RoundMode::Round => tail >= midpoint,
        RoundMode::RoundEven => tail > midpoint || (tail == midpoint && odd),
    };

    tracing::trace!(%raw, shift, %mode, carry, "re-quantized raw value");

    if carry {
        kept + 1u32
    } else {
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> BigInt {
        BigInt::from(v)
    }

    #[test]
    fn test_round_real_modes() {
        let fmt = Format::new(8, 7, 0).unwrap();
        let inputs = [2.5, -2.5, 3.5, 2.3, -2.3];
        let expected: [(RoundMode, [i64; 5]); 6] = [
            (RoundMode::Floor, [2, -3, 3, 2, -3]),
            (RoundMode::Ceil, [3, -2, 4, 3, -2]),
            (RoundMode::Fix, [2, -2, 3, 2, -2]),
            (RoundMode::Nearest, [3, -3, 4, 2, -2]),
            (RoundMode::Round, [3, -3, 4, 2, -2]),
            (RoundMode::RoundEven, [2, -2, 4, 2, -2]),
        ];

        for (mode, outputs) in expected {
            for (&x, &want) in inputs.iter().zip(&outputs) {
                assert_eq!(
                    round_real(x, &fmt, mode).unwrap(),
                    int(want),
                    "{} of {}",
                    mode,
                    x
                );
            }
        }
    }

    #[test]
    fn test_round_real_scales() {
        let fmt = Format::new(8, 3, 4).unwrap();
        assert_eq!(round_real(3.25, &fmt, RoundMode::Floor).unwrap(), int(52));
        assert_eq!(round_real(0.03, &fmt, RoundMode::Floor).unwrap(), int(0));
        assert_eq!(round_real(0.03, &fmt, RoundMode::Ceil).unwrap(), int(1));
    }

    #[test]
    fn test_round_real_wide_fractions() {
        // 2^-1074 resolution: 2^1074 units per 1.0, far past f64 range
        let fmt = Format::new(1078, 3, 1074).unwrap();
        assert_eq!(
            round_real(1.0, &fmt, RoundMode::Floor).unwrap(),
            BigInt::one() << 1074u32
        );
        assert_eq!(
            round_real(-0.75, &fmt, RoundMode::Fix).unwrap(),
            -(BigInt::from(3) << 1072u32)
        );

        // A value far below one unit only moves the directed modes
        let coarse = Format::new(8, 7, 0).unwrap();
        let tiny = 1e-30;
        assert_eq!(round_real(tiny, &coarse, RoundMode::Floor).unwrap(), int(0));
        assert_eq!(round_real(tiny, &coarse, RoundMode::Ceil).unwrap(), int(1));
        assert_eq!(round_real(-tiny, &coarse, RoundMode::Floor).unwrap(), int(-1));
        assert_eq!(round_real(-tiny, &coarse, RoundMode::Round).unwrap(), int(0));
        assert_eq!(round_real(0.0, &coarse, RoundMode::Ceil).unwrap(), int(0));
    }

    #[test]
    fn test_round_real_rejects_nan() {
        let fmt = Format::new(8, 3, 4).unwrap();
        assert!(matches!(
            round_real(f64::NAN, &fmt, RoundMode::Floor),
            Err(FixedPointError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_round_fixed_table() {
        // Four fractional bits down to two: shift 2, midpoint 2
        let source = Format::new(8, 3, 4).unwrap();
        let target = Format::new(6, 3, 2).unwrap();
        let inputs = [10, 14, -10, 9, 11, -9];
        let expected: [(RoundMode, [i64; 6]); 6] = [
            (RoundMode::Floor, [2, 3, -3, 2, 2, -3]),
            (RoundMode::Ceil, [3, 4, -2, 3, 3, -2]),
            (RoundMode::Fix, [2, 3, -2, 2, 2, -2]),
            (RoundMode::Nearest, [3, 4, -3, 2, 3, -2]),
            (RoundMode::Round, [3, 4, -2, 2, 3, -2]),
            (RoundMode::RoundEven, [2, 4, -2, 2, 3, -2]),
        ];

        for (mode, outputs) in expected {
            for (&raw, &want) in inputs.iter().zip(&outputs) {
                assert_eq!(
                    round_fixed(&int(raw), &source, &target, mode),
                    int(want),
                    "{} of raw {}",
                    mode,
                    raw
                );
            }
        }
    }

    #[test]
    fn test_round_fixed_ties_from_odd_and_even() {
        let source = Format::new(8, 3, 4).unwrap();
        let target = Format::new(5, 3, 1).unwrap();
        // shift 3, midpoint 4: raw 12 -> kept 1 (odd), raw 20 -> kept 2 (even)
        assert_eq!(round_fixed(&int(12), &source, &target, RoundMode::Round), int(2));
        assert_eq!(round_fixed(&int(20), &source, &target, RoundMode::Round), int(3));
        assert_eq!(round_fixed(&int(12), &source, &target, RoundMode::RoundEven), int(2));
        assert_eq!(round_fixed(&int(20), &source, &target, RoundMode::RoundEven), int(2));
    }

    #[test]
    fn test_round_fixed_grows_exactly() {
        let source = Format::new(6, 3, 2).unwrap();
        let target = Format::new(8, 3, 4).unwrap();
        for mode in RoundMode::ALL {
            assert_eq!(round_fixed(&int(5), &source, &target, mode), int(20));
            assert_eq!(round_fixed(&int(-5), &source, &target, mode), int(-20));
        }
    }
}
