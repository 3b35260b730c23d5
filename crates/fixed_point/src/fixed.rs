//! Fixed-point value type

use std::fmt;

use fixsim_intbv::IntBv;
use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};

use crate::config::FixedConfig;
use crate::error::{FixedPointError, Result};
use crate::format::Format;
use crate::mode::{OverflowMode, RoundMode};
use crate::{overflow, round};

/// A signed fixed-point number: raw two's-complement storage plus a format.
///
/// The real value is `raw / 2^F`. Cloning is the explicit copy; values never
/// share storage.
#[derive(Debug, Clone)]
pub struct FixedValue {
    storage: IntBv,
    format: Format,
    config: FixedConfig,
    /// Bounds declared by the caller, informational only
    declared_min: f64,
    declared_max: f64,
}

impl FixedValue {
    /// Create a value sized for the range `[min, max]` at the given resolution.
    ///
    /// The integer width covers `max(|min|, max)` and the fractional width
    /// covers `resolution`. Both bounds must have magnitude of at least 1 and
    /// the resolution must lie in `(0, 1]`.
    pub fn from_range(
        value: f64,
        min: f64,
        max: f64,
        resolution: f64,
        config: FixedConfig,
    ) -> Result<Self> {
        if !(min.is_finite() && max.is_finite()) {
            return Err(FixedPointError::InvalidRange(format!(
                "bounds must be finite, got min={} max={}",
                min, max
            )));
        }
        if max < 1.0 || min.abs() < 1.0 {
            return Err(FixedPointError::InvalidRange(format!(
                "maximum and minimum must have magnitude 1 or greater, got min={} max={}",
                min, max
            )));
        }
        if !(resolution > 0.0 && resolution <= 1.0) {
            return Err(FixedPointError::InvalidRange(format!(
                "resolution must be in (0, 1], got {}",
                resolution
            )));
        }

        let magnitude = min.abs().max(max);
        let integer_width = magnitude.log2().ceil();
        // -log2 rather than log2(1/res): the reciprocal of a subnormal is inf
        let fractional_width = (-resolution.log2()).ceil();
        let format = Format::from_parts(integer_width as u32, fractional_width as u32)
            .map_err(|e| FixedPointError::InvalidRange(e.to_string()))?;
        tracing::trace!(min, max, resolution, %format, "derived format from range");

        Self::from_f64_in(value, format, config, min, max)
    }

    /// Create a value with an explicit format and default modes.
    ///
    /// When `fractional_width` is omitted it is `total - integer - 1`.
    pub fn from_format(
        value: f64,
        total_width: u32,
        integer_width: u32,
        fractional_width: Option<u32>,
    ) -> Result<Self> {
        let format = match fractional_width {
            Some(fwl) => Format::new(total_width, integer_width, fwl)?,
            None => Format::from_widths(total_width, integer_width)?,
        };
        Self::with_format(value, format, FixedConfig::default())
    }

    /// Create a value in `format` with the given modes
    pub fn with_format(value: f64, format: Format, config: FixedConfig) -> Result<Self> {
        let bound = 2f64.powi(format.integer_width() as i32);
        Self::from_f64_in(value, format, config, -bound, bound)
    }

    /// Start building a value from a range description
    pub fn builder(value: f64) -> FixedBuilder {
        FixedBuilder::new(value)
    }

    /// A zero of the given format
    pub fn zero(format: Format, config: FixedConfig) -> Result<Self> {
        Self::from_raw(BigInt::zero(), format, config)
    }

    /// Wrap a raw integer without rounding or overflow handling.
    ///
    /// Fails with a bounds violation if `raw` does not fit the format.
    pub fn from_raw(raw: BigInt, format: Format, config: FixedConfig) -> Result<Self> {
        let bound = 2f64.powi(format.integer_width() as i32);
        Ok(Self {
            storage: IntBv::with_width(raw, format.total_width())?,
            format,
            config,
            declared_min: -bound,
            declared_max: bound,
        })
    }

    fn from_f64_in(
        value: f64,
        format: Format,
        config: FixedConfig,
        declared_min: f64,
        declared_max: f64,
    ) -> Result<Self> {
        // Infinities have no raw value; they saturate (or are rejected under wrap)
        let value = if value.is_infinite() {
            overflow::clamp_real(value, &format, config.overflow_mode)?
        } else {
            value
        };
        let raw = round::round_real(value, &format, config.round_mode)?;
        let raw = overflow::clamp_raw(raw, &format, config.overflow_mode);
        let storage = IntBv::with_width(raw, format.total_width())?;

        Ok(Self {
            storage,
            format,
            config,
            declared_min,
            declared_max,
        })
    }

    /// The raw two's-complement integer
    pub fn raw(&self) -> &BigInt {
        self.storage.value()
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn config(&self) -> FixedConfig {
        self.config
    }

    pub fn round_mode(&self) -> RoundMode {
        self.config.round_mode
    }

    pub fn overflow_mode(&self) -> OverflowMode {
        self.config.overflow_mode
    }

    /// Real value of one raw unit
    pub fn resolution(&self) -> f64 {
        self.format.resolution()
    }

    /// Lower bound given at construction
    pub fn declared_min(&self) -> f64 {
        self.declared_min
    }

    /// Upper bound given at construction
    pub fn declared_max(&self) -> f64 {
        self.declared_max
    }

    /// Convert back to floating-point.
    ///
    /// Only the top 64 significant bits of wide raw values take part, so the
    /// result stays finite whenever the real value fits in an `f64`.
    pub fn to_f64(&self) -> f64 {
        let raw = self.raw();
        let drop = raw.bits().saturating_sub(64);
        let top: BigInt = raw >> drop;
        let mantissa = top.to_f64().unwrap_or(f64::NAN);
        scale_by_pow2(mantissa, drop as i64 - i64::from(self.format.fractional_width()))
    }

    /// Integer bits of the value, `raw >> F` (rounds toward negative infinity)
    pub fn integer_part(&self) -> BigInt {
        self.raw() >> self.format.fractional_width()
    }

    /// Fractional bits of the value as an unsigned integer
    pub fn fractional_part(&self) -> BigInt {
        let mask: BigInt = (BigInt::one() << self.format.fractional_width()) - 1u32;
        self.raw() & mask
    }

    /// Re-quantize into a new format with default modes.
    ///
    /// The real value is floored onto the new grid and saturated. This works
    /// on the raw bits, so no precision is lost to an `f64` round trip.
    pub fn requantize(
        &self,
        total_width: u32,
        integer_width: u32,
        fractional_width: Option<u32>,
    ) -> Result<Self> {
        let format = match fractional_width {
            Some(fwl) => Format::new(total_width, integer_width, fwl)?,
            None => Format::from_widths(total_width, integer_width)?,
        };
        let config = FixedConfig::default();
        let raw = round::round_fixed(self.raw(), &self.format, &format, config.round_mode);
        let raw = overflow::clamp_raw(raw, &format, config.overflow_mode);
        Self::from_raw(raw, format, config)
    }

    /// Overwrite this value with `source`, keeping this value's format.
    ///
    /// `source` is re-quantized with this value's round mode, then brought
    /// into range with this value's overflow mode.
    pub fn assign(&mut self, source: &FixedValue) -> Result<()> {
        let raw = round::round_fixed(
            source.raw(),
            &source.format,
            &self.format,
            self.config.round_mode,
        );
        let raw = overflow::clamp_raw(raw, &self.format, self.config.overflow_mode);
        self.storage.set_value(raw)?;
        Ok(())
    }

    /// Replace the raw integer, enforcing the storage bounds
    pub(crate) fn set_raw(&mut self, raw: BigInt) -> Result<()> {
        self.storage.set_value(raw)?;
        Ok(())
    }

    /// Read a single raw bit
    pub fn bit(&self, index: u32) -> Result<bool> {
        Ok(self.storage.bit(index)?)
    }

    /// Write a single raw bit
    pub fn set_bit(&mut self, index: u32, bit: bool) -> Result<()> {
        Ok(self.storage.set_bit(index, bit)?)
    }

    /// Read raw bits `[lo, hi)` as an unsigned integer
    pub fn slice(&self, hi: u32, lo: u32) -> Result<BigInt> {
        Ok(self.storage.slice(hi, lo)?)
    }

    /// Write raw bits `[lo, hi)`
    pub fn set_slice(&mut self, hi: u32, lo: u32, bits: &BigInt) -> Result<()> {
        Ok(self.storage.set_slice(hi, lo, bits)?)
    }

    /// Raw value in hexadecimal
    pub fn to_hex(&self) -> String {
        format!("{:#x}", self.raw())
    }

    /// Value and format, e.g. `FixedValue(3.250000, format=(8, 3, [4]))`
    pub fn describe(&self) -> String {
        format!("FixedValue({:.6}, format={})", self.to_f64(), self.format)
    }
}

/// `value * 2^exp`, applied in steps so intermediate powers stay finite
fn scale_by_pow2(mut value: f64, mut exp: i64) -> f64 {
    const STEP: i64 = 512;
    while exp > STEP && value.is_finite() && value != 0.0 {
        value *= 2f64.powi(STEP as i32);
        exp -= STEP;
    }
    while exp < -STEP && value != 0.0 {
        value *= 2f64.powi(-STEP as i32);
        exp += STEP;
    }
    value * 2f64.powi(exp as i32)
}

impl fmt::Display for FixedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.to_f64())
    }
}

/// Range-based construction where every bound must be supplied
#[derive(Debug, Clone, Default)]
pub struct FixedBuilder {
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
    resolution: Option<f64>,
    config: FixedConfig,
}

impl FixedBuilder {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn resolution(mut self, resolution: f64) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn round_mode(mut self, round_mode: RoundMode) -> Self {
        self.config.round_mode = round_mode;
        self
    }

    pub fn overflow_mode(mut self, overflow_mode: OverflowMode) -> Self {
        self.config.overflow_mode = overflow_mode;
        self
    }

    pub fn config(mut self, config: FixedConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<FixedValue> {
        let min = self
            .min
            .ok_or_else(|| FixedPointError::InvalidRange("minimum has to be provided".into()))?;
        let max = self
            .max
            .ok_or_else(|| FixedPointError::InvalidRange("maximum has to be provided".into()))?;
        let resolution = self
            .resolution
            .ok_or_else(|| FixedPointError::InvalidRange("resolution has to be provided".into()))?;
        FixedValue::from_range(self.value, min, max, resolution, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> BigInt {
        BigInt::from(v)
    }

    fn q8_4(value: f64) -> FixedValue {
        FixedValue::from_range(value, -8.0, 8.0, 0.0625, FixedConfig::default()).unwrap()
    }

    #[test]
    fn test_format_from_range() {
        let x = q8_4(3.25);
        assert_eq!(x.format().widths(), [8, 3, 4]);
        assert_eq!(x.raw(), &int(52));
        assert_eq!(x.to_f64(), 3.25);
        assert_eq!(x.declared_min(), -8.0);
        assert_eq!(x.declared_max(), 8.0);
        assert_eq!(x.resolution(), 0.0625);

        let y = FixedValue::from_range(0.0, -3.0, 1.0, 0.1, FixedConfig::default()).unwrap();
        assert_eq!(y.format().widths(), [7, 2, 4]);
    }

    #[test]
    fn test_invalid_ranges() {
        let cfg = FixedConfig::default();
        for (min, max, res) in [
            (-8.0, 0.5, 0.0625),
            (-0.5, 8.0, 0.0625),
            (-8.0, 8.0, 0.0),
            (-8.0, 8.0, 1.5),
            (-8.0, f64::NAN, 0.5),
            (-8.0, 8.0, f64::NAN),
        ] {
            assert!(
                matches!(
                    FixedValue::from_range(1.0, min, max, res, cfg),
                    Err(FixedPointError::InvalidRange(_))
                ),
                "min={} max={} res={}",
                min,
                max,
                res
            );
        }
    }

    #[test]
    fn test_builder_requires_all_bounds() {
        let missing = FixedValue::builder(1.0).min(-8.0).max(8.0).build();
        assert!(matches!(missing, Err(FixedPointError::InvalidRange(_))));

        let x = FixedValue::builder(-1.3)
            .min(-8.0)
            .max(8.0)
            .resolution(0.0625)
            .round_mode(RoundMode::Ceil)
            .build()
            .unwrap();
        // -1.3 * 16 = -20.8 -> -20
        assert_eq!(x.raw(), &int(-20));
        assert_eq!(x.round_mode(), RoundMode::Ceil);
    }

    #[test]
    fn test_construction_saturates_and_wraps() {
        let x = q8_4(100.0);
        assert_eq!(x.raw(), &int(127));

        let y = FixedValue::from_range(
            9.0,
            -8.0,
            8.0,
            0.0625,
            FixedConfig::default().with_overflow_mode(OverflowMode::Wrap),
        )
        .unwrap();
        assert_eq!(y.to_f64(), -7.0);

        // Rounding up past the top saturates on the raw grid
        let z = FixedValue::builder(7.99)
            .min(-8.0)
            .max(8.0)
            .resolution(0.0625)
            .round_mode(RoundMode::Ceil)
            .build()
            .unwrap();
        assert_eq!(z.raw(), &int(127));

        // Under wrap, rounding up past the top wraps on the raw grid
        let w = FixedValue::builder(7.99)
            .min(-8.0)
            .max(8.0)
            .resolution(0.0625)
            .round_mode(RoundMode::Ceil)
            .overflow_mode(OverflowMode::Wrap)
            .build()
            .unwrap();
        assert_eq!(w.raw(), &int(-128));
    }

    #[test]
    fn test_from_format() {
        let x = FixedValue::from_format(1.5, 8, 3, None).unwrap();
        assert_eq!(x.format().widths(), [8, 3, 4]);
        assert_eq!(x.raw(), &int(24));
        assert_eq!(x.declared_max(), 8.0);

        assert!(matches!(
            FixedValue::from_format(1.5, 8, 3, Some(3)),
            Err(FixedPointError::WidthMismatch { .. })
        ));
    }

    #[test]
    fn test_integer_and_fractional_parts() {
        let x = q8_4(3.25);
        assert_eq!(x.integer_part(), int(3));
        assert_eq!(x.fractional_part(), int(4));

        let y = q8_4(-1.25);
        // -20 = -2 * 16 + 12
        assert_eq!(y.integer_part(), int(-2));
        assert_eq!(y.fractional_part(), int(12));
    }

    #[test]
    fn test_wrap_applies_to_rounded_raw() {
        let wrap = |mode| FixedConfig::new(mode, OverflowMode::Wrap);

        // 8.03125 * 16 = 128.5 rounds to 129, which wraps to -127
        let x = FixedValue::from_range(8.03125, -8.0, 8.0, 0.0625, wrap(RoundMode::Round)).unwrap();
        assert_eq!(x.raw(), &int(-127));

        // 8.03 * 16 = 128.48 truncates to 128, which wraps to -128
        let y = FixedValue::from_range(8.03, -8.0, 8.0, 0.0625, wrap(RoundMode::Fix)).unwrap();
        assert_eq!(y.raw(), &int(-128));

        // -8.03 * 16 = -128.48 truncates to -128, already in range
        let z = FixedValue::from_range(-8.03, -8.0, 8.0, 0.0625, wrap(RoundMode::Fix)).unwrap();
        assert_eq!(z.raw(), &int(-128));

        let inf = FixedValue::from_range(f64::INFINITY, -8.0, 8.0, 0.0625, wrap(RoundMode::Floor));
        assert!(matches!(inf, Err(FixedPointError::InvalidRange(_))));
        assert_eq!(q8_4(f64::NEG_INFINITY).raw(), &int(-128));
    }

    #[test]
    fn test_subnormal_resolution() {
        let x = FixedValue::from_range(1.0, -8.0, 8.0, 1e-320, FixedConfig::default()).unwrap();
        // 1e-320 is about 2^-1063.02
        assert_eq!(x.format().widths(), [1068, 3, 1064]);
        assert_eq!(x.raw(), &(BigInt::one() << 1064u32));
        assert_eq!(x.to_f64(), 1.0);

        let res = f64::MIN_POSITIVE / 4.0;
        let tiny = FixedValue::from_range(0.0, -8.0, 8.0, res, FixedConfig::default()).unwrap();
        assert_eq!(tiny.format().fractional_width(), 1024);
    }

    #[test]
    fn test_to_f64_of_wide_values() {
        let x = q8_4(7.9375);
        let big = x.pow(150).unwrap();
        assert_eq!(big.format().widths(), [1200, 599, 600]);
        let expected = 7.9375f64.powi(150);
        let got = big.to_f64();
        assert!(got.is_finite());
        assert!((got - expected).abs() / expected < 1e-12, "{} vs {}", got, expected);

        let neg = q8_4(-7.9375).pow(151).unwrap().to_f64();
        assert!((neg + 7.9375f64.powi(151)).abs() / 7.9375f64.powi(151) < 1e-12);

        // Narrowing keeps the saturated value instead of losing it to inf
        let narrow = big.requantize(8, 3, None).unwrap();
        assert_eq!(narrow.raw(), &int(127));
        let mid = big.requantize(600, 500, None).unwrap();
        assert!((mid.to_f64() - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn test_requantize() {
        let x = q8_4(3.3125);
        let narrow = x.requantize(6, 3, None).unwrap();
        assert_eq!(narrow.format().widths(), [6, 3, 2]);
        assert_eq!(narrow.to_f64(), 3.25);
        assert_eq!(narrow.round_mode(), RoundMode::Floor);

        let small = x.requantize(4, 1, Some(2)).unwrap();
        assert_eq!(small.to_f64(), 1.75);
    }

    #[test]
    fn test_assign_rounds_with_receiver_mode() {
        let source = q8_4(2.625);
        let mut target = FixedValue::with_format(
            0.0,
            Format::new(6, 3, 2).unwrap(),
            FixedConfig::default().with_round_mode(RoundMode::RoundEven),
        )
        .unwrap();
        target.assign(&source).unwrap();
        // 2.625 sits between 2.5 and 2.75; tie goes to the even raw value 10
        assert_eq!(target.raw(), &int(10));
        assert_eq!(target.format().widths(), [6, 3, 2]);

        let mut tiny = FixedValue::from_format(0.0, 4, 1, None).unwrap();
        tiny.assign(&q8_4(7.5)).unwrap();
        assert_eq!(tiny.to_f64(), 1.75);
    }

    #[test]
    fn test_bit_access() {
        let mut x = q8_4(1.0);
        assert!(x.bit(4).unwrap());
        assert!(!x.bit(3).unwrap());
        assert_eq!(x.slice(8, 4).unwrap(), int(1));

        x.set_bit(0, true).unwrap();
        assert_eq!(x.to_f64(), 1.0625);
        x.set_slice(4, 0, &int(0b1000)).unwrap();
        assert_eq!(x.to_f64(), 1.5);
        x.set_bit(7, true).unwrap();
        assert!(x.to_f64() < 0.0);
        assert!(x.set_bit(8, true).is_err());
    }

    #[test]
    fn test_from_raw_bounds() {
        let fmt = Format::new(8, 3, 4).unwrap();
        let err = FixedValue::from_raw(int(128), fmt, FixedConfig::default()).unwrap_err();
        assert!(err.is_bounds_violation());
        assert!(FixedValue::from_raw(int(-128), fmt, FixedConfig::default()).is_ok());
    }

    #[test]
    fn test_display() {
        let x = q8_4(3.25);
        assert_eq!(x.to_string(), "3.250000");
        assert_eq!(x.describe(), "FixedValue(3.250000, format=(8, 3, [4]))");
        assert_eq!(x.to_hex(), "0x34");
    }
}
