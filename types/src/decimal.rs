//! Fixed-point, arbitrary-precision decimal used for asset quantities.
//!
//! A [`Decimal`] stores one signed big integer scaled by `10^precision`, with
//! `precision` in `0..=18`. Two decimals can only be added, subtracted or
//! compared when their precisions match; mixing precisions is a logic error in
//! the caller and panics rather than producing a silently wrong amount.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Highest supported number of fractional digits.
pub const MAX_PRECISION: u8 = 18;

/// Precision used for amounts that carry no fractional part.
pub const DEFAULT_PRECISION: u8 = 0;

/// `10^exp` as a big integer.
pub fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u32).pow(exp)
}

/// A fixed-point decimal number.
///
/// The numeric value is `value / 10^precision`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DecimalRepr", into = "DecimalRepr")]
pub struct Decimal {
    precision: u8,
    value: BigInt,
}

impl Decimal {
    /// Build a decimal from an already-scaled integer.
    ///
    /// # Panics
    ///
    /// If `precision` exceeds [`MAX_PRECISION`].
    pub fn new(value: i64, precision: u8) -> Self {
        Self::from_raw(BigInt::from(value), precision)
    }

    /// Build a decimal from an already-scaled big integer.
    ///
    /// # Panics
    ///
    /// If `precision` exceeds [`MAX_PRECISION`].
    pub fn from_raw(value: BigInt, precision: u8) -> Self {
        assert!(
            precision <= MAX_PRECISION,
            "decimal precision {precision} out of range (max {MAX_PRECISION})"
        );
        Self { precision, value }
    }

    pub fn zero(precision: u8) -> Self {
        Self::from_raw(BigInt::zero(), precision)
    }

    /// Build a decimal from an unsigned 128-bit scaled integer.
    pub fn from_u128(value: u128, precision: u8) -> Self {
        Self::from_raw(BigInt::from(value), precision)
    }

    /// Parse standard fixed-point notation (`-?\d+(\.\d+)?`).
    ///
    /// The fractional part may have at most `max_precision` digits; the
    /// result always carries exactly `max_precision`.
    pub fn from_str_with_precision(s: &str, max_precision: u8) -> Result<Self, ParseError> {
        if max_precision > MAX_PRECISION {
            return Err(ParseError::PrecisionOutOfRange(max_precision));
        }
        if s.is_empty() {
            return Err(ParseError::EmptyDecimal);
        }

        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let mut parts = body.split('.');
        let integer = parts.next().unwrap_or_default();
        let fraction = parts.next();
        if parts.next().is_some() {
            return Err(ParseError::InvalidDecimal(s.to_string()));
        }
        if !is_digits(integer) {
            return Err(ParseError::InvalidDecimal(s.to_string()));
        }

        let fraction = fraction.unwrap_or_default();
        if body.contains('.') && !is_digits(fraction) {
            return Err(ParseError::InvalidDecimal(s.to_string()));
        }
        if fraction.len() > max_precision as usize {
            return Err(ParseError::PrecisionExceeded {
                value: s.to_string(),
                max: max_precision,
            });
        }

        let mut digits = String::with_capacity(integer.len() + max_precision as usize);
        digits.push_str(integer);
        digits.push_str(fraction);
        for _ in fraction.len()..max_precision as usize {
            digits.push('0');
        }

        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| ParseError::InvalidDecimal(s.to_string()))?;
        let value = if negative { -magnitude } else { magnitude };
        Ok(Self {
            precision: max_precision,
            value,
        })
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// The scaled integer backing this decimal.
    pub fn raw(&self) -> &BigInt {
        &self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.value.is_positive()
    }

    /// -1, 0 or 1.
    pub fn sign(&self) -> i8 {
        if self.value.is_negative() {
            -1
        } else if self.value.is_zero() {
            0
        } else {
            1
        }
    }

    pub fn abs(&self) -> Self {
        Self::from_raw(self.value.abs(), self.precision)
    }

    /// Compare two decimals of equal precision.
    ///
    /// # Panics
    ///
    /// Panics if the precisions differ.
    pub fn compare(&self, other: &Decimal) -> Ordering {
        self.assert_same_precision(other, "compare");
        self.value.cmp(&other.value)
    }

    /// Compare the scaled integers directly, ignoring precision.
    pub fn compare_aligned(&self, other: &Decimal) -> Ordering {
        self.value.cmp(&other.value)
    }

    /// Multiply by an integer scalar, keeping the precision.
    pub fn mul_int(&self, factor: &BigInt) -> Self {
        Self::from_raw(&self.value * factor, self.precision)
    }

    /// Divide by an integer scalar (truncating), keeping the precision.
    ///
    /// # Panics
    ///
    /// Panics if `divisor` is zero.
    pub fn div_int(&self, divisor: &BigInt) -> Self {
        Self::from_raw(&self.value / divisor, self.precision)
    }

    /// The integer part, truncated toward zero.
    pub fn integer_part(&self) -> BigInt {
        &self.value / pow10(self.precision as u32)
    }

    /// Whether the scaled integer falls outside the `i64` range.
    pub fn is_overflow_i64(&self) -> bool {
        self.value.to_i64().is_none()
    }

    /// The scaled integer as `u128`, if it is non-negative and fits.
    pub fn to_u128(&self) -> Option<u128> {
        self.value.to_u128()
    }

    /// Compress this amount into an `i64` field whose largest possible value
    /// is `max` (typically an asset's max supply).
    ///
    /// When `max` fits in `i64` the scaled integer is returned unchanged.
    /// Otherwise every amount under the same `max` is divided by the same
    /// power of ten, so proportions are kept and
    /// [`Decimal::from_i64_with_max`] inverts the mapping up to the dropped
    /// low digits.
    ///
    /// # Panics
    ///
    /// Panics if `self` is larger than `max` or the precisions differ.
    pub fn to_i64_with_max(&self, max: &Decimal) -> i64 {
        if self.compare(max) == Ordering::Greater {
            panic!("to_i64_with_max overflow: {} > {}", self, max);
        }
        let scaled = match i64_scale_factor(max) {
            Some(factor) => &self.value / factor,
            None => self.value.clone(),
        };
        match scaled.to_i64() {
            Some(v) => v,
            None => panic!("to_i64_with_max: {} does not fit after scaling", self),
        }
    }

    /// Inverse of [`Decimal::to_i64_with_max`].
    pub fn from_i64_with_max(value: i64, max: &Decimal) -> Self {
        let raw = BigInt::from(value);
        match i64_scale_factor(max) {
            Some(factor) => Self::from_raw(raw * factor, max.precision),
            None => Self::from_raw(raw, max.precision),
        }
    }

    fn assert_same_precision(&self, other: &Decimal, op: &str) {
        if self.precision != other.precision {
            panic!(
                "decimal precision mismatch in {}: {} != {}",
                op, self.precision, other.precision
            );
        }
    }
}

/// Power of ten that brings every amount `<= max` into the `i64` range, or
/// `None` when `max` already fits.
fn i64_scale_factor(max: &Decimal) -> Option<BigInt> {
    let limit = BigInt::from(i64::MAX);
    if max.value.abs() <= limit {
        return None;
    }
    let quotient = max.value.abs() / limit;
    let digits = quotient.to_string().len() as u32;
    Some(pow10(digits))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl Default for Decimal {
    fn default() -> Self {
        Self::zero(DEFAULT_PRECISION)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.value.is_negative() { "-" } else { "" };
        let magnitude = self.value.abs();
        let factor = pow10(self.precision as u32);
        let quotient = &magnitude / &factor;
        let remainder = &magnitude % &factor;
        if remainder.is_zero() {
            return write!(f, "{}{}", sign, quotient);
        }
        let fraction = format!(
            "{:0>width$}",
            remainder.to_string(),
            width = self.precision as usize
        );
        write!(f, "{}{}.{}", sign, quotient, fraction.trim_end_matches('0'))
    }
}

impl Add<&Decimal> for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        self.assert_same_precision(rhs, "add");
        Decimal::from_raw(&self.value + &rhs.value, self.precision)
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        &self + &rhs
    }
}

impl AddAssign<&Decimal> for Decimal {
    fn add_assign(&mut self, rhs: &Decimal) {
        self.assert_same_precision(rhs, "add");
        self.value += &rhs.value;
    }
}

impl Sub<&Decimal> for &Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &Decimal) -> Decimal {
        self.assert_same_precision(rhs, "sub");
        Decimal::from_raw(&self.value - &rhs.value, self.precision)
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        &self - &rhs
    }
}

impl SubAssign<&Decimal> for Decimal {
    fn sub_assign(&mut self, rhs: &Decimal) {
        self.assert_same_precision(rhs, "sub");
        self.value -= &rhs.value;
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal::from_raw(-self.value, self.precision)
    }
}

/// Serialized form: the scaled integer travels as a string so magnitudes
/// beyond 64 bits survive JSON.
#[derive(Clone, Serialize, Deserialize)]
struct DecimalRepr {
    precision: u8,
    value: String,
}

impl From<Decimal> for DecimalRepr {
    fn from(d: Decimal) -> Self {
        Self {
            precision: d.precision,
            value: d.value.to_string(),
        }
    }
}

impl TryFrom<DecimalRepr> for Decimal {
    type Error = ParseError;

    fn try_from(repr: DecimalRepr) -> Result<Self, Self::Error> {
        if repr.precision > MAX_PRECISION {
            return Err(ParseError::PrecisionOutOfRange(repr.precision));
        }
        let value = repr
            .value
            .parse::<BigInt>()
            .map_err(|_| ParseError::InvalidDecimal(repr.value.clone()))?;
        Ok(Self {
            precision: repr.precision,
            value,
        })
    }
}
