use crate::error::{FixedParseError, MathError};
use ethnum::{I256, U256 as WideU256};
use primitive_types::{U256, U512};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Number of fractional decimal digits carried by [`Fixed`].
pub const DECIMALS: usize = 18;

const SCALE_RAW: I256 = I256::new(1_000_000_000_000_000_000);

/// Largest raw magnitude a [`Fixed`] may hold: 10^76, i.e. 10^58 whole units.
///
/// It sits a factor of five under `I256::MAX`, so a handful of bounded
/// values can be summed without leaving the integer range.
fn max_raw() -> I256 {
    let half = I256::new(10_i128.pow(38));
    half * half
}

/// A signed real number stored as an integer scaled by 10^18.
///
/// `*` and `/` rescale by exactly one factor of the scale, so composed
/// expressions stay in the same fixed-point domain. Division by zero yields
/// zero; callers guard divisions where a zero divisor is invalid input.
/// `min`, `max` and `clamp` come from [`Ord`].
///
/// Magnitudes are bounded by [`Fixed::max_value`]. The operators saturate
/// at that bound and never panic; quote code uses the `checked_*` forms and
/// [`Fixed::mul_div`], which report overflow as [`MathError::Overflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fixed(I256);

impl Fixed {
    pub const ZERO: Fixed = Fixed(I256::ZERO);
    pub const ONE: Fixed = Fixed(SCALE_RAW);
    pub const SCALE: I256 = SCALE_RAW;

    pub const fn from_raw(raw: I256) -> Self {
        Self(raw)
    }

    pub const fn from_raw_i128(raw: i128) -> Self {
        Self(I256::new(raw))
    }

    /// Whole units, e.g. `Fixed::from_int(3)` is 3.0.
    pub fn from_int(value: i64) -> Self {
        Self(I256::new(value as i128) * SCALE_RAW)
    }

    pub const fn raw(self) -> I256 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == I256::ZERO
    }

    pub fn is_positive(self) -> bool {
        self.0 > I256::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < I256::ZERO
    }

    pub fn abs(self) -> Self {
        if self.is_negative() { -self } else { self }
    }

    /// The largest representable value.
    pub fn max_value() -> Fixed {
        Self(max_raw())
    }

    fn saturated(negative: bool) -> Fixed {
        if negative { Self(-max_raw()) } else { Self(max_raw()) }
    }

    fn clamped(raw: I256) -> Fixed {
        let bound = max_raw();
        Self(raw.clamp(-bound, bound))
    }

    fn bounded(self) -> Result<Fixed, MathError> {
        let bound = max_raw();
        if self.0 > bound || self.0 < -bound {
            Err(MathError::Overflow("scaled decimal"))
        } else {
            Ok(self)
        }
    }

    /// Raw magnitude, sign dropped.
    fn magnitude(self) -> U256 {
        let (hi, lo) = self.0.unsigned_abs().into_words();
        (U256::from(hi) << 128) | U256::from(lo)
    }

    /// Lenient parser: malformed or empty text yields zero.
    ///
    /// Accepts an optional sign, digits and a single decimal point. Comma
    /// separators are ignored and fractional digits beyond 18 are truncated.
    pub fn parse(text: &str) -> Self {
        Self::parse_strict(text).unwrap_or(Self::ZERO)
    }

    /// Strict parser: distinguishes unparseable text from zero.
    ///
    /// Empty text, a bare sign and a bare point all parse to zero.
    pub fn parse_strict(text: &str) -> Result<Self, FixedParseError> {
        let normalized: String = text.trim().chars().filter(|c| *c != ',').collect();
        let (negative, int_part, frac_part) = split_decimal(&normalized)
            .ok_or_else(|| FixedParseError::Malformed(text.to_string()))?;
        assemble(negative, int_part, frac_part)
            .filter(|value| value.bounded().is_ok())
            .ok_or_else(|| FixedParseError::Overflow(text.to_string()))
    }

    /// Integer part plus at most `max_decimals` fractional digits, trailing
    /// zeros dropped. No decimal point is emitted for a whole result.
    pub fn format(self, max_decimals: usize) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.abs().0;
        let int_part = abs / SCALE_RAW;
        let frac_raw = format!("{:0>width$}", (abs % SCALE_RAW).to_string(), width = DECIMALS);
        let keep = max_decimals.min(DECIMALS);
        let frac_trimmed = frac_raw[..keep].trim_end_matches('0');
        if frac_trimmed.is_empty() {
            format!("{sign}{int_part}")
        } else {
            format!("{sign}{int_part}.{frac_trimmed}")
        }
    }

    /// Formats `self * 100`, for rates such as slippage or spreads.
    pub fn format_percent(self, max_decimals: usize) -> String {
        (self * Self::from_int(100)).format(max_decimals)
    }

    /// Exact `a * b / denominator` on the raw integers, truncated toward
    /// zero, with a 512-bit intermediate. A zero denominator yields zero.
    pub fn mul_div(a: Fixed, b: Fixed, denominator: Fixed) -> Result<Fixed, MathError> {
        if denominator.is_zero() {
            return Ok(Self::ZERO);
        }
        let negative = a.is_negative() ^ b.is_negative() ^ denominator.is_negative();
        let quotient = a.magnitude().full_mul(b.magnitude()) / U512::from(denominator.magnitude());
        let quotient = U256::try_from(quotient).map_err(|_| MathError::Overflow("scaled decimal"))?;
        let magnitude = Self::from_u256(quotient)?;
        Ok(if negative { Self(-magnitude.0) } else { magnitude })
    }

    /// `self * rhs`, or an overflow error.
    pub fn checked_mul(self, rhs: Fixed) -> Result<Fixed, MathError> {
        Self::mul_div(self, rhs, Self::ONE)
    }

    /// `self / rhs`, or an overflow error; zero when `rhs` is zero.
    pub fn checked_div(self, rhs: Fixed) -> Result<Fixed, MathError> {
        Self::mul_div(self, Self::ONE, rhs)
    }

    pub fn checked_add(self, rhs: Fixed) -> Result<Fixed, MathError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(MathError::Overflow("scaled decimal"))?
            .bounded()
    }

    pub fn checked_sub(self, rhs: Fixed) -> Result<Fixed, MathError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(MathError::Overflow("scaled decimal"))?
            .bounded()
    }

    /// Newton's-method integer square root of the raw (unscaled) value.
    ///
    /// Non-positive input yields zero and any raw value in `[1, 4)` yields 1.
    pub fn sqrt(self) -> Fixed {
        let value = self.0;
        if value <= I256::ZERO {
            return Self::ZERO;
        }
        if value < I256::new(4) {
            return Self(I256::ONE);
        }
        let two = I256::new(2);
        let mut x0 = value;
        let mut x1 = x0 / two + x0 % two;
        while x1 < x0 {
            x0 = x1;
            x1 = (x1 + value / x1) / two;
        }
        Self(x0)
    }

    /// Raw magnitude as a Q96-domain integer.
    pub fn to_u256(self) -> Result<U256, MathError> {
        if self.is_negative() {
            return Err(MathError::NegativeAmount);
        }
        Ok(self.magnitude())
    }

    pub fn from_u256(value: U256) -> Result<Fixed, MathError> {
        if value.bits() > 255 {
            return Err(MathError::Overflow("scaled decimal"));
        }
        let lo = value.low_u128();
        let hi = (value >> 128).low_u128();
        Self(WideU256::from_words(hi, lo).as_i256()).bounded()
    }

    /// Lossy bridge for display; `None` outside the range of `Decimal`.
    pub fn to_decimal(self) -> Option<Decimal> {
        Decimal::from_str(&self.format(DECIMALS)).ok()
    }

    pub fn from_decimal(value: Decimal) -> Fixed {
        Self::parse(&value.to_string())
    }
}

fn split_decimal(text: &str) -> Option<(bool, &str, &str)> {
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }
    Some((negative, int_part, frac_part))
}

fn assemble(negative: bool, int_part: &str, frac_part: &str) -> Option<Fixed> {
    let int_value = if int_part.is_empty() {
        I256::ZERO
    } else {
        I256::from_str_radix(int_part, 10).ok()?
    };
    let mut frac: String = frac_part.chars().take(DECIMALS).collect();
    while frac.len() < DECIMALS {
        frac.push('0');
    }
    let frac_value = I256::from_str_radix(&frac, 10).ok()?;
    let magnitude = int_value.checked_mul(SCALE_RAW)?.checked_add(frac_value)?;
    Some(Fixed(if negative { -magnitude } else { magnitude }))
}

impl Default for Fixed {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Fixed {
    type Output = Fixed;

    fn add(self, rhs: Fixed) -> Fixed {
        Fixed::clamped(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Fixed) {
        *self = *self + rhs;
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed::clamped(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Fixed) {
        *self = *self - rhs;
    }
}

impl Neg for Fixed {
    type Output = Fixed;

    fn neg(self) -> Fixed {
        Fixed::clamped(I256::ZERO.saturating_sub(self.0))
    }
}

/// `a * b / SCALE`, truncating toward zero and saturating on overflow.
impl Mul for Fixed {
    type Output = Fixed;

    fn mul(self, rhs: Fixed) -> Fixed {
        self.checked_mul(rhs)
            .unwrap_or_else(|_| Fixed::saturated(self.is_negative() != rhs.is_negative()))
    }
}

/// `a * SCALE / b`, truncating toward zero and saturating on overflow;
/// zero when `b` is zero.
impl Div for Fixed {
    type Output = Fixed;

    fn div(self, rhs: Fixed) -> Fixed {
        self.checked_div(rhs)
            .unwrap_or_else(|_| Fixed::saturated(self.is_negative() != rhs.is_negative()))
    }
}

impl FromStr for Fixed {
    type Err = FixedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_strict(s)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(DECIMALS))
    }
}

// The wire form is the raw scaled integer in base 10, never a float.
impl Serialize for Fixed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Fixed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        I256::from_str_radix(text.trim(), 10)
            .ok()
            .and_then(|raw| Fixed(raw).bounded().ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid scaled integer: {text:?}")))
    }
}
