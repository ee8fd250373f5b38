//! Q96 / Q128 ratio math.
//!
//! Full-precision multiply-divide over 256-bit operands with a 512-bit
//! intermediate, in either rounding direction. Amounts charged to a trader
//! round up, amounts paid out round down.

use crate::error::MathError;
use primitive_types::{U256, U512};

/// 2^96, the unit of a Q96 square-root price.
pub const Q96: U256 = U256([0, 1 << 32, 0, 0]);
/// 2^128, the unit of a Q128 fee-growth accumulator.
pub const Q128: U256 = U256([0, 0, 1, 0]);
/// 2^192, the unit of a squared Q96 price.
pub const Q192: U512 = U512([0, 0, 0, 1, 0, 0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Truncate toward zero.
    Down,
    /// Add one unit whenever the division leaves a remainder.
    Up,
}

/// `a * b / denominator` without intermediate overflow.
pub fn mul_div(a: U256, b: U256, denominator: U256, rounding: Rounding) -> Result<U256, MathError> {
    wide_mul_div(a.full_mul(b), U512::from(denominator), rounding)
}

pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    mul_div(a, b, denominator, Rounding::Up)
}

pub fn div_rounding_up(numerator: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let quotient = numerator / denominator;
    if (numerator % denominator).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::one())
    }
}

/// Divides a 512-bit product and narrows the quotient back to 256 bits.
pub(crate) fn wide_mul_div(
    product: U512,
    denominator: U512,
    rounding: Rounding,
) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let mut quotient = product / denominator;
    if rounding == Rounding::Up && !(product % denominator).is_zero() {
        quotient += U512::one();
    }
    U256::try_from(quotient).map_err(|_| MathError::Overflow("mul_div"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(Q96, U256::one() << 96);
        assert_eq!(Q128, U256::one() << 128);
        assert_eq!(Q192, U512::one() << 192);
    }

    #[test]
    fn test_rounding_directions() {
        let a = U256::from(10u64);
        let b = U256::from(10u64);
        let d = U256::from(3u64);
        assert_eq!(mul_div(a, b, d, Rounding::Down).unwrap(), U256::from(33u64));
        assert_eq!(mul_div(a, b, d, Rounding::Up).unwrap(), U256::from(34u64));

        // exact division never rounds up
        let exact = mul_div_rounding_up(a, b, U256::from(4u64)).unwrap();
        assert_eq!(exact, U256::from(25u64));

        assert_eq!(div_rounding_up(U256::from(7u64), d).unwrap(), U256::from(3u64));
        assert_eq!(div_rounding_up(U256::from(6u64), d).unwrap(), U256::from(2u64));
    }

    #[test]
    fn test_wide_intermediate() {
        // (2^200 * 2^100) / 2^150 overflows 256 bits only in the product
        let a = U256::one() << 200;
        let b = U256::one() << 100;
        let d = U256::one() << 150;
        assert_eq!(mul_div(a, b, d, Rounding::Down).unwrap(), U256::one() << 150);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            mul_div(U256::one(), U256::one(), U256::zero(), Rounding::Down),
            Err(MathError::DivisionByZero)
        );
        assert_eq!(div_rounding_up(U256::one(), U256::zero()), Err(MathError::DivisionByZero));
        assert_eq!(
            mul_div(U256::MAX, U256::MAX, U256::one(), Rounding::Down),
            Err(MathError::Overflow("mul_div"))
        );
    }
}
