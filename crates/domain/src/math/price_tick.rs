use crate::error::MathError;
use crate::fixed::Fixed;
use crate::math::q_math::{Q192, Rounding, wide_mul_div};
use crate::math::tick_math::{MAX_SQRT_RATIO, MIN_SQRT_RATIO, sqrt_ratio_at_tick, tick_at_sqrt_ratio};
use primitive_types::{U256, U512};

fn scale() -> U512 {
    U512::exp10(18)
}

/// Returns the scaled price (Y per X) of a Q96 square-root price.
/// P = sqrtPriceX96^2 / 2^192
pub fn sqrt_price_x96_to_price(sqrt_price_x96: U256) -> Result<Fixed, MathError> {
    if sqrt_price_x96.is_zero() {
        return Ok(Fixed::ZERO);
    }
    let squared = sqrt_price_x96.full_mul(sqrt_price_x96);
    let scaled = squared
        .checked_mul(scale())
        .ok_or(MathError::Overflow("price from sqrt"))?;
    Fixed::from_u256(wide_mul_div(scaled, Q192, Rounding::Down)?)
}

/// Returns the Q96 square-root price for a scaled price, clamped into
/// `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`. Prices below one raw unit count as one.
pub fn price_to_sqrt_price_x96(price: Fixed) -> Result<U256, MathError> {
    let price = price.max(Fixed::from_raw_i128(1)).to_u256()?;
    let ratio_x192 = U512::from(price)
        .checked_mul(Q192)
        .ok_or(MathError::Overflow("sqrt from price"))?
        / scale();
    let root = U256::try_from(ratio_x192.integer_sqrt()).map_err(|_| MathError::Overflow("sqrt from price"))?;
    Ok(root.clamp(MIN_SQRT_RATIO, MAX_SQRT_RATIO - U256::one()))
}

/// Returns the price corresponding to a given tick.
/// P = 1.0001 ^ tick
pub fn tick_to_price(tick: i32) -> Result<Fixed, MathError> {
    sqrt_price_x96_to_price(sqrt_ratio_at_tick(tick)?)
}

/// Returns the highest tick whose price does not exceed `price`.
pub fn price_to_tick(price: Fixed) -> Result<i32, MathError> {
    tick_at_sqrt_ratio(price_to_sqrt_price_x96(price)?)
}
