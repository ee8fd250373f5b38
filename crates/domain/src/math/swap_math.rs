//! Single exact-input swap step inside one liquidity range.

use crate::error::MathError;
use crate::math::liquidity_amounts::{get_amount0_delta, get_amount1_delta};
use crate::math::q_math::{Rounding, div_rounding_up, mul_div, wide_mul_div};
use primitive_types::{U256, U512};

/// Fee denominator: fees are expressed in parts per million ("pips").
pub const FEE_UNITS: u32 = 1_000_000;

/// Outcome of [`compute_swap_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapStep {
    pub sqrt_price_next_x96: U256,
    /// Input converted into the output token, fee excluded.
    pub amount_in: U256,
    pub amount_out: U256,
    pub fee_amount: U256,
    pub reached_target: bool,
}

/// Next price after adding or removing `amount` of token0.
///
/// Always rounds up so the price moves no further than the amount pays for.
pub fn next_sqrt_price_from_amount0_rounding_up(
    sqrt_price_x96: U256,
    liquidity: U256,
    amount: U256,
    add: bool,
) -> Result<U256, MathError> {
    if amount.is_zero() {
        return Ok(sqrt_price_x96);
    }
    if liquidity.bits() > 160 {
        return Err(MathError::Overflow("amount0 price update"));
    }
    let numerator1 = liquidity << 96;
    let numerator = numerator1.full_mul(sqrt_price_x96);
    let product = amount.full_mul(sqrt_price_x96);

    let denominator = if add {
        U512::from(numerator1) + product
    } else {
        if product >= U512::from(numerator1) {
            return Err(MathError::PriceUpdateOverflow("amount0"));
        }
        U512::from(numerator1) - product
    };
    wide_mul_div(numerator, denominator, Rounding::Up)
}

/// Next price after adding or removing `amount` of token1.
///
/// Rounds down when adding and up when removing.
pub fn next_sqrt_price_from_amount1_rounding_down(
    sqrt_price_x96: U256,
    liquidity: U256,
    amount: U256,
    add: bool,
) -> Result<U256, MathError> {
    if amount.is_zero() {
        return Ok(sqrt_price_x96);
    }
    if liquidity.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    if amount.bits() > 160 {
        return Err(MathError::Overflow("amount1 price update"));
    }
    let shifted = amount << 96;

    if add {
        sqrt_price_x96
            .checked_add(shifted / liquidity)
            .ok_or(MathError::Overflow("amount1 price update"))
    } else {
        let quotient = div_rounding_up(shifted, liquidity)?;
        if quotient >= sqrt_price_x96 {
            return Err(MathError::PriceUpdateOverflow("amount1"));
        }
        Ok(sqrt_price_x96 - quotient)
    }
}

/// Price reached by spending `amount_in` of the input token.
pub fn next_sqrt_price_from_input(
    sqrt_price_x96: U256,
    liquidity: U256,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, MathError> {
    if sqrt_price_x96.is_zero() || liquidity.is_zero() {
        return Err(MathError::InvalidSwapState);
    }
    if zero_for_one {
        next_sqrt_price_from_amount0_rounding_up(sqrt_price_x96, liquidity, amount_in, true)
    } else {
        next_sqrt_price_from_amount1_rounding_down(sqrt_price_x96, liquidity, amount_in, true)
    }
}

/// Swaps `amount_remaining` of input toward `sqrt_price_target_x96`.
///
/// When the fee-free budget covers the distance to the target the step stops
/// exactly on the target and the fee is grossed up from the consumed input;
/// otherwise the price moves as far as the budget allows and everything not
/// converted to input is fee.
pub fn compute_swap_step(
    sqrt_price_current_x96: U256,
    sqrt_price_target_x96: U256,
    liquidity: U256,
    amount_remaining: U256,
    fee_pips: u32,
    zero_for_one: bool,
) -> Result<SwapStep, MathError> {
    if amount_remaining.is_zero() || liquidity.is_zero() {
        return Ok(SwapStep {
            sqrt_price_next_x96: sqrt_price_current_x96,
            amount_in: U256::zero(),
            amount_out: U256::zero(),
            fee_amount: U256::zero(),
            reached_target: false,
        });
    }
    if fee_pips >= FEE_UNITS {
        return Err(MathError::InvalidSwapState);
    }
    let fee_units = U256::from(FEE_UNITS);
    let fee = U256::from(fee_pips);

    let remaining_less_fee = mul_div(amount_remaining, fee_units - fee, fee_units, Rounding::Down)?;
    let amount_in_to_target = if zero_for_one {
        get_amount0_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, Rounding::Up)?
    } else {
        get_amount1_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, Rounding::Up)?
    };

    let reached_target = remaining_less_fee >= amount_in_to_target;
    let sqrt_price_next_x96 = if reached_target {
        sqrt_price_target_x96
    } else {
        next_sqrt_price_from_input(sqrt_price_current_x96, liquidity, remaining_less_fee, zero_for_one)?
    };

    let (amount_in, amount_out) = if zero_for_one {
        (
            get_amount0_delta(sqrt_price_next_x96, sqrt_price_current_x96, liquidity, Rounding::Up)?,
            get_amount1_delta(sqrt_price_next_x96, sqrt_price_current_x96, liquidity, Rounding::Down)?,
        )
    } else {
        (
            get_amount1_delta(sqrt_price_current_x96, sqrt_price_next_x96, liquidity, Rounding::Up)?,
            get_amount0_delta(sqrt_price_current_x96, sqrt_price_next_x96, liquidity, Rounding::Down)?,
        )
    };

    let fee_amount = if reached_target {
        mul_div(amount_in, fee, fee_units - fee, Rounding::Up)?
    } else {
        amount_remaining.saturating_sub(amount_in)
    };

    Ok(SwapStep {
        sqrt_price_next_x96,
        amount_in,
        amount_out,
        fee_amount,
        reached_target,
    })
}
