//! Exact-input swaps bounded by the position range.
//!
//! With a single position there is no liquidity beyond either bound, so a
//! swap is one step of the swap-step algorithm toward the bound in the
//! direction of travel. Input that cannot be absorbed before the bound is
//! reported back as unfilled.

use super::state::{V3PoolState, V3TradeRecord, normalize_liquidity, to_q};
use crate::quote::{Quote, QuoteError, traced};
use crate::v2::swap::{average_price, slippage};
use amm_sandbox_domain::math::price_tick::sqrt_price_x96_to_price;
use amm_sandbox_domain::math::q_math::{Q128, Rounding, mul_div};
use amm_sandbox_domain::math::swap_math::compute_swap_step;
use amm_sandbox_domain::math::tick_math::{sqrt_ratio_at_tick, tick_at_sqrt_ratio};
use amm_sandbox_domain::{Fixed, SwapDirection, U256};
use tracing::info;

/// Effect of an exact-input v3 swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3SwapQuote {
    pub direction: SwapDirection,
    pub amount_in: Fixed,
    /// Input actually taken, fee included.
    pub amount_in_consumed: Fixed,
    /// Input returned because the range ran out.
    pub amount_in_unfilled: Fixed,
    pub amount_out: Fixed,
    pub fee_amount_in_token: Fixed,
    pub avg_price_y_per_x: Fixed,
    pub spot_price_before_y_per_x: Fixed,
    pub spot_price_after_y_per_x: Fixed,
    pub slippage_total: Fixed,
    pub sqrt_price_before_x96: U256,
    pub sqrt_price_after_x96: U256,
    pub tick_before: i32,
    pub tick_after: i32,
    pub liquidity_before: Fixed,
    pub liquidity_after: Fixed,
    /// The step stopped on the range bound.
    pub crossed_boundary: bool,
    pub partial_fill: bool,
    pub k_before: U256,
    pub k_after: U256,
    /// Fee per unit of starting liquidity, Q128.
    pub fee_growth_delta_x128: U256,
}

/// Quotes selling `amount_in` of the input token into the active range.
pub fn quote_swap(state: &V3PoolState, direction: SwapDirection, amount_in: Fixed) -> Quote<V3SwapQuote> {
    traced("v3 swap", compute_swap(state, direction, amount_in))
}

fn compute_swap(state: &V3PoolState, direction: SwapDirection, amount_in: Fixed) -> Quote<V3SwapQuote> {
    if !amount_in.is_positive() {
        return Err(QuoteError::NonPositiveInput);
    }
    let liquidity_before = normalize_liquidity(state.liquidity);
    if !liquidity_before.is_positive() {
        return Err(QuoteError::NoActiveLiquidity);
    }

    let zero_for_one = direction.is_zero_for_one();
    let sqrt_before = state.sqrt_price_x96;
    let target_tick = if zero_for_one {
        state.position.tick_lower
    } else {
        state.position.tick_upper
    };
    let target_sqrt = sqrt_ratio_at_tick(target_tick)?;

    if zero_for_one && target_sqrt >= sqrt_before {
        return Err(QuoteError::AtLowerBound);
    }
    if !zero_for_one && target_sqrt <= sqrt_before {
        return Err(QuoteError::AtUpperBound);
    }

    let step = compute_swap_step(
        sqrt_before,
        target_sqrt,
        to_q(liquidity_before)?,
        to_q(amount_in)?,
        state.fee_tier.fee_pips(),
        zero_for_one,
    )?;

    let consumed = Fixed::from_u256(step.amount_in + step.fee_amount)?;
    let amount_out = Fixed::from_u256(step.amount_out)?;
    if !consumed.is_positive() || !amount_out.is_positive() {
        return Err(QuoteError::SwapTooSmall);
    }

    let amount_in_unfilled = (amount_in - consumed).max(Fixed::ZERO);
    let sqrt_after = step.sqrt_price_next_x96;
    let tick_after = tick_at_sqrt_ratio(sqrt_after)?;
    let crossed_boundary = step.reached_target;
    let liquidity_after = if crossed_boundary {
        Fixed::ZERO
    } else {
        normalize_liquidity(liquidity_before)
    };

    let fee_amount = Fixed::from_u256(step.fee_amount)?;
    let fee_growth_delta_x128 = mul_div(step.fee_amount, Q128, to_q(liquidity_before)?, Rounding::Down)?;

    let spot_before = sqrt_price_x96_to_price(sqrt_before)?;
    let spot_after = sqrt_price_x96_to_price(sqrt_after)?;
    let avg_price = average_price(direction, consumed, amount_out)?;

    Ok(V3SwapQuote {
        direction,
        amount_in,
        amount_in_consumed: consumed,
        amount_in_unfilled,
        amount_out,
        fee_amount_in_token: fee_amount,
        avg_price_y_per_x: avg_price,
        spot_price_before_y_per_x: spot_before,
        spot_price_after_y_per_x: spot_after,
        slippage_total: slippage(direction, avg_price, spot_before)?,
        sqrt_price_before_x96: sqrt_before,
        sqrt_price_after_x96: sqrt_after,
        tick_before: state.tick_current,
        tick_after,
        liquidity_before,
        liquidity_after,
        crossed_boundary,
        partial_fill: amount_in_unfilled.is_positive(),
        k_before: state.virtual_k(sqrt_before, liquidity_before)?,
        k_after: state.virtual_k(sqrt_after, liquidity_after)?,
        fee_growth_delta_x128,
    })
}

/// Commits a swap quote and accrues its fee.
///
/// The fee lands in the cumulative accumulator, in fee growth per unit of
/// the liquidity active at swap start, and in the position's owed fees.
pub fn apply_swap(state: &V3PoolState, quote: &Quote<V3SwapQuote>) -> V3PoolState {
    let Ok(quote) = quote else {
        return state.clone();
    };

    let mut next = state.clone();
    next.sqrt_price_x96 = quote.sqrt_price_after_x96;
    next.tick_current = quote.tick_after;
    next.liquidity = normalize_liquidity(quote.liquidity_after);
    next.t = state.t + 1;

    let fee = quote.fee_amount_in_token;
    let growth = quote.fee_growth_delta_x128;
    match quote.direction {
        SwapDirection::XToY => {
            next.fee_acc_x += fee;
            next.fee_growth_global_x128_x = next.fee_growth_global_x128_x.overflowing_add(growth).0;
            next.position.fee_owed_x += fee;
        }
        SwapDirection::YToX => {
            next.fee_acc_y += fee;
            next.fee_growth_global_x128_y = next.fee_growth_global_x128_y.overflowing_add(growth).0;
            next.position.fee_owed_y += fee;
        }
    }
    next.last_trade = Some(V3TradeRecord::from(quote));

    info!(
        t = next.t,
        direction = %quote.direction,
        amount_in = %quote.amount_in_consumed,
        amount_out = %quote.amount_out,
        tick = next.tick_current,
        partial_fill = quote.partial_fill,
        "Applied v3 swap"
    );
    next
}

impl From<&V3SwapQuote> for V3TradeRecord {
    fn from(quote: &V3SwapQuote) -> Self {
        Self {
            direction: quote.direction,
            amount_in: quote.amount_in,
            amount_in_consumed: quote.amount_in_consumed,
            amount_in_unfilled: quote.amount_in_unfilled,
            amount_out: quote.amount_out,
            fee_amount_in_token: quote.fee_amount_in_token,
            avg_price_y_per_x: quote.avg_price_y_per_x,
            spot_price_before_y_per_x: quote.spot_price_before_y_per_x,
            spot_price_after_y_per_x: quote.spot_price_after_y_per_x,
            slippage_total: quote.slippage_total,
            sqrt_price_before_x96: quote.sqrt_price_before_x96,
            sqrt_price_after_x96: quote.sqrt_price_after_x96,
            tick_before: quote.tick_before,
            tick_after: quote.tick_after,
            liquidity_before: quote.liquidity_before,
            liquidity_after: quote.liquidity_after,
            crossed_boundary: quote.crossed_boundary,
            partial_fill: quote.partial_fill,
            k_before: quote.k_before,
            k_after: quote.k_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::V3PoolParams;
    use crate::v3::state::create_pool;
    use amm_sandbox_domain::{FeeTier, MathError};

    fn pool(lower: i32, upper: i32, x: &str, y: &str) -> V3PoolState {
        let params = V3PoolParams::new(FeeTier::Medium, "1")
            .with_range(lower, upper)
            .with_amounts(x, y);
        create_pool(&params).unwrap()
    }

    #[test]
    fn test_in_range_swap_x_to_y() {
        let state = pool(-1200, 1200, "1000", "1000");
        assert!(state.liquidity.is_positive());

        let quote = quote_swap(&state, SwapDirection::XToY, Fixed::from_int(10));
        let q = quote.as_ref().unwrap();
        assert!(q.amount_out.is_positive());
        assert!(q.amount_in_unfilled.is_zero());
        assert!(!q.crossed_boundary);
        assert!(!q.partial_fill);
        assert_eq!(q.amount_in_consumed, q.amount_in);
        assert!(q.spot_price_after_y_per_x < q.spot_price_before_y_per_x);
        assert!(q.slippage_total.is_positive());
        assert_eq!(q.liquidity_after, q.liquidity_before);

        let next = apply_swap(&state, &quote);
        assert!(next.fee_acc_x.is_positive());
        assert_eq!(next.position.fee_owed_x, next.fee_acc_x);
        assert!(next.fee_growth_global_x128_x > U256::zero());
        assert!(next.fee_growth_global_x128_y.is_zero());
        assert!(next.tick_current <= state.tick_current);
        assert_eq!(next.t, 1);
        assert!(next.last_trade.as_ref().is_some_and(|trade| !trade.partial_fill));
    }

    #[test]
    fn test_in_range_swap_y_to_x() {
        let state = pool(-1200, 1200, "1000", "1000");
        let quote = quote_swap(&state, SwapDirection::YToX, Fixed::from_int(10));
        let q = quote.as_ref().unwrap();
        assert!(q.spot_price_after_y_per_x > q.spot_price_before_y_per_x);
        assert!(q.avg_price_y_per_x > q.spot_price_before_y_per_x);

        let next = apply_swap(&state, &quote);
        assert!(next.fee_acc_y.is_positive());
        assert!(next.fee_acc_x.is_zero());
        assert!(next.tick_current >= state.tick_current);
    }

    #[test]
    fn test_crossing_bound_is_partial_fill() {
        let state = pool(-120, 120, "30", "30");
        let quote = quote_swap(&state, SwapDirection::XToY, Fixed::from_int(5000));
        let q = quote.as_ref().unwrap();

        assert!(q.crossed_boundary);
        assert!(q.partial_fill);
        assert!(q.amount_in_unfilled.is_positive());
        assert_eq!(q.amount_in_consumed + q.amount_in_unfilled, q.amount_in);
        assert!(q.liquidity_after.is_zero());
        assert_eq!(q.sqrt_price_after_x96, sqrt_ratio_at_tick(-120).unwrap());
        assert!(q.k_after.is_zero());

        let next = apply_swap(&state, &quote);
        assert!(next.liquidity.is_zero());
        assert_eq!(
            quote_swap(&next, SwapDirection::XToY, Fixed::ONE),
            Err(QuoteError::NoActiveLiquidity)
        );
    }

    #[test]
    fn test_fee_is_tier_share_of_consumed_input() {
        let state = pool(-1200, 1200, "1000", "1000");
        let q = quote_swap(&state, SwapDirection::XToY, Fixed::from_int(10)).unwrap();
        // 0.3% of 10, give or take rounding dust
        let expected = Fixed::parse("0.03");
        assert!((q.fee_amount_in_token - expected).abs() <= Fixed::from_raw_i128(1_000));
    }

    #[test]
    fn test_swap_rejections() {
        let state = pool(-1200, 1200, "1000", "1000");
        assert_eq!(
            quote_swap(&state, SwapDirection::XToY, Fixed::ZERO),
            Err(QuoteError::NonPositiveInput)
        );
        assert_eq!(
            quote_swap(&state, SwapDirection::XToY, Fixed::from_raw_i128(1)),
            Err(QuoteError::SwapTooSmall)
        );

        let mut at_lower = state.clone();
        at_lower.sqrt_price_x96 = sqrt_ratio_at_tick(-1200).unwrap();
        at_lower.tick_current = -1200;
        assert_eq!(
            quote_swap(&at_lower, SwapDirection::XToY, Fixed::ONE),
            Err(QuoteError::AtLowerBound)
        );

        let mut at_upper = state.clone();
        at_upper.sqrt_price_x96 = sqrt_ratio_at_tick(1200).unwrap();
        assert_eq!(
            quote_swap(&at_upper, SwapDirection::YToX, Fixed::ONE),
            Err(QuoteError::AtUpperBound)
        );
    }

    #[test]
    fn test_oversized_liquidity_reports_overflow() {
        let mut state = pool(-60, 60, "1", "1");
        state.position.liquidity = Fixed::max_value();
        state.liquidity = Fixed::max_value();
        let quote = quote_swap(&state, SwapDirection::XToY, Fixed::max_value());
        assert!(matches!(quote, Err(QuoteError::Math(MathError::Overflow(_)))));
        assert_eq!(apply_swap(&state, &quote), state);

        // deep but representable liquidity still fills
        let deep = pool(-60, 60, &format!("1{}", "0".repeat(21)), &format!("1{}", "0".repeat(21)));
        let q = quote_swap(&deep, SwapDirection::XToY, Fixed::from_int(1_000_000)).unwrap();
        assert!(!q.partial_fill);
        assert!(q.amount_out.is_positive());
    }

    #[test]
    fn test_failed_quote_applies_as_no_op() {
        let state = pool(-1200, 1200, "1000", "1000");
        let failed = quote_swap(&state, SwapDirection::XToY, Fixed::ZERO);
        assert_eq!(apply_swap(&state, &failed), state);
    }

    #[test]
    fn test_round_trip_never_profits_trader() {
        for amount in ["1", "25", "200"] {
            let state = pool(-6000, 6000, "1000", "1000");
            let amount_in = Fixed::parse(amount);

            let first = quote_swap(&state, SwapDirection::XToY, amount_in);
            let mid = apply_swap(&state, &first);
            let received = first.as_ref().unwrap().amount_out;

            let second = quote_swap(&mid, SwapDirection::YToX, received).unwrap();
            assert!(second.amount_out < amount_in);
        }
    }
}
