//! Exact-input swaps against the constant-product curve.

use super::state::{V2PoolState, V2TradeRecord, spot_price};
use crate::quote::{Quote, QuoteError, traced};
use amm_sandbox_domain::math::constant_product::{apply_fee, calculate_k, calculate_out_amount};
use amm_sandbox_domain::{Fixed, MathError, SwapDirection, U256};
use tracing::info;

/// Effect of an exact-input swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V2SwapQuote {
    pub direction: SwapDirection,
    pub reserve_x_before: Fixed,
    pub reserve_y_before: Fixed,
    pub amount_in: Fixed,
    /// Input left after the fee is taken.
    pub amount_in_after_fee: Fixed,
    pub amount_out: Fixed,
    /// Output the same input would buy with a zero fee.
    pub amount_out_no_fee: Fixed,
    pub fee_amount_in_token: Fixed,
    pub reserve_x_after: Fixed,
    pub reserve_y_after: Fixed,
    pub avg_price_y_per_x: Fixed,
    pub spot_price_before_y_per_x: Fixed,
    pub spot_price_after_y_per_x: Fixed,
    /// Execution shortfall against the pre-trade spot price.
    pub slippage_total: Fixed,
    /// The part of the shortfall caused by the curve alone.
    pub slippage_curve: Fixed,
    pub fee_impact_rate: Fixed,
    pub fee_impact_out_token: Fixed,
    pub k_before: U256,
    pub k_after: U256,
}

/// Average execution price in Y per X.
pub(crate) fn average_price(direction: SwapDirection, amount_in: Fixed, amount_out: Fixed) -> Result<Fixed, MathError> {
    match direction {
        SwapDirection::XToY => amount_out.checked_div(amount_in),
        SwapDirection::YToX => amount_in.checked_div(amount_out),
    }
}

/// How much worse than `spot` the average price is for the trader.
pub(crate) fn slippage(direction: SwapDirection, avg_price: Fixed, spot: Fixed) -> Result<Fixed, MathError> {
    let ratio = avg_price.checked_div(spot)?;
    let shortfall = match direction {
        SwapDirection::XToY => Fixed::ONE.checked_sub(ratio)?,
        SwapDirection::YToX => ratio.checked_sub(Fixed::ONE)?,
    };
    Ok(shortfall.max(Fixed::ZERO))
}

/// Quotes selling `amount_in` of the input token.
pub fn quote_swap(state: &V2PoolState, direction: SwapDirection, amount_in: Fixed) -> Quote<V2SwapQuote> {
    traced("v2 swap", compute_swap(state, direction, amount_in))
}

fn compute_swap(state: &V2PoolState, direction: SwapDirection, amount_in: Fixed) -> Quote<V2SwapQuote> {
    if !amount_in.is_positive() {
        return Err(QuoteError::NonPositiveInput);
    }
    if !state.has_reserves() {
        return Err(QuoteError::EmptyReserves);
    }
    if state.fee_rate.is_negative() || state.fee_rate >= Fixed::ONE {
        return Err(QuoteError::InvalidFeeRate);
    }

    let (reserve_in, reserve_out) = state.reserves_for(direction);
    let (amount_in_after_fee, fee_amount) = apply_fee(amount_in, state.fee_rate)?;
    if !amount_in_after_fee.is_positive() {
        return Err(QuoteError::AmountAfterFeeTooSmall);
    }

    let amount_out = calculate_out_amount(amount_in_after_fee, reserve_in, reserve_out)?;
    if !amount_out.is_positive() || amount_out >= reserve_out {
        return Err(QuoteError::OutputTooSmallOrDrainsPool);
    }
    let amount_out_no_fee = calculate_out_amount(amount_in, reserve_in, reserve_out)?;

    let (reserve_x_after, reserve_y_after) = match direction {
        SwapDirection::XToY => (
            state.reserve_x.checked_add(amount_in)?,
            state.reserve_y.checked_sub(amount_out)?,
        ),
        SwapDirection::YToX => (
            state.reserve_x.checked_sub(amount_out)?,
            state.reserve_y.checked_add(amount_in)?,
        ),
    };
    if !reserve_x_after.is_positive() || !reserve_y_after.is_positive() {
        return Err(QuoteError::NonPositiveReserves);
    }

    let spot_before = spot_price(state)?;
    let spot_after = reserve_y_after.checked_div(reserve_x_after)?;
    let avg_price = average_price(direction, amount_in, amount_out)?;
    let avg_price_no_fee = average_price(direction, amount_in, amount_out_no_fee)?;

    let slippage_total = slippage(direction, avg_price, spot_before)?;
    let slippage_curve = slippage(direction, avg_price_no_fee, spot_before)?;

    Ok(V2SwapQuote {
        direction,
        reserve_x_before: state.reserve_x,
        reserve_y_before: state.reserve_y,
        amount_in,
        amount_in_after_fee,
        amount_out,
        amount_out_no_fee,
        fee_amount_in_token: fee_amount,
        reserve_x_after,
        reserve_y_after,
        avg_price_y_per_x: avg_price,
        spot_price_before_y_per_x: spot_before,
        spot_price_after_y_per_x: spot_after,
        slippage_total,
        slippage_curve,
        fee_impact_rate: (slippage_total - slippage_curve).max(Fixed::ZERO),
        fee_impact_out_token: (amount_out_no_fee - amount_out).max(Fixed::ZERO),
        k_before: calculate_k(state.reserve_x, state.reserve_y)?,
        k_after: calculate_k(reserve_x_after, reserve_y_after)?,
    })
}

/// Commits a swap quote: new reserves, fee accrued to the input token.
pub fn apply_swap(state: &V2PoolState, quote: &Quote<V2SwapQuote>) -> V2PoolState {
    let Ok(quote) = quote else {
        return state.clone();
    };

    let mut next = state.clone();
    next.reserve_x = quote.reserve_x_after;
    next.reserve_y = quote.reserve_y_after;
    next.t = state.t + 1;
    match quote.direction {
        SwapDirection::XToY => next.fee_acc_x += quote.fee_amount_in_token,
        SwapDirection::YToX => next.fee_acc_y += quote.fee_amount_in_token,
    }
    next.last_trade = Some(V2TradeRecord::from(quote));

    info!(
        t = next.t,
        direction = %quote.direction,
        amount_in = %quote.amount_in,
        amount_out = %quote.amount_out,
        "Applied v2 swap"
    );
    next
}

impl From<&V2SwapQuote> for V2TradeRecord {
    fn from(quote: &V2SwapQuote) -> Self {
        Self {
            direction: quote.direction,
            reserve_x_before: quote.reserve_x_before,
            reserve_y_before: quote.reserve_y_before,
            reserve_x_after: quote.reserve_x_after,
            reserve_y_after: quote.reserve_y_after,
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
            amount_out_no_fee: quote.amount_out_no_fee,
            fee_amount_in_token: quote.fee_amount_in_token,
            avg_price_y_per_x: quote.avg_price_y_per_x,
            spot_price_before_y_per_x: quote.spot_price_before_y_per_x,
            spot_price_after_y_per_x: quote.spot_price_after_y_per_x,
            slippage_total: quote.slippage_total,
            slippage_curve: quote.slippage_curve,
            fee_impact_rate: quote.fee_impact_rate,
            fee_impact_out_token: quote.fee_impact_out_token,
            k_before: quote.k_before,
            k_after: quote.k_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::V2PoolParams;
    use crate::v2::state::create_pool;

    fn pool(x: &str, y: &str, fee: &str) -> V2PoolState {
        create_pool(&V2PoolParams::new(x, y).with_fee_rate(fee))
    }

    #[test]
    fn test_swap_x_to_y_with_fee_and_k_growth() {
        let state = pool("1000", "1000", "0.003");
        let amount_in = Fixed::from_int(10);

        let quote = quote_swap(&state, SwapDirection::XToY, amount_in);
        let q = quote.as_ref().unwrap();
        assert!(q.amount_out.is_positive());
        assert!(q.amount_out_no_fee > q.amount_out);
        assert!(q.slippage_total.is_positive());
        assert!(q.k_after > q.k_before);
        assert_eq!(q.fee_amount_in_token, Fixed::parse("0.03"));
        assert!(q.fee_impact_rate.is_positive());
        assert_eq!(q.fee_impact_out_token, q.amount_out_no_fee - q.amount_out);

        let next = apply_swap(&state, &quote);
        assert_eq!(next.reserve_x, state.reserve_x + amount_in);
        assert_eq!(next.reserve_y, state.reserve_y - q.amount_out);
        assert_eq!(next.fee_acc_x, Fixed::parse("0.03"));
        assert_eq!(next.t, 1);
        let record = next.last_trade.as_ref().unwrap();
        assert_eq!(record.amount_out, q.amount_out);
        assert_eq!(record.k_after, q.k_after);
    }

    #[test]
    fn test_swap_y_to_x() {
        let state = pool("500", "2000", "0.003");
        let quote = quote_swap(&state, SwapDirection::YToX, Fixed::from_int(250));
        let q = quote.as_ref().unwrap();
        assert!(q.spot_price_after_y_per_x > q.spot_price_before_y_per_x);
        assert!(q.avg_price_y_per_x > q.spot_price_before_y_per_x);

        let next = apply_swap(&state, &quote);
        assert_eq!(next.reserve_y, state.reserve_y + q.amount_in);
        assert_eq!(next.reserve_x, state.reserve_x - q.amount_out);
        assert!(next.fee_acc_y.is_positive());
        assert!(next.fee_acc_x.is_zero());
    }

    #[test]
    fn test_zero_fee_has_no_fee_impact() {
        let state = pool("10000", "10000", "0");
        let q = quote_swap(&state, SwapDirection::XToY, Fixed::from_int(100)).unwrap();
        assert_eq!(q.amount_out, q.amount_out_no_fee);
        assert_eq!(q.slippage_total, q.slippage_curve);
        assert!(q.fee_impact_rate.is_zero());
        assert!(q.fee_amount_in_token.is_zero());
    }

    #[test]
    fn test_swap_rejections() {
        let state = pool("1000", "1000", "0.003");
        assert_eq!(
            quote_swap(&state, SwapDirection::XToY, Fixed::ZERO),
            Err(QuoteError::NonPositiveInput)
        );
        assert_eq!(
            quote_swap(&state, SwapDirection::XToY, Fixed::from_int(-1)),
            Err(QuoteError::NonPositiveInput)
        );

        let mut empty = state.clone();
        empty.reserve_y = Fixed::ZERO;
        assert_eq!(
            quote_swap(&empty, SwapDirection::XToY, Fixed::ONE),
            Err(QuoteError::EmptyReserves)
        );

        let mut bad_fee = state.clone();
        bad_fee.fee_rate = Fixed::ONE;
        assert_eq!(
            quote_swap(&bad_fee, SwapDirection::XToY, Fixed::ONE),
            Err(QuoteError::InvalidFeeRate)
        );

        // one raw unit loses everything to the fee
        assert_eq!(
            quote_swap(&state, SwapDirection::XToY, Fixed::from_raw_i128(1)),
            Err(QuoteError::AmountAfterFeeTooSmall)
        );

        let lopsided = pool("1000000", "1", "0.003");
        assert_eq!(
            quote_swap(&lopsided, SwapDirection::XToY, Fixed::from_raw_i128(1_000)),
            Err(QuoteError::OutputTooSmallOrDrainsPool)
        );
    }

    #[test]
    fn test_extreme_magnitudes_are_rejected_not_panicking() {
        // an input far beyond the reserves still quotes without wrapping
        let state = pool("1000", "1000", "0.003");
        let huge = Fixed::parse_strict(&format!("1{}", "0".repeat(45))).unwrap();
        let q = quote_swap(&state, SwapDirection::XToY, huge).unwrap();
        assert!(q.amount_out < state.reserve_y);
        assert_eq!(q.fee_amount_in_token, Fixed::parse(&format!("3{}", "0".repeat(42))));

        // a spot price that does not fit surfaces as an overflow
        let mut skewed = pool("1000", "1000", "0.003");
        skewed.reserve_x = Fixed::from_raw_i128(1);
        skewed.reserve_y = Fixed::parse(&format!("1{}", "0".repeat(50)));
        let quote = quote_swap(&skewed, SwapDirection::XToY, Fixed::ONE);
        assert_eq!(quote, Err(QuoteError::Math(MathError::Overflow("scaled decimal"))));
        assert_eq!(apply_swap(&skewed, &quote), skewed);

        // reserves at the bound cannot absorb another bound-sized input
        let max = format!("1{}", "0".repeat(58));
        let edge = pool(&max, &max, "0.003");
        assert_eq!(
            quote_swap(&edge, SwapDirection::YToX, Fixed::max_value()),
            Err(QuoteError::Math(MathError::Overflow("scaled decimal")))
        );

        // large but representable pools still quote normally
        let big = format!("1{}", "0".repeat(21));
        let deep = pool(&big, &big, "0.003");
        let q = quote_swap(&deep, SwapDirection::XToY, Fixed::from_int(1_000_000)).unwrap();
        assert!(q.amount_out.is_positive());
        assert!(q.k_after > q.k_before);
    }

    #[test]
    fn test_failed_quote_applies_as_no_op() {
        let state = pool("1000", "1000", "0.003");
        let failed = quote_swap(&state, SwapDirection::XToY, Fixed::ZERO);
        assert_eq!(apply_swap(&state, &failed), state);
    }

    #[test]
    fn test_round_trip_never_profits_trader() {
        for (x, y, amount) in [("1000", "1000", "10"), ("500", "2000", "40"), ("10000", "20000000", "3")] {
            let state = pool(x, y, "0.003");
            let amount_in = Fixed::parse(amount);

            let first = quote_swap(&state, SwapDirection::XToY, amount_in);
            let mid = apply_swap(&state, &first);
            let received = first.as_ref().unwrap().amount_out;

            let second = quote_swap(&mid, SwapDirection::YToX, received);
            let end = apply_swap(&mid, &second);
            let q = second.as_ref().unwrap();

            assert!(q.amount_out < amount_in);
            assert!(q.k_after >= q.k_before);
            assert!(end.reserve_x > state.reserve_x);
        }
    }
}
