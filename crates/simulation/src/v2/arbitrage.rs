//! Arbitrage against an external reference price.
//!
//! The solver looks for the swap input that moves the pool spot price
//! closest to the reference. An expanding search brackets the input from a
//! small seed, then a bisection over the bracket refines it. Each trial is
//! an ordinary swap quote, so fees and rounding are priced in exactly.

use super::state::{V2PoolState, relative_spread, spot_price};
use super::swap::{V2SwapQuote, apply_swap, quote_swap};
use crate::config::ArbitrageConfig;
use crate::quote::{Quote, QuoteError, traced};
use amm_sandbox_domain::{Fixed, SwapDirection};
use tracing::debug;

/// Best trade found toward an external price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitrageQuote {
    pub external_price: Fixed,
    pub direction: SwapDirection,
    pub amount_in: Fixed,
    pub amount_out: Fixed,
    pub spot_price_before: Fixed,
    pub spot_price_after: Fixed,
    /// Relative distance to the external price before the trade.
    pub spread_before: Fixed,
    /// Relative distance to the external price after the trade.
    pub spread_after: Fixed,
    /// Profit valued in Y at the external price.
    pub expected_profit_in_y: Fixed,
    /// The swap that realises the trade.
    pub swap_quote: V2SwapQuote,
}

/// Quotes the arbitrage trade toward `external_price` with default search bounds.
pub fn quote_arbitrage(state: &V2PoolState, external_price: Fixed) -> Quote<ArbitrageQuote> {
    quote_arbitrage_with_config(state, external_price, &ArbitrageConfig::default())
}

pub fn quote_arbitrage_with_config(
    state: &V2PoolState,
    external_price: Fixed,
    config: &ArbitrageConfig,
) -> Quote<ArbitrageQuote> {
    traced("v2 arbitrage", compute_arbitrage(state, external_price, config))
}

/// Whether a larger input would still move the spot toward the target.
fn should_increase(direction: SwapDirection, spot_after: Fixed, target: Fixed) -> bool {
    match direction {
        SwapDirection::XToY => spot_after > target,
        SwapDirection::YToX => spot_after < target,
    }
}

/// Closer to the target wins; ties go to the smaller input.
fn is_better(candidate: &V2SwapQuote, best: Option<&V2SwapQuote>, target: Fixed) -> bool {
    let Some(best) = best else {
        return true;
    };
    let candidate_gap = (candidate.spot_price_after_y_per_x - target).abs();
    let best_gap = (best.spot_price_after_y_per_x - target).abs();
    candidate_gap < best_gap || (candidate_gap == best_gap && candidate.amount_in < best.amount_in)
}

fn saturating_whole(value: u64) -> Fixed {
    Fixed::from_int(i64::try_from(value).unwrap_or(i64::MAX))
}

fn compute_arbitrage(state: &V2PoolState, external_price: Fixed, config: &ArbitrageConfig) -> Quote<ArbitrageQuote> {
    if !external_price.is_positive() {
        return Err(QuoteError::NonPositiveExternalPrice);
    }
    if !state.has_reserves() {
        return Err(QuoteError::EmptyReserves);
    }
    let spot_before = spot_price(state)?;
    if spot_before == external_price {
        return Err(QuoteError::PriceAlreadyAligned);
    }

    let direction = if external_price > spot_before {
        SwapDirection::YToX
    } else {
        SwapDirection::XToY
    };
    let (reserve_in, _) = state.reserves_for(direction);

    let unit = Fixed::from_raw_i128(1);
    let two = Fixed::from_int(2);
    let max_bound = (reserve_in * saturating_whole(config.cap_multiplier)).max(unit);
    let mut low = unit;
    let mut high = (reserve_in / saturating_whole(config.seed_divisor)).max(unit);
    let mut best: Option<V2SwapQuote> = None;

    let mut expansions = 0;
    while expansions < config.max_iterations {
        expansions += 1;
        let Ok(trial) = quote_swap(state, direction, high) else {
            break;
        };
        let keep_going = should_increase(direction, trial.spot_price_after_y_per_x, external_price);
        if is_better(&trial, best.as_ref(), external_price) {
            best = Some(trial);
        }
        if !keep_going {
            break;
        }
        low = high;
        high = high * two;
        if high > max_bound {
            high = max_bound;
            break;
        }
    }

    let mut left = low;
    let mut right = high;
    let mut bisections = 0;
    while left <= right && bisections < config.max_iterations {
        bisections += 1;
        let mid = (left + right) / two;
        if !mid.is_positive() {
            break;
        }
        let Ok(trial) = quote_swap(state, direction, mid) else {
            right = mid - unit;
            continue;
        };
        if should_increase(direction, trial.spot_price_after_y_per_x, external_price) {
            left = mid + unit;
        } else {
            right = mid - unit;
        }
        if is_better(&trial, best.as_ref(), external_price) {
            best = Some(trial);
        }
    }

    let Some(swap_quote) = best else {
        return Err(QuoteError::NoArbitrageTrade);
    };
    debug!(
        direction = %direction,
        low = %low,
        high = %high,
        expansions,
        bisections,
        amount_in = %swap_quote.amount_in,
        "Arbitrage search settled"
    );

    let expected_profit_in_y = match direction {
        SwapDirection::XToY => swap_quote
            .amount_out
            .checked_sub(swap_quote.amount_in.checked_mul(external_price)?)?,
        SwapDirection::YToX => swap_quote
            .amount_out
            .checked_mul(external_price)?
            .checked_sub(swap_quote.amount_in)?,
    };
    if !expected_profit_in_y.is_positive() {
        return Err(QuoteError::UnprofitableArbitrage);
    }

    let spot_after = swap_quote.spot_price_after_y_per_x;
    Ok(ArbitrageQuote {
        external_price,
        direction,
        amount_in: swap_quote.amount_in,
        amount_out: swap_quote.amount_out,
        spot_price_before: spot_before,
        spot_price_after: spot_after,
        spread_before: relative_spread(spot_before, external_price)?,
        spread_after: relative_spread(spot_after, external_price)?,
        expected_profit_in_y,
        swap_quote,
    })
}

/// Commits the swap behind an arbitrage quote.
pub fn apply_arbitrage(state: &V2PoolState, quote: &Quote<ArbitrageQuote>) -> V2PoolState {
    let Ok(quote) = quote else {
        return state.clone();
    };
    apply_swap(state, &Ok(quote.swap_quote.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::V2PoolParams;
    use crate::v2::state::create_pool;
    use amm_sandbox_domain::MathError;

    fn pool(x: &str, y: &str, fee: &str) -> V2PoolState {
        create_pool(&V2PoolParams::new(x, y).with_fee_rate(fee))
    }

    #[test]
    fn test_buys_x_when_external_price_is_higher() {
        let state = pool("1000", "2000", "0.003");
        let quote = quote_arbitrage(&state, Fixed::parse("2.4"));
        let q = quote.as_ref().unwrap();

        assert_eq!(q.direction, SwapDirection::YToX);
        assert!(q.expected_profit_in_y.is_positive());
        assert!(q.spread_after < q.spread_before);
        assert!(q.spot_price_after > q.spot_price_before);
        // never overshoots by more than rounding
        assert!(q.spot_price_after <= Fixed::parse("2.4") + Fixed::parse("0.000001"));

        let next = apply_arbitrage(&state, &quote);
        assert_eq!(next.reserve_y, state.reserve_y + q.amount_in);
        assert_eq!(next.reserve_x, state.reserve_x - q.amount_out);
        assert_eq!(next.t, 1);
        assert!(next.last_trade.is_some());
    }

    #[test]
    fn test_sells_x_when_external_price_is_lower() {
        let state = pool("1000", "2000", "0.003");
        let q = quote_arbitrage(&state, Fixed::parse("1.5")).unwrap();

        assert_eq!(q.direction, SwapDirection::XToY);
        assert!(q.spot_price_after < q.spot_price_before);
        assert!(q.spread_after < q.spread_before);
        assert!(q.expected_profit_in_y.is_positive());
    }

    #[test]
    fn test_zero_fee_pool_lands_on_target() {
        let state = pool("1000", "1000", "0");
        let q = quote_arbitrage(&state, Fixed::from_int(4)).unwrap();
        let gap = (q.spot_price_after - Fixed::from_int(4)).abs();
        assert!(gap < Fixed::parse("0.000000001"));
    }

    #[test]
    fn test_gap_inside_fee_band_is_unprofitable() {
        let state = pool("1000", "2000", "0.003");
        assert_eq!(
            quote_arbitrage(&state, Fixed::parse("2.001")),
            Err(QuoteError::UnprofitableArbitrage)
        );
    }

    #[test]
    fn test_arbitrage_rejections() {
        let state = pool("1000", "2000", "0.003");
        assert_eq!(
            quote_arbitrage(&state, Fixed::ZERO),
            Err(QuoteError::NonPositiveExternalPrice)
        );
        assert_eq!(
            quote_arbitrage(&state, Fixed::from_int(2)),
            Err(QuoteError::PriceAlreadyAligned)
        );

        let mut empty = state.clone();
        empty.reserve_x = Fixed::ZERO;
        assert_eq!(
            quote_arbitrage(&empty, Fixed::from_int(3)),
            Err(QuoteError::EmptyReserves)
        );
    }

    #[test]
    fn test_tight_config_still_improves_spread() {
        let state = pool("1000", "2000", "0.003");
        let config = ArbitrageConfig::default().with_max_iterations(4);
        let q = quote_arbitrage_with_config(&state, Fixed::from_int(3), &config).unwrap();
        assert!(q.spread_after < q.spread_before);
    }

    #[test]
    fn test_extreme_pools_report_overflow() {
        let mut skewed = pool("1000", "1000", "0.003");
        skewed.reserve_x = Fixed::from_raw_i128(1);
        skewed.reserve_y = Fixed::parse(&format!("1{}", "0".repeat(50)));
        let quote = quote_arbitrage(&skewed, Fixed::ONE);
        assert_eq!(quote, Err(QuoteError::Math(MathError::Overflow("scaled decimal"))));
        assert_eq!(apply_arbitrage(&skewed, &quote), skewed);

        let max = format!("1{}", "0".repeat(58));
        let edge = pool(&max, &max, "0.003");
        assert!(quote_arbitrage(&edge, Fixed::max_value()).is_err());

        let big = format!("1{}", "0".repeat(21));
        let deep = pool(&big, &big, "0.003");
        let q = quote_arbitrage(&deep, Fixed::from_int(2)).unwrap();
        assert_eq!(q.direction, SwapDirection::YToX);
        assert!(q.expected_profit_in_y.is_positive());
        assert!(q.spread_after < q.spread_before);
    }

    #[test]
    fn test_failed_quote_applies_as_no_op() {
        let state = pool("1000", "2000", "0.003");
        let failed = quote_arbitrage(&state, Fixed::ZERO);
        assert_eq!(apply_arbitrage(&state, &failed), state);
    }
}
