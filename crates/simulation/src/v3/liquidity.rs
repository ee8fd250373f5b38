//! Deposits into and withdrawals from the single position.

use super::range::{is_tick_in_range, normalize_range};
use super::state::{V3PoolState, normalize_liquidity, to_q};
use crate::quote::{Quote, QuoteError, traced};
use amm_sandbox_domain::Fixed;
use amm_sandbox_domain::math::liquidity_amounts::{get_amounts_for_liquidity, get_liquidity_for_amounts};
use amm_sandbox_domain::math::tick_math::sqrt_ratio_at_tick;
use tracing::info;

/// A deposit request. Unset ticks keep the position's current range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct V3AddLiquidityParams {
    pub amount_x: Fixed,
    pub amount_y: Fixed,
    pub tick_lower: Option<i32>,
    pub tick_upper: Option<i32>,
}

impl V3AddLiquidityParams {
    #[must_use]
    pub fn new(amount_x: Fixed, amount_y: Fixed) -> Self {
        Self {
            amount_x,
            amount_y,
            ..Self::default()
        }
    }

    /// Requests a new range; only allowed while the position is empty.
    #[must_use]
    pub fn with_range(mut self, tick_lower: i32, tick_upper: i32) -> Self {
        self.tick_lower = Some(tick_lower);
        self.tick_upper = Some(tick_upper);
        self
    }
}

/// Effect of a deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3AddLiquidityQuote {
    pub amount_x_in: Fixed,
    pub amount_y_in: Fixed,
    pub amount_x_used: Fixed,
    pub amount_y_used: Fixed,
    pub refund_x: Fixed,
    pub refund_y: Fixed,
    pub liquidity_delta: Fixed,
    /// Aligned range the deposit goes into.
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub position_liquidity_after: Fixed,
    pub active_liquidity_after: Fixed,
    /// The deposit re-centers an empty position.
    pub range_updated: bool,
}

/// Effect of a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3RemoveLiquidityQuote {
    pub liquidity_delta: Fixed,
    pub amount_x_out: Fixed,
    pub amount_y_out: Fixed,
    pub position_liquidity_after: Fixed,
    pub active_liquidity_after: Fixed,
}

/// Quotes a deposit at the current price.
///
/// Below the range only X is taken, above it only Y; inside it both sides
/// are needed and the scarcer one bounds the liquidity minted.
pub fn quote_add_liquidity(state: &V3PoolState, params: &V3AddLiquidityParams) -> Quote<V3AddLiquidityQuote> {
    traced("v3 add liquidity", compute_add(state, params))
}

fn compute_add(state: &V3PoolState, params: &V3AddLiquidityParams) -> Quote<V3AddLiquidityQuote> {
    if !params.amount_x.is_positive() && !params.amount_y.is_positive() {
        return Err(QuoteError::EmptyDeposit);
    }

    let (tick_lower, tick_upper) = normalize_range(
        params.tick_lower.unwrap_or(state.position.tick_lower),
        params.tick_upper.unwrap_or(state.position.tick_upper),
        state.tick_spacing,
    );
    let current_liquidity = normalize_liquidity(state.position.liquidity);
    let range_updated = tick_lower != state.position.tick_lower || tick_upper != state.position.tick_upper;
    if range_updated && current_liquidity.is_positive() {
        return Err(QuoteError::RangeLocked);
    }

    let sqrt_lower = sqrt_ratio_at_tick(tick_lower)?;
    let sqrt_upper = sqrt_ratio_at_tick(tick_upper)?;
    let delta = get_liquidity_for_amounts(
        state.sqrt_price_x96,
        sqrt_lower,
        sqrt_upper,
        to_q(params.amount_x)?,
        to_q(params.amount_y)?,
    )?;
    let liquidity_delta = Fixed::from_u256(delta)?;
    if !liquidity_delta.is_positive() {
        return Err(QuoteError::LiquidityDeltaTooSmall);
    }

    let (used_x, used_y) = get_amounts_for_liquidity(state.sqrt_price_x96, sqrt_lower, sqrt_upper, delta)?;
    let amount_x_used = Fixed::from_u256(used_x)?;
    let amount_y_used = Fixed::from_u256(used_y)?;

    let base = if range_updated { Fixed::ZERO } else { current_liquidity };
    let position_liquidity_after = normalize_liquidity(base.checked_add(liquidity_delta)?);
    let active_liquidity_after = if is_tick_in_range(state.tick_current, tick_lower, tick_upper) {
        position_liquidity_after
    } else {
        Fixed::ZERO
    };

    Ok(V3AddLiquidityQuote {
        amount_x_in: params.amount_x,
        amount_y_in: params.amount_y,
        amount_x_used,
        amount_y_used,
        refund_x: params.amount_x - amount_x_used,
        refund_y: params.amount_y - amount_y_used,
        liquidity_delta,
        tick_lower,
        tick_upper,
        position_liquidity_after,
        active_liquidity_after,
        range_updated,
    })
}

pub fn apply_add_liquidity(state: &V3PoolState, quote: &Quote<V3AddLiquidityQuote>) -> V3PoolState {
    let Ok(quote) = quote else {
        return state.clone();
    };

    let mut next = state.clone();
    if quote.range_updated {
        next.position.tick_lower = quote.tick_lower;
        next.position.tick_upper = quote.tick_upper;
    }
    next.position.liquidity = normalize_liquidity(quote.position_liquidity_after);
    next.liquidity = normalize_liquidity(quote.active_liquidity_after);
    next.t = state.t + 1;
    next.last_trade = None;

    info!(
        t = next.t,
        liquidity_delta = %quote.liquidity_delta,
        tick_lower = next.position.tick_lower,
        tick_upper = next.position.tick_upper,
        "Applied v3 add liquidity"
    );
    next
}

/// Quotes burning `liquidity_delta` from the position at the current price.
pub fn quote_remove_liquidity(state: &V3PoolState, liquidity_delta: Fixed) -> Quote<V3RemoveLiquidityQuote> {
    traced("v3 remove liquidity", compute_remove(state, liquidity_delta))
}

fn compute_remove(state: &V3PoolState, liquidity_delta: Fixed) -> Quote<V3RemoveLiquidityQuote> {
    let current_liquidity = normalize_liquidity(state.position.liquidity);
    if !liquidity_delta.is_positive() {
        return Err(QuoteError::NonPositiveLiquidityBurn);
    }
    if !current_liquidity.is_positive() {
        return Err(QuoteError::NoPositionLiquidity);
    }
    if liquidity_delta > current_liquidity {
        return Err(QuoteError::BurnExceedsLiquidity);
    }

    let (sqrt_lower, sqrt_upper) = state.position_sqrt_bounds()?;
    let (out_x, out_y) = get_amounts_for_liquidity(state.sqrt_price_x96, sqrt_lower, sqrt_upper, to_q(liquidity_delta)?)?;
    let amount_x_out = Fixed::from_u256(out_x)?;
    let amount_y_out = Fixed::from_u256(out_y)?;
    if !amount_x_out.is_positive() && !amount_y_out.is_positive() {
        return Err(QuoteError::WithdrawTooSmallAtPrecision);
    }

    let position_liquidity_after = normalize_liquidity(current_liquidity - liquidity_delta);
    let active_liquidity_after = if state.is_in_range() {
        position_liquidity_after
    } else {
        Fixed::ZERO
    };

    Ok(V3RemoveLiquidityQuote {
        liquidity_delta,
        amount_x_out,
        amount_y_out,
        position_liquidity_after,
        active_liquidity_after,
    })
}

pub fn apply_remove_liquidity(state: &V3PoolState, quote: &Quote<V3RemoveLiquidityQuote>) -> V3PoolState {
    let Ok(quote) = quote else {
        return state.clone();
    };

    let mut next = state.clone();
    next.position.liquidity = normalize_liquidity(quote.position_liquidity_after);
    next.liquidity = normalize_liquidity(quote.active_liquidity_after);
    next.t = state.t + 1;
    next.last_trade = None;

    info!(t = next.t, liquidity_delta = %quote.liquidity_delta, "Applied v3 remove liquidity");
    next
}
