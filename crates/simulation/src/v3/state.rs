//! Concentrated-liquidity pool state with a single position.
//!
//! Token amounts and liquidity are [`Fixed`] values whose raw integers feed
//! the Q96 math directly; square-root prices and fee-growth accumulators are
//! plain Q96/Q128 integers.

use super::range::{default_range_around, is_tick_in_range, normalize_range};
use crate::config::V3PoolParams;
use amm_sandbox_domain::math::liquidity_amounts::{get_amount0_delta, get_amount1_delta, get_liquidity_for_amounts};
use amm_sandbox_domain::math::price_tick::{price_to_sqrt_price_x96, sqrt_price_x96_to_price};
use amm_sandbox_domain::math::tick_math::{sqrt_ratio_at_tick, tick_at_sqrt_ratio};
use amm_sandbox_domain::math::Rounding;
use amm_sandbox_domain::{FeeTier, Fixed, MathError, SwapDirection, TokenInfo, U256};
use serde::{Deserialize, Serialize};

/// Liquidity at or below this raw magnitude (1e-8) is treated as zero.
pub const LIQUIDITY_DUST: Fixed = Fixed::from_raw_i128(10_000_000_000);

/// Zeroes liquidity that has decayed to dust.
pub fn normalize_liquidity(value: Fixed) -> Fixed {
    if value <= LIQUIDITY_DUST { Fixed::ZERO } else { value }
}

/// Raw integer of a non-negative amount; negative amounts count as zero.
pub(crate) fn to_q(value: Fixed) -> Result<U256, MathError> {
    value.max(Fixed::ZERO).to_u256()
}

/// The user's single liquidity range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V3Position {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: Fixed,
    /// Fees credited in X since the position was opened.
    pub fee_owed_x: Fixed,
    /// Fees credited in Y since the position was opened.
    pub fee_owed_y: Fixed,
}

/// Snapshot of a concentrated-liquidity pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V3PoolState {
    pub token_x: TokenInfo,
    pub token_y: TokenInfo,
    pub fee_tier: FeeTier,
    /// Always `fee_tier.tick_spacing()`.
    pub tick_spacing: i32,
    #[serde(with = "amm_sandbox_domain::serde_dec")]
    pub sqrt_price_x96: U256,
    /// Derived from `sqrt_price_x96`.
    pub tick_current: i32,
    /// Active liquidity: the position's while the current tick is in range, zero otherwise.
    pub liquidity: Fixed,
    pub position: V3Position,
    #[serde(with = "amm_sandbox_domain::serde_dec")]
    pub fee_growth_global_x128_x: U256,
    #[serde(with = "amm_sandbox_domain::serde_dec")]
    pub fee_growth_global_x128_y: U256,
    pub fee_acc_x: Fixed,
    pub fee_acc_y: Fixed,
    pub t: u64,
    pub last_trade: Option<V3TradeRecord>,
}

/// Before/after metrics of a committed v3 swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V3TradeRecord {
    pub direction: SwapDirection,
    pub amount_in: Fixed,
    pub amount_in_consumed: Fixed,
    pub amount_in_unfilled: Fixed,
    pub amount_out: Fixed,
    pub fee_amount_in_token: Fixed,
    pub avg_price_y_per_x: Fixed,
    pub spot_price_before_y_per_x: Fixed,
    pub spot_price_after_y_per_x: Fixed,
    pub slippage_total: Fixed,
    #[serde(with = "amm_sandbox_domain::serde_dec")]
    pub sqrt_price_before_x96: U256,
    #[serde(with = "amm_sandbox_domain::serde_dec")]
    pub sqrt_price_after_x96: U256,
    pub tick_before: i32,
    pub tick_after: i32,
    pub liquidity_before: Fixed,
    pub liquidity_after: Fixed,
    pub crossed_boundary: bool,
    pub partial_fill: bool,
    #[serde(with = "amm_sandbox_domain::serde_dec")]
    pub k_before: U256,
    #[serde(with = "amm_sandbox_domain::serde_dec")]
    pub k_after: U256,
}

impl V3PoolState {
    /// Whether the current tick lies inside the position range.
    pub fn is_in_range(&self) -> bool {
        is_tick_in_range(self.tick_current, self.position.tick_lower, self.position.tick_upper)
    }

    /// Q96 square-root prices of the position bounds.
    pub fn position_sqrt_bounds(&self) -> Result<(U256, U256), MathError> {
        Ok((
            sqrt_ratio_at_tick(self.position.tick_lower)?,
            sqrt_ratio_at_tick(self.position.tick_upper)?,
        ))
    }

    /// Virtual reserves the position would hold at `sqrt_price_x96` with
    /// `liquidity`, rounded down. Returns `(x, y)`.
    pub fn virtual_reserves(&self, sqrt_price_x96: U256, liquidity: Fixed) -> Result<(U256, U256), MathError> {
        if !liquidity.is_positive() {
            return Ok((U256::zero(), U256::zero()));
        }
        let (sqrt_lower, sqrt_upper) = self.position_sqrt_bounds()?;
        let liquidity = to_q(liquidity)?;
        Ok((
            get_amount0_delta(sqrt_price_x96, sqrt_upper, liquidity, Rounding::Down)?,
            get_amount1_delta(sqrt_lower, sqrt_price_x96, liquidity, Rounding::Down)?,
        ))
    }

    /// Product of the virtual reserves, saturating at `U256::MAX`.
    pub fn virtual_k(&self, sqrt_price_x96: U256, liquidity: Fixed) -> Result<U256, MathError> {
        let (x, y) = self.virtual_reserves(sqrt_price_x96, liquidity)?;
        Ok(x.saturating_mul(y))
    }
}

/// Builds the initial state from `params`.
///
/// The initial price is clamped into the valid square-root domain, the
/// range is aligned to the tier spacing and the deposit is converted to the
/// largest liquidity it can fund.
pub fn create_pool(params: &V3PoolParams) -> Result<V3PoolState, MathError> {
    let tick_spacing = params.fee_tier.tick_spacing();
    let sqrt_price_x96 = price_to_sqrt_price_x96(Fixed::parse(&params.initial_price))?;
    let tick_current = tick_at_sqrt_ratio(sqrt_price_x96)?;

    let (fallback_lower, fallback_upper) = default_range_around(tick_current, tick_spacing);
    let (tick_lower, tick_upper) = normalize_range(
        params.tick_lower.unwrap_or(fallback_lower),
        params.tick_upper.unwrap_or(fallback_upper),
        tick_spacing,
    );

    let liquidity = Fixed::from_u256(get_liquidity_for_amounts(
        sqrt_price_x96,
        sqrt_ratio_at_tick(tick_lower)?,
        sqrt_ratio_at_tick(tick_upper)?,
        to_q(Fixed::parse(&params.initial_amount_x))?,
        to_q(Fixed::parse(&params.initial_amount_y))?,
    )?)?;

    let active = if is_tick_in_range(tick_current, tick_lower, tick_upper) {
        liquidity
    } else {
        Fixed::ZERO
    };

    Ok(V3PoolState {
        token_x: params.token_x.clone(),
        token_y: params.token_y.clone(),
        fee_tier: params.fee_tier,
        tick_spacing,
        sqrt_price_x96,
        tick_current,
        liquidity: active,
        position: V3Position {
            tick_lower,
            tick_upper,
            liquidity,
            fee_owed_x: Fixed::ZERO,
            fee_owed_y: Fixed::ZERO,
        },
        fee_growth_global_x128_x: U256::zero(),
        fee_growth_global_x128_y: U256::zero(),
        fee_acc_x: Fixed::ZERO,
        fee_acc_y: Fixed::ZERO,
        t: 0,
        last_trade: None,
    })
}

/// Marginal price of X in Y.
pub fn spot_price(state: &V3PoolState) -> Result<Fixed, MathError> {
    sqrt_price_x96_to_price(state.sqrt_price_x96)
}
