//! Constant-product pool state.

use crate::config::V2PoolParams;
use amm_sandbox_domain::math::constant_product::{calculate_spot_price, initial_lp_supply};
use amm_sandbox_domain::{Fixed, MathError, SwapDirection, TokenInfo, U256};
use serde::{Deserialize, Serialize};

/// Snapshot of a constant-product pool with a single implicit LP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2PoolState {
    /// Base token.
    pub token_x: TokenInfo,
    /// Quote token.
    pub token_y: TokenInfo,
    /// X held by the pool.
    pub reserve_x: Fixed,
    /// Y held by the pool.
    pub reserve_y: Fixed,
    /// Swap fee as a fraction in `[0, 1)`.
    pub fee_rate: Fixed,
    /// Outstanding LP tokens.
    pub lp_total_supply: Fixed,
    /// LP tokens held by the user.
    pub lp_user_balance: Fixed,
    /// Cumulative fees charged in X.
    pub fee_acc_x: Fixed,
    /// Cumulative fees charged in Y.
    pub fee_acc_y: Fixed,
    /// Number of operations applied so far.
    pub t: u64,
    /// Metrics of the most recent swap, cleared by liquidity changes.
    pub last_trade: Option<V2TradeRecord>,
}

/// Before/after metrics of a committed swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2TradeRecord {
    pub direction: SwapDirection,
    pub reserve_x_before: Fixed,
    pub reserve_y_before: Fixed,
    pub reserve_x_after: Fixed,
    pub reserve_y_after: Fixed,
    pub amount_in: Fixed,
    pub amount_out: Fixed,
    pub amount_out_no_fee: Fixed,
    pub fee_amount_in_token: Fixed,
    pub avg_price_y_per_x: Fixed,
    pub spot_price_before_y_per_x: Fixed,
    pub spot_price_after_y_per_x: Fixed,
    pub slippage_total: Fixed,
    pub slippage_curve: Fixed,
    pub fee_impact_rate: Fixed,
    pub fee_impact_out_token: Fixed,
    #[serde(with = "amm_sandbox_domain::serde_dec")]
    pub k_before: U256,
    #[serde(with = "amm_sandbox_domain::serde_dec")]
    pub k_after: U256,
}

impl V2PoolState {
    /// Input and output reserves for a swap in `direction`.
    pub fn reserves_for(&self, direction: SwapDirection) -> (Fixed, Fixed) {
        match direction {
            SwapDirection::XToY => (self.reserve_x, self.reserve_y),
            SwapDirection::YToX => (self.reserve_y, self.reserve_x),
        }
    }

    pub fn has_reserves(&self) -> bool {
        self.reserve_x.is_positive() && self.reserve_y.is_positive()
    }

    /// Symbols of the input and output token for `direction`.
    pub fn symbols_for(&self, direction: SwapDirection) -> (&str, &str) {
        match direction {
            SwapDirection::XToY => (&self.token_x.symbol, &self.token_y.symbol),
            SwapDirection::YToX => (&self.token_y.symbol, &self.token_x.symbol),
        }
    }
}

/// Builds the initial state; the whole LP seed belongs to the user.
pub fn create_pool(params: &V2PoolParams) -> V2PoolState {
    let reserve_x = Fixed::parse(&params.reserve_x);
    let reserve_y = Fixed::parse(&params.reserve_y);
    let lp_seed = initial_lp_supply(reserve_x, reserve_y);

    V2PoolState {
        token_x: params.token_x.clone(),
        token_y: params.token_y.clone(),
        reserve_x,
        reserve_y,
        fee_rate: Fixed::parse(&params.fee_rate),
        lp_total_supply: lp_seed,
        lp_user_balance: lp_seed,
        fee_acc_x: Fixed::ZERO,
        fee_acc_y: Fixed::ZERO,
        t: 0,
        last_trade: None,
    }
}

/// Marginal price of X in Y; zero for an empty X reserve.
pub fn spot_price(state: &V2PoolState) -> Result<Fixed, MathError> {
    calculate_spot_price(state.reserve_x, state.reserve_y)
}

/// Total pool value expressed in Y at the spot price.
pub fn pool_value_in_y(state: &V2PoolState) -> Result<Fixed, MathError> {
    if !state.reserve_x.is_positive() {
        return Ok(state.reserve_y);
    }
    state.reserve_y.checked_add(state.reserve_x.checked_mul(spot_price(state)?)?)
}

/// `|base - target| / target`, or zero for a non-positive target.
pub fn relative_spread(base: Fixed, target: Fixed) -> Result<Fixed, MathError> {
    if !target.is_positive() {
        return Ok(Fixed::ZERO);
    }
    base.checked_sub(target)?.abs().checked_div(target)
}
