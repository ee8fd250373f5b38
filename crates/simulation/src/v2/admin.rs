//! Pool administration: fee rate and token metadata.

use super::state::V2PoolState;
use crate::quote::{Quote, QuoteError, traced};
use amm_sandbox_domain::{Fixed, TokenInfo};
use tracing::info;

/// Validates a new fee rate; it must lie in `[0, 1)`.
pub fn quote_fee_rate_update(fee_rate: Fixed) -> Quote<Fixed> {
    let quote = if fee_rate.is_negative() || fee_rate >= Fixed::ONE {
        Err(QuoteError::InvalidFeeRate)
    } else {
        Ok(fee_rate)
    };
    traced("v2 fee rate update", quote)
}

/// Sets the fee rate. Like metadata edits this leaves `t` alone.
pub fn apply_fee_rate_update(state: &V2PoolState, quote: &Quote<Fixed>) -> V2PoolState {
    let Ok(fee_rate) = quote else {
        return state.clone();
    };
    let mut next = state.clone();
    next.fee_rate = *fee_rate;
    info!(t = next.t, fee_rate = %fee_rate, "Updated v2 fee rate");
    next
}

/// Replaces the token descriptors.
pub fn with_token_meta(state: &V2PoolState, token_x: &TokenInfo, token_y: &TokenInfo) -> V2PoolState {
    let mut next = state.clone();
    next.token_x = token_x.normalized();
    next.token_y = token_y.normalized();
    next
}
