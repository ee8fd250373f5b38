//! Pool administration: fee tier and token metadata.

use super::range::normalize_range;
use super::state::{V3PoolState, normalize_liquidity};
use crate::quote::{Quote, QuoteError, traced};
use amm_sandbox_domain::{FeeTier, Fixed, TokenInfo};
use tracing::info;

/// A tier change re-spaces the range, so it needs an empty position.
pub fn quote_fee_tier_update(state: &V3PoolState, fee_tier: FeeTier) -> Quote<FeeTier> {
    let quote = if normalize_liquidity(state.position.liquidity).is_positive() {
        Err(QuoteError::FeeTierLocked)
    } else {
        Ok(fee_tier)
    };
    traced("v3 fee tier update", quote)
}

/// Switches the tier and realigns the empty range to its spacing.
pub fn apply_fee_tier_update(state: &V3PoolState, quote: &Quote<FeeTier>) -> V3PoolState {
    let Ok(fee_tier) = quote else {
        return state.clone();
    };

    let mut next = state.clone();
    let spacing = fee_tier.tick_spacing();
    let (tick_lower, tick_upper) = normalize_range(state.position.tick_lower, state.position.tick_upper, spacing);
    next.fee_tier = *fee_tier;
    next.tick_spacing = spacing;
    next.position.tick_lower = tick_lower;
    next.position.tick_upper = tick_upper;
    next.liquidity = Fixed::ZERO;

    info!(fee_tier = %fee_tier, tick_lower, tick_upper, "Updated v3 fee tier");
    next
}

/// Replaces the token descriptors.
pub fn with_token_meta(state: &V3PoolState, token_x: &TokenInfo, token_y: &TokenInfo) -> V3PoolState {
    let mut next = state.clone();
    next.token_x = token_x.normalized();
    next.token_y = token_y.normalized();
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::V3PoolParams;
    use crate::v3::liquidity::{apply_remove_liquidity, quote_remove_liquidity};
    use crate::v3::state::create_pool;

    #[test]
    fn test_tier_locked_while_position_open() {
        let state = create_pool(&V3PoolParams::default()).unwrap();
        let quote = quote_fee_tier_update(&state, FeeTier::High);
        assert_eq!(quote, Err(QuoteError::FeeTierLocked));
        assert_eq!(apply_fee_tier_update(&state, &quote), state);
    }

    #[test]
    fn test_tier_change_realigns_range() {
        let params = V3PoolParams::new(FeeTier::Low, "1").with_range(-130, 130);
        let state = create_pool(&params).unwrap();
        assert_eq!((state.position.tick_lower, state.position.tick_upper), (-130, 130));

        let empty = apply_remove_liquidity(&state, &quote_remove_liquidity(&state, state.position.liquidity));
        let next = apply_fee_tier_update(&empty, &quote_fee_tier_update(&empty, FeeTier::Medium));

        assert_eq!(next.fee_tier, FeeTier::Medium);
        assert_eq!(next.tick_spacing, 60);
        assert_eq!((next.position.tick_lower, next.position.tick_upper), (-180, 180));
        assert!(next.liquidity.is_zero());
        assert_eq!(next.t, empty.t);
    }

    #[test]
    fn test_token_meta() {
        let state = create_pool(&V3PoolParams::default()).unwrap();
        let next = with_token_meta(&state, &TokenInfo::new("ETH", 18), &TokenInfo::new(" USDC", 6));
        assert_eq!(next.token_y, TokenInfo::new("USDC", 6));
        assert_eq!(next.position, state.position);
    }
}
